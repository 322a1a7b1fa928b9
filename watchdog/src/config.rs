//! Watchdog configuration

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// Isolation forest artifact
    pub model_path: PathBuf,

    /// Endpoint receiving anomaly alerts
    pub webhook_url: String,

    /// Pause between iterations
    pub interval: Duration,

    /// Pause after a failed iteration
    pub recovery_pause: Duration,

    /// Per-request timeout for webhook delivery
    pub webhook_timeout: Duration,

    /// Share of generated transactions that follow the fraud pattern
    pub fraud_rate: f64,
}

impl Default for WatchdogConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("models/anomaly_model.json"),
            webhook_url: "http://localhost:5000/api/webhook/anomaly".to_string(),
            interval: Duration::from_millis(3000),
            recovery_pause: Duration::from_millis(1000),
            webhook_timeout: Duration::from_millis(1000),
            fraud_rate: 0.2,
        }
    }
}

impl WatchdogConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            model_path: env::var("WATCHDOG_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),

            webhook_url: env::var("WEBHOOK_URL").unwrap_or(defaults.webhook_url),

            interval: millis_var("WATCHDOG_INTERVAL_MS").unwrap_or(defaults.interval),

            recovery_pause: millis_var("WATCHDOG_RECOVERY_MS").unwrap_or(defaults.recovery_pause),

            webhook_timeout: millis_var("WEBHOOK_TIMEOUT_MS").unwrap_or(defaults.webhook_timeout),

            fraud_rate: env::var("WATCHDOG_FRAUD_RATE")
                .ok()
                .and_then(|r| r.parse::<f64>().ok())
                .filter(|r| (0.0..=1.0).contains(r))
                .unwrap_or(defaults.fraud_rate),
        }
    }
}

fn millis_var(key: &str) -> Option<Duration> {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .map(Duration::from_millis)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WatchdogConfig::default();
        assert_eq!(config.interval, Duration::from_secs(3));
        assert_eq!(config.recovery_pause, Duration::from_secs(1));
        assert_eq!(config.webhook_timeout, Duration::from_secs(1));
        assert_eq!(config.fraud_rate, 0.2);
        assert!(config.webhook_url.ends_with("/api/webhook/anomaly"));
    }
}
