//! Anomaly watch loop
//!
//! ```text
//! Init ──▶ Running ──▶ Terminated
//!   │         ▲  │
//!   ▼         └──┘ generate → classify → alert → wait
//! FatalExit
//! ```
//!
//! Init is handled by the caller; this module runs the loop. Waits race the
//! shutdown channel, so a stop request never waits out a full interval.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rand::Rng;
use serde::Serialize;
use tokio::sync::mpsc;
use trustai_core::model::AnomalyDetector;
use trustai_core::ModelError;

use crate::alert::{AlertSink, AnomalyAlert};
use crate::config::WatchdogConfig;
use crate::detector::WatchdogState;
use crate::generator;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug)]
pub enum WatchdogError {
    /// Startup failed; the watchdog cannot run
    Init(String),
    /// A single iteration failed
    Detection(ModelError),
}

impl std::fmt::Display for WatchdogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init(e) => write!(f, "Initialization failed: {}", e),
            Self::Detection(e) => write!(f, "Detection failed: {}", e),
        }
    }
}

impl std::error::Error for WatchdogError {}

impl From<ModelError> for WatchdogError {
    fn from(e: ModelError) -> Self {
        WatchdogError::Detection(e)
    }
}

// ============================================================================
// STATS
// ============================================================================

#[derive(Debug, Default)]
pub struct WatchdogStats {
    iterations: AtomicU64,
    anomalies: AtomicU64,
    alerts_sent: AtomicU64,
    alerts_failed: AtomicU64,
    errors: AtomicU64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub iterations: u64,
    pub anomalies: u64,
    pub alerts_sent: u64,
    pub alerts_failed: u64,
    pub errors: u64,
}

impl WatchdogStats {
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            iterations: self.iterations.load(Ordering::Relaxed),
            anomalies: self.anomalies.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
            alerts_failed: self.alerts_failed.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }

    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

// ============================================================================
// LOOP
// ============================================================================

pub struct Watchdog<D, S, R> {
    state: WatchdogState<D>,
    sink: S,
    rng: R,
    interval: Duration,
    recovery_pause: Duration,
    fraud_rate: f64,
    stats: WatchdogStats,
    shutdown_rx: Option<mpsc::Receiver<()>>,
}

impl<D, S, R> Watchdog<D, S, R>
where
    D: AnomalyDetector,
    S: AlertSink,
    R: Rng,
{
    pub fn new(state: WatchdogState<D>, sink: S, rng: R, config: &WatchdogConfig) -> Self {
        Self {
            state,
            sink,
            rng,
            interval: config.interval,
            recovery_pause: config.recovery_pause,
            fraud_rate: config.fraud_rate.clamp(0.0, 1.0),
            stats: WatchdogStats::default(),
            shutdown_rx: None,
        }
    }

    /// Set the shutdown receiver
    pub fn with_shutdown(mut self, rx: mpsc::Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run until a shutdown signal arrives
    pub async fn run(mut self) -> StatsSnapshot {
        log::info!("👀 Watchdog active: monitoring live transactions");
        log::info!(
            "Interval: {:?}, recovery pause: {:?}, fraud rate: {}",
            self.interval,
            self.recovery_pause,
            self.fraud_rate
        );

        loop {
            let pause = match self.run_iteration().await {
                Ok(()) => self.interval,
                Err(e) => {
                    WatchdogStats::bump(&self.stats.errors);
                    log::error!("⚠️ Loop error: {}", e);
                    self.recovery_pause
                }
            };

            if self.wait(pause).await {
                log::info!("Shutdown signal received");
                break;
            }
        }

        let stats = self.stats.snapshot();
        log::info!(
            "Watchdog stopped: {} iterations, {} anomalies, {} alerts sent, {} failed, {} errors",
            stats.iterations,
            stats.anomalies,
            stats.alerts_sent,
            stats.alerts_failed,
            stats.errors
        );
        stats
    }

    /// One generate → classify → alert pass
    async fn run_iteration(&mut self) -> Result<(), WatchdogError> {
        WatchdogStats::bump(&self.stats.iterations);

        let (pattern, txn) = generator::next_transaction(&mut self.rng, self.fraud_rate);
        let detection = self.state.classify(&txn)?;

        if !detection.is_anomaly() {
            log::info!("{} | Score: {:.4}", pattern.label(), detection.score);
            return Ok(());
        }

        WatchdogStats::bump(&self.stats.anomalies);
        log::warn!("🚨 ANOMALY DETECTED! Score: {:.4}", detection.score);

        let alert = AnomalyAlert::new(txn, detection.score);
        match self.sink.send(&alert).await {
            Ok(()) => {
                WatchdogStats::bump(&self.stats.alerts_sent);
                log::info!("   -> Alert sent to backend");
            }
            Err(e) => {
                WatchdogStats::bump(&self.stats.alerts_failed);
                log::warn!("   -> Alert dropped, backend offline: {}", e);
            }
        }

        Ok(())
    }

    /// Sleep for `pause`; true when shutdown was requested meanwhile
    async fn wait(&mut self, pause: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(pause) => false,
            Some(_) = async {
                if let Some(ref mut rx) = self.shutdown_rx {
                    rx.recv().await
                } else {
                    std::future::pending::<Option<()>>().await
                }
            } => true,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::AlertError;
    use ndarray::{Array1, ArrayView2};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::atomic::AtomicUsize;
    use std::sync::{Arc, Mutex};
    use trustai_core::model::{ANOMALY_LABEL, INLIER_LABEL};

    /// Detector answering every row with the same label
    struct Fixed {
        label: i8,
        score: f64,
    }

    impl AnomalyDetector for Fixed {
        fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Array1<i8>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), self.label))
        }

        fn decision_function(&self, x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
            Ok(Array1::from_elem(x.nrows(), self.score))
        }
    }

    struct Failing;

    impl AnomalyDetector for Failing {
        fn predict(&self, _x: ArrayView2<'_, f64>) -> Result<Array1<i8>, ModelError> {
            Err(ModelError::InvalidOutput("model exploded".to_string()))
        }

        fn decision_function(&self, _x: ArrayView2<'_, f64>) -> Result<Array1<f64>, ModelError> {
            Err(ModelError::InvalidOutput("model exploded".to_string()))
        }
    }

    /// Sink recording alerts, optionally failing every delivery
    #[derive(Clone, Default)]
    struct Recorder {
        alerts: Arc<Mutex<Vec<AnomalyAlert>>>,
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl AlertSink for Recorder {
        async fn send(&self, alert: &AnomalyAlert) -> Result<(), AlertError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AlertError::Timeout);
            }
            self.alerts.lock().unwrap().push(alert.clone());
            Ok(())
        }
    }

    fn config() -> WatchdogConfig {
        WatchdogConfig {
            interval: Duration::from_secs(3),
            recovery_pause: Duration::from_secs(1),
            ..WatchdogConfig::default()
        }
    }

    fn watchdog<D: AnomalyDetector>(
        detector: D,
        sink: Recorder,
    ) -> (Watchdog<D, Recorder, StdRng>, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel(1);
        let dog = Watchdog::new(WatchdogState::new(detector), sink, StdRng::seed_from_u64(1), &config())
            .with_shutdown(rx);
        (dog, tx)
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_webhook_does_not_stop_loop() {
        let sink = Recorder {
            fail: true,
            ..Recorder::default()
        };
        let detector = Fixed { label: ANOMALY_LABEL, score: -0.2 };
        let (dog, tx) = watchdog(detector, sink.clone());
        let handle = tokio::spawn(dog.run());

        // Iterations at t = 0, 3, 6, 9
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        tx.send(()).await.unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(stats.iterations, 4);
        assert_eq!(stats.anomalies, 4);
        assert_eq!(stats.alerts_failed, 4);
        assert_eq!(stats.alerts_sent, 0);
        assert_eq!(stats.errors, 0);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_iteration_error_uses_recovery_pause() {
        let (dog, tx) = watchdog(Failing, Recorder::default());
        let handle = tokio::spawn(dog.run());

        // Failures at t = 0, 1, ..., 10
        tokio::time::sleep(Duration::from_millis(10_500)).await;
        tx.send(()).await.unwrap();
        let stats = handle.await.unwrap();

        assert_eq!(stats.iterations, 11);
        assert_eq!(stats.errors, 11);
        assert_eq!(stats.anomalies, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inliers_raise_no_alerts() {
        let sink = Recorder::default();
        let detector = Fixed { label: INLIER_LABEL, score: 0.1 };
        let (dog, tx) = watchdog(detector, sink.clone());
        let handle = tokio::spawn(dog.run());

        tokio::time::sleep(Duration::from_secs(20)).await;
        tx.send(()).await.unwrap();
        let stats = handle.await.unwrap();

        assert!(stats.iterations > 0);
        assert_eq!(stats.anomalies, 0);
        assert_eq!(sink.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_alert_carries_transaction_and_score() {
        let sink = Recorder::default();
        let detector = Fixed { label: ANOMALY_LABEL, score: -0.3125 };
        let (dog, tx) = watchdog(detector, sink.clone());
        let handle = tokio::spawn(dog.run());

        tokio::time::sleep(Duration::from_millis(500)).await;
        tx.send(()).await.unwrap();
        let stats = handle.await.unwrap();
        assert_eq!(stats.alerts_sent, 1);

        let alerts = sink.alerts.lock().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].score, -0.3125);
        assert_eq!(alerts[0].details, "Watchdog Auto-Detection");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_interrupts_wait() {
        let detector = Fixed { label: INLIER_LABEL, score: 0.1 };
        let (dog, tx) = watchdog(detector, Recorder::default());
        tx.send(()).await.unwrap();

        let start = tokio::time::Instant::now();
        let stats = dog.run().await;
        assert_eq!(stats.iterations, 1);
        assert!(start.elapsed() < Duration::from_secs(3));
    }
}
