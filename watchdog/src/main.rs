//! TrustAI Watchdog
//!
//! Generates synthetic loan traffic, scores every transaction with the
//! isolation forest and posts anomalies to the backend webhook. A missing
//! anomaly model is fatal: the process exits with status 1 before the first
//! iteration.

mod alert;
mod config;
mod detector;
mod generator;
mod watchdog;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;
use trustai_core::model::IsolationForest;

use crate::alert::WebhookClient;
use crate::config::WatchdogConfig;
use crate::detector::WatchdogState;
use crate::watchdog::{Watchdog, WatchdogError};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = WatchdogConfig::from_env();

    let (state, client) = match init(&config) {
        Ok(parts) => parts,
        Err(e) => {
            log::error!("❌ CRITICAL ERROR: {}", e);
            std::process::exit(1);
        }
    };

    let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = shutdown_tx.send(()).await;
            }
            Err(e) => log::error!("Failed to listen for Ctrl+C: {}", e),
        }
    });

    Watchdog::new(state, client, StdRng::from_entropy(), &config)
        .with_shutdown(shutdown_rx)
        .run()
        .await;
}

/// Init phase: load the model and build the webhook client
fn init(config: &WatchdogConfig) -> Result<(WatchdogState<IsolationForest>, WebhookClient), WatchdogError> {
    log::info!("⚙️  Loading anomaly model from: {}", config.model_path.display());

    let state = WatchdogState::load(&config.model_path)
        .map_err(|e| WatchdogError::Init(e.to_string()))?;
    log::info!("✅ Model loaded, columns: {}", state.columns().join(", "));

    let client = WebhookClient::new(config.webhook_url.clone(), config.webhook_timeout)
        .map_err(|e| WatchdogError::Init(e.to_string()))?;
    log::info!("Alerts go to {} (timeout {:?})", client.url(), config.webhook_timeout);

    Ok((state, client))
}
