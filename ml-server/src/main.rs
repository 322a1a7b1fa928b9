//! TrustAI ML Server
//!
//! Serves approval scores and SHAP explanations for loan applications.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                   TRUSTAI ML SERVER                    │
//! ├────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌─────────────┐   ┌────────────────┐  │
//! │  │  Routes   │──▶│  Inference  │──▶│   Vectorizer   │  │
//! │  │  (Axum)   │   │  Service    │   │  (trustai-core)│  │
//! │  └───────────┘   └──────┬──────┘   └────────────────┘  │
//! │                         ▼                              │
//! │                  ┌──────────────┐                      │
//! │                  │   Model      │  scoring model       │
//! │                  │   Registry   │  SHAP explainer      │
//! │                  └──────────────┘                      │
//! └────────────────────────────────────────────────────────┘
//! ```

mod config;
mod error;
mod handlers;
mod inference;
mod models;
mod registry;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

pub use error::{AppError, AppResult};
use registry::ModelRegistry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    dotenvy::dotenv().ok();
    let config = config::Config::from_env();

    // Initialize logging
    let fmt_layer = if config.is_production() {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trustai_ml_server=debug,trustai_core=info,tower_http=debug".into()),
        )
        .with(fmt_layer)
        .init();

    tracing::info!("TrustAI ML Server starting...");
    tracing::info!("Model directory: {}", config.model_dir.display());

    // Load models once; failures degrade to fallback responses
    let registry = Arc::new(ModelRegistry::load(&config));

    // Build application state
    let state = AppState {
        registry,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("🚀 Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: config::Config,
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::health::alive))
        .route("/health", get(handlers::health::check))
        .route("/score", post(handlers::scoring::score))
        .route("/shap", post(handlers::scoring::shap))
        .route("/simulate-traffic", post(handlers::simulation::simulate))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
