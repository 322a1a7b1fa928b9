//! Anomaly alert delivery
//!
//! Alerts are best effort: one POST per anomaly, bounded by the client
//! timeout, never retried or queued.

use std::future::Future;
use std::time::Duration;

use serde::Serialize;
use trustai_core::Transaction;

pub const ALERT_DETAILS: &str = "Watchdog Auto-Detection";

/// Body POSTed to the anomaly webhook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnomalyAlert {
    pub transaction: Transaction,
    pub score: f64,
    pub details: String,
}

impl AnomalyAlert {
    pub fn new(transaction: Transaction, score: f64) -> Self {
        Self {
            transaction,
            score,
            details: ALERT_DETAILS.to_string(),
        }
    }
}

#[derive(Debug)]
pub enum AlertError {
    /// Client could not be constructed
    ClientError(String),
    /// No response within the timeout
    Timeout,
    /// Connection failed
    NetworkError(String),
    /// Non-success response
    ServerError(u16),
}

impl std::fmt::Display for AlertError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ClientError(e) => write!(f, "HTTP client error: {}", e),
            Self::Timeout => write!(f, "Webhook timed out"),
            Self::NetworkError(e) => write!(f, "Network error: {}", e),
            Self::ServerError(code) => write!(f, "Server error: {}", code),
        }
    }
}

impl std::error::Error for AlertError {}

/// Destination for anomaly alerts
pub trait AlertSink: Send + Sync {
    fn send(&self, alert: &AnomalyAlert) -> impl Future<Output = Result<(), AlertError>> + Send;
}

/// Webhook over HTTP
pub struct WebhookClient {
    url: String,
    http_client: reqwest::Client,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, AlertError> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AlertError::ClientError(e.to_string()))?;

        Ok(Self {
            url: url.into(),
            http_client,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl AlertSink for WebhookClient {
    async fn send(&self, alert: &AnomalyAlert) -> Result<(), AlertError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AlertError::Timeout
                } else {
                    AlertError::NetworkError(e.to_string())
                }
            })?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(AlertError::ServerError(response.status().as_u16()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    fn alert() -> AnomalyAlert {
        let transaction = Transaction {
            credit_score: 320,
            dti_ratio: 0.81,
            late_payments_6m: 4,
            employment_months: 2,
            monthly_income: 42000,
        };
        AnomalyAlert::new(transaction, -0.1234)
    }

    /// Serve `router` on an ephemeral port and return the webhook URL
    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/webhook/anomaly", addr)
    }

    #[test]
    fn test_alert_wire_format() {
        let value = serde_json::to_value(alert()).unwrap();
        assert_eq!(
            value,
            json!({
                "transaction": {
                    "credit_score": 320,
                    "dti_ratio": 0.81,
                    "late_payments_6m": 4,
                    "employment_months": 2,
                    "monthly_income": 42000
                },
                "score": -0.1234,
                "details": "Watchdog Auto-Detection"
            })
        );
    }

    #[tokio::test]
    async fn test_webhook_delivers_alert() {
        let received: Arc<Mutex<Vec<Value>>> = Arc::default();
        let router = Router::new()
            .route(
                "/api/webhook/anomaly",
                post(
                    |State(store): State<Arc<Mutex<Vec<Value>>>>, Json(body): Json<Value>| async move {
                        store.lock().unwrap().push(body);
                        StatusCode::OK
                    },
                ),
            )
            .with_state(received.clone());
        let url = serve(router).await;

        let client = WebhookClient::new(url, Duration::from_secs(1)).unwrap();
        client.send(&alert()).await.unwrap();

        let received = received.lock().unwrap();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0]["details"], "Watchdog Auto-Detection");
        assert_eq!(received[0]["transaction"]["credit_score"], 320);
    }

    #[tokio::test]
    async fn test_webhook_error_status() {
        let router = Router::new().route(
            "/api/webhook/anomaly",
            post(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        );
        let url = serve(router).await;

        let client = WebhookClient::new(url, Duration::from_secs(1)).unwrap();
        let err = client.send(&alert()).await.unwrap_err();
        assert!(matches!(err, AlertError::ServerError(500)));
    }

    #[tokio::test]
    async fn test_webhook_timeout() {
        let router = Router::new().route(
            "/api/webhook/anomaly",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let url = serve(router).await;

        let client = WebhookClient::new(url, Duration::from_millis(100)).unwrap();
        let err = client.send(&alert()).await.unwrap_err();
        assert!(matches!(err, AlertError::Timeout));
    }

    #[tokio::test]
    async fn test_webhook_offline() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = format!("http://{}/api/webhook/anomaly", addr);
        let client = WebhookClient::new(url, Duration::from_secs(1)).unwrap();
        let err = client.send(&alert()).await.unwrap_err();
        assert!(matches!(err, AlertError::NetworkError(_)));
    }
}
