//! Webhook push backend.
//!
//! Delivers wake-up notifications by POSTing JSON to the push endpoint,
//! which must be an HTTP(S) URL:
//!
//! ```json
//! { "queue": "…-to-responder", "payload": "<transit text>", "alert": "Login request" }
//! ```
//!
//! `alert` is omitted for silent notifications.

use crate::config::PushConfig;
use async_trait::async_trait;
use pairlink_client::{PushBackend, PushError};
use pairlink_types::{PushEndpoint, QueueName};
use serde::Serialize;
use std::time::Duration;

/// Push backend that calls a webhook per notification.
#[derive(Debug, Clone)]
pub struct WebhookPush {
    client: reqwest::Client,
    enabled: bool,
}

#[derive(Debug, Serialize)]
struct WebhookBody<'a> {
    queue: &'a str,
    payload: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<&'a str>,
}

impl WebhookPush {
    /// Build a webhook backend from push configuration.
    pub fn new(config: &PushConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            enabled: config.enabled,
        })
    }

    async fn post(&self, endpoint: &PushEndpoint, body: WebhookBody<'_>) -> Result<(), PushError> {
        if !self.enabled {
            return Err(PushError::Disabled);
        }

        let response = self
            .client
            .post(endpoint.as_str())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    PushError::Timeout
                } else {
                    PushError::Delivery(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PushError::Rejected(format!("endpoint returned {status}")));
        }

        tracing::debug!(queue = body.queue, %status, "webhook delivered");
        Ok(())
    }
}

#[async_trait]
impl PushBackend for WebhookPush {
    async fn notify_silent(
        &self,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError> {
        self.post(
            endpoint,
            WebhookBody {
                queue: queue.as_str(),
                payload,
                alert: None,
            },
        )
        .await
    }

    async fn notify_alert(
        &self,
        alert: &str,
        payload: &str,
        endpoint: &PushEndpoint,
        queue: &QueueName,
    ) -> Result<(), PushError> {
        self.post(
            endpoint,
            WebhookBody {
                queue: queue.as_str(),
                payload,
                alert: Some(alert),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::Value;
    use tokio::sync::mpsc;

    fn push(timeout_secs: u64) -> WebhookPush {
        WebhookPush::new(&PushConfig {
            enabled: true,
            timeout_secs,
        })
        .unwrap()
    }

    async fn serve(app: Router) -> PushEndpoint {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        PushEndpoint::new(format!("http://{addr}/hook")).unwrap()
    }

    async fn recording_hook(status: StatusCode) -> (PushEndpoint, mpsc::UnboundedReceiver<Value>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let app = Router::new().route(
            "/hook",
            post(move |Json(body): Json<Value>| {
                let tx = tx.clone();
                async move {
                    let _ = tx.send(body);
                    status
                }
            }),
        );
        (serve(app).await, rx)
    }

    fn queue() -> QueueName {
        QueueName::new("abc-to-responder").unwrap()
    }

    #[tokio::test]
    async fn silent_notification_omits_alert() {
        let (endpoint, mut rx) = recording_hook(StatusCode::OK).await;

        push(5).notify_silent("cGF5bG9hZA==", &endpoint, &queue()).await.unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["queue"], "abc-to-responder");
        assert_eq!(body["payload"], "cGF5bG9hZA==");
        assert!(body.get("alert").is_none());
    }

    #[tokio::test]
    async fn alert_notification_carries_text() {
        let (endpoint, mut rx) = recording_hook(StatusCode::NO_CONTENT).await;

        push(5)
            .notify_alert("Login request", "cGF5bG9hZA==", &endpoint, &queue())
            .await
            .unwrap();

        let body = rx.recv().await.unwrap();
        assert_eq!(body["alert"], "Login request");
    }

    #[tokio::test]
    async fn non_success_status_is_rejected() {
        let (endpoint, _rx) = recording_hook(StatusCode::GONE).await;

        let result = push(5).notify_silent("x", &endpoint, &queue()).await;
        assert!(matches!(result, Err(PushError::Rejected(msg)) if msg.contains("410")));
    }

    #[tokio::test]
    async fn slow_endpoint_times_out() {
        let app = Router::new().route(
            "/hook",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let endpoint = serve(app).await;

        let result = push(1).notify_silent("x", &endpoint, &queue()).await;
        assert!(matches!(result, Err(PushError::Timeout)));
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_delivery_error() {
        let endpoint = PushEndpoint::new("not a url").unwrap();
        let result = push(1).notify_silent("x", &endpoint, &queue()).await;
        assert!(matches!(result, Err(PushError::Delivery(_))));
    }

    #[tokio::test]
    async fn disabled_push_sends_nothing() {
        let (endpoint, mut rx) = recording_hook(StatusCode::OK).await;
        let push = WebhookPush::new(&PushConfig {
            enabled: false,
            timeout_secs: 1,
        })
        .unwrap();

        let result = push.notify_silent("x", &endpoint, &queue()).await;
        assert!(matches!(result, Err(PushError::Disabled)));
        assert!(rx.try_recv().is_err());
    }
}
