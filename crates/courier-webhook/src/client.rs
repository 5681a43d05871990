//! Webhook client implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use courier_core::config::webhook::WebhookConfig;
use courier_core::error::{AppError, ErrorKind};
use courier_core::result::AppResult;

/// Delay between retries of connection-level failures.
const RETRY_DELAY: Duration = Duration::from_millis(200);

/// Request payload delivered to the webhook endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SendMessage {
    /// Recipient address.
    pub to: String,
    /// Message body.
    pub content: String,
}

/// Response returned by the webhook provider on accepted delivery.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryReceipt {
    /// Human-readable provider message (e.g. "Accepted").
    pub message: String,
    /// Provider-assigned identifier for the delivered message.
    pub message_id: String,
}

/// Trait for the outbound message transport.
///
/// The sender only distinguishes success from failure; the status
/// classification below exists for diagnostics, not control flow.
#[async_trait]
pub trait WebhookTransport: Send + Sync + 'static {
    /// Deliver one message. Success means the provider accepted it.
    async fn send(&self, request: &SendMessage) -> AppResult<DeliveryReceipt>;
}

/// Webhook client built on reqwest.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    max_retries: u32,
}

impl WebhookClient {
    /// Create a new webhook client from configuration.
    pub fn new(config: &WebhookConfig) -> AppResult<Self> {
        let mut headers = HeaderMap::new();
        if !config.auth_key.is_empty() {
            let value = HeaderValue::from_str(&config.auth_key).map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Invalid webhook auth key", e)
            })?;
            headers.insert("x-auth-key", value);
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorKind::Configuration,
                    "Failed to build webhook HTTP client",
                    e,
                )
            })?;

        Ok(Self {
            http,
            url: config.url.clone(),
            max_retries: config.max_retries,
        })
    }

    /// Issue the POST, retrying connection-level failures.
    async fn post_with_retry(&self, request: &SendMessage) -> AppResult<reqwest::Response> {
        let mut attempt = 0;
        loop {
            match self.http.post(&self.url).json(request).send().await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %e,
                        "Webhook request failed, retrying"
                    );
                    tokio::time::sleep(RETRY_DELAY).await;
                }
                Err(e) => {
                    return Err(AppError::with_source(
                        ErrorKind::ExternalService,
                        format!("Webhook connection failed: {e}"),
                        e,
                    ));
                }
            }
        }
    }
}

/// Classify a webhook response status: 2xx is success, 401 an auth error,
/// 5xx a provider-side error, anything else an invalid request.
fn classify_status(status: StatusCode) -> AppResult<()> {
    if status.is_success() {
        return Ok(());
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(AppError::external_service(
            "Webhook authentication failed (401)",
        ));
    }
    if status.is_server_error() {
        return Err(AppError::external_service(format!(
            "Webhook provider error (status {})",
            status.as_u16()
        )));
    }
    Err(AppError::external_service(format!(
        "Webhook rejected request (status {})",
        status.as_u16()
    )))
}

#[async_trait]
impl WebhookTransport for WebhookClient {
    async fn send(&self, request: &SendMessage) -> AppResult<DeliveryReceipt> {
        if request.to.is_empty() {
            return Err(AppError::validation("Recipient must not be empty"));
        }
        if request.content.is_empty() {
            return Err(AppError::validation("Content must not be empty"));
        }

        let response = self.post_with_retry(request).await?;
        let status = response.status();
        classify_status(status)?;

        let receipt: DeliveryReceipt = response.json().await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Serialization,
                format!("Failed to parse webhook response: {e}"),
                e,
            )
        })?;

        debug!(
            to = %request.to,
            provider_message_id = %receipt.message_id,
            "Webhook accepted message"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> WebhookClient {
        WebhookClient::new(&WebhookConfig {
            url: "http://localhost:9/hook".to_string(),
            auth_key: "test-key".to_string(),
            timeout_seconds: 1,
            max_retries: 0,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_empty_recipient_is_rejected_without_a_request() {
        let request = SendMessage {
            to: String::new(),
            content: "hello".to_string(),
        };
        let err = client().send(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_empty_content_is_rejected_without_a_request() {
        let request = SendMessage {
            to: "+905551111111".to_string(),
            content: String::new(),
        };
        let err = client().send(&request).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_classify_status() {
        assert!(classify_status(StatusCode::ACCEPTED).is_ok());
        assert!(classify_status(StatusCode::OK).is_ok());

        let auth = classify_status(StatusCode::UNAUTHORIZED).unwrap_err();
        assert!(auth.message.contains("401"));

        let server = classify_status(StatusCode::BAD_GATEWAY).unwrap_err();
        assert!(server.message.contains("502"));

        let invalid = classify_status(StatusCode::UNPROCESSABLE_ENTITY).unwrap_err();
        assert!(invalid.message.contains("422"));
    }

    #[test]
    fn test_receipt_parses_provider_payload() {
        let receipt: DeliveryReceipt =
            serde_json::from_str(r#"{"message": "Accepted", "messageId": "wh-1"}"#).unwrap();
        assert_eq!(receipt.message, "Accepted");
        assert_eq!(receipt.message_id, "wh-1");
    }
}
