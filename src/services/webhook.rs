// src/services/webhook.rs

//! Webhook delivery with bounded retry on rate limiting.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::Result;
use crate::models::{WebhookConfig, WebhookPayload};
use crate::utils::http;

/// Status and body returned by the sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: String,
}

impl TransportResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Retry delay suggested by a rate-limit body (`retry_after`, milliseconds).
    pub fn retry_after(&self) -> Option<Duration> {
        let body: Value = serde_json::from_str(&self.body).ok()?;
        let millis = body.get("retry_after")?.as_f64()?;
        (millis.is_finite() && millis >= 0.0).then(|| Duration::from_millis(millis.ceil() as u64))
    }
}

/// Transport that posts a payload to the notification sink.
#[async_trait]
pub trait WebhookTransport: Send + Sync {
    /// Post the payload once. Errors are transport-level failures only.
    async fn post(&self, payload: &WebhookPayload) -> Result<TransportResponse>;
}

/// Webhook posted over HTTP as JSON.
pub struct HttpWebhook {
    client: Client,
    url: String,
}

impl HttpWebhook {
    /// Create a webhook transport for the configured endpoint.
    pub fn new(config: &WebhookConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_webhook_client(config)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl WebhookTransport for HttpWebhook {
    async fn post(&self, payload: &WebhookPayload) -> Result<TransportResponse> {
        let response = self.client.post(&self.url).json(payload).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportResponse { status, body })
    }
}

/// Outcome of delivering one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The sink accepted the payload
    Delivered { attempts: u32 },
    /// Every attempt was rate limited
    RateLimited { attempts: u32 },
    /// Terminal failure; `status` is `None` for transport errors
    Failed { status: Option<u16>, detail: String },
}

impl DeliveryResult {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryResult::Delivered { .. })
    }
}

/// Retry policy for rate-limited deliveries.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// Delay used when the sink gives no hint
    pub default_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&WebhookConfig::default())
    }
}

impl From<&WebhookConfig> for RetryPolicy {
    fn from(config: &WebhookConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            default_delay: config.default_retry_after(),
        }
    }
}

/// Delivers payloads through a transport, honouring rate limits.
pub struct Notifier<T> {
    transport: T,
    policy: RetryPolicy,
}

impl<T: WebhookTransport> Notifier<T> {
    pub fn new(transport: T, policy: RetryPolicy) -> Self {
        Self { transport, policy }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Deliver one payload.
    ///
    /// Rate-limited attempts sleep for the suggested delay and retry until
    /// `max_attempts` is reached. Any other failure returns immediately.
    pub async fn deliver(&self, payload: &WebhookPayload) -> DeliveryResult {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 0;

        loop {
            attempt += 1;
            let response = match self.transport.post(payload).await {
                Ok(response) => response,
                Err(e) => {
                    return DeliveryResult::Failed {
                        status: None,
                        detail: e.to_string(),
                    };
                }
            };

            if http::is_success(response.status) {
                return DeliveryResult::Delivered { attempts: attempt };
            }

            if !http::is_rate_limited(response.status) {
                return DeliveryResult::Failed {
                    status: Some(response.status),
                    detail: response.body,
                };
            }

            if attempt >= max_attempts {
                return DeliveryResult::RateLimited { attempts: attempt };
            }

            let delay = response.retry_after().unwrap_or(self.policy.default_delay);
            log::warn!(
                "Webhook rate limited (attempt {}/{}), retrying in {} ms",
                attempt,
                max_attempts,
                delay.as_millis()
            );
            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::error::AppError;
    use crate::models::Embed;

    /// Transport replaying canned responses.
    struct Scripted {
        responses: Mutex<VecDeque<Result<TransportResponse>>>,
        posts: Mutex<u32>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<TransportResponse>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                posts: Mutex::new(0),
            }
        }

        fn posts(&self) -> u32 {
            *self.posts.lock().unwrap()
        }
    }

    #[async_trait]
    impl WebhookTransport for Scripted {
        async fn post(&self, _payload: &WebhookPayload) -> Result<TransportResponse> {
            *self.posts.lock().unwrap() += 1;
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(TransportResponse::new(429, "")))
        }
    }

    fn payload() -> WebhookPayload {
        WebhookPayload {
            embeds: vec![Embed {
                title: "New Track Detected".to_string(),
                thumbnail: None,
                fields: Vec::new(),
            }],
        }
    }

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            default_delay: Duration::from_millis(5000),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt() {
        let transport = Scripted::new(vec![Ok(TransportResponse::new(204, ""))]);
        let notifier = Notifier::new(transport, policy(3));
        let start = tokio::time::Instant::now();

        let result = notifier.deliver(&payload()).await;

        assert_eq!(result, DeliveryResult::Delivered { attempts: 1 });
        assert_eq!(notifier.transport().posts(), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limited_twice_then_success() {
        let transport = Scripted::new(vec![
            Ok(TransportResponse::new(429, r#"{"retry_after": 1500}"#)),
            Ok(TransportResponse::new(429, "")),
            Ok(TransportResponse::new(200, "")),
        ]);
        let notifier = Notifier::new(transport, policy(3));
        let start = tokio::time::Instant::now();

        let result = notifier.deliver(&payload()).await;

        assert_eq!(result, DeliveryResult::Delivered { attempts: 3 });
        assert_eq!(notifier.transport().posts(), 3);
        // Two sleeps: the hinted 1500 ms and the 5000 ms default.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(6500));
        assert!(elapsed < Duration::from_millis(6600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_gives_up() {
        let notifier = Notifier::new(Scripted::new(Vec::new()), policy(3));
        let start = tokio::time::Instant::now();

        let result = notifier.deliver(&payload()).await;

        assert_eq!(result, DeliveryResult::RateLimited { attempts: 3 });
        assert_eq!(notifier.transport().posts(), 3);
        // No sleep after the final attempt.
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(10_000));
        assert!(elapsed < Duration::from_millis(10_100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_status_fails_without_retry() {
        let transport = Scripted::new(vec![Ok(TransportResponse::new(400, "bad embed"))]);
        let notifier = Notifier::new(transport, policy(3));

        let result = notifier.deliver(&payload()).await;

        assert_eq!(
            result,
            DeliveryResult::Failed {
                status: Some(400),
                detail: "bad embed".to_string()
            }
        );
        assert_eq!(notifier.transport().posts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_fails_without_retry() {
        let transport = Scripted::new(vec![Err(AppError::config("connection refused"))]);
        let notifier = Notifier::new(transport, policy(3));

        let result = notifier.deliver(&payload()).await;

        assert!(matches!(result, DeliveryResult::Failed { status: None, .. }));
        assert!(!result.is_delivered());
        assert_eq!(notifier.transport().posts(), 1);
    }

    #[test]
    fn test_retry_after_parsing() {
        assert_eq!(
            TransportResponse::new(429, r#"{"retry_after": 250}"#).retry_after(),
            Some(Duration::from_millis(250))
        );
        assert_eq!(
            TransportResponse::new(429, r#"{"retry_after": 0.4}"#).retry_after(),
            Some(Duration::from_millis(1))
        );
        assert_eq!(TransportResponse::new(429, "slow down").retry_after(), None);
        assert_eq!(TransportResponse::new(429, r#"{"retry_after": -3}"#).retry_after(), None);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from(&WebhookConfig {
            max_attempts: 0,
            ..WebhookConfig::default()
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.default_delay, Duration::from_millis(5000));
    }
}
