// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use crate::error::Result;
use crate::models::{CatalogConfig, WebhookConfig};

/// Default User-Agent for requests that do not configure one.
const USER_AGENT: &str = concat!("trackwatch/", env!("CARGO_PKG_VERSION"));

/// Create the HTTP client used for catalog requests.
pub fn create_catalog_client(config: &CatalogConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Create the HTTP client used for webhook posts.
pub fn create_webhook_client(config: &WebhookConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Whether a status code is in the success class.
pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Whether a status code signals rate limiting.
pub fn is_rate_limited(status: u16) -> bool {
    status == 429
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classes() {
        assert!(is_success(200));
        assert!(is_success(204));
        assert!(!is_success(301));
        assert!(!is_success(429));
        assert!(is_rate_limited(429));
        assert!(!is_rate_limited(500));
    }

    #[test]
    fn test_clients_build_from_defaults() {
        assert!(create_catalog_client(&CatalogConfig::default()).is_ok());
        assert!(create_webhook_client(&WebhookConfig::default()).is_ok());
    }
}
