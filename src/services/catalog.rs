// src/services/catalog.rs

//! Catalog retrieval.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::CatalogConfig;
use crate::utils::http;

/// Source of the raw catalog document.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch the current catalog document.
    async fn fetch(&self) -> Result<Value>;
}

/// Catalog fetched over HTTP.
pub struct HttpCatalog {
    client: Client,
    url: String,
}

impl HttpCatalog {
    /// Create a catalog client for the configured endpoint.
    pub fn new(config: &CatalogConfig) -> Result<Self> {
        Ok(Self {
            client: http::create_catalog_client(config)?,
            url: config.url.clone(),
        })
    }
}

#[async_trait]
impl CatalogSource for HttpCatalog {
    async fn fetch(&self) -> Result<Value> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::fetch(&self.url, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::fetch(
                &self.url,
                format!("status {}: {}", status.as_u16(), body.trim()),
            ));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| AppError::fetch(&self.url, e))?;
        let document: Value =
            serde_json::from_slice(&bytes).map_err(|e| AppError::fetch(&self.url, e))?;

        log::debug!("Fetched catalog document ({} bytes)", bytes.len());
        Ok(document)
    }
}
