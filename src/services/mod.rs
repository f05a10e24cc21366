//! Service layer for the watcher.
//!
//! This module contains the collaborators of a polling cycle:
//! - Catalog retrieval (`CatalogSource`, `HttpCatalog`)
//! - Catalog normalization (`normalize`)
//! - Webhook delivery (`Notifier`, `WebhookTransport`, `HttpWebhook`)

mod catalog;
pub mod normalize;
mod webhook;

pub use catalog::{CatalogSource, HttpCatalog};
pub use normalize::normalize;
pub use webhook::{
    DeliveryResult, HttpWebhook, Notifier, RetryPolicy, TransportResponse, WebhookTransport,
};
