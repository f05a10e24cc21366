// src/lib.rs

//! trackwatch library: spark tracks change detection and webhook notification.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
