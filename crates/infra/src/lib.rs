//! Infrastructure layer: store adapters and configuration.

pub mod catalog_store;
pub mod config;
pub mod user_store;

pub use config::{AppConfig, ConfigError};
