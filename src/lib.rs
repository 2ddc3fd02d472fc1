//! Materio: a material-pricing scrape pipeline
//!
//! This crate extracts product-pricing records from paginated category
//! listings of configured suppliers, normalizes the raw text into a canonical
//! schema, and writes deduplicated, versioned snapshots.

pub mod catalog;
pub mod config;
pub mod normalize;
pub mod product;
pub mod scrape;
pub mod state;
pub mod store;

use thiserror::Error;

/// Main error type for Materio operations
///
/// Per-page and per-item failures are contained inside the category walker;
/// only configuration and storage failures reach this level and end the run.
#[derive(Debug, Error)]
pub enum MaterioError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] store::StorageError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Configuration-specific errors
///
/// All of these are fatal at startup, before any network activity.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: {selector}")]
    InvalidSelector { field: String, selector: String },
}

/// Result type alias for Materio operations
pub type Result<T> = std::result::Result<T, MaterioError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use product::{CanonicalProduct, Category, QualityFlag, RawProduct};
pub use store::Snapshot;
