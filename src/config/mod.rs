//! Configuration module for Materio
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! The rest of the pipeline consumes a fully parsed [`Config`] and never reads
//! configuration text itself.
//!
//! # Example
//!
//! ```no_run
//! use materio::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Suppliers configured: {}", config.suppliers.len());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CategoryEntry, Config, FieldSpec, OutputConfig, ScrapingConfig, SelectorSpec, SupplierConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};
