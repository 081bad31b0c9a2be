// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool Configuration System
//!
//! Type-safe configuration for genepool with support for:
//! - TOML file parsing
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! ## Usage
//!
//! ```rust
//! use genepool_config::{load_config_from_str, validate_config};
//!
//! let config = load_config_from_str(
//!     r#"
//!     [layout]
//!     preset = "roundworm"
//!     input_neurons = 16
//!     output_neurons = 4
//!
//!     [storage]
//!     genes = "alias"
//!     "#,
//! )
//! .unwrap();
//! validate_config(&config).unwrap();
//!
//! let layout = config.layout.to_gene_layout().unwrap();
//! assert_eq!(layout.gene_byte_size(), 4);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod loader;
pub mod types;
pub mod validation;

pub use loader::{
    apply_cli_overrides, apply_environment_overrides, find_config_file, load_config,
    load_config_from_str, CONFIG_FILE_NAME, CONFIG_PATH_ENV,
};
pub use types::*;
pub use validation::{validate_config, ConfigValidationError};

/// Re-export for convenience
pub use serde;

/// Configuration error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found. Searched: {0}")]
    FileNotFound(String),

    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Invalid TOML syntax: {0}")]
    ParseError(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Invalid gene layout: {0}")]
    Layout(#[from] genepool_structures::GenePoolError),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_toml() {
        let config = GenePoolConfig::default();
        let text = toml::to_string(&config).unwrap();
        assert_eq!(load_config_from_str(&text).unwrap(), config);
    }

    #[test]
    fn test_parse_error_is_reported() {
        let err = load_config_from_str("[layout\npreset = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }
}
