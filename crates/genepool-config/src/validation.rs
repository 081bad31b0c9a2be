// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! This module checks that configuration values describe a usable pool
//! layout and a logging setup the observability layer understands.

use crate::{ConfigError, ConfigResult, GenePoolConfig};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    MissingRequired { field: String },
    InvalidValue { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired { field } => {
                write!(f, "Missing required configuration: {}", field)
            }
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// Checks for:
/// - A preset name that exists
/// - Field widths that are present, in range and byte aligned
/// - Node bands that fit the id space
/// - Known log level and format
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every problem found
pub fn validate_config(config: &GenePoolConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_layout(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_layout(config: &GenePoolConfig, errors: &mut Vec<ConfigValidationError>) {
    match config.layout.to_gene_layout() {
        Ok(_) => {}
        Err(ConfigError::MissingRequired(field)) => {
            errors.push(ConfigValidationError::MissingRequired { field });
        }
        Err(ConfigError::InvalidValue(reason)) => {
            errors.push(ConfigValidationError::InvalidValue {
                field: "layout.preset".to_string(),
                reason,
            });
        }
        Err(err) => {
            errors.push(ConfigValidationError::InvalidValue {
                field: "layout".to_string(),
                reason: err.to_string(),
            });
        }
    }
}

fn validate_logging(config: &GenePoolConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }

    let format = config.logging.format.to_lowercase();
    if !LOG_FORMATS.contains(&format.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.format".to_string(),
            reason: "must be 'text' or 'json'".to_string(),
        });
    }
}
