// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Values are resolved in three tiers, later tiers winning:
//! 1. TOML file (base values, missing keys take defaults)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use crate::{ConfigError, ConfigResult, GenePoolConfig, TransferMode};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming an explicit config file
pub const CONFIG_PATH_ENV: &str = "GENEPOOL_CONFIG_PATH";

/// File name searched for when no path is given
pub const CONFIG_FILE_NAME: &str = "genepool.toml";

/// Find the genepool configuration file
///
/// Search order:
/// 1. `GENEPOOL_CONFIG_PATH` environment variable
/// 2. Current working directory: `./genepool.toml`
/// 3. Up to 5 parent directories
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|path| path.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from a TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if config file is not found or contains invalid TOML.
/// Semantic checks are left to [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<GenePoolConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config = load_config_from_str(&content)?;

    apply_environment_overrides(&mut config);
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli);
    }

    Ok(config)
}

/// Parse configuration from TOML text without applying overrides
pub fn load_config_from_str(content: &str) -> ConfigResult<GenePoolConfig> {
    Ok(toml::from_str(content)?)
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `GENEPOOL_PRESET` -> `layout.preset`
/// - `GENEPOOL_NODE_ID_BITS` -> `layout.node_id_bits`
/// - `GENEPOOL_WEIGHT_BITS` -> `layout.weight_bits`
/// - `GENEPOOL_INPUT_NEURONS` -> `layout.input_neurons`
/// - `GENEPOOL_OUTPUT_NEURONS` -> `layout.output_neurons`
/// - `GENEPOOL_LOG_LEVEL` -> `logging.level`
/// - `GENEPOOL_LOG_FORMAT` -> `logging.format`
///
/// Values that fail to parse are ignored.
pub fn apply_environment_overrides(config: &mut GenePoolConfig) {
    let overrides: HashMap<String, String> = [
        ("GENEPOOL_PRESET", "preset"),
        ("GENEPOOL_NODE_ID_BITS", "node_id_bits"),
        ("GENEPOOL_WEIGHT_BITS", "weight_bits"),
        ("GENEPOOL_INPUT_NEURONS", "input_neurons"),
        ("GENEPOOL_OUTPUT_NEURONS", "output_neurons"),
        ("GENEPOOL_LOG_LEVEL", "log_level"),
        ("GENEPOOL_LOG_FORMAT", "log_format"),
    ]
    .into_iter()
    .filter_map(|(var, key)| env::var(var).ok().map(|value| (key.to_string(), value)))
    .collect();

    apply_cli_overrides(config, &overrides);
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - HashMap of CLI arguments (e.g., `{"node_id_bits": "6", "genes": "alias"}`)
pub fn apply_cli_overrides(config: &mut GenePoolConfig, cli_args: &HashMap<String, String>) {
    // Layout
    if let Some(value) = cli_args.get("preset") {
        config.layout.preset = Some(value.clone());
    }
    if let Some(bits) = cli_args.get("node_id_bits").and_then(|v| v.parse::<u8>().ok()) {
        config.layout.node_id_bits = Some(bits);
    }
    if let Some(bits) = cli_args.get("weight_bits").and_then(|v| v.parse::<u8>().ok()) {
        config.layout.weight_bits = Some(bits);
    }
    if let Some(count) = cli_args.get("input_neurons").and_then(|v| v.parse::<u64>().ok()) {
        config.layout.input_neurons = count;
    }
    if let Some(count) = cli_args.get("output_neurons").and_then(|v| v.parse::<u64>().ok()) {
        config.layout.output_neurons = count;
    }

    // Storage
    if let Some(mode) = cli_args.get("genes").and_then(|v| v.parse::<TransferMode>().ok()) {
        config.storage.genes = mode;
    }
    if let Some(mode) = cli_args.get("metadata").and_then(|v| v.parse::<TransferMode>().ok()) {
        config.storage.metadata = mode;
    }

    // Logging
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    if let Some(value) = cli_args.get("log_format") {
        config.logging.format = value.clone();
    }
    if let Some(value) = cli_args.get("log_dir") {
        config.logging.file_path = Some(PathBuf::from(value));
    }
}
