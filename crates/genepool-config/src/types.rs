// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! This module defines all configuration structs that map to sections in
//! `genepool.toml`.

use std::path::PathBuf;
use std::str::FromStr;

use genepool_structures::{GeneLayout, LayoutPreset};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult};

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenePoolConfig {
    pub layout: LayoutConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

/// Gene geometry for newly written pools
///
/// `node_id_bits` and `weight_bits` each override the matching width of
/// `preset` when set.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub preset: Option<String>,
    pub node_id_bits: Option<u8>,
    pub weight_bits: Option<u8>,
    pub input_neurons: u64,
    pub output_neurons: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            preset: Some(LayoutPreset::Plant.name().to_string()),
            node_id_bits: None,
            weight_bits: None,
            input_neurons: 0,
            output_neurons: 0,
        }
    }
}

impl LayoutConfig {
    /// Field widths after applying the preset and explicit overrides.
    pub fn widths(&self) -> ConfigResult<(u8, u8)> {
        let preset = match &self.preset {
            Some(name) => Some(LayoutPreset::from_str(name).map_err(ConfigError::InvalidValue)?),
            None => None,
        };
        let (preset_node, preset_weight) = match preset {
            Some(preset) => {
                let (node, weight) = preset.widths();
                (Some(node), Some(weight))
            }
            None => (None, None),
        };

        let node_id_bits = self
            .node_id_bits
            .or(preset_node)
            .ok_or_else(|| ConfigError::MissingRequired("layout.node_id_bits".to_string()))?;
        let weight_bits = self
            .weight_bits
            .or(preset_weight)
            .ok_or_else(|| ConfigError::MissingRequired("layout.weight_bits".to_string()))?;
        Ok((node_id_bits, weight_bits))
    }

    pub fn to_gene_layout(&self) -> ConfigResult<GeneLayout> {
        let (node_id_bits, weight_bits) = self.widths()?;
        Ok(GeneLayout::new(
            node_id_bits,
            weight_bits,
            self.input_neurons,
            self.output_neurons,
        )?)
    }
}

/// How a data target reaches a newly written pool file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferMode {
    #[default]
    Copy,
    Alias,
}

impl FromStr for TransferMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "copy" => Ok(TransferMode::Copy),
            "alias" => Ok(TransferMode::Alias),
            _ => Err(format!(
                "Invalid transfer mode: '{}'. Use 'copy' or 'alias'",
                s
            )),
        }
    }
}

/// Pool writer configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Gene arrays and residues
    pub genes: TransferMode,
    /// Pool and genome metadata
    pub metadata: TransferMode,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    /// Directory for log files (used when file logging is compiled in)
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file_path: None,
        }
    }
}
