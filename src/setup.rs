// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Turns a loaded [`GenePoolConfig`] into the values the pool API and the
//! logging layer take.

use genepool_config::{ConfigResult, GenePoolConfig, StorageConfig, TransferMode};
use genepool_serialization::{PoolDescriptor, WriteOptions};
use genepool_structures::GenePoolResult;

/// Writer options for the configured transfer modes.
pub fn write_options(storage: &StorageConfig) -> GenePoolResult<WriteOptions> {
    let mut builder = WriteOptions::builder();
    builder = match storage.genes {
        TransferMode::Copy => builder.copy_genes(),
        TransferMode::Alias => builder.alias_genes(),
    };
    builder = match storage.metadata {
        TransferMode::Copy => builder.copy_metadata(),
        TransferMode::Alias => builder.alias_metadata(),
    };
    builder.build()
}

/// Descriptor for a new pool with the configured layout.
pub fn pool_descriptor(config: &GenePoolConfig, metadata: Vec<u8>) -> ConfigResult<PoolDescriptor> {
    Ok(PoolDescriptor::new(config.layout.to_gene_layout()?, metadata))
}

#[cfg(feature = "observability")]
pub use self::logging::{init_logging_from_config, logging_config};

#[cfg(feature = "observability")]
mod logging {
    use genepool_config::{ConfigError, ConfigResult, GenePoolConfig};
    use genepool_observability::{CrateDebugFlags, LoggingConfig, LoggingGuard};

    /// Observability settings from the `[logging]` section.
    pub fn logging_config(config: &GenePoolConfig) -> ConfigResult<LoggingConfig> {
        let logging = &config.logging;
        LoggingConfig::from_parts(&logging.level, &logging.format, logging.file_path.clone())
            .map_err(ConfigError::InvalidValue)
    }

    /// Installs the global subscriber described by `config`.
    pub fn init_logging_from_config(
        config: &GenePoolConfig,
        debug_flags: &CrateDebugFlags,
    ) -> anyhow::Result<LoggingGuard> {
        let logging = logging_config(config)?;
        genepool_observability::init_logging(debug_flags, &logging)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use genepool_serialization::Transfer;

    #[test]
    fn test_write_options_follow_storage_config() {
        let options = write_options(&StorageConfig::default()).unwrap();
        assert_eq!(options, WriteOptions::copy_all());

        let storage = StorageConfig {
            genes: TransferMode::Alias,
            metadata: TransferMode::Copy,
        };
        let options = write_options(&storage).unwrap();
        assert_eq!(options.genes(), Transfer::Alias);
        assert_eq!(options.metadata(), Transfer::Copy);
    }

    #[test]
    fn test_pool_descriptor_uses_layout() {
        let mut config = GenePoolConfig::default();
        config.layout.preset = Some("frog".to_string());
        config.layout.input_neurons = 10;

        let descriptor = pool_descriptor(&config, b"run-7".to_vec()).unwrap();
        assert_eq!(descriptor.layout.node_id_bits(), 24);
        assert_eq!(descriptor.layout.input_neurons_number(), 10);
        assert_eq!(descriptor.metadata, b"run-7");
    }

    #[cfg(feature = "observability")]
    #[test]
    fn test_logging_config_conversion() {
        let mut config = GenePoolConfig::default();
        config.logging.format = "JSON".to_string();
        let logging = logging_config(&config).unwrap();
        assert_eq!(logging.format, genepool_observability::LogFormat::Json);

        config.logging.format = "yaml".to_string();
        assert!(logging_config(&config).is_err());
    }
}
