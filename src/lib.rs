// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool - bit-packed genome pools on disk
//!
//! genepool stores a population of neuroevolution genomes in a single binary
//! file. Each genome is an array of fixed-width genes (`outcome node`,
//! `income node`, `weight`), packed big-endian and fenced by control bytes so
//! that damage is detected at the first byte that does not fit.
//!
//! Reading is zero-copy: a [`Pool`](serialization::Pool) memory-maps the
//! file and hands out genome views that borrow the mapping.
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! genepool = "0.1"  # Default: config + observability
//! ```
//!
//! ## Feature Flags
//!
//! - **`config`** (default): TOML configuration with environment and CLI overrides
//! - **`observability`** (default): logging initialization and per-crate debug flags
//! - **`file-logging`**: rolling log files
//!
//! ## Usage
//!
//! ```rust
//! use genepool::prelude::*;
//!
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("generation-0.pool");
//!
//! let layout = GeneLayout::from_preset(LayoutPreset::Roundworm, 8, 2)?;
//! let codec = GeneCodec::new(layout);
//! let genes = vec![
//!     Gene::new(NodeRef::intermediate(0), NodeRef::input(3), 0.25),
//!     Gene::new(NodeRef::output(1), NodeRef::intermediate(0), 1.0),
//! ];
//! let genome = Genome::from_genes(&codec, &genes, b"parent=none".to_vec())?;
//! write_pool(&path, &PoolDescriptor::new(layout, Vec::new()), &[genome])?;
//!
//! let mut pool = Pool::open(&path)?;
//! while let Some(genome) = pool.read_next_genome()? {
//!     assert_eq!(genome.metadata(), b"parent=none");
//!     assert_eq!(genome.decode_gene(&codec, 1)?.outcome, NodeRef::output(1));
//! }
//! pool.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: genepool-structures                        │
//! │  (errors, bit fields, gene layout and codec)            │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Storage: genepool-storage                              │
//! │  (file descriptor + memory mapping ownership)           │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Format: genepool-serialization                         │
//! │  (pool reader, genome views, pool writer)               │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! `genepool-config` and `genepool-observability` sit beside the stack and
//! are wired to it by [`setup`].
//!
//! ## License
//!
//! Apache-2.0

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export foundation
pub use genepool_structures as structures;

// Re-export storage and format
pub use genepool_serialization as serialization;
pub use genepool_storage as storage;

// Re-export infrastructure
#[cfg(feature = "config")]
pub use genepool_config as config;

#[cfg(feature = "observability")]
pub use genepool_observability as observability;

#[cfg(feature = "config")]
pub mod setup;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::structures::{
        Checkpoint, ErrorKind, Gene, GeneCodec, GeneLayout, GenePoolError, GenePoolResult,
        LayoutPreset, NodeKind, NodeRef,
    };

    pub use crate::serialization::{
        create_pool, write_pool, Genome, GenomeData, GenomeView, GenomeViewMut, Pool,
        PoolDescriptor, Transfer, WriteOptions,
    };

    #[cfg(feature = "config")]
    pub use crate::config::{load_config, validate_config, GenePoolConfig};

    #[cfg(feature = "observability")]
    pub use crate::observability::{init_logging, parse_debug_flags, CrateDebugFlags};
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_version_matches_members() {
        assert_eq!(super::VERSION, crate::structures::VERSION);
        assert_eq!(super::VERSION, crate::serialization::VERSION);
        assert_eq!(super::VERSION, crate::storage::VERSION);
    }
}
