// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool Serialization
//!
//! Reads and writes pool files: a header, a population of genomes and
//! control bytes between every section so that a damaged file is caught at
//! the first byte that does not fit.
//!
//! ## Core Components
//!
//! - **[`Pool`]** - an open pool with a streaming genome cursor
//! - **[`GenomeData`]** - common read access to [`GenomeView`], [`GenomeViewMut`] and [`Genome`]
//! - **[`create_pool`] / [`write_pool`]** - sized, single-pass pool writing with [`WriteOptions`]
//! - **[`format`]** - control bytes, preambles and size arithmetic
//!
//! ## Basic Usage
//!
//! ```rust
//! use genepool_serialization::{write_pool, Genome, GenomeData, Pool, PoolDescriptor};
//! use genepool_structures::{Gene, GeneCodec, GeneLayout, NodeRef};
//!
//! let dir = tempfile::tempdir().unwrap();
//! let path = dir.path().join("example.pool");
//!
//! let layout = GeneLayout::new(6, 12, 4, 2).unwrap();
//! let codec = GeneCodec::new(layout);
//! let genes = [Gene::new(NodeRef::output(0), NodeRef::input(2), 1.0)];
//! let genome = Genome::from_genes(&codec, &genes, Vec::new()).unwrap();
//!
//! write_pool(&path, &PoolDescriptor::new(layout, b"gen 0".to_vec()), &[genome]).unwrap();
//!
//! let mut pool = Pool::open(&path).unwrap();
//! assert_eq!(pool.metadata(), b"gen 0");
//! let first = pool.read_next_genome().unwrap().unwrap();
//! assert_eq!(first.decode_genes(&codec).unwrap(), genes);
//! assert!(pool.read_next_genome().unwrap().is_none());
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod format;
mod genome;
mod pool;
mod writer;

pub use genome::{Genome, GenomeData, GenomeView, GenomeViewMut};
pub use pool::{GenomeIter, Pool, PoolDescriptor};
pub use writer::{create_pool, write_pool, Transfer, WriteOptions, WriteOptionsBuilder};
