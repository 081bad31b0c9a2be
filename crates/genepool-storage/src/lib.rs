// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool-storage
//!
//! Owns the two operating system resources behind a pool: the open file and
//! its memory mapping. A [`FileMapping`] releases both in the right order on
//! every path (explicit [`FileMapping::close`], drop, or an early error
//! return while opening).
//!
//! ## Usage
//! ```no_run
//! use genepool_storage::{FileMapping, MapMode};
//!
//! let mut mapping = FileMapping::open("population.pool", MapMode::Write, 64)?;
//! mapping.as_bytes_mut()?[0] = 0xAB;
//! mapping.close()?;
//!
//! let mapping = FileMapping::open("population.pool", MapMode::Read, 0)?;
//! assert_eq!(mapping.as_bytes()[0], 0xAB);
//! # Ok::<(), genepool_structures::GenePoolError>(())
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod mapping;

pub use mapping::{FileMapping, MapMode};
