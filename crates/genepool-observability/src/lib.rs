// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool-observability
//!
//! Logging infrastructure for genepool.
//!
//! The library crates only emit `tracing` events; this crate turns them into
//! output, with per-crate debug flags taken from the command line or the
//! `GENEPOOL_DEBUG` environment variable.
//!
//! ## Features
//! - `file-logging`: rolling JSON log files per run

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod config;
pub mod init;

// Re-export commonly used items
pub use cli::*;
pub use config::*;
pub use init::*;

/// Known genepool crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "genepool",
    "genepool-structures",
    "genepool-storage",
    "genepool-serialization",
    "genepool-config",
    "genepool-observability",
];
