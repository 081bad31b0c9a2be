// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # genepool-structures
//!
//! The core crate of genepool. Defines the data types shared by every other
//! crate in the workspace:
//!
//! - **[`GenePoolError`]** - the single error taxonomy, classified by [`ErrorKind`]
//! - **[`bits`]** - big-endian bit field reading and writing over byte buffers
//! - **[`GeneLayout`]** - validated gene geometry (field widths and node-id bands)
//! - **[`GeneCodec`]** - conversion between packed gene bytes and [`Gene`] values
//!
//! ## Basic Usage
//!
//! ```rust
//! use genepool_structures::{Gene, GeneCodec, GeneLayout, NodeRef};
//!
//! let layout = GeneLayout::new(6, 12, 4, 2).unwrap();
//! let codec = GeneCodec::new(layout);
//!
//! let gene = Gene::new(NodeRef::output(1), NodeRef::input(3), 1.0);
//! let mut bytes = vec![0u8; codec.gene_byte_size()];
//! codec.encode_gene(&gene, &mut bytes).unwrap();
//! assert_eq!(codec.decode_gene(&bytes).unwrap(), gene);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod bits;
mod error;
mod gene;
mod layout;

pub use error::{Checkpoint, ErrorKind, GenePoolError, GenePoolResult};
pub use gene::{Gene, GeneCodec, NodeKind, NodeRef, RawGene};
pub use layout::{GeneLayout, LayoutPreset, MAX_NODE_ID_BITS, MAX_WEIGHT_BITS};
