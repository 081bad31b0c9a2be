// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error taxonomy shared by every genepool crate.

use std::fmt::{Display, Formatter};
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::gene::NodeKind;

/// Structural checkpoint of the pool format.
///
/// Each checkpoint is a control byte (or the boundary it closes) that is
/// verified while opening a pool or stepping to the next genome. A failed
/// check is reported as [`GenePoolError::Corrupt`] naming the checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Checkpoint {
    PoolInitial,
    PoolMetadataStart,
    PoolMetadataEnd,
    PoolTerminal,
    GenomeInitial,
    GenomeMetadataStart,
    GenomeMetadataEnd,
    GenomeResidueMarker,
    GenomeTerminal,
}

impl Checkpoint {
    /// Every checkpoint, in the order a reader meets them.
    pub const ALL: [Checkpoint; 9] = [
        Checkpoint::PoolInitial,
        Checkpoint::PoolMetadataStart,
        Checkpoint::PoolMetadataEnd,
        Checkpoint::GenomeInitial,
        Checkpoint::GenomeMetadataStart,
        Checkpoint::GenomeMetadataEnd,
        Checkpoint::GenomeResidueMarker,
        Checkpoint::GenomeTerminal,
        Checkpoint::PoolTerminal,
    ];

    pub const fn name(&self) -> &'static str {
        match self {
            Checkpoint::PoolInitial => "pool initial byte",
            Checkpoint::PoolMetadataStart => "pool metadata initial byte",
            Checkpoint::PoolMetadataEnd => "pool metadata terminal byte",
            Checkpoint::PoolTerminal => "pool terminal byte",
            Checkpoint::GenomeInitial => "genome initial byte",
            Checkpoint::GenomeMetadataStart => "genome metadata initial byte",
            Checkpoint::GenomeMetadataEnd => "genome metadata terminal byte",
            Checkpoint::GenomeResidueMarker => "genome residue marker byte",
            Checkpoint::GenomeTerminal => "genome terminal byte",
        }
    }
}

impl Display for Checkpoint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Coarse classification of a [`GenePoolError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Allocation failure
    System,
    /// Open, stat, resize, map or flush failure
    Storage,
    /// A control byte or boundary mismatch in the file
    Corruption,
    /// A value that does not fit the format's constraints
    Constraint,
    /// An invalid combination of caller options
    Configuration,
}

/// Errors raised by pool, genome and gene operations.
///
/// Reaching the end of a genome sequence is not an error; readers return
/// `Ok(None)` for that.
#[derive(Error, Debug)]
pub enum GenePoolError {
    //region System
    #[error("Out of memory: could not reserve {requested} bytes")]
    OutOfMemory { requested: usize },
    //endregion

    //region Storage
    #[error("Cannot open {}: {source}", .path.display())]
    CannotOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot stat {}: {source}", .path.display())]
    CannotStat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot resize {} to {size} bytes: {source}", .path.display())]
    CannotResize {
        path: PathBuf,
        size: u64,
        #[source]
        source: io::Error,
    },

    #[error("Cannot map {}: {source}", .path.display())]
    CannotMap {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Cannot flush {}: {source}", .path.display())]
    CannotFlush {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Mapping of {} is read-only", .path.display())]
    NotWritable { path: PathBuf },
    //endregion

    //region Corruption
    #[error("Pool file is {actual} bytes, smaller than the {minimum} byte minimum")]
    TooSmall { actual: usize, minimum: usize },

    #[error("Corrupt pool: {checkpoint} check failed at byte offset {offset}")]
    Corrupt { checkpoint: Checkpoint, offset: usize },
    //endregion

    //region Constraint
    #[error("Node id width of {bits} bits exceeds the 64 bit maximum")]
    NodeIdTooWide { bits: u8 },

    #[error("Weight width of {bits} bits exceeds the 64 bit maximum")]
    WeightTooWide { bits: u8 },

    #[error("Gene of 2 x {node_id_bits} + {weight_bits} bits is not a whole number of bytes")]
    GeneNotAligned { node_id_bits: u8, weight_bits: u8 },

    #[error("Gene of 2 x 0 + 0 bits carries no data")]
    EmptyGene,

    #[error("{input} input and {output} output node ids do not fit in {node_id_bits} bits")]
    NodeBandsOverlap {
        input: u64,
        output: u64,
        node_id_bits: u8,
    },

    #[error("{kind:?} node index {index} is outside its id band")]
    NodeIdOutOfBand { kind: NodeKind, index: u64 },

    #[error("Weight {weight} is outside [0, 1]")]
    WeightOutOfRange { weight: f64 },

    #[error("Bit field of {width} bits exceeds the 64 bit maximum")]
    FieldTooWide { width: usize },

    #[error("Value {value} does not fit in {width} bits")]
    ValueTooWide { value: u64, width: usize },

    #[error("Bit range {start}..{end} is outside a buffer of {len} bits")]
    OutOfBounds { start: usize, end: usize, len: usize },

    #[error("Metadata of {size} bytes exceeds the 65535 byte maximum")]
    MetadataTooLarge { size: usize },

    #[error("Genome of {count} genes exceeds the u32 maximum")]
    TooManyGenes { count: usize },

    #[error("Expected {expected} gene bytes, got {actual}")]
    GeneBytesMismatch { expected: usize, actual: usize },

    #[error("Residue of {bits} bits needs {expected} bytes, got {actual}")]
    ResidueMismatch {
        bits: u16,
        expected: usize,
        actual: usize,
    },
    //endregion

    //region Configuration
    #[error("Incompatible write mode: {target} cannot be both copied and aliased")]
    IncompatibleWriteMode { target: &'static str },

    #[error("Cannot resize {} to {size} bytes while mapping it read-only", .path.display())]
    ResizeReadOnly { path: PathBuf, size: u64 },
    //endregion
}

impl GenePoolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenePoolError::OutOfMemory { .. } => ErrorKind::System,
            GenePoolError::CannotOpen { .. }
            | GenePoolError::CannotStat { .. }
            | GenePoolError::CannotResize { .. }
            | GenePoolError::CannotMap { .. }
            | GenePoolError::CannotFlush { .. }
            | GenePoolError::NotWritable { .. } => ErrorKind::Storage,
            GenePoolError::TooSmall { .. } | GenePoolError::Corrupt { .. } => {
                ErrorKind::Corruption
            }
            GenePoolError::NodeIdTooWide { .. }
            | GenePoolError::WeightTooWide { .. }
            | GenePoolError::GeneNotAligned { .. }
            | GenePoolError::EmptyGene
            | GenePoolError::NodeBandsOverlap { .. }
            | GenePoolError::NodeIdOutOfBand { .. }
            | GenePoolError::WeightOutOfRange { .. }
            | GenePoolError::FieldTooWide { .. }
            | GenePoolError::ValueTooWide { .. }
            | GenePoolError::OutOfBounds { .. }
            | GenePoolError::MetadataTooLarge { .. }
            | GenePoolError::TooManyGenes { .. }
            | GenePoolError::GeneBytesMismatch { .. }
            | GenePoolError::ResidueMismatch { .. } => ErrorKind::Constraint,
            GenePoolError::IncompatibleWriteMode { .. } | GenePoolError::ResizeReadOnly { .. } => {
                ErrorKind::Configuration
            }
        }
    }

    /// The failed checkpoint, if this is a corruption error at a control byte.
    pub fn checkpoint(&self) -> Option<Checkpoint> {
        match self {
            GenePoolError::Corrupt { checkpoint, .. } => Some(*checkpoint),
            _ => None,
        }
    }
}

/// Result type for genepool operations
pub type GenePoolResult<T> = Result<T, GenePoolError>;
