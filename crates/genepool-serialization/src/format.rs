// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pool file layout.
//!
//! All multi-byte integers are big-endian.
//!
//! ```text
//! pool:
//!   u8  0xAB                      pool initial byte
//!   u64 organisms_number
//!   u64 input_neurons_number
//!   u64 output_neurons_number
//!   u8  node_id_bits
//!   u8  weight_bits
//!   u16 metadata_byte_size
//!   u8  0xBC                      pool metadata initial byte
//!   ..  metadata
//!   u8  0xCD                      pool metadata terminal byte
//!   ..  organisms_number genomes
//!   u8  0xFF                      pool terminal byte
//!
//! genome:
//!   u8  0xA0                      genome initial byte
//!   u32 genes_number
//!   u16 metadata_byte_size
//!   u8  0xDE                      genome metadata initial byte
//!   ..  metadata
//!   u8  0xEF                      genome metadata terminal byte
//!   ..  genes_number * gene_byte_size gene bytes
//!   u8  0xA2                      residue marker byte
//!   u16 residue_size_bits
//!   ..  ceil(residue_size_bits / 8) residue bytes
//!   u8  0xA1                      genome terminal byte
//! ```

use std::ops::Range;

use byteorder::{BigEndian, ByteOrder};
use genepool_structures::bits::bits_to_bytes;
use genepool_structures::{Checkpoint, GeneLayout, GenePoolError, GenePoolResult};

//region Control bytes

pub const POOL_INITIAL_BYTE: u8 = 0xAB;
pub const POOL_METADATA_INITIAL_BYTE: u8 = 0xBC;
pub const POOL_METADATA_TERMINAL_BYTE: u8 = 0xCD;
pub const POOL_TERMINAL_BYTE: u8 = 0xFF;
pub const GENOME_INITIAL_BYTE: u8 = 0xA0;
pub const GENOME_METADATA_INITIAL_BYTE: u8 = 0xDE;
pub const GENOME_METADATA_TERMINAL_BYTE: u8 = 0xEF;
pub const GENOME_RESIDUE_MARKER_BYTE: u8 = 0xA2;
pub const GENOME_TERMINAL_BYTE: u8 = 0xA1;

/// Control byte expected at a checkpoint.
pub const fn checkpoint_byte(checkpoint: Checkpoint) -> u8 {
    match checkpoint {
        Checkpoint::PoolInitial => POOL_INITIAL_BYTE,
        Checkpoint::PoolMetadataStart => POOL_METADATA_INITIAL_BYTE,
        Checkpoint::PoolMetadataEnd => POOL_METADATA_TERMINAL_BYTE,
        Checkpoint::PoolTerminal => POOL_TERMINAL_BYTE,
        Checkpoint::GenomeInitial => GENOME_INITIAL_BYTE,
        Checkpoint::GenomeMetadataStart => GENOME_METADATA_INITIAL_BYTE,
        Checkpoint::GenomeMetadataEnd => GENOME_METADATA_TERMINAL_BYTE,
        Checkpoint::GenomeResidueMarker => GENOME_RESIDUE_MARKER_BYTE,
        Checkpoint::GenomeTerminal => GENOME_TERMINAL_BYTE,
    }
}

//endregion

pub const MAX_METADATA_BYTE_SIZE: usize = u16::MAX as usize;

/// Smallest structurally complete pool: preamble, empty metadata, no genomes.
pub const MIN_POOL_BYTE_SIZE: usize = PoolPreamble::BYTE_SIZE + 2;

/// Fixed-size head of a pool, up to and including the metadata initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolPreamble {
    pub organisms_number: u64,
    pub input_neurons_number: u64,
    pub output_neurons_number: u64,
    pub node_id_bits: u8,
    pub weight_bits: u8,
    pub metadata_byte_size: u16,
}

impl PoolPreamble {
    pub const BYTE_SIZE: usize = 30;

    pub fn new(layout: &GeneLayout, organisms_number: u64, metadata_byte_size: u16) -> Self {
        Self {
            organisms_number,
            input_neurons_number: layout.input_neurons_number(),
            output_neurons_number: layout.output_neurons_number(),
            node_id_bits: layout.node_id_bits(),
            weight_bits: layout.weight_bits(),
            metadata_byte_size,
        }
    }

    /// Parses the preamble and checks its two control bytes.
    pub fn read_from(bytes: &[u8]) -> GenePoolResult<Self> {
        if bytes.len() < Self::BYTE_SIZE {
            return Err(GenePoolError::TooSmall {
                actual: bytes.len(),
                minimum: Self::BYTE_SIZE,
            });
        }
        expect_control_byte(bytes, 0, Checkpoint::PoolInitial)?;
        expect_control_byte(bytes, Self::BYTE_SIZE - 1, Checkpoint::PoolMetadataStart)?;
        Ok(Self {
            organisms_number: BigEndian::read_u64(&bytes[1..9]),
            input_neurons_number: BigEndian::read_u64(&bytes[9..17]),
            output_neurons_number: BigEndian::read_u64(&bytes[17..25]),
            node_id_bits: bytes[25],
            weight_bits: bytes[26],
            metadata_byte_size: BigEndian::read_u16(&bytes[27..29]),
        })
    }

    pub fn write_to(&self, out: &mut [u8]) -> GenePoolResult<()> {
        let out = head_mut(out, Self::BYTE_SIZE)?;
        out[0] = POOL_INITIAL_BYTE;
        BigEndian::write_u64(&mut out[1..9], self.organisms_number);
        BigEndian::write_u64(&mut out[9..17], self.input_neurons_number);
        BigEndian::write_u64(&mut out[17..25], self.output_neurons_number);
        out[25] = self.node_id_bits;
        out[26] = self.weight_bits;
        BigEndian::write_u16(&mut out[27..29], self.metadata_byte_size);
        out[29] = POOL_METADATA_INITIAL_BYTE;
        Ok(())
    }

    pub fn layout(&self) -> GenePoolResult<GeneLayout> {
        GeneLayout::new(
            self.node_id_bits,
            self.weight_bits,
            self.input_neurons_number,
            self.output_neurons_number,
        )
    }

    pub fn metadata_range(&self) -> Range<usize> {
        Self::BYTE_SIZE..Self::BYTE_SIZE + usize::from(self.metadata_byte_size)
    }

    /// Offset of the pool metadata terminal byte.
    pub fn metadata_terminal_offset(&self) -> usize {
        self.metadata_range().end
    }

    pub fn first_genome_offset(&self) -> usize {
        self.metadata_terminal_offset() + 1
    }
}

/// Fixed-size head of a genome, up to and including the metadata initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomePreamble {
    pub genes_number: u32,
    pub metadata_byte_size: u16,
}

impl GenomePreamble {
    pub const BYTE_SIZE: usize = 8;

    /// Parses the preamble at `offset`, checking its two control bytes.
    pub fn read_at(bytes: &[u8], offset: usize) -> GenePoolResult<Self> {
        expect_control_byte(bytes, offset, Checkpoint::GenomeInitial)?;
        expect_control_byte(
            bytes,
            offset.saturating_add(Self::BYTE_SIZE - 1),
            Checkpoint::GenomeMetadataStart,
        )?;
        let head = &bytes[offset..offset + Self::BYTE_SIZE];
        Ok(Self {
            genes_number: BigEndian::read_u32(&head[1..5]),
            metadata_byte_size: BigEndian::read_u16(&head[5..7]),
        })
    }

    pub fn write_to(&self, out: &mut [u8]) -> GenePoolResult<()> {
        let out = head_mut(out, Self::BYTE_SIZE)?;
        out[0] = GENOME_INITIAL_BYTE;
        BigEndian::write_u32(&mut out[1..5], self.genes_number);
        BigEndian::write_u16(&mut out[5..7], self.metadata_byte_size);
        out[7] = GENOME_METADATA_INITIAL_BYTE;
        Ok(())
    }
}

/// Byte ranges of one validated genome inside a pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenomeSpan {
    pub start: usize,
    pub genes_number: u32,
    pub metadata: Range<usize>,
    pub genes: Range<usize>,
    pub residue_bits: u16,
    pub residue: Range<usize>,
    /// One past the genome terminal byte.
    pub end: usize,
}

impl GenomeSpan {
    pub fn byte_len(&self) -> usize {
        self.end - self.start
    }
}

/// Validates the pool head: size, control bytes, gene geometry and the
/// metadata terminal byte, in that order.
pub fn read_pool_header(bytes: &[u8]) -> GenePoolResult<(PoolPreamble, GeneLayout)> {
    if bytes.len() < MIN_POOL_BYTE_SIZE {
        return Err(GenePoolError::TooSmall {
            actual: bytes.len(),
            minimum: MIN_POOL_BYTE_SIZE,
        });
    }
    let preamble = PoolPreamble::read_from(bytes)?;
    let layout = preamble.layout()?;
    expect_control_byte(
        bytes,
        preamble.metadata_terminal_offset(),
        Checkpoint::PoolMetadataEnd,
    )?;
    Ok((preamble, layout))
}

/// Walks the genome starting at `offset`, checking each checkpoint in file
/// order. A checkpoint that lies past the end of `bytes` fails as corrupt.
pub fn locate_genome(
    bytes: &[u8],
    offset: usize,
    gene_byte_size: usize,
) -> GenePoolResult<GenomeSpan> {
    let preamble = GenomePreamble::read_at(bytes, offset)?;

    let metadata_start = offset + GenomePreamble::BYTE_SIZE;
    let metadata_end = metadata_start + usize::from(preamble.metadata_byte_size);
    expect_control_byte(bytes, metadata_end, Checkpoint::GenomeMetadataEnd)?;

    let genes_start = metadata_end + 1;
    let marker = (preamble.genes_number as usize)
        .checked_mul(gene_byte_size)
        .and_then(|len| len.checked_add(genes_start))
        .ok_or(GenePoolError::Corrupt {
            checkpoint: Checkpoint::GenomeResidueMarker,
            offset: genes_start,
        })?;
    expect_control_byte(bytes, marker, Checkpoint::GenomeResidueMarker)?;

    // the residue length field sits between the marker and the terminal byte
    let residue_start = marker + 3;
    let residue_bits = match bytes.get(marker + 1..residue_start) {
        Some(field) => BigEndian::read_u16(field),
        None => {
            return Err(GenePoolError::Corrupt {
                checkpoint: Checkpoint::GenomeTerminal,
                offset: residue_start,
            })
        }
    };
    let terminal = residue_start + bits_to_bytes(usize::from(residue_bits));
    expect_control_byte(bytes, terminal, Checkpoint::GenomeTerminal)?;

    Ok(GenomeSpan {
        start: offset,
        genes_number: preamble.genes_number,
        metadata: metadata_start..metadata_end,
        genes: genes_start..marker,
        residue_bits,
        residue: residue_start..terminal,
        end: terminal + 1,
    })
}

//region Sizes

/// Bytes occupied by one genome.
pub fn genome_byte_size(
    genes_number: u32,
    gene_byte_size: usize,
    metadata_byte_size: usize,
    residue_bits: u16,
) -> usize {
    GenomePreamble::BYTE_SIZE
        + metadata_byte_size
        + 1
        + genes_number as usize * gene_byte_size
        + 3
        + bits_to_bytes(usize::from(residue_bits))
        + 1
}

/// Bytes occupied by a pool whose genomes take `genomes_byte_size` bytes together.
pub fn pool_byte_size(metadata_byte_size: usize, genomes_byte_size: usize) -> usize {
    PoolPreamble::BYTE_SIZE + metadata_byte_size + 1 + genomes_byte_size + 1
}

//endregion

pub(crate) fn expect_control_byte(
    bytes: &[u8],
    offset: usize,
    checkpoint: Checkpoint,
) -> GenePoolResult<()> {
    if bytes.get(offset) == Some(&checkpoint_byte(checkpoint)) {
        Ok(())
    } else {
        Err(GenePoolError::Corrupt { checkpoint, offset })
    }
}

fn head_mut(out: &mut [u8], len: usize) -> GenePoolResult<&mut [u8]> {
    let available = out.len();
    out.get_mut(..len).ok_or(GenePoolError::OutOfBounds {
        start: 0,
        end: len * 8,
        len: available * 8,
    })
}
