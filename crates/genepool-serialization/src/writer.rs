// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pool creation.
//!
//! The writer sizes the file exactly, writes every control byte and size
//! field, and then fills each data target according to its [`Transfer`]:
//!
//! - `Copy` copies the caller's bytes into the file.
//! - `Alias` leaves the region zeroed; the caller fills it in place through
//!   the returned writable [`Pool`].

use std::path::Path;

use byteorder::{BigEndian, ByteOrder};
use genepool_storage::{FileMapping, MapMode};
use genepool_structures::{GenePoolError, GenePoolResult};
use tracing::info;

use crate::format::{
    self, GenomePreamble, PoolPreamble, GENOME_METADATA_TERMINAL_BYTE,
    GENOME_RESIDUE_MARKER_BYTE, GENOME_TERMINAL_BYTE, POOL_METADATA_TERMINAL_BYTE,
    POOL_TERMINAL_BYTE,
};
use crate::genome::{check_metadata_size, check_residue, GenomeData};
use crate::pool::{Pool, PoolDescriptor};

/// How one data target reaches the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Transfer {
    /// Bytes are copied from the caller.
    Copy,
    /// The region is left zeroed for the caller to fill through the open pool.
    Alias,
}

/// Per-target transfer modes for [`create_pool`].
///
/// `genes` covers gene arrays and residues; `metadata` covers the pool and
/// genome metadata blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteOptions {
    genes: Transfer,
    metadata: Transfer,
}

impl WriteOptions {
    pub fn builder() -> WriteOptionsBuilder {
        WriteOptionsBuilder::default()
    }

    pub const fn copy_all() -> Self {
        Self {
            genes: Transfer::Copy,
            metadata: Transfer::Copy,
        }
    }

    pub const fn alias_all() -> Self {
        Self {
            genes: Transfer::Alias,
            metadata: Transfer::Alias,
        }
    }

    pub fn genes(&self) -> Transfer {
        self.genes
    }

    pub fn metadata(&self) -> Transfer {
        self.metadata
    }
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self::copy_all()
    }
}

/// Collects copy and alias requests per target; a target with neither is copied.
///
/// ```
/// use genepool_serialization::{Transfer, WriteOptions};
///
/// let options = WriteOptions::builder().alias_genes().copy_metadata().build().unwrap();
/// assert_eq!(options.genes(), Transfer::Alias);
///
/// // metadata was never mentioned, so it is copied
/// let options = WriteOptions::builder().alias_genes().build().unwrap();
/// assert_eq!(options.metadata(), Transfer::Copy);
///
/// assert!(WriteOptions::builder().copy_genes().alias_genes().build().is_err());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptionsBuilder {
    copy_genes: bool,
    alias_genes: bool,
    copy_metadata: bool,
    alias_metadata: bool,
}

impl WriteOptionsBuilder {
    pub fn copy_genes(mut self) -> Self {
        self.copy_genes = true;
        self
    }

    pub fn alias_genes(mut self) -> Self {
        self.alias_genes = true;
        self
    }

    pub fn copy_metadata(mut self) -> Self {
        self.copy_metadata = true;
        self
    }

    pub fn alias_metadata(mut self) -> Self {
        self.alias_metadata = true;
        self
    }

    /// Resolves each target: alias only gives [`Transfer::Alias`]; copy only or
    /// no request at all gives [`Transfer::Copy`]. An unrequested target is
    /// therefore written from the caller's genomes, never left zeroed.
    ///
    /// # Errors
    /// [`GenePoolError::IncompatibleWriteMode`] if a target was asked to be
    /// both copied and aliased.
    pub fn build(self) -> GenePoolResult<WriteOptions> {
        Ok(WriteOptions {
            genes: resolve(self.copy_genes, self.alias_genes, "genes")?,
            metadata: resolve(self.copy_metadata, self.alias_metadata, "metadata")?,
        })
    }
}

fn resolve(copy: bool, alias: bool, target: &'static str) -> GenePoolResult<Transfer> {
    match (copy, alias) {
        (true, true) => Err(GenePoolError::IncompatibleWriteMode { target }),
        (false, true) => Ok(Transfer::Alias),
        _ => Ok(Transfer::Copy),
    }
}

/// Writes a complete pool, copying all data, and closes the file.
pub fn write_pool<P, G>(path: P, descriptor: &PoolDescriptor, genomes: &[G]) -> GenePoolResult<()>
where
    P: AsRef<Path>,
    G: GenomeData,
{
    create_pool(path, descriptor, genomes, WriteOptions::copy_all())?.close()
}

/// Creates (or truncates) a pool file sized for `genomes` and returns it open
/// for writing.
///
/// Every shape check runs before the file is touched, so a rejected call
/// leaves the file system unchanged.
pub fn create_pool<P, G>(
    path: P,
    descriptor: &PoolDescriptor,
    genomes: &[G],
    options: WriteOptions,
) -> GenePoolResult<Pool>
where
    P: AsRef<Path>,
    G: GenomeData,
{
    let total = plan_size(descriptor, genomes)?;

    let mut mapping = FileMapping::open(path, MapMode::Write, total as u64)?;
    serialize(mapping.as_bytes_mut()?, descriptor, genomes, options)?;
    info!(
        "[POOL-WRITER] Wrote {} ({} organisms, {} bytes, genes {:?}, metadata {:?})",
        mapping.path().display(),
        genomes.len(),
        total,
        options.genes(),
        options.metadata()
    );

    Pool::from_mapping(mapping)
}

/// Checks every genome against the pool geometry and returns the file size.
fn plan_size<G: GenomeData>(descriptor: &PoolDescriptor, genomes: &[G]) -> GenePoolResult<usize> {
    check_metadata_size(descriptor.metadata.len())?;
    let gene_byte_size = descriptor.layout.gene_byte_size();

    let mut genomes_size = 0usize;
    for genome in genomes {
        check_metadata_size(genome.metadata().len())?;
        check_residue(genome.residue_bits(), genome.residue().len())?;
        let expected = (genome.genes_number() as usize)
            .checked_mul(gene_byte_size)
            .ok_or(GenePoolError::TooManyGenes {
                count: genome.genes_number() as usize,
            })?;
        if genome.gene_bytes().len() != expected {
            return Err(GenePoolError::GeneBytesMismatch {
                expected,
                actual: genome.gene_bytes().len(),
            });
        }
        let size = format::genome_byte_size(
            genome.genes_number(),
            gene_byte_size,
            genome.metadata().len(),
            genome.residue_bits(),
        );
        genomes_size = genomes_size.checked_add(size).ok_or(GenePoolError::OutOfMemory {
            requested: usize::MAX,
        })?;
    }
    Ok(format::pool_byte_size(descriptor.metadata.len(), genomes_size))
}

/// Lays out the pool into `out`, which is exactly the planned size and zeroed.
fn serialize<G: GenomeData>(
    out: &mut [u8],
    descriptor: &PoolDescriptor,
    genomes: &[G],
    options: WriteOptions,
) -> GenePoolResult<()> {
    let preamble = PoolPreamble::new(
        &descriptor.layout,
        genomes.len() as u64,
        descriptor.metadata.len() as u16,
    );
    preamble.write_to(out)?;

    let mut offset = PoolPreamble::BYTE_SIZE;
    offset = put_region(out, offset, &descriptor.metadata, options.metadata);
    out[offset] = POOL_METADATA_TERMINAL_BYTE;
    offset += 1;

    for genome in genomes {
        GenomePreamble {
            genes_number: genome.genes_number(),
            metadata_byte_size: genome.metadata().len() as u16,
        }
        .write_to(&mut out[offset..])?;
        offset += GenomePreamble::BYTE_SIZE;

        offset = put_region(out, offset, genome.metadata(), options.metadata);
        out[offset] = GENOME_METADATA_TERMINAL_BYTE;
        offset += 1;

        offset = put_region(out, offset, genome.gene_bytes(), options.genes);
        out[offset] = GENOME_RESIDUE_MARKER_BYTE;
        BigEndian::write_u16(&mut out[offset + 1..offset + 3], genome.residue_bits());
        offset += 3;

        offset = put_region(out, offset, genome.residue(), options.genes);
        out[offset] = GENOME_TERMINAL_BYTE;
        offset += 1;
    }

    out[offset] = POOL_TERMINAL_BYTE;
    Ok(())
}

/// Copies or skips `source` at `offset`; returns the offset past the region.
fn put_region(out: &mut [u8], offset: usize, source: &[u8], transfer: Transfer) -> usize {
    let end = offset + source.len();
    if transfer == Transfer::Copy {
        out[offset..end].copy_from_slice(source);
    }
    end
}
