// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Genomes, borrowed from a pool mapping or owned.
//!
//! [`GenomeView`] and [`GenomeViewMut`] borrow the bytes of an open
//! [`Pool`](crate::Pool), so the compiler rejects any use after the pool is
//! closed. [`Genome`] owns its buffers and exists independently of any file,
//! typically as input to the writer.

use genepool_structures::bits::bits_to_bytes;
use genepool_structures::{Gene, GeneCodec, GenePoolError, GenePoolResult};

use crate::format::{GenomeSpan, MAX_METADATA_BYTE_SIZE};

/// Read access shared by every genome representation.
pub trait GenomeData {
    fn genes_number(&self) -> u32;

    fn metadata(&self) -> &[u8];

    /// The packed gene array, `genes_number * gene_byte_size` bytes.
    fn gene_bytes(&self) -> &[u8];

    fn residue_bits(&self) -> u16;

    /// `ceil(residue_bits / 8)` bytes.
    fn residue(&self) -> &[u8];

    /// Bytes of gene `index`, if the genome has that many genes.
    fn gene_slice(&self, gene_byte_size: usize, index: usize) -> Option<&[u8]> {
        if index >= self.genes_number() as usize {
            return None;
        }
        let start = index.checked_mul(gene_byte_size)?;
        self.gene_bytes().get(start..start + gene_byte_size)
    }

    fn decode_gene(&self, codec: &GeneCodec, index: usize) -> GenePoolResult<Gene> {
        let size = codec.gene_byte_size();
        let bytes = self
            .gene_slice(size, index)
            .ok_or_else(|| gene_out_of_bounds(index, size, self.genes_number()))?;
        codec.decode_gene(bytes)
    }

    fn decode_genes(&self, codec: &GeneCodec) -> GenePoolResult<Vec<Gene>> {
        codec.decode_genes(self.gene_bytes(), self.genes_number() as usize)
    }

    /// Copies the genome into owned buffers.
    fn to_genome(&self) -> GenePoolResult<Genome> {
        Genome::new(
            self.genes_number(),
            try_copy(self.metadata())?,
            try_copy(self.gene_bytes())?,
            self.residue_bits(),
            try_copy(self.residue())?,
        )
    }
}

//region Genome View

/// A genome borrowed from a pool mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenomeView<'a> {
    genes_number: u32,
    metadata: &'a [u8],
    genes: &'a [u8],
    residue_bits: u16,
    residue: &'a [u8],
}

impl<'a> GenomeView<'a> {
    pub(crate) fn from_span(bytes: &'a [u8], span: &GenomeSpan) -> Self {
        Self {
            genes_number: span.genes_number,
            metadata: &bytes[span.metadata.clone()],
            genes: &bytes[span.genes.clone()],
            residue_bits: span.residue_bits,
            residue: &bytes[span.residue.clone()],
        }
    }

    /// Gene bytes with the lifetime of the pool borrow rather than of `self`.
    pub fn pool_gene_bytes(&self) -> &'a [u8] {
        self.genes
    }

    pub fn pool_metadata(&self) -> &'a [u8] {
        self.metadata
    }
}

impl GenomeData for GenomeView<'_> {
    fn genes_number(&self) -> u32 {
        self.genes_number
    }

    fn metadata(&self) -> &[u8] {
        self.metadata
    }

    fn gene_bytes(&self) -> &[u8] {
        self.genes
    }

    fn residue_bits(&self) -> u16 {
        self.residue_bits
    }

    fn residue(&self) -> &[u8] {
        self.residue
    }
}

//endregion

//region Genome View Mut

/// A genome borrowed mutably from a writable pool mapping.
///
/// Only the metadata, gene and residue bytes are exposed for writing; sizes
/// and control bytes stay fixed.
#[derive(Debug, PartialEq, Eq)]
pub struct GenomeViewMut<'a> {
    genes_number: u32,
    metadata: &'a mut [u8],
    genes: &'a mut [u8],
    residue_bits: u16,
    residue: &'a mut [u8],
}

impl<'a> GenomeViewMut<'a> {
    pub(crate) fn from_span(bytes: &'a mut [u8], span: &GenomeSpan) -> Self {
        let region = &mut bytes[span.metadata.start..span.residue.end];
        let (metadata, rest) = region.split_at_mut(span.metadata.len());
        // metadata terminal byte
        let (_, rest) = rest.split_at_mut(1);
        let (genes, rest) = rest.split_at_mut(span.genes.len());
        // residue marker byte and residue length field
        let (_, residue) = rest.split_at_mut(3);
        Self {
            genes_number: span.genes_number,
            metadata,
            genes,
            residue_bits: span.residue_bits,
            residue,
        }
    }

    pub fn metadata_mut(&mut self) -> &mut [u8] {
        &mut self.metadata[..]
    }

    pub fn gene_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.genes[..]
    }

    pub fn residue_mut(&mut self) -> &mut [u8] {
        &mut self.residue[..]
    }

    pub fn as_view(&self) -> GenomeView<'_> {
        GenomeView {
            genes_number: self.genes_number,
            metadata: &self.metadata[..],
            genes: &self.genes[..],
            residue_bits: self.residue_bits,
            residue: &self.residue[..],
        }
    }

    pub fn encode_gene(&mut self, codec: &GeneCodec, index: usize, gene: &Gene) -> GenePoolResult<()> {
        encode_gene_at(&mut self.genes[..], self.genes_number, codec, index, gene)
    }

    /// Overwrites every gene. `genes` must hold exactly `genes_number` entries.
    pub fn encode_genes(&mut self, codec: &GeneCodec, genes: &[Gene]) -> GenePoolResult<()> {
        encode_all_genes(&mut self.genes[..], self.genes_number, codec, genes)
    }
}

impl GenomeData for GenomeViewMut<'_> {
    fn genes_number(&self) -> u32 {
        self.genes_number
    }

    fn metadata(&self) -> &[u8] {
        &self.metadata[..]
    }

    fn gene_bytes(&self) -> &[u8] {
        &self.genes[..]
    }

    fn residue_bits(&self) -> u16 {
        self.residue_bits
    }

    fn residue(&self) -> &[u8] {
        &self.residue[..]
    }
}

//endregion

//region Genome

/// A freestanding genome that owns its buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genome {
    genes_number: u32,
    metadata: Vec<u8>,
    genes: Vec<u8>,
    residue_bits: u16,
    residue: Vec<u8>,
}

impl Genome {
    /// Checks metadata size and residue length. The gene array length is
    /// checked against a gene size when the genome is written or decoded.
    pub fn new(
        genes_number: u32,
        metadata: Vec<u8>,
        genes: Vec<u8>,
        residue_bits: u16,
        residue: Vec<u8>,
    ) -> GenePoolResult<Self> {
        check_metadata_size(metadata.len())?;
        check_residue(residue_bits, residue.len())?;
        Ok(Self {
            genes_number,
            metadata,
            genes,
            residue_bits,
            residue,
        })
    }

    /// A genome of the given shape with every byte zero.
    pub fn zeroed(
        gene_byte_size: usize,
        genes_number: u32,
        metadata_byte_size: usize,
        residue_bits: u16,
    ) -> GenePoolResult<Self> {
        check_metadata_size(metadata_byte_size)?;
        let gene_len = (genes_number as usize)
            .checked_mul(gene_byte_size)
            .ok_or(GenePoolError::TooManyGenes {
                count: genes_number as usize,
            })?;
        Ok(Self {
            genes_number,
            metadata: try_zeroed(metadata_byte_size)?,
            genes: try_zeroed(gene_len)?,
            residue_bits,
            residue: try_zeroed(bits_to_bytes(usize::from(residue_bits)))?,
        })
    }

    /// Encodes `genes` into a new genome with no residue.
    pub fn from_genes(codec: &GeneCodec, genes: &[Gene], metadata: Vec<u8>) -> GenePoolResult<Self> {
        let genes_number = u32::try_from(genes.len()).map_err(|_| GenePoolError::TooManyGenes {
            count: genes.len(),
        })?;
        Self::new(genes_number, metadata, codec.encode_genes(genes)?, 0, Vec::new())
    }

    pub fn with_residue(mut self, residue_bits: u16, residue: Vec<u8>) -> GenePoolResult<Self> {
        check_residue(residue_bits, residue.len())?;
        self.residue_bits = residue_bits;
        self.residue = residue;
        Ok(self)
    }

    pub fn metadata_mut(&mut self) -> &mut [u8] {
        &mut self.metadata
    }

    pub fn gene_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.genes
    }

    pub fn residue_mut(&mut self) -> &mut [u8] {
        &mut self.residue
    }

    pub fn encode_gene(&mut self, codec: &GeneCodec, index: usize, gene: &Gene) -> GenePoolResult<()> {
        encode_gene_at(&mut self.genes, self.genes_number, codec, index, gene)
    }
}

impl GenomeData for Genome {
    fn genes_number(&self) -> u32 {
        self.genes_number
    }

    fn metadata(&self) -> &[u8] {
        &self.metadata
    }

    fn gene_bytes(&self) -> &[u8] {
        &self.genes
    }

    fn residue_bits(&self) -> u16 {
        self.residue_bits
    }

    fn residue(&self) -> &[u8] {
        &self.residue
    }
}

//endregion

//region Helpers

pub(crate) fn check_metadata_size(size: usize) -> GenePoolResult<()> {
    if size > MAX_METADATA_BYTE_SIZE {
        return Err(GenePoolError::MetadataTooLarge { size });
    }
    Ok(())
}

pub(crate) fn check_residue(bits: u16, actual: usize) -> GenePoolResult<()> {
    let expected = bits_to_bytes(usize::from(bits));
    if actual != expected {
        return Err(GenePoolError::ResidueMismatch {
            bits,
            expected,
            actual,
        });
    }
    Ok(())
}

fn try_zeroed(len: usize) -> GenePoolResult<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(len)
        .map_err(|_| GenePoolError::OutOfMemory { requested: len })?;
    bytes.resize(len, 0);
    Ok(bytes)
}

fn try_copy(source: &[u8]) -> GenePoolResult<Vec<u8>> {
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(source.len())
        .map_err(|_| GenePoolError::OutOfMemory {
            requested: source.len(),
        })?;
    bytes.extend_from_slice(source);
    Ok(bytes)
}

fn gene_out_of_bounds(index: usize, gene_byte_size: usize, genes_number: u32) -> GenePoolError {
    GenePoolError::OutOfBounds {
        start: index.saturating_mul(gene_byte_size).saturating_mul(8),
        end: index
            .saturating_add(1)
            .saturating_mul(gene_byte_size)
            .saturating_mul(8),
        len: (genes_number as usize)
            .saturating_mul(gene_byte_size)
            .saturating_mul(8),
    }
}

fn encode_gene_at(
    genes: &mut [u8],
    genes_number: u32,
    codec: &GeneCodec,
    index: usize,
    gene: &Gene,
) -> GenePoolResult<()> {
    let size = codec.gene_byte_size();
    if index >= genes_number as usize {
        return Err(gene_out_of_bounds(index, size, genes_number));
    }
    let start = index * size;
    let slot = genes
        .get_mut(start..start + size)
        .ok_or_else(|| gene_out_of_bounds(index, size, genes_number))?;
    codec.encode_gene(gene, slot)
}

fn encode_all_genes(
    target: &mut [u8],
    genes_number: u32,
    codec: &GeneCodec,
    genes: &[Gene],
) -> GenePoolResult<()> {
    let size = codec.gene_byte_size();
    let expected = (genes_number as usize).saturating_mul(size);
    if genes.len() != genes_number as usize || target.len() != expected {
        return Err(GenePoolError::GeneBytesMismatch {
            expected,
            actual: genes.len().saturating_mul(size),
        });
    }
    for (gene, slot) in genes.iter().zip(target.chunks_exact_mut(size)) {
        codec.encode_gene(gene, slot)?;
    }
    Ok(())
}

//endregion

#[cfg(test)]
mod tests {
    use super::*;
    use genepool_structures::{GeneLayout, NodeRef};

    fn codec() -> GeneCodec {
        GeneCodec::new(GeneLayout::new(6, 12, 4, 2).unwrap())
    }

    #[test]
    fn test_zeroed_shape() {
        let genome = Genome::zeroed(3, 4, 5, 12).unwrap();
        assert_eq!(genome.genes_number(), 4);
        assert_eq!(genome.gene_bytes(), &[0u8; 12]);
        assert_eq!(genome.metadata(), &[0u8; 5]);
        assert_eq!(genome.residue_bits(), 12);
        assert_eq!(genome.residue().len(), 2);
    }

    #[test]
    fn test_new_validates() {
        assert!(matches!(
            Genome::new(0, vec![0; MAX_METADATA_BYTE_SIZE + 1], vec![], 0, vec![]),
            Err(GenePoolError::MetadataTooLarge { .. })
        ));
        assert!(matches!(
            Genome::new(0, vec![], vec![], 9, vec![0]),
            Err(GenePoolError::ResidueMismatch {
                bits: 9,
                expected: 2,
                actual: 1
            })
        ));
    }

    #[test]
    fn test_genes_by_index() {
        let codec = codec();
        let genes = [
            Gene::new(NodeRef::output(0), NodeRef::input(1), 0.0),
            Gene::new(NodeRef::intermediate(7), NodeRef::input(3), 1.0),
        ];
        let mut genome = Genome::from_genes(&codec, &genes, b"meta".to_vec()).unwrap();
        assert_eq!(genome.genes_number(), 2);
        assert_eq!(genome.decode_gene(&codec, 1).unwrap(), genes[1]);
        assert!(genome.decode_gene(&codec, 2).is_err());

        genome.encode_gene(&codec, 0, &genes[1]).unwrap();
        assert_eq!(genome.decode_genes(&codec).unwrap(), vec![genes[1], genes[1]]);
        assert!(genome.encode_gene(&codec, 2, &genes[0]).is_err());
    }

    #[test]
    fn test_view_mut_splits_regions() {
        // metadata 2, genes 3, residue 1 byte
        let mut bytes = vec![
            0xA0, 0, 0, 0, 1, 0, 2, 0xDE, 1, 2, 0xEF, 3, 4, 5, 0xA2, 0, 4, 0x90, 0xA1,
        ];
        let span = crate::format::locate_genome(&bytes, 0, 3).unwrap();
        {
            let mut view = GenomeViewMut::from_span(&mut bytes, &span);
            assert_eq!(view.metadata(), &[1, 2]);
            assert_eq!(view.gene_bytes(), &[3, 4, 5]);
            assert_eq!(view.residue(), &[0x90]);
            view.metadata_mut().copy_from_slice(&[9, 9]);
            view.gene_bytes_mut().fill(0);
            view.residue_mut()[0] = 0x10;
        }
        assert_eq!(
            bytes,
            vec![0xA0, 0, 0, 0, 1, 0, 2, 0xDE, 9, 9, 0xEF, 0, 0, 0, 0xA2, 0, 4, 0x10, 0xA1]
        );
    }

    #[test]
    fn test_view_to_genome() {
        let bytes = [0xA0, 0, 0, 0, 0, 0, 1, 0xDE, 42, 0xEF, 0xA2, 0, 0, 0xA1];
        let span = crate::format::locate_genome(&bytes, 0, 3).unwrap();
        let view = GenomeView::from_span(&bytes, &span);
        let owned = view.to_genome().unwrap();
        assert_eq!(owned.metadata(), &[42]);
        assert_eq!(owned.genes_number(), 0);
        assert!(owned.gene_bytes().is_empty());
    }
}
