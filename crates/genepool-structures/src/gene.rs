// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Genes and their packed representation.
//!
//! A [`Gene`] is a weighted edge between two nodes, each node named by its
//! band ([`NodeKind`]) and a band-relative index. On disk the same edge is a
//! [`RawGene`]: two absolute node ids and an unsigned weight magnitude packed
//! big-endian by [`GeneCodec`].

use crate::bits::{read_bits, write_bits};
use crate::{GeneLayout, GenePoolError, GenePoolResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeKind {
    Input,
    Intermediate,
    Output,
}

/// A node addressed by band and band-relative index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    pub kind: NodeKind,
    pub index: u64,
}

impl NodeRef {
    pub const fn new(kind: NodeKind, index: u64) -> Self {
        Self { kind, index }
    }

    pub const fn input(index: u64) -> Self {
        Self::new(NodeKind::Input, index)
    }

    pub const fn intermediate(index: u64) -> Self {
        Self::new(NodeKind::Intermediate, index)
    }

    pub const fn output(index: u64) -> Self {
        Self::new(NodeKind::Output, index)
    }
}

/// Gene fields exactly as stored, before band remapping and weight scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RawGene {
    pub outcome_id: u64,
    pub income_id: u64,
    pub weight_magnitude: u64,
}

/// A decoded gene: an edge from `income` to `outcome` with a weight in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Gene {
    pub outcome: NodeRef,
    pub income: NodeRef,
    pub weight: f64,
}

impl Gene {
    pub const fn new(outcome: NodeRef, income: NodeRef, weight: f64) -> Self {
        Self {
            outcome,
            income,
            weight,
        }
    }
}

/// Packs and unpacks genes for one [`GeneLayout`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneCodec {
    layout: GeneLayout,
}

impl GeneCodec {
    pub fn new(layout: GeneLayout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> &GeneLayout {
        &self.layout
    }

    pub fn gene_byte_size(&self) -> usize {
        self.layout.gene_byte_size()
    }

    //region Raw fields

    pub fn decode_raw(&self, bytes: &[u8]) -> GenePoolResult<RawGene> {
        let n = usize::from(self.layout.node_id_bits());
        let end = self.layout.gene_bit_size();
        Ok(RawGene {
            outcome_id: read_bits(bytes, 0, n)?,
            income_id: read_bits(bytes, n, 2 * n)?,
            weight_magnitude: read_bits(bytes, 2 * n, end)?,
        })
    }

    /// Writes the three fields into the first `gene_byte_size` bytes of `out`.
    pub fn encode_raw(&self, raw: &RawGene, out: &mut [u8]) -> GenePoolResult<()> {
        let n = usize::from(self.layout.node_id_bits());
        let w = usize::from(self.layout.weight_bits());
        let span = self.gene_span_mut(out)?;
        span.fill(0);
        write_bits(span, 0, n, raw.outcome_id)?;
        write_bits(span, n, n, raw.income_id)?;
        write_bits(span, 2 * n, w, raw.weight_magnitude)
    }

    //endregion

    //region Genes

    pub fn decode_gene(&self, bytes: &[u8]) -> GenePoolResult<Gene> {
        let raw = self.decode_raw(bytes)?;
        Ok(Gene {
            outcome: self.classify(raw.outcome_id)?,
            income: self.classify(raw.income_id)?,
            weight: self.normalize_weight(raw.weight_magnitude),
        })
    }

    /// Encodes `gene` into the first `gene_byte_size` bytes of `out`.
    ///
    /// Nothing is written if any field is out of range.
    pub fn encode_gene(&self, gene: &Gene, out: &mut [u8]) -> GenePoolResult<()> {
        let raw = RawGene {
            outcome_id: self.absolute_id(gene.outcome)?,
            income_id: self.absolute_id(gene.income)?,
            weight_magnitude: self.quantize_weight(gene.weight)?,
        };
        self.encode_raw(&raw, out)
    }

    /// Packs genes back to back into a freshly allocated gene array.
    pub fn encode_genes(&self, genes: &[Gene]) -> GenePoolResult<Vec<u8>> {
        let size = self.gene_byte_size();
        let total = genes.len().checked_mul(size).ok_or(GenePoolError::TooManyGenes {
            count: genes.len(),
        })?;
        let mut bytes = Vec::new();
        bytes
            .try_reserve_exact(total)
            .map_err(|_| GenePoolError::OutOfMemory { requested: total })?;
        bytes.resize(total, 0);
        for (gene, chunk) in genes.iter().zip(bytes.chunks_exact_mut(size)) {
            self.encode_gene(gene, chunk)?;
        }
        Ok(bytes)
    }

    /// Unpacks a gene array holding exactly `count` genes.
    pub fn decode_genes(&self, bytes: &[u8], count: usize) -> GenePoolResult<Vec<Gene>> {
        let size = self.gene_byte_size();
        let expected = count.saturating_mul(size);
        if bytes.len() != expected {
            return Err(GenePoolError::GeneBytesMismatch {
                expected,
                actual: bytes.len(),
            });
        }
        bytes
            .chunks_exact(size)
            .map(|chunk| self.decode_gene(chunk))
            .collect()
    }

    //endregion

    //region Node ids

    /// Maps an absolute id to its band and band-relative index.
    pub fn classify(&self, absolute_id: u64) -> GenePoolResult<NodeRef> {
        let max_id = self.layout.max_node_id();
        if absolute_id > max_id {
            return Err(GenePoolError::ValueTooWide {
                value: absolute_id,
                width: usize::from(self.layout.node_id_bits()),
            });
        }
        let id = u128::from(absolute_id);
        let kind = if id < self.layout.band_start(NodeKind::Intermediate) {
            NodeKind::Input
        } else if id >= self.layout.band_start(NodeKind::Output) {
            NodeKind::Output
        } else {
            NodeKind::Intermediate
        };
        // id >= band start and both are below 2^64 here
        let index = (id - self.layout.band_start(kind)) as u64;
        Ok(NodeRef { kind, index })
    }

    /// Maps a band-relative node to its absolute id.
    pub fn absolute_id(&self, node: NodeRef) -> GenePoolResult<u64> {
        if u128::from(node.index) >= self.layout.band_capacity(node.kind) {
            return Err(GenePoolError::NodeIdOutOfBand {
                kind: node.kind,
                index: node.index,
            });
        }
        Ok((self.layout.band_start(node.kind) + u128::from(node.index)) as u64)
    }

    //endregion

    //region Weights

    pub fn normalize_weight(&self, magnitude: u64) -> f64 {
        let max = self.layout.max_weight();
        if max == 0 {
            return 0.0;
        }
        magnitude as f64 / max as f64
    }

    /// Rounds a weight in `[0, 1]` to the nearest representable magnitude.
    pub fn quantize_weight(&self, weight: f64) -> GenePoolResult<u64> {
        if !(0.0..=1.0).contains(&weight) {
            return Err(GenePoolError::WeightOutOfRange { weight });
        }
        let max = self.layout.max_weight();
        let scaled = (weight * max as f64).round();
        // f64 cannot hold every u64; clamp what rounds past the top
        if scaled >= max as f64 {
            Ok(max)
        } else {
            Ok(scaled as u64)
        }
    }

    /// Largest difference between a weight and its decoded value. Wide
    /// weights are bounded by `f64` precision rather than the field.
    pub fn quantization_step(&self) -> f64 {
        let max = self.layout.max_weight();
        if max == 0 {
            1.0
        } else {
            (1.0 / max as f64).max(4.0 * f64::EPSILON)
        }
    }

    //endregion

    fn gene_span_mut<'a>(&self, out: &'a mut [u8]) -> GenePoolResult<&'a mut [u8]> {
        let size = self.gene_byte_size();
        let len = out.len();
        out.get_mut(..size).ok_or(GenePoolError::OutOfBounds {
            start: 0,
            end: size * 8,
            len: len * 8,
        })
    }
}
