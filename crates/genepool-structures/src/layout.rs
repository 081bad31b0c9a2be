// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Gene geometry: field widths and node-id bands.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use crate::bits::max_for_bit_width;
use crate::gene::NodeKind;
use crate::{GenePoolError, GenePoolResult};

pub const MAX_NODE_ID_BITS: u8 = 64;
pub const MAX_WEIGHT_BITS: u8 = 64;

/// Validated geometry of a gene.
///
/// A gene is `[outcome id][income id][weight]`, the two ids `node_id_bits`
/// wide and the weight `weight_bits` wide. The absolute id space
/// `[0, 2^node_id_bits)` is split into three bands:
///
/// | band         | absolute ids                               |
/// |--------------|--------------------------------------------|
/// | input        | `[0, input)`                               |
/// | intermediate | `[input, first_output)`                    |
/// | output       | `[first_output, max_id]`                   |
///
/// where `max_id = 2^node_id_bits - 1` and `first_output = max_id - output + 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneLayout {
    node_id_bits: u8,
    weight_bits: u8,
    input_neurons_number: u64,
    output_neurons_number: u64,
}

impl GeneLayout {
    /// Checks, in order: node id width, weight width, byte alignment, non-empty
    /// gene, band fit.
    pub fn new(
        node_id_bits: u8,
        weight_bits: u8,
        input_neurons_number: u64,
        output_neurons_number: u64,
    ) -> GenePoolResult<Self> {
        Self::validate_widths(node_id_bits, weight_bits)?;

        // 2^n ids in total; computed wide so that n = 64 does not overflow
        let id_space = 1u128 << node_id_bits;
        let requested = u128::from(input_neurons_number) + u128::from(output_neurons_number);
        if requested > id_space {
            return Err(GenePoolError::NodeBandsOverlap {
                input: input_neurons_number,
                output: output_neurons_number,
                node_id_bits,
            });
        }

        Ok(Self {
            node_id_bits,
            weight_bits,
            input_neurons_number,
            output_neurons_number,
        })
    }

    pub fn from_preset(
        preset: LayoutPreset,
        input_neurons_number: u64,
        output_neurons_number: u64,
    ) -> GenePoolResult<Self> {
        let (node_id_bits, weight_bits) = preset.widths();
        Self::new(
            node_id_bits,
            weight_bits,
            input_neurons_number,
            output_neurons_number,
        )
    }

    /// Width and alignment checks alone, without the band constraint.
    pub fn validate_widths(node_id_bits: u8, weight_bits: u8) -> GenePoolResult<()> {
        if node_id_bits > MAX_NODE_ID_BITS {
            return Err(GenePoolError::NodeIdTooWide { bits: node_id_bits });
        }
        if weight_bits > MAX_WEIGHT_BITS {
            return Err(GenePoolError::WeightTooWide { bits: weight_bits });
        }
        let gene_bits = 2 * usize::from(node_id_bits) + usize::from(weight_bits);
        if gene_bits % 8 != 0 {
            return Err(GenePoolError::GeneNotAligned {
                node_id_bits,
                weight_bits,
            });
        }
        if gene_bits == 0 {
            return Err(GenePoolError::EmptyGene);
        }
        Ok(())
    }

    //region Properties

    pub fn node_id_bits(&self) -> u8 {
        self.node_id_bits
    }

    pub fn weight_bits(&self) -> u8 {
        self.weight_bits
    }

    pub fn input_neurons_number(&self) -> u64 {
        self.input_neurons_number
    }

    pub fn output_neurons_number(&self) -> u64 {
        self.output_neurons_number
    }

    pub fn gene_bit_size(&self) -> usize {
        2 * usize::from(self.node_id_bits) + usize::from(self.weight_bits)
    }

    pub fn gene_byte_size(&self) -> usize {
        self.gene_bit_size() / 8
    }

    pub fn max_node_id(&self) -> u64 {
        max_for_bit_width(usize::from(self.node_id_bits))
    }

    pub fn max_weight(&self) -> u64 {
        max_for_bit_width(usize::from(self.weight_bits))
    }

    //endregion

    //region Bands

    /// First absolute id of a band. Equals `2^node_id_bits` for an empty
    /// output band, which is why it is returned as `u128`.
    pub fn band_start(&self, kind: NodeKind) -> u128 {
        match kind {
            NodeKind::Input => 0,
            NodeKind::Intermediate => u128::from(self.input_neurons_number),
            NodeKind::Output => self.first_output_id(),
        }
    }

    /// Number of ids in a band.
    pub fn band_capacity(&self, kind: NodeKind) -> u128 {
        match kind {
            NodeKind::Input => u128::from(self.input_neurons_number),
            NodeKind::Intermediate => {
                self.first_output_id() - u128::from(self.input_neurons_number)
            }
            NodeKind::Output => u128::from(self.output_neurons_number),
        }
    }

    fn first_output_id(&self) -> u128 {
        u128::from(self.max_node_id()) + 1 - u128::from(self.output_neurons_number)
    }

    //endregion
}

/// Named gene geometries, as `(node_id_bits, weight_bits)`.
///
/// All presets are byte aligned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutPreset {
    Plant,
    Roundworm,
    Leech,
    Lobster,
    Guppy,
    Frog,
    Cat,
}

impl LayoutPreset {
    pub const ALL: [LayoutPreset; 7] = [
        LayoutPreset::Plant,
        LayoutPreset::Roundworm,
        LayoutPreset::Leech,
        LayoutPreset::Lobster,
        LayoutPreset::Guppy,
        LayoutPreset::Frog,
        LayoutPreset::Cat,
    ];

    pub const fn widths(&self) -> (u8, u8) {
        match self {
            LayoutPreset::Plant => (5, 6),
            LayoutPreset::Roundworm => (9, 14),
            LayoutPreset::Leech => (14, 20),
            LayoutPreset::Lobster => (17, 22),
            LayoutPreset::Guppy => (22, 20),
            LayoutPreset::Frog => (24, 24),
            LayoutPreset::Cat => (30, 28),
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            LayoutPreset::Plant => "plant",
            LayoutPreset::Roundworm => "roundworm",
            LayoutPreset::Leech => "leech",
            LayoutPreset::Lobster => "lobster",
            LayoutPreset::Guppy => "guppy",
            LayoutPreset::Frog => "frog",
            LayoutPreset::Cat => "cat",
        }
    }
}

impl Display for LayoutPreset {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LayoutPreset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        LayoutPreset::ALL
            .iter()
            .copied()
            .find(|preset| preset.name() == lowered)
            .ok_or_else(|| {
                let names: Vec<&str> = LayoutPreset::ALL.iter().map(|p| p.name()).collect();
                format!("Unknown layout preset '{}', expected one of: {}", s, names.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gene_sizes() {
        let layout = GeneLayout::new(6, 12, 4, 2).unwrap();
        assert_eq!(layout.gene_bit_size(), 24);
        assert_eq!(layout.gene_byte_size(), 3);
        assert_eq!(layout.max_node_id(), 63);
        assert_eq!(layout.max_weight(), 4095);
    }

    #[test]
    fn test_validation_order() {
        assert!(matches!(
            GeneLayout::new(65, 70, 0, 0),
            Err(GenePoolError::NodeIdTooWide { bits: 65 })
        ));
        assert!(matches!(
            GeneLayout::new(64, 65, 0, 0),
            Err(GenePoolError::WeightTooWide { bits: 65 })
        ));
        assert!(matches!(
            GeneLayout::new(5, 5, 0, 0),
            Err(GenePoolError::GeneNotAligned {
                node_id_bits: 5,
                weight_bits: 5
            })
        ));
        assert!(matches!(
            GeneLayout::new(6, 10, 1, 1),
            Err(GenePoolError::GeneNotAligned { .. })
        ));
        assert!(matches!(GeneLayout::new(0, 0, 1, 0), Err(GenePoolError::EmptyGene)));
        assert!(matches!(
            GeneLayout::new(4, 0, 10, 7),
            Err(GenePoolError::NodeBandsOverlap { .. })
        ));
    }

    #[test]
    fn test_bands() {
        let layout = GeneLayout::new(4, 0, 3, 2).unwrap();
        assert_eq!(layout.band_start(NodeKind::Input), 0);
        assert_eq!(layout.band_start(NodeKind::Intermediate), 3);
        assert_eq!(layout.band_start(NodeKind::Output), 14);
        assert_eq!(layout.band_capacity(NodeKind::Input), 3);
        assert_eq!(layout.band_capacity(NodeKind::Intermediate), 11);
        assert_eq!(layout.band_capacity(NodeKind::Output), 2);

        // bands may fill the whole id space
        let full = GeneLayout::new(4, 0, 10, 6).unwrap();
        assert_eq!(full.band_capacity(NodeKind::Intermediate), 0);
    }

    #[test]
    fn test_64_bit_ids_without_outputs() {
        let layout = GeneLayout::new(64, 64, 5, 0).unwrap();
        assert_eq!(layout.gene_byte_size(), 24);
        assert_eq!(layout.band_start(NodeKind::Output), 1u128 << 64);
        assert_eq!(layout.band_capacity(NodeKind::Output), 0);
        assert_eq!(layout.max_weight(), u64::MAX);
    }

    #[test]
    fn test_presets_are_aligned() {
        for preset in LayoutPreset::ALL {
            let layout = GeneLayout::from_preset(preset, 1, 1).unwrap();
            assert_eq!(layout.gene_bit_size() % 8, 0, "{} is not aligned", preset);
        }
        assert_eq!(
            GeneLayout::from_preset(LayoutPreset::Cat, 0, 0)
                .unwrap()
                .gene_byte_size(),
            11
        );
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("Frog".parse::<LayoutPreset>().unwrap(), LayoutPreset::Frog);
        assert_eq!(" plant ".parse::<LayoutPreset>().unwrap(), LayoutPreset::Plant);
        assert!("dragon".parse::<LayoutPreset>().is_err());
    }
}
