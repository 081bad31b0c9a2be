// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Pools created from a parsed `genepool.toml`.

#![cfg(feature = "config")]

use std::collections::HashMap;

use genepool::config::{load_config, load_config_from_str, ConfigError};
use genepool::prelude::*;
use genepool::setup::{pool_descriptor, write_options};
use tempfile::tempdir;

const ALIAS_GENES: &str = r#"
[layout]
preset = "roundworm"
input_neurons = 16
output_neurons = 4

[storage]
genes = "alias"
"#;

#[test]
fn test_configured_pool_is_filled_in_place() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("configured.pool");

    let config = load_config_from_str(ALIAS_GENES).unwrap();
    validate_config(&config).unwrap();
    let descriptor = pool_descriptor(&config, b"generation=0".to_vec()).unwrap();
    let options = write_options(&config.storage).unwrap();
    assert_eq!(options.genes(), Transfer::Alias);
    assert_eq!(options.metadata(), Transfer::Copy);

    let codec = GeneCodec::new(descriptor.layout);
    let shape = Genome::zeroed(codec.gene_byte_size(), 2, 0, 0).unwrap();
    let mut pool = create_pool(&path, &descriptor, &[shape.clone(), shape], options).unwrap();

    let genes = [
        Gene::new(NodeRef::intermediate(7), NodeRef::input(15), 0.75),
        Gene::new(NodeRef::output(3), NodeRef::intermediate(7), 0.0),
    ];
    while let Some(mut genome) = pool.read_next_genome_mut().unwrap() {
        assert!(genome.gene_bytes().iter().all(|&b| b == 0));
        genome.encode_genes(&codec, &genes).unwrap();
    }
    pool.close().unwrap();

    let pool = Pool::open(&path).unwrap();
    assert_eq!(pool.metadata(), b"generation=0");
    assert_eq!(pool.layout().node_id_bits(), 9);
    let step = codec.quantization_step();
    for genome in pool.read_genomes().unwrap() {
        let decoded = genome.decode_genes(&codec).unwrap();
        assert_eq!(decoded[0].outcome, NodeRef::intermediate(7));
        assert_eq!(decoded[1].outcome, NodeRef::output(3));
        assert!((decoded[0].weight - 0.75).abs() <= step);
    }
}

#[test]
fn test_cli_overrides_reach_the_pool_layout() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("genepool.toml");
    std::fs::write(&config_path, ALIAS_GENES).unwrap();

    let cli: HashMap<String, String> = [
        ("preset".to_string(), "frog".to_string()),
        ("genes".to_string(), "copy".to_string()),
    ]
    .into_iter()
    .collect();
    let config = load_config(Some(&config_path), Some(&cli)).unwrap();

    let descriptor = pool_descriptor(&config, Vec::new()).unwrap();
    assert_eq!(descriptor.layout.node_id_bits(), 24);
    assert_eq!(descriptor.layout.input_neurons_number(), 16);
    assert_eq!(write_options(&config.storage).unwrap(), WriteOptions::copy_all());
}

#[test]
fn test_unaligned_config_layout_rejected() {
    let config = load_config_from_str(
        r#"
        [layout]
        preset = "plant"
        node_id_bits = 5
        weight_bits = 5
        "#,
    )
    .unwrap();

    assert!(validate_config(&config).is_err());
    let err = pool_descriptor(&config, Vec::new()).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Layout(GenePoolError::GeneNotAligned { .. })
    ));
}
