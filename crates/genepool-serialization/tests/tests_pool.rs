// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fs;
use std::path::Path;

use genepool_serialization::{
    create_pool, write_pool, Genome, GenomeData, Pool, PoolDescriptor, WriteOptions,
};
use genepool_structures::{
    Checkpoint, ErrorKind, Gene, GeneCodec, GeneLayout, GenePoolError, NodeRef,
};
use tempfile::tempdir;

fn layout() -> GeneLayout {
    GeneLayout::new(6, 12, 4, 2).unwrap()
}

fn sample_genes(seed: u64) -> Vec<Gene> {
    vec![
        Gene::new(NodeRef::output(seed % 2), NodeRef::input(seed % 4), 1.0),
        Gene::new(NodeRef::intermediate(seed), NodeRef::input(0), 0.0),
        Gene::new(NodeRef::output(1), NodeRef::intermediate(seed + 1), 1.0),
    ]
}

/// Two genomes of three genes each, no metadata, no residue.
fn write_streaming_pool(path: &Path) -> Vec<Genome> {
    let codec = GeneCodec::new(layout());
    let genomes = vec![
        Genome::from_genes(&codec, &sample_genes(0), Vec::new()).unwrap(),
        Genome::from_genes(&codec, &sample_genes(5), Vec::new()).unwrap(),
    ];
    write_pool(path, &PoolDescriptor::new(layout(), Vec::new()), &genomes).unwrap();
    genomes
}

/// One genome with pool metadata, genome metadata and a residue.
///
/// ```text
/// 0 AB | 29 BC | 30..32 meta | 32 CD | 33 A0 | 40 DE | 41 meta | 42 EF
/// 43..49 genes | 49 A2 | 50..52 residue bits | 52 residue | 53 A1 | 54 FF
/// ```
fn write_annotated_pool(path: &Path) {
    let codec = GeneCodec::new(layout());
    let genome = Genome::from_genes(&codec, &sample_genes(2)[..2], vec![0x42])
        .unwrap()
        .with_residue(4, vec![0xF0])
        .unwrap();
    write_pool(path, &PoolDescriptor::new(layout(), b"pm".to_vec()), &[genome]).unwrap();
}

#[test]
fn test_streaming_reads_each_genome_once() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("stream.pool");
    let written = write_streaming_pool(&path);
    assert_eq!(fs::metadata(&path).unwrap().len(), 30 + 1 + 2 * (8 + 1 + 9 + 3 + 1) + 1);

    let mut pool = Pool::open(&path).unwrap();
    assert_eq!(pool.organisms_number(), 2);
    assert_eq!(pool.gene_byte_size(), 3);

    let first = pool.read_next_genome().unwrap().unwrap().to_genome().unwrap();
    let second = pool.read_next_genome().unwrap().unwrap().to_genome().unwrap();
    assert!(pool.read_next_genome().unwrap().is_none());
    assert!(pool.read_next_genome().unwrap().is_none());
    assert_eq!(vec![first.clone(), second.clone()], written);

    pool.reset_cursor();
    assert_eq!(pool.genomes_read(), 0);
    let again = pool.read_next_genome().unwrap().unwrap().to_genome().unwrap();
    assert_eq!(again, first);
    let again = pool.read_next_genome().unwrap().unwrap().to_genome().unwrap();
    assert_eq!(again, second);
    assert!(pool.read_next_genome().unwrap().is_none());

    pool.close().unwrap();
}

#[test]
fn test_decoded_genes_survive_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("genes.pool");
    write_streaming_pool(&path);

    let mut pool = Pool::open(&path).unwrap();
    let codec = pool.codec();
    let genome = pool.read_next_genome().unwrap().unwrap();
    assert_eq!(genome.decode_genes(&codec).unwrap(), sample_genes(0));
    assert_eq!(genome.decode_gene(&codec, 2).unwrap(), sample_genes(0)[2]);
}

#[test]
fn test_iteration_leaves_cursor_alone() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("iter.pool");
    let written = write_streaming_pool(&path);

    let mut pool = Pool::open(&path).unwrap();
    pool.read_next_genome().unwrap();
    let cursor = pool.cursor();

    assert_eq!(pool.genomes().count(), 2);
    assert_eq!(pool.read_genomes().unwrap(), written);
    assert_eq!(pool.cursor(), cursor);
    assert_eq!(pool.genomes_read(), 1);
}

#[test]
fn test_metadata_and_residue_preserved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("annotated.pool");
    write_annotated_pool(&path);
    assert_eq!(fs::metadata(&path).unwrap().len(), 55);

    let mut pool = Pool::open(&path).unwrap();
    assert_eq!(pool.metadata(), b"pm");
    assert_eq!(pool.descriptor(), PoolDescriptor::new(layout(), b"pm".to_vec()));

    let genome = pool.read_next_genome().unwrap().unwrap();
    assert_eq!(genome.metadata(), &[0x42]);
    assert_eq!(genome.residue_bits(), 4);
    assert_eq!(genome.residue(), &[0xF0]);
    assert_eq!(genome.genes_number(), 2);
}

#[test]
fn test_every_checkpoint_detects_corruption() {
    let dir = tempdir().unwrap();
    let pristine_path = dir.path().join("pristine.pool");
    write_annotated_pool(&pristine_path);
    let pristine = fs::read(&pristine_path).unwrap();

    let checkpoints = [
        (0, Checkpoint::PoolInitial),
        (29, Checkpoint::PoolMetadataStart),
        (32, Checkpoint::PoolMetadataEnd),
        (33, Checkpoint::GenomeInitial),
        (40, Checkpoint::GenomeMetadataStart),
        (42, Checkpoint::GenomeMetadataEnd),
        (49, Checkpoint::GenomeResidueMarker),
        (53, Checkpoint::GenomeTerminal),
        (54, Checkpoint::PoolTerminal),
    ];
    assert_eq!(checkpoints.len(), Checkpoint::ALL.len());

    for (offset, checkpoint) in checkpoints {
        let mut bytes = pristine.clone();
        bytes[offset] ^= 0x01;
        let path = dir.path().join(format!("{:?}.pool", checkpoint));
        fs::write(&path, &bytes).unwrap();

        let err = match Pool::open(&path) {
            Err(err) => err,
            Ok(mut pool) => {
                let mut outcome = pool.read_next_genome().map(|_| ());
                if outcome.is_ok() {
                    outcome = pool.read_next_genome().map(|_| ());
                }
                outcome.unwrap_err()
            }
        };

        assert_eq!(err.checkpoint(), Some(checkpoint), "flipped byte {}", offset);
        assert!(matches!(err, GenePoolError::Corrupt { offset: at, .. } if at == offset));
        assert_eq!(err.kind(), ErrorKind::Corruption);
        assert_eq!(fs::read(&path).unwrap(), bytes);
    }
}

#[test]
fn test_cursor_stays_on_failed_genome() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.pool");
    write_streaming_pool(&path);

    let mut bytes = fs::read(&path).unwrap();
    let second_genome = 31 + 22;
    bytes[second_genome] = 0;
    fs::write(&path, &bytes).unwrap();

    let mut pool = Pool::open(&path).unwrap();
    assert!(pool.read_next_genome().unwrap().is_some());
    let cursor = pool.cursor();
    assert_eq!(cursor, second_genome);
    assert!(pool.read_next_genome().is_err());
    assert_eq!(pool.cursor(), cursor);
    assert_eq!(pool.genomes_read(), 1);

    let results: Vec<_> = pool.genomes().collect();
    assert_eq!(results.len(), 2);
    assert!(results[1].is_err());
}

#[test]
fn test_early_pool_terminal_ends_the_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.pool");
    write_streaming_pool(&path);

    // claim a third organism that is not there
    let mut bytes = fs::read(&path).unwrap();
    bytes[8] = 3;
    fs::write(&path, &bytes).unwrap();

    let mut pool = Pool::open(&path).unwrap();
    assert!(pool.read_next_genome().unwrap().is_some());
    assert!(pool.read_next_genome().unwrap().is_some());
    let end = pool.cursor();
    assert!(pool.read_next_genome().unwrap().is_none());
    assert_eq!(pool.cursor(), end);
    assert_eq!(pool.genomes_read(), 2);
    assert_eq!(pool.read_genomes().unwrap().len(), 2);
}

#[test]
fn test_trailing_bytes_are_ignored() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("trailing.pool");
    write_streaming_pool(&path);

    let mut bytes = fs::read(&path).unwrap();
    bytes.extend_from_slice(&[0xEE; 5]);
    fs::write(&path, &bytes).unwrap();

    let pool = Pool::open(&path).unwrap();
    assert_eq!(pool.read_genomes().unwrap().len(), 2);
}

#[test]
fn test_truncated_and_empty_files() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tiny.pool");
    fs::write(&path, [0xAB; 10]).unwrap();
    assert!(matches!(
        Pool::open(&path),
        Err(GenePoolError::TooSmall { actual: 10, .. })
    ));

    let empty = dir.path().join("empty.pool");
    fs::write(&empty, []).unwrap();
    assert_eq!(Pool::open(&empty).unwrap_err().kind(), ErrorKind::Storage);
}

#[test]
fn test_alias_mode_fills_in_place() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("alias.pool");
    let codec = GeneCodec::new(layout());
    let shapes = vec![
        Genome::zeroed(codec.gene_byte_size(), 3, 1, 0).unwrap(),
        Genome::zeroed(codec.gene_byte_size(), 3, 1, 0).unwrap(),
    ];
    let options = WriteOptions::builder().alias_genes().build().unwrap();

    let mut pool = create_pool(&path, &PoolDescriptor::new(layout(), Vec::new()), &shapes, options)
        .unwrap();
    assert!(pool.is_writable());
    let mut seed = 0;
    while let Some(mut genome) = pool.read_next_genome_mut().unwrap() {
        assert!(genome.gene_bytes().iter().all(|&b| b == 0));
        genome.encode_genes(&codec, &sample_genes(seed)).unwrap();
        genome.metadata_mut()[0] = seed as u8;
        seed += 1;
    }
    pool.close().unwrap();

    let pool = Pool::open(&path).unwrap();
    let genomes = pool.read_genomes().unwrap();
    assert_eq!(genomes[0].decode_genes(&codec).unwrap(), sample_genes(0));
    assert_eq!(genomes[1].decode_genes(&codec).unwrap(), sample_genes(1));
    assert_eq!(genomes[1].metadata(), &[1]);
}

#[test]
fn test_alias_metadata_is_zeroed() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("alias-meta.pool");
    let codec = GeneCodec::new(layout());
    let genome = Genome::from_genes(&codec, &sample_genes(1), vec![9, 9]).unwrap();
    let options = WriteOptions::builder().alias_metadata().build().unwrap();

    let mut pool = create_pool(
        &path,
        &PoolDescriptor::new(layout(), b"pool".to_vec()),
        &[genome],
        options,
    )
    .unwrap();
    assert_eq!(pool.metadata(), &[0, 0, 0, 0]);
    pool.metadata_mut().unwrap().copy_from_slice(b"late");
    {
        let view = pool.read_next_genome().unwrap().unwrap();
        assert_eq!(view.metadata(), &[0, 0]);
        assert_eq!(view.decode_genes(&codec).unwrap(), sample_genes(1));
    }
    pool.close().unwrap();

    assert_eq!(Pool::open(&path).unwrap().metadata(), b"late");
}

#[test]
fn test_read_only_pool_refuses_mutation() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("ro.pool");
    write_streaming_pool(&path);

    let mut pool = Pool::open(&path).unwrap();
    assert!(matches!(
        pool.read_next_genome_mut(),
        Err(GenePoolError::NotWritable { .. })
    ));
    assert!(pool.metadata_mut().is_err());
    assert_eq!(pool.cursor(), 31);
}

#[test]
fn test_open_writable_edits_existing_pool() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("edit.pool");
    write_streaming_pool(&path);
    let size = fs::metadata(&path).unwrap().len();

    let codec = GeneCodec::new(layout());
    let replacement = Gene::new(NodeRef::output(0), NodeRef::input(0), 0.0);
    let mut pool = Pool::open_writable(&path).unwrap();
    pool.read_next_genome_mut()
        .unwrap()
        .unwrap()
        .encode_gene(&codec, 1, &replacement)
        .unwrap();
    pool.close().unwrap();

    assert_eq!(fs::metadata(&path).unwrap().len(), size);
    let pool = Pool::open(&path).unwrap();
    let first = pool.genomes().next().unwrap().unwrap();
    assert_eq!(first.decode_gene(&codec, 1).unwrap(), replacement);
    assert_eq!(first.decode_gene(&codec, 0).unwrap(), sample_genes(0)[0]);
}

#[test]
fn test_invalid_input_leaves_no_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never.pool");
    let bad = Genome::new(2, Vec::new(), vec![0; 4], 0, Vec::new()).unwrap();

    let err = write_pool(&path, &PoolDescriptor::new(layout(), Vec::new()), &[bad]).unwrap_err();
    assert!(matches!(err, GenePoolError::GeneBytesMismatch { expected: 6, actual: 4 }));
    assert!(!path.exists());

    let descriptor = PoolDescriptor::new(layout(), vec![0; 70_000]);
    let err = write_pool(&path, &descriptor, &Vec::<Genome>::new()).unwrap_err();
    assert!(matches!(err, GenePoolError::MetadataTooLarge { size: 70_000 }));
    assert!(!path.exists());
}

#[test]
fn test_empty_population() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("empty-population.pool");
    write_pool(&path, &PoolDescriptor::new(layout(), Vec::new()), &Vec::<Genome>::new()).unwrap();
    assert_eq!(fs::read(&path).unwrap().len(), 32);

    let mut pool = Pool::open(&path).unwrap();
    assert_eq!(pool.organisms_number(), 0);
    assert!(pool.read_next_genome().unwrap().is_none());
}
