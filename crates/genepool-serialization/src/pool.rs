// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::path::Path;

use genepool_storage::{FileMapping, MapMode};
use genepool_structures::{Checkpoint, GeneCodec, GeneLayout, GenePoolError, GenePoolResult};
use tracing::{debug, info, warn};

use crate::format::{self, GenomeSpan, PoolPreamble, POOL_TERMINAL_BYTE};
use crate::genome::{Genome, GenomeData, GenomeView, GenomeViewMut};

/// Everything about a pool except its genomes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolDescriptor {
    pub layout: GeneLayout,
    pub metadata: Vec<u8>,
}

impl PoolDescriptor {
    pub fn new(layout: GeneLayout, metadata: Vec<u8>) -> Self {
        Self { layout, metadata }
    }
}

/// An open, validated pool file with a streaming genome cursor.
///
/// Genome views borrow the pool, so they cannot outlive [`Pool::close`] or
/// the pool being dropped.
///
/// # Example
/// ```no_run
/// use genepool_serialization::{GenomeData, Pool};
///
/// let mut pool = Pool::open("population.pool")?;
/// let codec = pool.codec();
/// while let Some(genome) = pool.read_next_genome()? {
///     for gene in genome.decode_genes(&codec)? {
///         println!("{:?} -> {:?} ({})", gene.income, gene.outcome, gene.weight);
///     }
/// }
/// pool.close()?;
/// # Ok::<(), genepool_structures::GenePoolError>(())
/// ```
#[derive(Debug)]
pub struct Pool {
    mapping: FileMapping,
    preamble: PoolPreamble,
    codec: GeneCodec,
    cursor: usize,
    genomes_read: u64,
}

impl Pool {
    //region Open

    /// Maps an existing pool read-only and validates its head.
    pub fn open<P: AsRef<Path>>(path: P) -> GenePoolResult<Self> {
        Self::from_mapping(FileMapping::open(path, MapMode::Read, 0)?)
    }

    /// Maps an existing pool read-write for in-place edits.
    pub fn open_writable<P: AsRef<Path>>(path: P) -> GenePoolResult<Self> {
        Self::from_mapping(FileMapping::open(path, MapMode::Write, 0)?)
    }

    pub(crate) fn from_mapping(mapping: FileMapping) -> GenePoolResult<Self> {
        let (preamble, layout) = match format::read_pool_header(mapping.as_bytes()) {
            Ok(header) => header,
            Err(err) => {
                warn!(
                    "[POOL-READER] Rejected {}: {}",
                    mapping.path().display(),
                    err
                );
                return Err(err);
            }
        };

        info!(
            "[POOL-READER] Opened {}: {} organisms, gene {}+{}+{} bits, {} input / {} output nodes",
            mapping.path().display(),
            preamble.organisms_number,
            layout.node_id_bits(),
            layout.node_id_bits(),
            layout.weight_bits(),
            layout.input_neurons_number(),
            layout.output_neurons_number()
        );

        Ok(Self {
            cursor: preamble.first_genome_offset(),
            mapping,
            preamble,
            codec: GeneCodec::new(layout),
            genomes_read: 0,
        })
    }

    //endregion

    //region Properties

    pub fn path(&self) -> &Path {
        self.mapping.path()
    }

    pub fn is_writable(&self) -> bool {
        self.mapping.is_writable()
    }

    pub fn organisms_number(&self) -> u64 {
        self.preamble.organisms_number
    }

    pub fn layout(&self) -> &GeneLayout {
        self.codec.layout()
    }

    pub fn codec(&self) -> GeneCodec {
        self.codec
    }

    pub fn gene_byte_size(&self) -> usize {
        self.codec.gene_byte_size()
    }

    pub fn metadata(&self) -> &[u8] {
        &self.mapping.as_bytes()[self.preamble.metadata_range()]
    }

    pub fn metadata_mut(&mut self) -> GenePoolResult<&mut [u8]> {
        let range = self.preamble.metadata_range();
        Ok(&mut self.mapping.as_bytes_mut()?[range])
    }

    pub fn descriptor(&self) -> PoolDescriptor {
        PoolDescriptor::new(*self.layout(), self.metadata().to_vec())
    }

    /// Byte offset of the next genome.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn genomes_read(&self) -> u64 {
        self.genomes_read
    }

    //endregion

    //region Streaming

    /// Validates and returns the genome at the cursor, then moves past it.
    ///
    /// Returns `Ok(None)` when the cursor sits on the pool terminal byte,
    /// even if fewer than `organisms_number` genomes were read. Once that
    /// many genomes are read, anything else at the cursor is a corrupt pool
    /// terminal byte. On error the cursor stays put.
    pub fn read_next_genome(&mut self) -> GenePoolResult<Option<GenomeView<'_>>> {
        match self.advance()? {
            Some(span) => Ok(Some(GenomeView::from_span(self.mapping.as_bytes(), &span))),
            None => Ok(None),
        }
    }

    /// Like [`Pool::read_next_genome`], with write access to the genome bytes.
    pub fn read_next_genome_mut(&mut self) -> GenePoolResult<Option<GenomeViewMut<'_>>> {
        if !self.mapping.is_writable() {
            return Err(GenePoolError::NotWritable {
                path: self.mapping.path().to_path_buf(),
            });
        }
        match self.advance()? {
            Some(span) => Ok(Some(GenomeViewMut::from_span(
                self.mapping.as_bytes_mut()?,
                &span,
            ))),
            None => Ok(None),
        }
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = self.preamble.first_genome_offset();
        self.genomes_read = 0;
        debug!("[POOL-READER] Cursor reset to {}", self.cursor);
    }

    /// Iterates every genome from the start without touching the cursor.
    pub fn genomes(&self) -> GenomeIter<'_> {
        GenomeIter {
            bytes: self.mapping.as_bytes(),
            cursor: self.preamble.first_genome_offset(),
            genomes_read: 0,
            organisms_number: self.preamble.organisms_number,
            gene_byte_size: self.codec.gene_byte_size(),
            finished: false,
        }
    }

    /// Owned copies of every genome. The cursor is not touched.
    pub fn read_genomes(&self) -> GenePoolResult<Vec<Genome>> {
        self.genomes()
            .map(|genome| genome.and_then(|view| view.to_genome()))
            .collect()
    }

    fn advance(&mut self) -> GenePoolResult<Option<GenomeSpan>> {
        let step = next_genome_span(
            self.mapping.as_bytes(),
            self.cursor,
            self.genomes_read,
            self.preamble.organisms_number,
            self.codec.gene_byte_size(),
        );
        match step {
            Ok(Some(span)) => {
                debug!(
                    "[POOL-READER] Genome {} at {}..{} ({} genes)",
                    self.genomes_read, span.start, span.end, span.genes_number
                );
                self.cursor = span.end;
                self.genomes_read += 1;
                Ok(Some(span))
            }
            Ok(None) => Ok(None),
            Err(err) => {
                warn!("[POOL-READER] {}: {}", self.mapping.path().display(), err);
                Err(err)
            }
        }
    }

    //endregion

    pub fn flush(&self) -> GenePoolResult<()> {
        self.mapping.flush()
    }

    /// Flushes pending writes, unmaps the file and closes it.
    pub fn close(self) -> GenePoolResult<()> {
        self.mapping.close()
    }
}

/// Cursor-independent iterator over the genomes of a [`Pool`].
///
/// Stops after the first error.
#[derive(Debug, Clone)]
pub struct GenomeIter<'a> {
    bytes: &'a [u8],
    cursor: usize,
    genomes_read: u64,
    organisms_number: u64,
    gene_byte_size: usize,
    finished: bool,
}

impl<'a> Iterator for GenomeIter<'a> {
    type Item = GenePoolResult<GenomeView<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match next_genome_span(
            self.bytes,
            self.cursor,
            self.genomes_read,
            self.organisms_number,
            self.gene_byte_size,
        ) {
            Ok(Some(span)) => {
                self.cursor = span.end;
                self.genomes_read += 1;
                Some(Ok(GenomeView::from_span(self.bytes, &span)))
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(err) => {
                self.finished = true;
                Some(Err(err))
            }
        }
    }
}

fn next_genome_span(
    bytes: &[u8],
    cursor: usize,
    genomes_read: u64,
    organisms_number: u64,
    gene_byte_size: usize,
) -> GenePoolResult<Option<GenomeSpan>> {
    if bytes.get(cursor) == Some(&POOL_TERMINAL_BYTE) {
        if genomes_read < organisms_number {
            debug!(
                "[POOL-READER] Pool terminal byte after {} of {} genomes",
                genomes_read, organisms_number
            );
        }
        let trailing = bytes.len() - cursor - 1;
        if trailing > 0 {
            warn!("[POOL-READER] Ignoring {} bytes after the pool terminal byte", trailing);
        }
        return Ok(None);
    }
    if genomes_read >= organisms_number {
        return Err(GenePoolError::Corrupt {
            checkpoint: Checkpoint::PoolTerminal,
            offset: cursor,
        });
    }
    format::locate_genome(bytes, cursor, gene_byte_size).map(Some)
}
