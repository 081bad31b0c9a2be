// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use genepool_structures::{GenePoolError, GenePoolResult};
use memmap2::{Mmap, MmapMut, MmapOptions};
use tracing::debug;

/// How a pool file is mapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    /// Private, read-only mapping of an existing file.
    Read,
    /// Shared, read-write mapping. Changes reach the file.
    Write,
}

enum Region {
    ReadOnly(Mmap),
    Writable(MmapMut),
}

/// An open file together with its memory mapping.
///
/// Every byte view handed out borrows the mapping, so no view outlives it.
pub struct FileMapping {
    // Declared before `_file`: fields drop in order, so the region is
    // unmapped before the descriptor closes.
    region: Region,
    _file: File,
    path: PathBuf,
    mode: MapMode,
}

impl FileMapping {
    /// Opens `path` and maps it.
    ///
    /// - `Read`: maps the whole existing file. `size_hint` must be 0.
    /// - `Write` with `size_hint > 0`: creates or truncates the file, extends
    ///   it sparsely to exactly `size_hint` bytes, and maps it.
    /// - `Write` with `size_hint == 0`: maps an existing file read-write
    ///   without changing its size.
    ///
    /// Anything acquired before a failure is released before returning.
    pub fn open<P: AsRef<Path>>(path: P, mode: MapMode, size_hint: u64) -> GenePoolResult<Self> {
        let path = path.as_ref().to_path_buf();

        let (region, file) = match mode {
            MapMode::Read => {
                if size_hint > 0 {
                    return Err(GenePoolError::ResizeReadOnly {
                        path,
                        size: size_hint,
                    });
                }
                let file = File::open(&path).map_err(|source| GenePoolError::CannotOpen {
                    path: path.clone(),
                    source,
                })?;
                ensure_mappable(stat(&file, &path)?, &path)?;
                // SAFETY: the mapping is private and read-only; concurrent
                // writers to the same file are unsupported by the format.
                let map = unsafe { MmapOptions::new().map_copy_read_only(&file) }
                    .map_err(|source| GenePoolError::CannotMap {
                        path: path.clone(),
                        source,
                    })?;
                (Region::ReadOnly(map), file)
            }
            MapMode::Write => {
                let mut file = OpenOptions::new()
                    .read(true)
                    .write(true)
                    .create(size_hint > 0)
                    .truncate(size_hint > 0)
                    .open(&path)
                    .map_err(|source| GenePoolError::CannotOpen {
                        path: path.clone(),
                        source,
                    })?;
                if size_hint > 0 {
                    stretch(&mut file, &path, size_hint)?;
                }
                ensure_mappable(stat(&file, &path)?, &path)?;
                // SAFETY: this process holds the only writable mapping of the file.
                let map = unsafe { MmapMut::map_mut(&file) }.map_err(|source| {
                    GenePoolError::CannotMap {
                        path: path.clone(),
                        source,
                    }
                })?;
                (Region::Writable(map), file)
            }
        };

        let mapping = Self {
            region,
            _file: file,
            path,
            mode,
        };
        debug!(
            "[POOL-MAPPING] Mapped {} ({} bytes, {:?})",
            mapping.path.display(),
            mapping.len(),
            mode
        );
        Ok(mapping)
    }

    //region Properties

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> MapMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_writable(&self) -> bool {
        matches!(self.region, Region::Writable(_))
    }

    //endregion

    //region Byte access

    pub fn as_bytes(&self) -> &[u8] {
        match &self.region {
            Region::ReadOnly(map) => &map[..],
            Region::Writable(map) => &map[..],
        }
    }

    pub fn as_bytes_mut(&mut self) -> GenePoolResult<&mut [u8]> {
        match &mut self.region {
            Region::Writable(map) => Ok(&mut map[..]),
            Region::ReadOnly(_) => Err(GenePoolError::NotWritable {
                path: self.path.clone(),
            }),
        }
    }

    //endregion

    /// Writes dirty pages of a writable mapping back to the file.
    pub fn flush(&self) -> GenePoolResult<()> {
        match &self.region {
            Region::Writable(map) => map.flush().map_err(|source| GenePoolError::CannotFlush {
                path: self.path.clone(),
                source,
            }),
            Region::ReadOnly(_) => Ok(()),
        }
    }

    /// Flushes (when writable), unmaps, then closes the file.
    pub fn close(self) -> GenePoolResult<()> {
        self.flush()?;
        let Self {
            region,
            _file: file,
            path,
            ..
        } = self;
        drop(region);
        drop(file);
        debug!("[POOL-MAPPING] Closed {}", path.display());
        Ok(())
    }
}

impl std::fmt::Debug for FileMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileMapping")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("len", &self.len())
            .finish()
    }
}

fn stat(file: &File, path: &Path) -> GenePoolResult<u64> {
    file.metadata()
        .map(|meta| meta.len())
        .map_err(|source| GenePoolError::CannotStat {
            path: path.to_path_buf(),
            source,
        })
}

fn ensure_mappable(len: u64, path: &Path) -> GenePoolResult<()> {
    let reason = if len == 0 {
        "cannot map an empty file"
    } else if usize::try_from(len).is_err() {
        "file is larger than the address space"
    } else {
        return Ok(());
    };
    Err(GenePoolError::CannotMap {
        path: path.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, reason),
    })
}

/// Extends `file` to `size` bytes by writing its last byte, leaving a hole.
fn stretch(file: &mut File, path: &Path, size: u64) -> GenePoolResult<()> {
    let resize_error = |source: io::Error| GenePoolError::CannotResize {
        path: path.to_path_buf(),
        size,
        source,
    };
    file.seek(SeekFrom::Start(size - 1)).map_err(resize_error)?;
    file.write_all(&[0]).map_err(resize_error)?;
    debug!("[POOL-MAPPING] Stretched {} to {} bytes", path.display(), size);
    Ok(())
}
