// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Storage backends for the register page.
//!
//! The page lives either behind a UIO device node or a plain shared file;
//! both are mapped as exactly [`PAGE_SIZE`] bytes of raw memory. There is
//! deliberately no lock, version counter, or any other synchronization
//! across the mapping: this emulates a hardware register block, and
//! hardware offers none either. A reader whose accesses interleave with
//! the writer's tick may observe a torn frame (fields from two adjacent
//! ticks). Consumers that need atomic snapshots must layer their own
//! convention on top.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use memmap2::{Mmap, MmapMut, MmapOptions};

use crate::regmap::{self, PAGE_SIZE};
use crate::{BackendError, BackendResult};

/// Storage medium underlying the register page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    /// Memory-mapped device node (e.g. a UIO region). Never created or
    /// resized by this crate; the region must already span a full page.
    Device(PathBuf),
    /// Plain file, typically under /dev/shm. Created and sized by the
    /// writer, opened as-is by readers.
    File(PathBuf),
}

impl Backend {
    pub fn path(&self) -> &Path {
        match self {
            Backend::Device(p) | Backend::File(p) => p,
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Device(p) => write!(f, "device:{}", p.display()),
            Backend::File(p) => write!(f, "file:{}", p.display()),
        }
    }
}

fn open_node(backend: &Backend, write: bool) -> BackendResult<File> {
    let mut opts = OpenOptions::new();
    opts.read(true);
    if write {
        opts.write(true);
        // Only the file backend provisions storage; a missing device node
        // is an environment problem, not something we can create.
        if matches!(backend, Backend::File(_)) {
            opts.create(true);
        }
    }
    opts.open(backend.path())
        .map_err(|source| BackendError::Unavailable {
            path: backend.path().to_path_buf(),
            source,
        })
}

/// Regular files must already hold a full page. Device nodes report no
/// meaningful length, so they are checked by the mapping call itself.
fn ensure_page_len(backend: &Backend, file: &File) -> BackendResult<()> {
    let meta = file
        .metadata()
        .map_err(|source| BackendError::Unavailable {
            path: backend.path().to_path_buf(),
            source,
        })?;
    if meta.is_file() && meta.len() < PAGE_SIZE as u64 {
        return Err(BackendError::SizeMismatch {
            path: backend.path().to_path_buf(),
            actual: meta.len(),
            expected: PAGE_SIZE as u64,
        });
    }
    Ok(())
}

fn map_failed(backend: &Backend, source: std::io::Error) -> BackendError {
    BackendError::Unavailable {
        path: backend.path().to_path_buf(),
        source,
    }
}

/// Read-only mapping of the register page.
///
/// The mapping and its descriptor are released when the value is dropped,
/// on every exit path. Mutation is not expressible through this type; a
/// tool that needs to write opens a [`RegisterPageMut`] instead.
#[derive(Debug)]
pub struct RegisterPage {
    map: Mmap,
    path: PathBuf,
}

impl RegisterPage {
    pub fn open(backend: &Backend) -> BackendResult<Self> {
        let file = open_node(backend, false)?;
        ensure_page_len(backend, &file)?;
        let map = unsafe { MmapOptions::new().len(PAGE_SIZE).map(&file) }
            .map_err(|e| map_failed(backend, e))?;
        Ok(Self {
            map,
            path: backend.path().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw view of the whole page. Each byte read goes straight to the
    /// shared mapping; no caching, no snapshot.
    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.map[offset..offset + len]
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        regmap::get_u32(&self.map, offset)
    }

    pub fn read_f32(&self, offset: usize) -> f32 {
        regmap::get_f32(&self.map, offset)
    }

    pub fn read_f64(&self, offset: usize) -> f64 {
        regmap::get_f64(&self.map, offset)
    }
}

/// Read-write mapping of the register page.
///
/// Held by exactly one writer process, plus short-lived control tools
/// that touch only the CTRL word.
#[derive(Debug)]
pub struct RegisterPageMut {
    map: MmapMut,
    path: PathBuf,
}

impl RegisterPageMut {
    /// Opens the page for writing. The file backend creates and sizes the
    /// file if needed (writer-side provisioning); the device backend
    /// requires the region to exist at full size already.
    pub fn open(backend: &Backend) -> BackendResult<Self> {
        let file = open_node(backend, true)?;
        match backend {
            Backend::File(_) => {
                file.set_len(PAGE_SIZE as u64)
                    .map_err(|e| map_failed(backend, e))?;
            }
            Backend::Device(_) => ensure_page_len(backend, &file)?,
        }
        let map = unsafe { MmapOptions::new().len(PAGE_SIZE).map_mut(&file) }
            .map_err(|e| map_failed(backend, e))?;
        Ok(Self {
            map,
            path: backend.path().to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes(&self) -> &[u8] {
        &self.map
    }

    /// Mutable raw view of the whole page, for serializers that write a
    /// full frame in one pass.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.map
    }

    pub fn read_bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.map[offset..offset + len]
    }

    pub fn read_u32(&self, offset: usize) -> u32 {
        regmap::get_u32(&self.map, offset)
    }

    pub fn read_f32(&self, offset: usize) -> f32 {
        regmap::get_f32(&self.map, offset)
    }

    pub fn read_f64(&self, offset: usize) -> f64 {
        regmap::get_f64(&self.map, offset)
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.map[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        regmap::put_u32(&mut self.map, offset, value);
    }

    pub fn write_f32(&mut self, offset: usize, value: f32) {
        regmap::put_f32(&mut self.map, offset, value);
    }

    pub fn write_f64(&mut self, offset: usize, value: f64) {
        regmap::put_f64(&mut self.map, offset, value);
    }

    /// Schedules a write-back of the page without waiting for it. The
    /// mapping stays coherent for other processes regardless; this only
    /// nudges the kernel for file-backed pages.
    pub fn flush_async(&self) -> std::io::Result<()> {
        self.map.flush_async()
    }

    /// Synchronous write-back, used by one-shot tools before exiting.
    pub fn flush(&self) -> std::io::Result<()> {
        self.map.flush()
    }
}
