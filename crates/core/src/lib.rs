// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Core engine for the SkyBench sensor simulation.
//!
//! SkyBench emulates a memory-mapped flight-sensor peripheral: a fixed
//! 4096-byte register page ([`regmap`]) backed by a UIO device or a plain
//! shared file ([`backend`]), filled by exactly one tick-driven writer
//! ([`writer`]) from deterministic flight scenarios ([`scenario`]) with
//! optional Gaussian noise ([`noise`]), and polled by any number of
//! independent readers ([`reader`]). Readers steer the writer through the
//! CTRL word ([`ctrl`]); the page itself is the only channel between
//! processes, with hardware-register semantics: no locks, no snapshots.

use std::path::PathBuf;

pub mod backend;
pub mod ctrl;
pub mod metrics;
pub mod noise;
pub mod reader;
pub mod regmap;
pub mod scenario;
pub mod writer;

#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// The requested path cannot be opened or mapped: missing device,
    /// missing file in read-only mode, permission denied.
    #[error("backend unavailable at {}: {source}", .path.display())]
    Unavailable {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The underlying region is smaller than one register page.
    #[error("register block at {} is {actual} bytes, need at least {expected}", .path.display())]
    SizeMismatch {
        path: PathBuf,
        actual: u64,
        expected: u64,
    },
}

pub type BackendResult<T> = Result<T, BackendError>;
