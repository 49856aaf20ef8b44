// SkyBench - Flight Sensor Simulation Bench
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

//! Bench manifests: YAML descriptions of a writer setup, so a bench can
//! be launched with one flag instead of repeating backend/path/rate on
//! every invocation. CLI flags override manifest values.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use skybench_core::backend::Backend;
use skybench_core::regmap::{DEFAULT_DEVICE_PATH, DEFAULT_SHM_PATH};

/// Default schema version for YAML configs
fn default_schema_version() -> String {
    "1.0".to_string()
}

fn default_rate_hz() -> f64 {
    100.0
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[serde(alias = "uio")]
    Device,
    #[serde(alias = "shm")]
    File,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BackendSpec {
    pub kind: BackendKind,
    /// Defaults to the conventional path for the kind when omitted.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl BackendSpec {
    pub fn to_backend(&self) -> Backend {
        match self.kind {
            BackendKind::Device => Backend::Device(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DEVICE_PATH)),
            ),
            BackendKind::File => Backend::File(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_SHM_PATH)),
            ),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BenchManifest {
    #[serde(default = "default_schema_version")]
    pub schema_version: String,
    pub name: String,
    pub backend: BackendSpec,
    #[serde(default = "default_rate_hz")]
    pub rate_hz: f64,
    /// Fixed noise seed for reproducible benches; drawn from wall clock
    /// when omitted.
    #[serde(default)]
    pub seed: Option<u32>,
}

impl BenchManifest {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("Failed to open bench manifest {:?}", path))?;
        let manifest: Self =
            serde_yaml::from_reader(f).context("Failed to parse Bench Manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.rate_hz.is_finite() || self.rate_hz <= 0.0 {
            anyhow::bail!(
                "rate_hz must be positive and finite, got {}",
                self.rate_hz
            );
        }
        if let Some(path) = &self.backend.path {
            if path.as_os_str().is_empty() {
                anyhow::bail!("backend.path must not be empty");
            }
        }
        Ok(())
    }
}
