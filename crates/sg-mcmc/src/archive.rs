use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::{SampleBatch, SpinConfig};

use crate::metropolis::ChainTrace;

/// On-disk sample archive: `sample[N][L][L]` spins with `log_prob[N]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleArchive {
    /// Spin configurations as `L` rows of `L` spins each.
    pub sample: Vec<Vec<Vec<i8>>>,
    /// Model log-probability paired with each configuration.
    pub log_prob: Vec<f64>,
}

impl SampleArchive {
    /// Converts a batch into archive layout.
    pub fn from_batch(batch: &SampleBatch) -> Self {
        Self {
            sample: batch.samples().iter().map(SpinConfig::to_rows).collect(),
            log_prob: batch.log_probs().to_vec(),
        }
    }

    /// Validates shapes and converts into a batch.
    pub fn into_batch(self) -> Result<SampleBatch, SgError> {
        let samples = self
            .sample
            .iter()
            .map(|rows| SpinConfig::from_rows(rows))
            .collect::<Result<Vec<_>, _>>()?;
        SampleBatch::new(samples, self.log_prob)
    }

    /// Loads an archive (`.json` as JSON, anything else as bincode).
    pub fn load(path: &Path) -> Result<Self, SgError> {
        load_artifact(path)
    }

    /// Writes the archive (`.json` as JSON, anything else as bincode).
    pub fn store(&self, path: &Path) -> Result<(), SgError> {
        store_artifact(path, self)
    }
}

/// On-disk Markov chain output: configurations, total energies and acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainArchive {
    /// Recorded configurations as `L` rows of `L` spins each.
    pub sample: Vec<Vec<Vec<i8>>>,
    /// Total energy of each recorded configuration.
    pub energy: Vec<f64>,
    /// Accepted proposals.
    pub accepted: usize,
    /// Evaluated proposals.
    pub attempted: usize,
}

impl ChainArchive {
    /// Converts a chain trace into archive layout.
    pub fn from_trace(trace: &ChainTrace) -> Self {
        Self {
            sample: trace.configs.iter().map(SpinConfig::to_rows).collect(),
            energy: trace.energies.clone(),
            accepted: trace.accepted,
            attempted: trace.attempted,
        }
    }

    /// Loads a chain archive.
    pub fn load(path: &Path) -> Result<Self, SgError> {
        load_artifact(path)
    }

    /// Writes the chain archive.
    pub fn store(&self, path: &Path) -> Result<(), SgError> {
        store_artifact(path, self)
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}

fn store_artifact<T: Serialize>(path: &Path, value: &T) -> Result<(), SgError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| SgError::io("archive-mkdir", err, parent.display()))?;
        }
    }
    let bytes = if is_json(path) {
        serde_json::to_vec(value).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("archive-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?
    } else {
        bincode::serialize(value).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("archive-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?
    };
    fs::write(path, bytes).map_err(|err| SgError::io("archive-write", err, path.display()))
}

fn load_artifact<T: DeserializeOwned>(path: &Path) -> Result<T, SgError> {
    let bytes = fs::read(path).map_err(|err| SgError::io("archive-read", err, path.display()))?;
    if is_json(path) {
        serde_json::from_slice(&bytes).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("archive-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    } else {
        bincode::deserialize(&bytes).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("archive-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}
