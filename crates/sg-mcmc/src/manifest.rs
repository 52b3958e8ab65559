use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::provenance::RunProvenance;
use sg_lattice::{canonical_hash, Lattice};

use crate::config::RunConfig;

/// Structured manifest describing one completed command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunManifest {
    /// Command that produced the artefacts (`couplings`, `reweight`, ...).
    pub command: String,
    /// Configuration used for the run.
    pub config: RunConfig,
    /// Lattice identity, seed and tool versions.
    pub provenance: RunProvenance,
    /// Input files consumed.
    pub inputs: Vec<PathBuf>,
    /// Files written.
    pub outputs: Vec<PathBuf>,
    /// Scalar summaries (acceptance rate, effective sample size, energies).
    pub metrics: BTreeMap<String, f64>,
}

impl RunManifest {
    /// Starts a manifest for `command` on `lattice`.
    pub fn new(command: &str, config: &RunConfig, lattice: &Lattice) -> Self {
        let provenance = RunProvenance {
            lattice_hash: canonical_hash(lattice),
            side: lattice.side(),
            levels: lattice.levels().iter().map(|level| level.get()).collect(),
            seed: config.seed,
            tool_versions: [(
                env!("CARGO_PKG_NAME").to_string(),
                env!("CARGO_PKG_VERSION").to_string(),
            )]
            .into_iter()
            .collect(),
        };
        Self {
            command: command.to_string(),
            config: config.clone(),
            provenance,
            inputs: Vec::new(),
            outputs: Vec::new(),
            metrics: BTreeMap::new(),
        }
    }

    /// Writes the manifest to a JSON file.
    pub fn write(&self, path: &Path) -> Result<(), SgError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| SgError::io("manifest-mkdir", err, parent.display()))?;
            }
        }
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("manifest-serialize", err.to_string())
                    .with_context("path", path.display()),
            )
        })?;
        fs::write(path, json).map_err(|err| SgError::io("manifest-write", err, path.display()))
    }

    /// Loads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, SgError> {
        let contents = fs::read_to_string(path)
            .map_err(|err| SgError::io("manifest-read", err, path.display()))?;
        serde_json::from_str(&contents).map_err(|err| {
            SgError::Serde(
                ErrorInfo::new("manifest-parse", err.to_string())
                    .with_context("path", path.display()),
            )
        })
    }
}
