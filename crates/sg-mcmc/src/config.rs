use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_lattice::LatticeConfig;

/// YAML-configurable parameters shared by every run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Lattice geometry: `side`, `levels` and `width_policy`.
    #[serde(flatten)]
    pub lattice: LatticeConfig,
    /// Master seed; the coupling draw uses it directly.
    #[serde(default = "default_seed")]
    pub seed: u64,
    /// Inverse temperature of the target Boltzmann distribution.
    #[serde(default = "default_beta")]
    pub beta: f64,
    /// Number of samples kept by reweighting; half the batch when absent.
    #[serde(default)]
    pub target_count: Option<usize>,
    /// Markov chain settings.
    #[serde(default)]
    pub mcmc: ChainConfig,
}

fn default_seed() -> u64 {
    12345
}

fn default_beta() -> f64 {
    1.0
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            lattice: LatticeConfig::default(),
            seed: default_seed(),
            beta: default_beta(),
            target_count: None,
            mcmc: ChainConfig::default(),
        }
    }
}

impl RunConfig {
    /// Parses a YAML document and validates it.
    pub fn from_yaml_str(text: &str) -> Result<Self, SgError> {
        let config: RunConfig = serde_yaml::from_str(text)
            .map_err(|err| SgError::Serde(ErrorInfo::new("config-parse", err.to_string())))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads and validates a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, SgError> {
        let text = fs::read_to_string(path)
            .map_err(|err| SgError::io("config-read", err, path.display()))?;
        Self::from_yaml_str(&text)
    }

    /// Checks values serde cannot: finite beta, non-empty lattice, positive thinning.
    pub fn validate(&self) -> Result<(), SgError> {
        if !self.beta.is_finite() {
            return Err(SgError::Config(
                ErrorInfo::new("beta-not-finite", "beta must be a finite number")
                    .with_context("beta", self.beta),
            ));
        }
        if self.lattice.side == 0 {
            return Err(SgError::Config(ErrorInfo::new(
                "empty-lattice",
                "lattice side must be at least 1",
            )));
        }
        if self.mcmc.save_every == 0 {
            return Err(SgError::Config(ErrorInfo::new(
                "save-every-zero",
                "save_every must be at least 1",
            )));
        }
        Ok(())
    }

    /// Resolves the resample size for a batch of `batch_len` samples.
    pub fn resolved_target(&self, batch_len: usize) -> usize {
        self.target_count.unwrap_or(batch_len / 2)
    }
}

/// Markov chain length and thinning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Recorded steps after burn-in.
    #[serde(default = "default_steps")]
    pub steps: usize,
    /// Full-lattice sweeps per step; 0 means a single proposal per step.
    #[serde(default)]
    pub sweeps: usize,
    /// Initial steps discarded before recording.
    #[serde(default)]
    pub burn_in: usize,
    /// Keep every `save_every`-th accepted state of a neural chain.
    #[serde(default = "default_save_every")]
    pub save_every: usize,
}

fn default_steps() -> usize {
    1000
}

fn default_save_every() -> usize {
    1
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            steps: default_steps(),
            sweeps: 0,
            burn_in: 0,
            save_every: default_save_every(),
        }
    }
}
