use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, SgError};

/// Spin configuration on an `L x L` grid, stored row-major with entries in `{-1, +1}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpinConfig {
    side: usize,
    spins: Vec<i8>,
}

impl SpinConfig {
    /// Builds a configuration from a flat row-major spin vector.
    pub fn new(side: usize, spins: Vec<i8>) -> Result<Self, SgError> {
        if spins.len() != side * side {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("spin-length", "spin vector length must equal side squared")
                    .with_context("side", side)
                    .with_context("len", spins.len()),
            ));
        }
        if let Some(position) = spins.iter().position(|&s| s != 1 && s != -1) {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("spin-value", "spins must be -1 or +1")
                    .with_context("site", position)
                    .with_context("value", spins[position]),
            ));
        }
        Ok(Self { side, spins })
    }

    /// Builds a configuration from `L` rows of `L` spins.
    pub fn from_rows(rows: &[Vec<i8>]) -> Result<Self, SgError> {
        let side = rows.len();
        if let Some((row, values)) = rows.iter().enumerate().find(|(_, r)| r.len() != side) {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("ragged-rows", "configuration rows must all have length L")
                    .with_context("row", row)
                    .with_context("len", values.len())
                    .with_context("side", side),
            ));
        }
        Self::new(side, rows.concat())
    }

    /// Configuration with every spin set to `value` (`+1` or `-1`).
    pub fn uniform(side: usize, value: i8) -> Result<Self, SgError> {
        Self::new(side, vec![value; side * side])
    }

    /// Grid side length `L`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of sites `L^2`.
    pub fn num_sites(&self) -> usize {
        self.spins.len()
    }

    /// Flat row-major view of the spins.
    pub fn spins(&self) -> &[i8] {
        &self.spins
    }

    /// Spin at a flat site index.
    pub fn spin(&self, site: usize) -> i8 {
        self.spins[site]
    }

    /// Flips the spin at `site` in place.
    pub fn flip(&mut self, site: usize) {
        self.spins[site] = -self.spins[site];
    }

    /// Returns the globally negated configuration.
    pub fn negated(&self) -> Self {
        Self {
            side: self.side,
            spins: self.spins.iter().map(|s| -s).collect(),
        }
    }

    /// Returns the configuration as `L` rows of `L` spins.
    pub fn to_rows(&self) -> Vec<Vec<i8>> {
        if self.side == 0 {
            return Vec::new();
        }
        self.spins.chunks(self.side).map(<[i8]>::to_vec).collect()
    }
}

/// Ordered batch of `(configuration, model log-probability)` pairs sharing one side length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleBatch {
    side: usize,
    samples: Vec<SpinConfig>,
    log_probs: Vec<f64>,
}

impl SampleBatch {
    /// Validates and assembles a batch.
    pub fn new(samples: Vec<SpinConfig>, log_probs: Vec<f64>) -> Result<Self, SgError> {
        if samples.len() != log_probs.len() {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("batch-length", "sample and log_prob counts differ")
                    .with_context("samples", samples.len())
                    .with_context("log_probs", log_probs.len()),
            ));
        }
        let side = samples.first().map(SpinConfig::side).unwrap_or(0);
        if let Some(index) = samples.iter().position(|s| s.side() != side) {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("batch-side", "all configurations must share one side length")
                    .with_context("index", index)
                    .with_context("expected", side)
                    .with_context("found", samples[index].side()),
            ));
        }
        Ok(Self {
            side,
            samples,
            log_probs,
        })
    }

    /// Side length shared by every configuration (0 for an empty batch).
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of samples `N`.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the batch holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Configurations in batch order.
    pub fn samples(&self) -> &[SpinConfig] {
        &self.samples
    }

    /// Model log-probabilities in batch order.
    pub fn log_probs(&self) -> &[f64] {
        &self.log_probs
    }

    /// Iterates `(configuration, log_prob)` pairs in batch order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&SpinConfig, f64)> + '_ {
        self.samples.iter().zip(self.log_probs.iter().copied())
    }

    /// Builds a new batch holding the pairs at `indices`, in the given order.
    pub fn select(&self, indices: &[usize]) -> Result<Self, SgError> {
        let mut samples = Vec::with_capacity(indices.len());
        let mut log_probs = Vec::with_capacity(indices.len());
        for &index in indices {
            let Some(sample) = self.samples.get(index) else {
                return Err(SgError::ShapeMismatch(
                    ErrorInfo::new("select-out-of-range", "index exceeds batch length")
                        .with_context("index", index)
                        .with_context("len", self.len()),
                ));
            };
            samples.push(sample.clone());
            log_probs.push(self.log_probs[index]);
        }
        Ok(Self {
            side: self.side,
            samples,
            log_probs,
        })
    }
}
