//! Importance reweighting of model samples toward the Boltzmann distribution.
//!
//! Each sample `i` drawn from a model with log-probability `q_i` receives the
//! log-weight `w_i = -beta * L^2 * E_i - q_i`, where `E_i` is the energy
//! density. Weights are normalized with a max-shifted log-sum-exp, and a subset
//! is drawn without replacement with inclusion driven by `exp(w_i)`.
//!
//! When one sample's weight dominates, the subset is nearly deterministic; when
//! all weights coincide, selection is uniform. Neither case is special-cased.

use std::cmp::Ordering;

use rand::distributions::Open01;
use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::{RngHandle, SampleBatch};
use sg_lattice::{energy, Lattice};
use tracing::{debug, instrument, warn};

/// Outcome of a reweighting call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resampled {
    /// Selected `(configuration, log_prob)` pairs, in draw order.
    pub batch: SampleBatch,
    /// Batch indices of the selected pairs, in draw order.
    pub indices: Vec<usize>,
    /// Normalized log-weights of the whole input batch.
    pub log_weights: Vec<f64>,
    /// Energy densities of the whole input batch.
    pub energies: Vec<f64>,
    /// Kish effective sample size of the normalized weights.
    pub effective_sample_size: f64,
}

/// Numerically stable `ln(sum(exp(values)))`; `-inf` when no value is finite.
pub fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(f64::NEG_INFINITY, f64::max);
    if !max.is_finite() {
        return f64::NEG_INFINITY;
    }
    let sum: f64 = values
        .iter()
        .filter(|v| v.is_finite())
        .map(|v| (v - max).exp())
        .sum();
    max + sum.ln()
}

/// Unnormalized Boltzmann log-weight of one sample.
pub fn boltzmann_log_weight(energy_density: f64, beta: f64, num_sites: usize, log_prob: f64) -> f64 {
    -beta * num_sites as f64 * energy_density - log_prob
}

/// Energy densities of every configuration, evaluated in parallel.
pub fn batch_energies(batch: &SampleBatch, lattice: &Lattice) -> Result<Vec<f64>, SgError> {
    batch
        .samples()
        .par_iter()
        .map(|config| energy(lattice, config))
        .collect()
}

/// Normalizes log-weights in place; non-finite entries become `-inf` (no mass).
///
/// This includes `+inf`, which arises from a model `log_prob` of `-inf`: such a
/// sample is one the model claims it cannot produce, so it is dropped rather
/// than given unbounded weight. Fails when no entry is finite.
pub fn normalize_log_weights(weights: &mut [f64]) -> Result<(), SgError> {
    let mut dropped = 0usize;
    for weight in weights.iter_mut() {
        if !weight.is_finite() {
            *weight = f64::NEG_INFINITY;
            dropped += 1;
        }
    }
    if dropped > 0 {
        warn!(dropped, "non-finite log-weights treated as zero mass");
    }
    let norm = log_sum_exp(weights);
    if !norm.is_finite() {
        return Err(SgError::ResampleSize(
            ErrorInfo::new("no-finite-weights", "no sample carries finite weight")
                .with_context("len", weights.len()),
        ));
    }
    for weight in weights.iter_mut() {
        *weight -= norm;
    }
    Ok(())
}

/// Normalized Boltzmann log-weights of a batch.
pub fn log_weights(batch: &SampleBatch, lattice: &Lattice, beta: f64) -> Result<Vec<f64>, SgError> {
    let energies = batch_energies(batch, lattice)?;
    weights_from_energies(batch, &energies, lattice.num_sites(), beta)
}

fn weights_from_energies(
    batch: &SampleBatch,
    energies: &[f64],
    num_sites: usize,
    beta: f64,
) -> Result<Vec<f64>, SgError> {
    let mut weights: Vec<f64> = energies
        .iter()
        .zip(batch.log_probs())
        .map(|(&e, &log_prob)| boltzmann_log_weight(e, beta, num_sites, log_prob))
        .collect();
    normalize_log_weights(&mut weights)?;
    Ok(weights)
}

/// Kish effective sample size `1 / sum(p_i^2)` of normalized log-weights.
pub fn effective_sample_size(log_weights: &[f64]) -> f64 {
    let sum_sq: f64 = log_weights
        .iter()
        .filter(|w| w.is_finite())
        .map(|w| (2.0 * w).exp())
        .sum();
    if sum_sq > 0.0 {
        1.0 / sum_sq
    } else {
        0.0
    }
}

/// Draws `count` distinct indices with probability driven by `exp(log_weights)`.
///
/// Efraimidis–Spirakis selection in log space: every index, in order, draws
/// `u ~ (0, 1)` and gets the key `w - ln(-ln u)`; the `count` largest keys win
/// and are returned largest first. Zero-mass entries only fill remaining slots.
pub fn sample_without_replacement(
    log_weights: &[f64],
    count: usize,
    rng: &mut RngHandle,
) -> Result<Vec<usize>, SgError> {
    check_target(count, log_weights.len())?;
    let mut keyed: Vec<(f64, usize)> = log_weights
        .iter()
        .enumerate()
        .map(|(index, &weight)| {
            let u: f64 = rng.sample(Open01);
            let key = if weight.is_finite() {
                weight - (-u.ln()).ln()
            } else {
                f64::NEG_INFINITY
            };
            (key, index)
        })
        .collect();
    keyed.sort_by(|a, b| match b.0.total_cmp(&a.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        other => other,
    });
    Ok(keyed.into_iter().take(count).map(|(_, index)| index).collect())
}

fn check_target(count: usize, len: usize) -> Result<(), SgError> {
    if count == 0 {
        return Err(SgError::ResampleSize(
            ErrorInfo::new("target-not-positive", "target count must be at least 1")
                .with_context("target_count", count)
                .with_context("batch_len", len),
        ));
    }
    if count > len {
        return Err(SgError::ResampleSize(
            ErrorInfo::new("target-exceeds-batch", "cannot draw more samples than the batch holds")
                .with_context("target_count", count)
                .with_context("batch_len", len),
        ));
    }
    Ok(())
}

/// Reweights a model batch toward `exp(-beta H)` and resamples `target_count` pairs.
#[instrument(skip(batch, lattice, rng), fields(n = batch.len(), side = lattice.side()))]
pub fn reweight(
    batch: &SampleBatch,
    lattice: &Lattice,
    beta: f64,
    target_count: usize,
    rng: &mut RngHandle,
) -> Result<Resampled, SgError> {
    if !beta.is_finite() {
        return Err(SgError::Config(
            ErrorInfo::new("beta-not-finite", "beta must be a finite number")
                .with_context("beta", beta),
        ));
    }
    if batch.is_empty() {
        return Err(SgError::ShapeMismatch(ErrorInfo::new(
            "empty-batch",
            "cannot reweight an empty batch",
        )));
    }
    if batch.side() != lattice.side() {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("batch-side", "batch side differs from lattice side")
                .with_context("batch_side", batch.side())
                .with_context("lattice_side", lattice.side()),
        ));
    }
    check_target(target_count, batch.len())?;

    let energies = batch_energies(batch, lattice)?;
    let log_weights = weights_from_energies(batch, &energies, lattice.num_sites(), beta)?;
    let indices = sample_without_replacement(&log_weights, target_count, rng)?;
    let selected = batch.select(&indices)?;
    let effective_sample_size = effective_sample_size(&log_weights);
    debug!(
        selected = indices.len(),
        ess = effective_sample_size,
        "resampled batch"
    );
    Ok(Resampled {
        batch: selected,
        indices,
        log_weights,
        energies,
        effective_sample_size,
    })
}
