use rand::Rng;
use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::{RngHandle, SpinConfig};
use sg_lattice::{flip_delta, total_energy, Lattice};
use tracing::{debug, instrument};

use crate::config::ChainConfig;

/// Configurations and total energies recorded along a Markov chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainTrace {
    /// Recorded configurations, one per kept step.
    pub configs: Vec<SpinConfig>,
    /// Total energy of each recorded configuration.
    pub energies: Vec<f64>,
    /// Number of accepted proposals.
    pub accepted: usize,
    /// Number of evaluated proposals.
    pub attempted: usize,
}

impl ChainTrace {
    /// Fraction of proposals accepted (0 when nothing was attempted).
    pub fn acceptance_rate(&self) -> f64 {
        if self.attempted == 0 {
            0.0
        } else {
            self.accepted as f64 / self.attempted as f64
        }
    }

    /// Recorded energies divided by the number of sites.
    pub fn energy_densities(&self, num_sites: usize) -> Vec<f64> {
        self.energies
            .iter()
            .map(|e| e / num_sites as f64)
            .collect()
    }
}

pub(crate) fn check_beta(beta: f64) -> Result<(), SgError> {
    if beta.is_finite() {
        Ok(())
    } else {
        Err(SgError::Config(
            ErrorInfo::new("beta-not-finite", "beta must be a finite number")
                .with_context("beta", beta),
        ))
    }
}

/// Single-spin-flip Metropolis chain at inverse temperature `beta`.
///
/// The starting configuration is drawn uniformly from `rng`. Each step makes
/// `sweeps * L^2` proposals (one when `sweeps` is 0), picking a site uniformly
/// and accepting when `dE < 0` or `u < exp(-beta dE)`. Steps after `burn_in`
/// are recorded.
#[instrument(skip(lattice, options, rng), fields(side = lattice.side(), steps = options.steps))]
pub fn single_spin_flip(
    lattice: &Lattice,
    beta: f64,
    options: &ChainConfig,
    rng: &mut RngHandle,
) -> Result<ChainTrace, SgError> {
    check_beta(beta)?;
    let num_sites = lattice.num_sites();
    let mut config = SpinConfig::new(lattice.side(), rng.random_spins(num_sites))?;
    let mut energy_now = total_energy(lattice, &config)?;

    let proposals_per_step = if options.sweeps == 0 {
        1
    } else {
        options.sweeps * num_sites
    };
    let mut trace = ChainTrace {
        configs: Vec::with_capacity(options.steps),
        energies: Vec::with_capacity(options.steps),
        accepted: 0,
        attempted: 0,
    };
    for step in 0..options.steps + options.burn_in {
        for _ in 0..proposals_per_step {
            let site = rng.gen_range(0..num_sites);
            let delta = flip_delta(lattice.table(), config.spins(), site);
            trace.attempted += 1;
            if delta < 0.0 || rng.gen::<f64>() < (-beta * delta).exp() {
                config.flip(site);
                energy_now += delta;
                trace.accepted += 1;
            }
        }
        if step >= options.burn_in {
            trace.configs.push(config.clone());
            trace.energies.push(energy_now);
        }
    }
    debug!(
        acceptance = trace.acceptance_rate(),
        recorded = trace.configs.len(),
        "metropolis chain finished"
    );
    Ok(trace)
}
