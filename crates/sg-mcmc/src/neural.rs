use rand::Rng;
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::{RngHandle, SampleBatch};
use sg_lattice::Lattice;
use tracing::{debug, instrument, warn};

use crate::metropolis::{check_beta, ChainTrace};
use crate::reweight::batch_energies;

/// Independent-proposal Metropolis–Hastings chain over a model batch.
///
/// The chain starts at the first sample with a finite log-probability and
/// visits the remaining samples in order as proposals. A proposal `t` replaces
/// the current state `a` with probability
/// `min(1, exp(q_a - q_t - beta (H_t - H_a)))`, where `q` is the model
/// log-probability and `H` the total energy. Proposals with a non-finite
/// log-probability are skipped. Every `save_every`-th recorded state is kept.
#[instrument(skip(batch, lattice, rng), fields(n = batch.len()))]
pub fn neural_mcmc(
    batch: &SampleBatch,
    lattice: &Lattice,
    beta: f64,
    save_every: usize,
    rng: &mut RngHandle,
) -> Result<ChainTrace, SgError> {
    check_beta(beta)?;
    if save_every == 0 {
        return Err(SgError::Config(ErrorInfo::new(
            "save-every-zero",
            "save_every must be at least 1",
        )));
    }
    let num_sites = lattice.num_sites() as f64;
    let totals: Vec<f64> = batch_energies(batch, lattice)?
        .into_iter()
        .map(|density| density * num_sites)
        .collect();
    let log_probs = batch.log_probs();

    let Some(start) = log_probs.iter().position(|lp| lp.is_finite()) else {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("no-finite-proposals", "no sample has a finite log_prob")
                .with_context("len", batch.len()),
        ));
    };

    let mut current = start;
    let mut visited = Vec::new();
    let mut accepted = 0usize;
    let mut attempted = 0usize;
    let mut skipped = 0usize;
    for trial in start + 1..batch.len() {
        if !log_probs[trial].is_finite() {
            skipped += 1;
            continue;
        }
        attempted += 1;
        let log_ratio = log_probs[current] - log_probs[trial] - beta * totals[trial]
            + beta * totals[current];
        let transition = log_ratio.min(0.0);
        if transition >= 0.0 || rng.gen::<f64>().ln() < transition {
            current = trial;
            accepted += 1;
        }
        visited.push(current);
    }
    if skipped > 0 {
        warn!(skipped, "proposals with non-finite log_prob skipped");
    }

    let kept: Vec<usize> = visited.into_iter().step_by(save_every).collect();
    let trace = ChainTrace {
        configs: kept.iter().map(|&i| batch.samples()[i].clone()).collect(),
        energies: kept.iter().map(|&i| totals[i]).collect(),
        accepted,
        attempted,
    };
    debug!(acceptance = trace.acceptance_rate(), kept = kept.len(), "neural chain finished");
    Ok(trace)
}
