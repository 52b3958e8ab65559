#![deny(missing_docs)]

//! Importance reweighting and Markov chain sampling on spin-glass lattices.

/// Sample and chain archives.
pub mod archive;
/// YAML configuration schema and defaults.
pub mod config;
/// Deterministic seed derivation helpers.
pub mod determinism;
/// Run manifest serialization helpers.
pub mod manifest;
/// Single-spin-flip Metropolis sampler.
pub mod metropolis;
/// Independent-proposal chain over model samples.
pub mod neural;
/// Boltzmann reweighting and resampling without replacement.
pub mod reweight;
/// Block averaging of correlated traces.
pub mod stats;

pub use archive::{ChainArchive, SampleArchive};
pub use config::{ChainConfig, RunConfig};
pub use manifest::RunManifest;
pub use metropolis::{single_spin_flip, ChainTrace};
pub use neural::neural_mcmc;
pub use reweight::{
    effective_sample_size, log_sum_exp, log_weights, reweight, sample_without_replacement,
    Resampled,
};
pub use stats::{block_mean, block_std};
