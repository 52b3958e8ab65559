use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sg_mcmc::determinism::chain_rng;
use sg_mcmc::{single_spin_flip, ChainArchive, ChainTrace, RunConfig, RunManifest};
use tracing::info;

use super::{resolve_lattice, write_manifest};

#[derive(Args, Debug)]
pub struct MetropolisArgs {
    /// YAML configuration (`beta`, `mcmc.*`, lattice settings).
    #[arg(long)]
    pub config: PathBuf,
    /// Coupling file; the lattice is drawn from the config when omitted.
    #[arg(long)]
    pub couplings: Option<PathBuf>,
    /// Chain archive to write.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &MetropolisArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let lattice = resolve_lattice(&config, args.couplings.as_deref())?;
    let mut rng = chain_rng(config.seed, 0);
    let trace = single_spin_flip(&lattice, config.beta, &config.mcmc, &mut rng)?;
    ChainArchive::from_trace(&trace).store(&args.out)?;

    let mut manifest = RunManifest::new("metropolis", &config, &lattice);
    manifest.inputs.push(args.config.clone());
    manifest.inputs.extend(args.couplings.iter().cloned());
    manifest.outputs.push(args.out.clone());
    record_chain_metrics(&mut manifest, &trace, lattice.num_sites());
    write_manifest(&manifest, &args.out)?;
    Ok(())
}

/// Acceptance and blocked energy-density estimates; blocks are a tenth of the trace.
pub fn record_chain_metrics(manifest: &mut RunManifest, trace: &ChainTrace, num_sites: usize) {
    let densities = trace.energy_densities(num_sites);
    let len_block = (densities.len() / 10).max(1);
    manifest
        .metrics
        .insert("acceptance_rate".into(), trace.acceptance_rate());
    manifest
        .metrics
        .insert("recorded".into(), densities.len() as f64);
    if let Ok(mean) = sg_mcmc::block_mean(&densities, len_block, 0) {
        manifest.metrics.insert("energy_mean".into(), mean);
    }
    if let Ok(error) = sg_mcmc::block_std(&densities, len_block, 0) {
        manifest.metrics.insert("energy_error".into(), error);
    }
    info!(
        acceptance = trace.acceptance_rate(),
        recorded = densities.len(),
        "chain finished"
    );
}
