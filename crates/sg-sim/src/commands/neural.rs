use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sg_mcmc::determinism::chain_rng;
use sg_mcmc::{neural_mcmc, ChainArchive, RunConfig, RunManifest, SampleArchive};

use super::metropolis::record_chain_metrics;
use super::{resolve_lattice, write_manifest};

#[derive(Args, Debug)]
pub struct NeuralArgs {
    /// YAML configuration (`beta`, `mcmc.save_every`, lattice settings).
    #[arg(long)]
    pub config: PathBuf,
    /// Coupling file; the lattice is drawn from the config when omitted.
    #[arg(long)]
    pub couplings: Option<PathBuf>,
    /// Sample archive providing the proposals.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Chain archive to write.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &NeuralArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let lattice = resolve_lattice(&config, args.couplings.as_deref())?;
    let batch = SampleArchive::load(&args.input)?.into_batch()?;
    let mut rng = chain_rng(config.seed, 1);
    let trace = neural_mcmc(
        &batch,
        &lattice,
        config.beta,
        config.mcmc.save_every,
        &mut rng,
    )?;
    ChainArchive::from_trace(&trace).store(&args.out)?;

    let mut manifest = RunManifest::new("neural-mcmc", &config, &lattice);
    manifest.inputs.push(args.config.clone());
    manifest.inputs.extend(args.couplings.iter().cloned());
    manifest.inputs.push(args.input.clone());
    manifest.outputs.push(args.out.clone());
    record_chain_metrics(&mut manifest, &trace, lattice.num_sites());
    write_manifest(&manifest, &args.out)?;
    Ok(())
}
