use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sg_mcmc::determinism::resample_rng;
use sg_mcmc::{reweight, RunConfig, RunManifest, SampleArchive};
use tracing::info;

use super::{resolve_lattice, write_manifest};

#[derive(Args, Debug)]
pub struct ReweightArgs {
    /// YAML configuration (`beta`, `target_count`, lattice settings).
    #[arg(long)]
    pub config: PathBuf,
    /// Coupling file; the lattice is drawn from the config when omitted.
    #[arg(long)]
    pub couplings: Option<PathBuf>,
    /// Sample archive with `sample` and `log_prob`.
    #[arg(long = "in")]
    pub input: PathBuf,
    /// Resampled archive to write.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &ReweightArgs) -> Result<(), Box<dyn Error>> {
    let config = RunConfig::load(&args.config)?;
    let lattice = resolve_lattice(&config, args.couplings.as_deref())?;
    let batch = SampleArchive::load(&args.input)?.into_batch()?;
    let target = config.resolved_target(batch.len());
    info!(samples = batch.len(), target, beta = config.beta, "reweighting");

    let mut rng = resample_rng(config.seed);
    let resampled = reweight(&batch, &lattice, config.beta, target, &mut rng)?;
    SampleArchive::from_batch(&resampled.batch).store(&args.out)?;

    let selected: Vec<f64> = resampled
        .indices
        .iter()
        .map(|&i| resampled.energies[i])
        .collect();
    let mut manifest = RunManifest::new("reweight", &config, &lattice);
    manifest.inputs.push(args.config.clone());
    manifest.inputs.extend(args.couplings.iter().cloned());
    manifest.inputs.push(args.input.clone());
    manifest.outputs.push(args.out.clone());
    manifest
        .metrics
        .insert("effective_sample_size".into(), resampled.effective_sample_size);
    manifest
        .metrics
        .insert("selected".into(), resampled.indices.len() as f64);
    manifest.metrics.insert(
        "selected_energy_mean".into(),
        selected.iter().sum::<f64>() / selected.len() as f64,
    );
    write_manifest(&manifest, &args.out)?;
    Ok(())
}
