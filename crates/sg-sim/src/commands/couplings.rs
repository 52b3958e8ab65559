use std::error::Error;
use std::path::PathBuf;

use clap::Args;
use sg_lattice::{build_lattice, write_couplings, write_lattice_json};
use sg_mcmc::{RunConfig, RunManifest};

use super::write_manifest;

#[derive(Args, Debug)]
pub struct CouplingsArgs {
    /// YAML configuration with `side`, `levels`, `seed` and `width_policy`.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Coupling file to write; `.json` writes the full lattice document.
    #[arg(long)]
    pub out: PathBuf,
}

pub fn run(args: &CouplingsArgs) -> Result<(), Box<dyn Error>> {
    let config = match &args.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    let lattice = build_lattice(&config.lattice, config.seed)?;
    if args.out.extension().is_some_and(|ext| ext == "json") {
        write_lattice_json(&args.out, &lattice)?;
    } else {
        write_couplings(&args.out, &lattice)?;
    }

    let mut manifest = RunManifest::new("couplings", &config, &lattice);
    manifest.inputs.extend(args.config.iter().cloned());
    manifest.outputs.push(args.out.clone());
    manifest
        .metrics
        .insert("edges".into(), lattice.num_edges() as f64);
    manifest
        .metrics
        .insert("width".into(), lattice.table().width() as f64);
    write_manifest(&manifest, &args.out)?;
    println!("{}", manifest.provenance.lattice_hash);
    Ok(())
}
