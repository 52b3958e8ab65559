use std::error::Error;
use std::path::{Path, PathBuf};

use sg_lattice::{build_lattice, load_couplings, Lattice};
use sg_mcmc::{RunConfig, RunManifest};
use tracing::info;

pub mod couplings;
pub mod metropolis;
pub mod neural;
pub mod reweight;

/// Loads the coupling file when given, otherwise draws the lattice from the config.
pub fn resolve_lattice(
    config: &RunConfig,
    couplings: Option<&Path>,
) -> Result<Lattice, Box<dyn Error>> {
    let lattice = match couplings {
        Some(path) => load_couplings(path, config.lattice.side)?,
        None => build_lattice(&config.lattice, config.seed)?,
    };
    info!(
        side = lattice.side(),
        edges = lattice.num_edges(),
        width = lattice.table().width(),
        "lattice ready"
    );
    Ok(lattice)
}

/// Manifest path written next to an output artefact.
pub fn manifest_path(out: &Path) -> PathBuf {
    out.with_extension("manifest.json")
}

pub fn write_manifest(manifest: &RunManifest, out: &Path) -> Result<(), Box<dyn Error>> {
    let path = manifest_path(out);
    manifest.write(&path)?;
    info!(path = %path.display(), "manifest written");
    Ok(())
}
