use sg_core::errors::{ErrorInfo, SgError};
use sg_core::SpinConfig;

use crate::adjacency::{Lattice, NeighborTable};

fn check_shape(lattice: &Lattice, config: &SpinConfig) -> Result<(), SgError> {
    if config.side() != lattice.side() {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("config-side", "configuration side differs from lattice side")
                .with_context("lattice_side", lattice.side())
                .with_context("config_side", config.side()),
        ));
    }
    Ok(())
}

/// Total Hamiltonian `H = -sum_edges J_ab S_a S_b`, each edge counted once.
pub fn total_energy(lattice: &Lattice, config: &SpinConfig) -> Result<f64, SgError> {
    check_shape(lattice, config)?;
    let spins = config.spins();
    Ok(lattice
        .edges()
        .map(|(a, b, coupling)| -(spins[a] as f64) * (spins[b] as f64) * coupling)
        .sum())
}

/// Energy density `H / L^2`.
///
/// Offsets falling outside the grid never became edges, so open boundaries
/// contribute nothing.
pub fn energy(lattice: &Lattice, config: &SpinConfig) -> Result<f64, SgError> {
    let total = total_energy(lattice, config)?;
    Ok(total / lattice.num_sites() as f64)
}

/// Total energy evaluated from the neighbour table (each edge seen twice, halved).
pub fn energy_from_table(lattice: &Lattice, config: &SpinConfig) -> Result<f64, SgError> {
    check_shape(lattice, config)?;
    let spins = config.spins();
    let table = lattice.table();
    let mut sum = 0.0;
    for site in 0..table.num_sites() {
        let spin = spins[site] as f64;
        for (neighbor, coupling) in table.neighbors(site) {
            sum += spin * spins[neighbor] as f64 * coupling;
        }
    }
    Ok(-sum / 2.0)
}

/// Change in total energy from flipping `site`: `2 S_k sum_j J_kj S_j`.
///
/// `spins` must hold one entry per table row; no bounds validation is done here.
pub fn flip_delta(table: &NeighborTable, spins: &[i8], site: usize) -> f64 {
    let local: f64 = table
        .neighbors(site)
        .map(|(neighbor, coupling)| coupling * spins[neighbor] as f64)
        .sum();
    2.0 * spins[site] as f64 * local
}

/// Checked variant of [`flip_delta`].
pub fn delta_energy(lattice: &Lattice, config: &SpinConfig, site: usize) -> Result<f64, SgError> {
    check_shape(lattice, config)?;
    if site >= lattice.num_sites() {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("site-out-of-range", "site index outside the lattice")
                .with_context("site", site)
                .with_context("sites", lattice.num_sites()),
        ));
    }
    Ok(flip_delta(lattice.table(), config.spins(), site))
}
