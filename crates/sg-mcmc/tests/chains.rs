use sg_core::errors::SgError;
use sg_core::{RngHandle, SampleBatch, SpinConfig};
use sg_lattice::{build_lattice, total_energy, LatticeConfig};
use sg_mcmc::{neural_mcmc, single_spin_flip, ChainConfig};

fn quench_options(steps: usize) -> ChainConfig {
    ChainConfig {
        steps,
        sweeps: 1,
        burn_in: 0,
        save_every: 1,
    }
}

#[test]
fn metropolis_tracks_energy_incrementally() {
    let lattice = build_lattice(&LatticeConfig::new(5, &[1, 2]), 12345).unwrap();
    let mut rng = RngHandle::from_seed(4);
    let trace = single_spin_flip(&lattice, 1.0, &quench_options(50), &mut rng).unwrap();
    assert_eq!(trace.configs.len(), 50);
    for (config, &recorded) in trace.configs.iter().zip(&trace.energies) {
        let exact = total_energy(&lattice, config).unwrap();
        assert!((exact - recorded).abs() < 1e-9);
    }
    assert_eq!(trace.attempted, 50 * 25);
}

#[test]
fn metropolis_is_deterministic_per_seed() {
    let lattice = build_lattice(&LatticeConfig::new(4, &[1]), 1).unwrap();
    let options = quench_options(20);
    let a = single_spin_flip(&lattice, 0.5, &options, &mut RngHandle::from_seed(8)).unwrap();
    let b = single_spin_flip(&lattice, 0.5, &options, &mut RngHandle::from_seed(8)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn cold_chain_lowers_energy() {
    let lattice = build_lattice(&LatticeConfig::new(6, &[1]), 12345).unwrap();
    let mut rng = RngHandle::from_seed(21);
    let trace = single_spin_flip(&lattice, 4.0, &quench_options(200), &mut rng).unwrap();
    let densities = trace.energy_densities(lattice.num_sites());
    let tail = &densities[100..];
    let mean = tail.iter().sum::<f64>() / tail.len() as f64;
    assert!(mean < -0.5, "mean energy density {mean}");
}

#[test]
fn infinite_temperature_accepts_everything() {
    let lattice = build_lattice(&LatticeConfig::new(4, &[1, 3]), 2).unwrap();
    let options = ChainConfig {
        steps: 30,
        sweeps: 0,
        burn_in: 10,
        save_every: 1,
    };
    let trace = single_spin_flip(&lattice, 0.0, &options, &mut RngHandle::from_seed(0)).unwrap();
    assert_eq!(trace.configs.len(), 30);
    assert_eq!(trace.attempted, 40);
    assert_eq!(trace.acceptance_rate(), 1.0);
}

#[test]
fn non_finite_beta_is_a_config_error() {
    let lattice = build_lattice(&LatticeConfig::new(3, &[1]), 2).unwrap();
    let err = single_spin_flip(&lattice, f64::NAN, &quench_options(1), &mut RngHandle::from_seed(0))
        .unwrap_err();
    assert!(matches!(err, SgError::Config(_)));
}

fn constant_batch(side: usize, len: usize) -> SampleBatch {
    let config = SpinConfig::uniform(side, 1).unwrap();
    SampleBatch::new(vec![config; len], vec![-3.0; len]).unwrap()
}

#[test]
fn neural_chain_accepts_equal_proposals() {
    let lattice = build_lattice(&LatticeConfig::new(3, &[1]), 5).unwrap();
    let batch = constant_batch(3, 11);
    let trace = neural_mcmc(&batch, &lattice, 1.0, 1, &mut RngHandle::from_seed(1)).unwrap();
    assert_eq!(trace.attempted, 10);
    assert_eq!(trace.accepted, 10);
    assert_eq!(trace.configs.len(), 10);
}

#[test]
fn neural_chain_thins_and_skips_non_finite() {
    let lattice = build_lattice(&LatticeConfig::new(3, &[1]), 5).unwrap();
    let batch = constant_batch(3, 10);
    let mut log_probs = batch.log_probs().to_vec();
    log_probs[0] = f64::NEG_INFINITY;
    log_probs[4] = f64::NAN;
    let batch = SampleBatch::new(batch.samples().to_vec(), log_probs).unwrap();
    let trace = neural_mcmc(&batch, &lattice, 1.0, 3, &mut RngHandle::from_seed(1)).unwrap();
    // start at 1, proposals 2..10 minus index 4
    assert_eq!(trace.attempted, 7);
    assert_eq!(trace.configs.len(), 3);
    assert_eq!(trace.energies.len(), 3);
}

#[test]
fn neural_chain_prefers_low_energy_proposals() {
    let lattice = build_lattice(&LatticeConfig::new(4, &[1]), 12345).unwrap();
    let ferro = SpinConfig::uniform(4, 1).unwrap();
    let low = total_energy(&lattice, &ferro).unwrap();
    let mut alt = ferro.clone();
    alt.flip(5);
    let (good, bad) = if total_energy(&lattice, &alt).unwrap() < low {
        (alt, ferro)
    } else {
        (ferro, alt)
    };
    let batch = SampleBatch::new(vec![good.clone(), bad], vec![0.0, 0.0]).unwrap();
    let trace = neural_mcmc(&batch, &lattice, 1.0e4, 1, &mut RngHandle::from_seed(2)).unwrap();
    assert_eq!(trace.configs, vec![good]);
    assert_eq!(trace.accepted, 0);
}

#[test]
fn neural_chain_without_finite_proposals_fails() {
    let lattice = build_lattice(&LatticeConfig::new(2, &[1]), 5).unwrap();
    let batch = SampleBatch::new(
        vec![SpinConfig::uniform(2, 1).unwrap()],
        vec![f64::NEG_INFINITY],
    )
    .unwrap();
    let err = neural_mcmc(&batch, &lattice, 1.0, 1, &mut RngHandle::from_seed(0)).unwrap_err();
    assert_eq!(err.info().code, "no-finite-proposals");
}

#[test]
fn chain_streams_are_per_index() {
    use rand::RngCore;
    use sg_mcmc::determinism::{chain_rng, resample_rng};

    assert_eq!(chain_rng(12345, 0).next_u64(), chain_rng(12345, 0).next_u64());
    assert_ne!(chain_rng(12345, 0).next_u64(), chain_rng(12345, 1).next_u64());
    assert_ne!(chain_rng(12345, 0).next_u64(), resample_rng(12345).next_u64());
    assert_eq!(
        resample_rng(12345).next_u64(),
        RngHandle::substream(12345, 1).next_u64()
    );
}
