use std::collections::BTreeSet;

use proptest::prelude::*;
use rand::Rng;
use sg_core::errors::SgError;
use sg_core::{RngHandle, SampleBatch, SpinConfig};
use sg_lattice::{build_lattice, energy, Lattice, LatticeConfig};
use sg_mcmc::{log_sum_exp, log_weights, reweight, sample_without_replacement};

fn random_batch(side: usize, len: usize, seed: u64) -> SampleBatch {
    let mut rng = RngHandle::from_seed(seed);
    let mut samples = Vec::with_capacity(len);
    let mut log_probs = Vec::with_capacity(len);
    for _ in 0..len {
        samples.push(SpinConfig::new(side, rng.random_spins(side * side)).unwrap());
        log_probs.push(-((side * side) as f64) * 2f64.ln() + rng.gen_range(-1.0..1.0));
    }
    SampleBatch::new(samples, log_probs).unwrap()
}

fn lattice(side: usize) -> Lattice {
    build_lattice(&LatticeConfig::new(side, &[1, 2]), 12345).unwrap()
}

#[test]
fn zero_beta_weights_are_inverse_model_probability() {
    let batch = random_batch(4, 32, 1);
    let weights = log_weights(&batch, &lattice(4), 0.0).unwrap();
    let shifted: Vec<f64> = weights
        .iter()
        .zip(batch.log_probs())
        .map(|(w, q)| w + q)
        .collect();
    for value in &shifted {
        assert!((value - shifted[0]).abs() < 1e-9);
    }
    assert!(log_sum_exp(&weights).abs() < 1e-12);
}

#[test]
fn weights_follow_boltzmann_factor() {
    let batch = random_batch(4, 8, 2);
    let lattice = lattice(4);
    let beta = 0.7;
    let weights = log_weights(&batch, &lattice, beta).unwrap();
    let (c0, q0) = (&batch.samples()[0], batch.log_probs()[0]);
    let (c1, q1) = (&batch.samples()[1], batch.log_probs()[1]);
    let e0 = energy(&lattice, c0).unwrap();
    let e1 = energy(&lattice, c1).unwrap();
    let expected = -beta * 16.0 * (e0 - e1) - (q0 - q1);
    assert!((weights[0] - weights[1] - expected).abs() < 1e-9);
}

#[test]
fn resampled_pairs_stay_together() {
    let batch = random_batch(5, 40, 3);
    let mut rng = RngHandle::from_seed(9);
    let out = reweight(&batch, &lattice(5), 1.0, 20, &mut rng).unwrap();
    assert_eq!(out.batch.len(), 20);
    assert_eq!(out.indices.len(), 20);
    for (k, &index) in out.indices.iter().enumerate() {
        assert_eq!(out.batch.samples()[k], batch.samples()[index]);
        assert_eq!(out.batch.log_probs()[k], batch.log_probs()[index]);
    }
    assert_eq!(out.log_weights.len(), 40);
    assert!(out.effective_sample_size >= 1.0 && out.effective_sample_size <= 40.0);
}

#[test]
fn resampling_is_deterministic_per_seed() {
    let batch = random_batch(4, 30, 4);
    let lattice = lattice(4);
    let first = reweight(&batch, &lattice, 1.0, 10, &mut RngHandle::from_seed(5)).unwrap();
    let second = reweight(&batch, &lattice, 1.0, 10, &mut RngHandle::from_seed(5)).unwrap();
    assert_eq!(first.indices, second.indices);
}

#[test]
fn full_draw_is_a_permutation() {
    let batch = random_batch(3, 12, 6);
    let mut rng = RngHandle::from_seed(1);
    let out = reweight(&batch, &lattice(3), 2.0, 12, &mut rng).unwrap();
    let unique: BTreeSet<usize> = out.indices.iter().copied().collect();
    assert_eq!(unique, (0..12).collect());
}

#[test]
fn dominant_sample_is_drawn_first() {
    let batch = random_batch(4, 16, 7);
    let mut log_probs = batch.log_probs().to_vec();
    log_probs[11] = -5000.0;
    let batch = SampleBatch::new(batch.samples().to_vec(), log_probs).unwrap();
    for seed in 0..10 {
        let out = reweight(&batch, &lattice(4), 1.0, 3, &mut RngHandle::from_seed(seed)).unwrap();
        assert_eq!(out.indices[0], 11);
    }
}

#[test]
fn target_size_is_validated() {
    let batch = random_batch(3, 5, 8);
    let lattice = lattice(3);
    let mut rng = RngHandle::from_seed(0);
    match reweight(&batch, &lattice, 1.0, 6, &mut rng) {
        Err(SgError::ResampleSize(info)) => {
            assert_eq!(info.code, "target-exceeds-batch");
            assert_eq!(info.context.get("batch_len").map(String::as_str), Some("5"));
        }
        other => panic!("expected ResampleSize, got {other:?}"),
    }
    assert!(matches!(
        reweight(&batch, &lattice, 1.0, 0, &mut rng),
        Err(SgError::ResampleSize(_))
    ));
}

#[test]
fn mismatched_side_is_rejected() {
    let batch = random_batch(3, 5, 8);
    let mut rng = RngHandle::from_seed(0);
    assert!(matches!(
        reweight(&batch, &lattice(4), 1.0, 2, &mut rng),
        Err(SgError::ShapeMismatch(_))
    ));
}

#[test]
fn uniform_weights_select_uniformly() {
    let weights = vec![0.0; 4];
    let mut counts = [0usize; 4];
    let mut rng = RngHandle::from_seed(77);
    for _ in 0..4000 {
        let picked = sample_without_replacement(&weights, 1, &mut rng).unwrap();
        counts[picked[0]] += 1;
    }
    for count in counts {
        assert!((850..1150).contains(&count), "counts {counts:?}");
    }
}

#[test]
fn first_pick_follows_normalized_weights() {
    let weights = [0.25f64.ln(), 0.75f64.ln()];
    let mut rng = RngHandle::from_seed(2024);
    let trials = 20_000;
    let mut light = 0usize;
    for _ in 0..trials {
        if sample_without_replacement(&weights, 1, &mut rng).unwrap()[0] == 0 {
            light += 1;
        }
    }
    let freq = light as f64 / trials as f64;
    assert!((freq - 0.25).abs() < 0.02, "first-pick frequency {freq}");
}

#[test]
fn second_pick_follows_remaining_mass() {
    let weights = [0.2f64.ln(), 0.3f64.ln(), 0.5f64.ln()];
    let mut rng = RngHandle::from_seed(77);
    let trials = 40_000;
    let mut pairs = [[0usize; 3]; 3];
    for _ in 0..trials {
        let picked = sample_without_replacement(&weights, 2, &mut rng).unwrap();
        pairs[picked[0]][picked[1]] += 1;
    }
    let first: Vec<f64> = pairs
        .iter()
        .map(|row| row.iter().sum::<usize>() as f64 / trials as f64)
        .collect();
    assert!((first[0] - 0.2).abs() < 0.015, "first picks {first:?}");
    assert!((first[2] - 0.5).abs() < 0.015, "first picks {first:?}");

    // after drawing 0, the rest is renormalized over {1, 2}: 0.3 / 0.8
    let after_zero = pairs[0][1] as f64 / (pairs[0][1] + pairs[0][2]) as f64;
    assert!((after_zero - 0.375).abs() < 0.03, "p(1 | 0) = {after_zero}");
    // after drawing 2: 0.2 / 0.5
    let after_two = pairs[2][0] as f64 / (pairs[2][0] + pairs[2][1]) as f64;
    assert!((after_two - 0.4).abs() < 0.03, "p(0 | 2) = {after_two}");
}

proptest! {
    #[test]
    fn draws_never_repeat(
        weights in proptest::collection::vec(-20.0f64..20.0, 1..40),
        seed in any::<u64>(),
        frac in 0.0f64..1.0,
    ) {
        let count = 1 + ((weights.len() - 1) as f64 * frac) as usize;
        let mut rng = RngHandle::from_seed(seed);
        let picked = sample_without_replacement(&weights, count, &mut rng).unwrap();
        prop_assert_eq!(picked.len(), count);
        let unique: BTreeSet<usize> = picked.iter().copied().collect();
        prop_assert_eq!(unique.len(), count);
        prop_assert!(picked.iter().all(|&i| i < weights.len()));
    }
}

#[test]
fn empty_batch_is_a_shape_error() {
    let batch = SampleBatch::new(Vec::new(), Vec::new()).unwrap();
    let err = reweight(&batch, &lattice(3), 1.0, 1, &mut RngHandle::from_seed(0)).unwrap_err();
    assert_eq!(err.info().code, "empty-batch");
}
