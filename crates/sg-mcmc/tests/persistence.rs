use sg_core::{RngHandle, SampleBatch, SpinConfig};
use sg_lattice::{build_lattice, LatticeConfig};
use sg_mcmc::{single_spin_flip, ChainArchive, ChainConfig, RunConfig, RunManifest, SampleArchive};
use tempfile::tempdir;

fn small_batch() -> SampleBatch {
    let a = SpinConfig::new(2, vec![1, -1, -1, 1]).unwrap();
    let b = SpinConfig::uniform(2, -1).unwrap();
    SampleBatch::new(vec![a, b], vec![-2.5, -0.1]).unwrap()
}

#[test]
fn sample_archive_round_trips_in_both_formats() {
    let dir = tempdir().unwrap();
    let archive = SampleArchive::from_batch(&small_batch());
    assert_eq!(archive.sample[0], vec![vec![1, -1], vec![-1, 1]]);
    for name in ["samples.json", "samples.bin"] {
        let path = dir.path().join("nested").join(name);
        archive.store(&path).unwrap();
        let loaded = SampleArchive::load(&path).unwrap();
        assert_eq!(loaded.into_batch().unwrap(), small_batch());
    }
}

#[test]
fn malformed_archives_are_rejected() {
    let ragged = SampleArchive {
        sample: vec![vec![vec![1, 1], vec![1]]],
        log_prob: vec![0.0],
    };
    assert!(ragged.into_batch().is_err());
    let unpaired = SampleArchive {
        sample: vec![vec![vec![1]]],
        log_prob: vec![0.0, 1.0],
    };
    assert!(unpaired.into_batch().is_err());

    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{\"sample\": 3}").unwrap();
    let err = SampleArchive::load(&path).unwrap_err();
    assert_eq!(err.info().code, "archive-parse");
    let missing = SampleArchive::load(&dir.path().join("absent.bin")).unwrap_err();
    assert_eq!(missing.info().code, "archive-read");
}

#[test]
fn chain_archive_and_manifest_round_trip() {
    let dir = tempdir().unwrap();
    let config = RunConfig::default();
    let lattice = build_lattice(&LatticeConfig::new(3, &[1]), config.seed).unwrap();
    let options = ChainConfig {
        steps: 5,
        ..ChainConfig::default()
    };
    let trace = single_spin_flip(&lattice, 1.0, &options, &mut RngHandle::from_seed(3)).unwrap();
    let archive = ChainArchive::from_trace(&trace);
    let path = dir.path().join("chain.bin");
    archive.store(&path).unwrap();
    assert_eq!(ChainArchive::load(&path).unwrap(), archive);

    let mut manifest = RunManifest::new("metropolis", &config, &lattice);
    manifest.outputs.push(path);
    manifest
        .metrics
        .insert("acceptance_rate".into(), trace.acceptance_rate());
    let manifest_path = dir.path().join("manifest.json");
    manifest.write(&manifest_path).unwrap();
    let loaded = RunManifest::load(&manifest_path).unwrap();
    assert_eq!(loaded, manifest);
    assert_eq!(loaded.provenance.side, 3);
    assert_eq!(loaded.provenance.lattice_hash.len(), 64);
}
