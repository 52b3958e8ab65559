use sg_core::errors::{ErrorInfo, SgError};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("site", 4)
        .with_context("reason", "example")
}

#[test]
fn level_error_surface() {
    let err = SgError::InvalidConnectivityLevel(sample_info("level-out-of-range", "level 8"));
    assert_eq!(err.info().code, "level-out-of-range");
    assert!(err.info().context.contains_key("site"));
}

#[test]
fn overflow_error_surface() {
    let err = SgError::NeighborSlotOverflow(sample_info("slot-overflow", "row full"));
    assert_eq!(err.info().code, "slot-overflow");
    assert_eq!(err.info().context.get("site").map(String::as_str), Some("4"));
}

#[test]
fn resample_error_surface() {
    let err = SgError::ResampleSize(sample_info("target-exceeds-batch", "too many"));
    assert_eq!(err.info().code, "target-exceeds-batch");
}

#[test]
fn shape_error_display_includes_context_and_hint() {
    let err = SgError::ShapeMismatch(sample_info("spin-length", "bad length").with_hint("check L"));
    let rendered = err.to_string();
    assert!(rendered.starts_with("shape mismatch: bad length (code: spin-length)"));
    assert!(rendered.contains("reason=example"));
    assert!(rendered.contains("hint: check L"));
}

#[test]
fn errors_round_trip_json() {
    let err = SgError::Config(sample_info("beta-not-finite", "beta is NaN"));
    let json = serde_json::to_string(&err).unwrap();
    assert!(json.contains("\"family\":\"Config\""));
    let back: SgError = serde_json::from_str(&json).unwrap();
    assert_eq!(back, err);
}
