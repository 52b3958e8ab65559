use sg_core::errors::{ErrorInfo, SgError};

fn block_means(
    trace: &[f64],
    len_block: usize,
    skip: usize,
    min_blocks: usize,
) -> Result<Vec<f64>, SgError> {
    if len_block == 0 {
        return Err(SgError::ShapeMismatch(ErrorInfo::new(
            "block-length-zero",
            "block length must be at least 1",
        )));
    }
    let kept = trace.get(skip..).unwrap_or(&[]);
    let blocks: Vec<f64> = kept
        .chunks_exact(len_block)
        .map(|block| block.iter().sum::<f64>() / len_block as f64)
        .collect();
    if blocks.len() < min_blocks {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("too-few-blocks", "trace too short for the requested blocking")
                .with_context("blocks", blocks.len())
                .with_context("required", min_blocks)
                .with_context("len_block", len_block)
                .with_context("skip", skip),
        ));
    }
    Ok(blocks)
}

/// Mean of block means after dropping `skip` leading values and any partial block.
pub fn block_mean(trace: &[f64], len_block: usize, skip: usize) -> Result<f64, SgError> {
    let blocks = block_means(trace, len_block, skip, 1)?;
    Ok(blocks.iter().sum::<f64>() / blocks.len() as f64)
}

/// Block standard error: population std of block means over `sqrt(blocks - 1)`.
pub fn block_std(trace: &[f64], len_block: usize, skip: usize) -> Result<f64, SgError> {
    let blocks = block_means(trace, len_block, skip, 2)?;
    let n = blocks.len() as f64;
    let mean = blocks.iter().sum::<f64>() / n;
    let variance = blocks.iter().map(|b| (b - mean).powi(2)).sum::<f64>() / n;
    Ok(variance.sqrt() / (n - 1.0).sqrt())
}
