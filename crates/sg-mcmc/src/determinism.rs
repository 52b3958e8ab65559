use sg_core::{derive_substream_seed, RngHandle};

const RESAMPLE_STREAM: u64 = 1;
const CHAIN_STREAM: u64 = 2;

/// Stream for the resampling keys of a reweighting run.
pub fn resample_rng(master_seed: u64) -> RngHandle {
    RngHandle::substream(master_seed, RESAMPLE_STREAM)
}

/// Stream for a Markov chain, distinct per chain index.
pub fn chain_rng(master_seed: u64, chain_index: usize) -> RngHandle {
    RngHandle::substream(
        derive_substream_seed(master_seed, CHAIN_STREAM),
        chain_index as u64,
    )
}
