use sha2::{Digest, Sha256};

use crate::adjacency::Lattice;

/// Canonical structural hash of a lattice: side, levels, width and every edge
/// with the exact bit pattern of its coupling, in draw order.
pub fn canonical_hash(lattice: &Lattice) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"sg-lattice:v1");
    hasher.update((lattice.side() as u64).to_le_bytes());
    hasher.update((lattice.levels().len() as u64).to_le_bytes());
    for level in lattice.levels() {
        hasher.update([level.get()]);
    }
    hasher.update((lattice.table().width() as u64).to_le_bytes());
    hasher.update((lattice.num_edges() as u64).to_le_bytes());
    for (a, b, coupling) in lattice.edges() {
        hasher.update((a as u64).to_le_bytes());
        hasher.update((b as u64).to_le_bytes());
        hasher.update(coupling.to_bits().to_le_bytes());
    }
    format!("{:x}", hasher.finalize())
}
