#![deny(missing_docs)]
//! Core data types, error surface and seeding policy shared by the spin-glass crates.

use serde::{Deserialize, Serialize};

pub mod errors;
pub mod provenance;
pub mod rng;
mod types;

pub use errors::{ErrorInfo, SgError};
pub use provenance::{RunProvenance, SchemaVersion};
pub use rng::{derive_substream_seed, RngHandle};
pub use types::{SampleBatch, SpinConfig};

/// Row-major site index `row * L + col` on an `L x L` grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Site(usize);

impl Site {
    /// Creates a site from its raw row-major index.
    pub fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    /// Creates a site from grid coordinates.
    pub fn from_coords(row: usize, col: usize, side: usize) -> Self {
        Self(row * side + col)
    }

    /// Returns the raw row-major index.
    pub fn as_raw(&self) -> usize {
        self.0
    }

    /// Returns `(row, col)` for a grid of the given side.
    pub fn coords(&self, side: usize) -> (usize, usize) {
        (self.0 / side, self.0 % side)
    }

    /// Applies a `(d_row, d_col)` offset under open boundaries.
    ///
    /// Returns `None` when the target falls outside `[0, side)` in either dimension.
    pub fn offset(&self, d_row: i32, d_col: i32, side: usize) -> Option<Site> {
        let (row, col) = self.coords(side);
        let row = row as i64 + d_row as i64;
        let col = col as i64 + d_col as i64;
        let bound = side as i64;
        if row < 0 || col < 0 || row >= bound || col >= bound {
            return None;
        }
        Some(Site::from_coords(row as usize, col as usize, side))
    }
}
