use indexmap::IndexMap;
use rand_distr::{Distribution, StandardNormal};
use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::rng::RngHandle;
use sg_core::Site;
use tracing::{debug, instrument};

use crate::shells::{normalize_levels, slot_width, ConnectivityLevel, WidthPolicy};

/// Unordered pair of distinct sites, stored as `(min, max)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edge {
    lo: usize,
    hi: usize,
}

impl Edge {
    /// Normalizes `(a, b)`; returns `None` for a self loop.
    pub fn new(a: usize, b: usize) -> Option<Self> {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self { lo: a, hi: b }),
            std::cmp::Ordering::Greater => Some(Self { lo: b, hi: a }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Endpoints as `(smaller, larger)` site indices.
    pub fn endpoints(&self) -> (usize, usize) {
        (self.lo, self.hi)
    }
}

/// Edge to coupling map in insertion (draw) order.
pub type AdjacencyMap = IndexMap<Edge, f64>;

/// Dense `[sites, width]` table of `(neighbour, coupling)` slots.
///
/// Occupancy is tracked by a per-site fill count, so a zero coupling in a filled
/// slot is never confused with an unused `(0, 0)` slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborTable {
    width: usize,
    neighbors: Vec<usize>,
    couplings: Vec<f64>,
    fill: Vec<usize>,
}

impl NeighborTable {
    fn empty(num_sites: usize, width: usize) -> Self {
        Self {
            width,
            neighbors: vec![0; num_sites * width],
            couplings: vec![0.0; num_sites * width],
            fill: vec![0; num_sites],
        }
    }

    /// Fills the table from `edges` in iteration order, writing both endpoints.
    pub fn from_edges(
        num_sites: usize,
        width: usize,
        edges: &AdjacencyMap,
    ) -> Result<Self, SgError> {
        let mut table = Self::empty(num_sites, width);
        for (edge, &coupling) in edges {
            let (a, b) = edge.endpoints();
            table.push(a, b, coupling)?;
            table.push(b, a, coupling)?;
        }
        Ok(table)
    }

    fn push(&mut self, site: usize, neighbor: usize, coupling: f64) -> Result<(), SgError> {
        let slot = self.fill[site];
        if slot >= self.width {
            return Err(SgError::NeighborSlotOverflow(
                ErrorInfo::new("slot-overflow", "site degree exceeds neighbour table width")
                    .with_context("site", site)
                    .with_context("neighbor", neighbor)
                    .with_context("width", self.width)
                    .with_hint("use the exact width policy or fewer connectivity levels"),
            ));
        }
        let index = site * self.width + slot;
        self.neighbors[index] = neighbor;
        self.couplings[index] = coupling;
        self.fill[site] = slot + 1;
        Ok(())
    }

    /// Slot width `W`.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of rows (sites).
    pub fn num_sites(&self) -> usize {
        self.fill.len()
    }

    /// Number of filled slots for `site`.
    pub fn degree(&self, site: usize) -> usize {
        self.fill[site]
    }

    /// Raw slot contents; unused slots read `(0, 0.0)`.
    pub fn slot(&self, site: usize, k: usize) -> (usize, f64) {
        let index = site * self.width + k;
        (self.neighbors[index], self.couplings[index])
    }

    /// Filled `(neighbour, coupling)` slots of `site` in fill order.
    pub fn neighbors(&self, site: usize) -> impl ExactSizeIterator<Item = (usize, f64)> + '_ {
        let start = site * self.width;
        let end = start + self.fill[site];
        self.neighbors[start..end]
            .iter()
            .copied()
            .zip(self.couplings[start..end].iter().copied())
    }

    /// Copies the table out in `[sites][width]` shape, sentinel slots included.
    pub fn to_dense(&self) -> Vec<Vec<(usize, f64)>> {
        (0..self.num_sites())
            .map(|site| (0..self.width).map(|k| self.slot(site, k)).collect())
            .collect()
    }
}

/// Parameters for building a lattice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatticeConfig {
    /// Grid side length `L`.
    #[serde(default = "default_side")]
    pub side: usize,
    /// Requested connectivity levels; processed ascending, duplicates ignored.
    #[serde(default = "default_levels")]
    pub levels: Vec<u8>,
    /// Neighbour-table sizing rule.
    #[serde(default)]
    pub width_policy: WidthPolicy,
}

fn default_side() -> usize {
    10
}

fn default_levels() -> Vec<u8> {
    vec![1]
}

impl Default for LatticeConfig {
    fn default() -> Self {
        Self {
            side: default_side(),
            levels: default_levels(),
            width_policy: WidthPolicy::default(),
        }
    }
}

impl LatticeConfig {
    /// Convenience constructor using the default width policy.
    pub fn new(side: usize, levels: &[u8]) -> Self {
        Self {
            side,
            levels: levels.to_vec(),
            width_policy: WidthPolicy::default(),
        }
    }
}

/// Immutable coupling graph on an `L x L` open-boundary grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Lattice {
    side: usize,
    levels: Vec<ConnectivityLevel>,
    couplings: AdjacencyMap,
    table: NeighborTable,
}

impl Lattice {
    /// Grid side length `L`.
    pub fn side(&self) -> usize {
        self.side
    }

    /// Number of sites `L^2`.
    pub fn num_sites(&self) -> usize {
        self.side * self.side
    }

    /// Connectivity levels used to build the lattice; empty for external adjacency.
    pub fn levels(&self) -> &[ConnectivityLevel] {
        &self.levels
    }

    /// Sparse edge to coupling map in draw order.
    pub fn couplings(&self) -> &AdjacencyMap {
        &self.couplings
    }

    /// Dense neighbour table.
    pub fn table(&self) -> &NeighborTable {
        &self.table
    }

    /// Number of edges.
    pub fn num_edges(&self) -> usize {
        self.couplings.len()
    }

    /// Iterates `(a, b, coupling)` with `a < b`, in draw order.
    pub fn edges(&self) -> impl ExactSizeIterator<Item = (usize, usize, f64)> + '_ {
        self.couplings.iter().map(|(edge, &coupling)| {
            let (a, b) = edge.endpoints();
            (a, b, coupling)
        })
    }
}

/// Builds a lattice drawing couplings from a fresh stream seeded with `seed`.
pub fn build_lattice(config: &LatticeConfig, seed: u64) -> Result<Lattice, SgError> {
    let mut rng = RngHandle::from_seed(seed);
    build_lattice_with(config, &mut rng)
}

/// Builds a lattice drawing couplings from the caller's stream.
///
/// Sites are visited row-major; for each site the levels are visited ascending
/// and, within a level, the offsets in catalog order. Every in-bounds offset
/// consumes exactly one standard-normal draw, so a given seed always yields the
/// same couplings on the same edges.
#[instrument(skip(config, rng), fields(side = config.side, levels = ?config.levels))]
pub fn build_lattice_with(config: &LatticeConfig, rng: &mut RngHandle) -> Result<Lattice, SgError> {
    let side = config.side;
    if side == 0 {
        return Err(SgError::Config(ErrorInfo::new(
            "empty-lattice",
            "lattice side must be at least 1",
        )));
    }
    let levels = normalize_levels(&config.levels)?;
    let width = slot_width(&levels, config.width_policy);

    let mut couplings = AdjacencyMap::new();
    for raw in 0..side * side {
        let site = Site::from_raw(raw);
        for level in &levels {
            for &(d_row, d_col) in level.offsets() {
                let Some(neighbor) = site.offset(d_row, d_col, side) else {
                    continue;
                };
                let coupling: f64 = StandardNormal.sample(rng);
                if let Some(edge) = Edge::new(raw, neighbor.as_raw()) {
                    let previous = couplings.insert(edge, coupling);
                    debug_assert!(previous.is_none(), "shell offsets produced a repeated edge");
                }
            }
        }
    }

    let table = NeighborTable::from_edges(side * side, width, &couplings)?;
    debug!(edges = couplings.len(), width, "built lattice couplings");
    Ok(Lattice {
        side,
        levels,
        couplings,
        table,
    })
}

/// Builds a lattice from externally supplied `(a, b, coupling)` edges.
///
/// Every edge must join two distinct in-range sites, appear once (in either
/// orientation) and carry a finite coupling. Shell membership is not checked.
/// When `width` is `None` the table is sized to the largest site degree.
pub fn from_couplings<I>(side: usize, edges: I, width: Option<usize>) -> Result<Lattice, SgError>
where
    I: IntoIterator<Item = (usize, usize, f64)>,
{
    if side == 0 {
        return Err(SgError::Config(ErrorInfo::new(
            "empty-lattice",
            "lattice side must be at least 1",
        )));
    }
    let num_sites = side * side;
    let mut couplings = AdjacencyMap::new();
    let mut degree = vec![0usize; num_sites];
    for (a, b, coupling) in edges {
        if a >= num_sites || b >= num_sites {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("edge-out-of-range", "edge endpoint outside the lattice")
                    .with_context("a", a)
                    .with_context("b", b)
                    .with_context("sites", num_sites),
            ));
        }
        let Some(edge) = Edge::new(a, b) else {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("self-loop", "edge endpoints must differ").with_context("site", a),
            ));
        };
        if !coupling.is_finite() {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("coupling-not-finite", "coupling must be finite")
                    .with_context("a", a)
                    .with_context("b", b),
            ));
        }
        if couplings.insert(edge, coupling).is_some() {
            return Err(SgError::ShapeMismatch(
                ErrorInfo::new("duplicate-edge", "edge supplied more than once")
                    .with_context("a", a)
                    .with_context("b", b),
            ));
        }
        degree[a] += 1;
        degree[b] += 1;
    }
    let width = width.unwrap_or_else(|| degree.iter().copied().max().unwrap_or(0));
    let table = NeighborTable::from_edges(num_sites, width, &couplings)?;
    Ok(Lattice {
        side,
        levels: Vec::new(),
        couplings,
        table,
    })
}

pub(crate) fn restore(
    side: usize,
    levels: Vec<ConnectivityLevel>,
    edges: Vec<(usize, usize, f64)>,
    width: usize,
) -> Result<Lattice, SgError> {
    let mut lattice = from_couplings(side, edges, Some(width))?;
    lattice.levels = levels;
    Ok(lattice)
}
