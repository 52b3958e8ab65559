use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};

/// Largest supported connectivity level.
pub const MAX_LEVEL: u8 = 7;

/// Canonical half-set of `(d_row, d_col)` offsets per shell, level 1 first.
///
/// Each unordered neighbour pair is reachable by exactly one listed offset; the
/// reverse direction is implied. The order inside each shell fixes the order in
/// which couplings are drawn.
const SHELLS: [&[(i32, i32)]; MAX_LEVEL as usize] = [
    &[(0, 1), (1, 0)],
    &[(-1, 1), (1, 1)],
    &[(0, 2), (2, 0)],
    &[(-2, 1), (-1, 2), (1, 2), (2, 1)],
    &[(0, 3), (3, 0)],
    &[(-2, 2), (2, 2)],
    &[(-3, 1), (-1, 3), (1, 3), (3, 1)],
];

/// A validated connectivity level in `[1, 7]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ConnectivityLevel(u8);

impl ConnectivityLevel {
    /// Validates a raw level.
    pub fn new(level: u8) -> Result<Self, SgError> {
        if level == 0 || level > MAX_LEVEL {
            return Err(SgError::InvalidConnectivityLevel(
                ErrorInfo::new("level-out-of-range", "connectivity level must lie in [1, 7]")
                    .with_context("level", level),
            ));
        }
        Ok(Self(level))
    }

    /// Raw level value.
    pub fn get(&self) -> u8 {
        self.0
    }

    /// Offsets defining this shell, in draw order.
    pub fn offsets(&self) -> &'static [(i32, i32)] {
        SHELLS[(self.0 - 1) as usize]
    }

    /// Euclidean length of the shell's offsets.
    pub fn distance(&self) -> f64 {
        let (d_row, d_col) = self.offsets()[0];
        ((d_row * d_row + d_col * d_col) as f64).sqrt()
    }

    /// Slot width used by legacy coupling files: 4, or 8 for levels 3 and 6.
    pub fn legacy_width(&self) -> usize {
        match self.0 {
            3 | 6 => 8,
            _ => 4,
        }
    }

    /// Interior degree contributed by this shell: two directions per offset.
    pub fn exact_width(&self) -> usize {
        2 * self.offsets().len()
    }

    /// All supported levels in ascending order.
    pub fn all() -> impl Iterator<Item = ConnectivityLevel> {
        (1..=MAX_LEVEL).map(ConnectivityLevel)
    }
}

impl TryFrom<u8> for ConnectivityLevel {
    type Error = SgError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        ConnectivityLevel::new(value)
    }
}

impl From<ConnectivityLevel> for u8 {
    fn from(value: ConnectivityLevel) -> Self {
        value.0
    }
}

/// Rule used to size the dense neighbour table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidthPolicy {
    /// Sum of `2 x offsets` over the selected shells; never overflows.
    #[default]
    Exact,
    /// Maximum of the legacy per-level width (4, or 8 for levels 3 and 6).
    ///
    /// Matches graphs produced by older tooling. Level 4 or 7 alone, or any
    /// combination of shells, exceeds this width on interior sites and the
    /// builder reports [`SgError::NeighborSlotOverflow`].
    Legacy,
}

/// Validates raw levels, returning them sorted ascending without duplicates.
pub fn normalize_levels(levels: &[u8]) -> Result<Vec<ConnectivityLevel>, SgError> {
    if levels.is_empty() {
        return Err(SgError::InvalidConnectivityLevel(ErrorInfo::new(
            "empty-levels",
            "at least one connectivity level is required",
        )));
    }
    let mut parsed = levels
        .iter()
        .map(|&level| ConnectivityLevel::new(level))
        .collect::<Result<Vec<_>, _>>()?;
    parsed.sort();
    parsed.dedup();
    Ok(parsed)
}

/// Neighbour-table width for the given shells under `policy`.
pub fn slot_width(levels: &[ConnectivityLevel], policy: WidthPolicy) -> usize {
    match policy {
        WidthPolicy::Exact => levels.iter().map(ConnectivityLevel::exact_width).sum(),
        WidthPolicy::Legacy => levels
            .iter()
            .map(ConnectivityLevel::legacy_width)
            .max()
            .unwrap_or(0),
    }
}
