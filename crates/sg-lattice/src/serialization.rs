use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sg_core::errors::{ErrorInfo, SgError};
use sg_core::provenance::SchemaVersion;

use crate::adjacency::{self, from_couplings, Lattice};
use crate::shells::ConnectivityLevel;

const LATTICE_SCHEMA: SchemaVersion = SchemaVersion::new(1, 0, 0);

/// Serializes the lattice to a compact binary representation using `bincode`.
pub fn lattice_to_bytes(lattice: &Lattice) -> Result<Vec<u8>, SgError> {
    bincode::serialize(&SerializableLattice::from_lattice(lattice))
        .map_err(|err| SgError::Serde(ErrorInfo::new("serialize-bytes", err.to_string())))
}

/// Restores a lattice from its binary representation.
pub fn lattice_from_bytes(bytes: &[u8]) -> Result<Lattice, SgError> {
    let serializable: SerializableLattice = bincode::deserialize(bytes)
        .map_err(|err| SgError::Serde(ErrorInfo::new("deserialize-bytes", err.to_string())))?;
    serializable.into_lattice()
}

/// Serializes the lattice to a JSON string.
pub fn lattice_to_json(lattice: &Lattice) -> Result<String, SgError> {
    serde_json::to_string_pretty(&SerializableLattice::from_lattice(lattice))
        .map_err(|err| SgError::Serde(ErrorInfo::new("serialize-json", err.to_string())))
}

/// Restores a lattice from a JSON string.
pub fn lattice_from_json(json: &str) -> Result<Lattice, SgError> {
    let serializable: SerializableLattice = serde_json::from_str(json)
        .map_err(|err| SgError::Serde(ErrorInfo::new("deserialize-json", err.to_string())))?;
    serializable.into_lattice()
}

/// Renders the couplings as text, one `a b J` line per edge in draw order.
pub fn couplings_to_text(lattice: &Lattice) -> String {
    let mut out = String::with_capacity(lattice.num_edges() * 32);
    for (a, b, coupling) in lattice.edges() {
        let _ = writeln!(out, "{a} {b} {coupling}");
    }
    out
}

/// Parses `a b J` lines into a lattice of the given side.
///
/// Blank lines and lines starting with `#` are ignored. The neighbour table is
/// sized to the largest site degree.
pub fn couplings_from_text(text: &str, side: usize) -> Result<Lattice, SgError> {
    let mut edges = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let parsed = match fields.as_slice() {
            [a, b, coupling] => a
                .parse::<usize>()
                .ok()
                .zip(b.parse::<usize>().ok())
                .zip(coupling.parse::<f64>().ok()),
            _ => None,
        };
        let Some(((a, b), coupling)) = parsed else {
            return Err(SgError::Serde(
                ErrorInfo::new("couplings-parse", "expected `a b coupling`")
                    .with_context("line", line_no + 1)
                    .with_context("content", line),
            ));
        };
        edges.push((a, b, coupling));
    }
    from_couplings(side, edges, None)
}

/// Writes the text coupling file.
pub fn write_couplings(path: &Path, lattice: &Lattice) -> Result<(), SgError> {
    ensure_parent(path)?;
    fs::write(path, couplings_to_text(lattice))
        .map_err(|err| SgError::io("couplings-write", err, path.display()))
}

/// Loads a coupling file: `.json` lattices keep their levels and width, any
/// other extension is read as `a b J` text on a grid of `side`.
pub fn load_couplings(path: &Path, side: usize) -> Result<Lattice, SgError> {
    let contents = fs::read_to_string(path)
        .map_err(|err| SgError::io("couplings-read", err, path.display()))?;
    let lattice = if path.extension().is_some_and(|ext| ext == "json") {
        lattice_from_json(&contents)?
    } else {
        couplings_from_text(&contents, side)?
    };
    if lattice.side() != side {
        return Err(SgError::ShapeMismatch(
            ErrorInfo::new("couplings-side", "coupling file side differs from configured side")
                .with_context("path", path.display())
                .with_context("file_side", lattice.side())
                .with_context("side", side),
        ));
    }
    Ok(lattice)
}

/// Writes the lattice as JSON.
pub fn write_lattice_json(path: &Path, lattice: &Lattice) -> Result<(), SgError> {
    ensure_parent(path)?;
    let json = lattice_to_json(lattice)?;
    fs::write(path, json).map_err(|err| SgError::io("lattice-write", err, path.display()))
}

fn ensure_parent(path: &Path) -> Result<(), SgError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|err| SgError::io("mkdir", err, parent.display()))?;
        }
    }
    Ok(())
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializableLattice {
    schema_version: SchemaVersion,
    side: usize,
    levels: Vec<ConnectivityLevel>,
    width: usize,
    edges: Vec<(usize, usize, f64)>,
}

impl SerializableLattice {
    fn from_lattice(lattice: &Lattice) -> Self {
        Self {
            schema_version: LATTICE_SCHEMA,
            side: lattice.side(),
            levels: lattice.levels().to_vec(),
            width: lattice.table().width(),
            edges: lattice.edges().collect(),
        }
    }

    fn into_lattice(self) -> Result<Lattice, SgError> {
        if self.schema_version.major != LATTICE_SCHEMA.major {
            return Err(SgError::Serde(
                ErrorInfo::new("schema-mismatch", "unsupported lattice schema")
                    .with_context("major", self.schema_version.major),
            ));
        }
        adjacency::restore(self.side, self.levels, self.edges, self.width)
    }
}
