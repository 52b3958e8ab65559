//! Structured error types shared across the spin-glass crates.

use std::collections::BTreeMap;
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to every [`SgError`] variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Stable machine readable error code.
    pub code: String,
    /// Human readable diagnostic message.
    pub message: String,
    /// Offending values (levels, sites, sizes, paths).
    #[serde(default)]
    pub context: BTreeMap<String, String>,
    /// Optional hint that may help the caller resolve the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorInfo {
    /// Creates a new error payload with the provided code and message.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: BTreeMap::new(),
            hint: None,
        }
    }

    /// Adds a context entry to the payload.
    pub fn with_context(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.context.insert(key.into(), value.to_string());
        self
    }

    /// Sets a human readable hint for remediation.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Canonical error type for lattice construction, energies and resampling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[serde(tag = "family", content = "detail")]
pub enum SgError {
    /// A connectivity level outside `[1, 7]` (or an empty level set).
    #[error("invalid connectivity level: {0}")]
    InvalidConnectivityLevel(ErrorInfo),
    /// More edges at a site than the neighbour table width allows.
    #[error("neighbour slot overflow: {0}")]
    NeighborSlotOverflow(ErrorInfo),
    /// Requested resample size is zero or larger than the batch.
    #[error("resample size error: {0}")]
    ResampleSize(ErrorInfo),
    /// Configuration, coupling or archive dimensions disagree with the lattice.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(ErrorInfo),
    /// Invalid run configuration values.
    #[error("config error: {0}")]
    Config(ErrorInfo),
    /// I/O, serialization and schema errors.
    #[error("serde error: {0}")]
    Serde(ErrorInfo),
}

impl Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code: {})", self.message, self.code)?;
        if !self.context.is_empty() {
            write!(f, " | context: [")?;
            for (idx, (key, value)) in self.context.iter().enumerate() {
                if idx > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{key}={value}")?;
            }
            write!(f, "]")?;
        }
        if let Some(hint) = &self.hint {
            write!(f, " | hint: {hint}")?;
        }
        Ok(())
    }
}

impl SgError {
    /// Returns a reference to the payload describing the error.
    pub fn info(&self) -> &ErrorInfo {
        match self {
            SgError::InvalidConnectivityLevel(info)
            | SgError::NeighborSlotOverflow(info)
            | SgError::ResampleSize(info)
            | SgError::ShapeMismatch(info)
            | SgError::Config(info)
            | SgError::Serde(info) => info,
        }
    }

    /// Shorthand for an I/O or serialization failure tied to a path.
    pub fn io(code: &str, err: impl ToString, path: impl ToString) -> Self {
        SgError::Serde(ErrorInfo::new(code, err.to_string()).with_context("path", path))
    }
}
