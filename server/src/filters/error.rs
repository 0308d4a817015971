//! Filter engine error and diagnostic types

use thiserror::Error;

use crate::data::DataError;

/// Errors that fail a filter request outright
#[derive(Error, Debug)]
pub enum FilterError {
    /// Engine used before (or configured twice with) a data-access handle
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Fetch or count failed; no partial page is ever produced
    #[error("Backend execution failed: {0}")]
    Backend(#[from] DataError),
}

impl FilterError {
    pub fn not_configured() -> Self {
        Self::Configuration(
            "data access handle not configured; call FilterEngine::configure first".to_string(),
        )
    }
}

/// A single field could not be read; only that field is dropped
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldAccessError {
    #[error("field '{field}' cannot be read")]
    Unreadable { field: String },

    #[error("field '{field}' expects {expected}, got {found}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

impl FieldAccessError {
    pub fn unreadable(field: impl Into<String>) -> Self {
        Self::Unreadable {
            field: field.into(),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            Self::Unreadable { field } | Self::TypeMismatch { field, .. } => field,
        }
    }
}

/// Which end of a range a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Lower,
    Upper,
}

impl std::fmt::Display for Bound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Bound::Lower => write!(f, "lower"),
            Bound::Upper => write!(f, "upper"),
        }
    }
}

/// Recoverable problems recorded while translating a request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterDiagnostic {
    #[error("{0}")]
    FieldAccess(FieldAccessError),

    #[error("range filter on unknown field '{field}' ignored")]
    UnknownRangeField { field: String },

    #[error("range filter on identifier field '{field}' ignored")]
    IdentifierRange { field: String },

    #[error("{bound} bound of range on '{field}' has incompatible type {found}")]
    InvalidRangeBound {
        field: String,
        bound: Bound,
        found: &'static str,
    },

    /// Kept as a predicate; matches no rows
    #[error("range on '{field}' has lower bound above upper bound")]
    InvertedRange { field: String },

    #[error("sort by unknown field '{field}' ignored")]
    UnknownSortField { field: String },
}
