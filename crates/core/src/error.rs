//! Error types for the round reconstruction pipeline.

use crate::schema::Column;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the round reconstruction pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The telemetry decoder could not produce a tick stream or header.
    #[error("Decode failure for {}: {}", .path.display(), .message)]
    DecodeFailure { path: PathBuf, message: String },

    /// A required column is absent from the decoded stream.
    #[error("Missing required column: {0}")]
    MissingColumn(Column),

    /// No round survived outcome reconstruction.
    #[error("No round has a resolved outcome")]
    NoResolvedOutcome,

    /// The opening round economy failed the sanity check.
    #[error("Invalid opening economy: {0}")]
    InvalidOpeningEconomy(String),

    /// Round numbering of an accepted match is not contiguous from 1.
    #[error("Invalid round sequence: {0}")]
    InvalidRoundSequence(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (values present but unusable).
    #[error("Data error: {0}")]
    Data(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a decode failure for a file.
    pub fn decode(path: impl AsRef<Path>, msg: impl Into<String>) -> Self {
        Error::DecodeFailure {
            path: path.as_ref().to_path_buf(),
            message: msg.into(),
        }
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create an opening economy error.
    pub fn opening_economy(msg: impl Into<String>) -> Self {
        Error::InvalidOpeningEconomy(msg.into())
    }

    /// Create a round sequence error.
    pub fn round_sequence(msg: impl Into<String>) -> Self {
        Error::InvalidRoundSequence(msg.into())
    }

    /// Classify the error for per-file failure reporting.
    pub fn kind(&self) -> FailureKind {
        match self {
            Error::DecodeFailure { .. } | Error::Io(_) | Error::Json(_) => {
                FailureKind::DecodeFailure
            }
            Error::MissingColumn(_) => FailureKind::MissingColumn,
            Error::NoResolvedOutcome => FailureKind::NoResolvedOutcome,
            Error::InvalidOpeningEconomy(_) => FailureKind::InvalidOpeningEconomy,
            Error::InvalidRoundSequence(_) => FailureKind::InvalidRoundSequence,
            Error::Data(_) => FailureKind::DataError,
            Error::Config(_) | Error::Other(_) => FailureKind::Other,
        }
    }
}

/// Why a match file contributed no rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    DecodeFailure,
    MissingColumn,
    NoResolvedOutcome,
    InvalidOpeningEconomy,
    InvalidRoundSequence,
    DataError,
    /// The pipeline panicked on this file.
    Panic,
    Other,
}

impl FailureKind {
    /// Stable snake_case name, as serialized.
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::DecodeFailure => "decode_failure",
            FailureKind::MissingColumn => "missing_column",
            FailureKind::NoResolvedOutcome => "no_resolved_outcome",
            FailureKind::InvalidOpeningEconomy => "invalid_opening_economy",
            FailureKind::InvalidRoundSequence => "invalid_round_sequence",
            FailureKind::DataError => "data_error",
            FailureKind::Panic => "panic",
            FailureKind::Other => "other",
        }
    }
}
