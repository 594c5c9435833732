//! Error types for saxsplot-core
//!
//! Three failure classes exist:
//! - invalid parameters (bad wavelength, malformed rule table) always
//!   surface to the caller,
//! - unavailable backing data degrades a curve during session decode
//!   instead of failing the load,
//! - structurally invalid session input fails the decode call.

use saxsplot_io::LoadError;
use thiserror::Error;

/// Main error type for saxsplot operations
#[derive(Debug, Error)]
pub enum CoreError {
    /// A caller-supplied parameter is out of range or malformed
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Session encode/decode errors
    #[error("session error: {0}")]
    Session(#[from] SessionError),

    /// Measurement file loading errors
    #[error("failed to load data: {0}")]
    Load(#[from] LoadError),
}

/// Errors raised by structurally invalid session input
///
/// These are fatal to the decode call. Missing backing data is not in
/// this category; it degrades the affected curve and emits a warning.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Container parsed but does not describe a valid session
    #[error("malformed session: {0}")]
    Malformed(String),

    /// No version tag in the persisted form
    #[error("session has no version tag")]
    MissingVersion,

    /// Version tag from a newer, incompatible writer
    #[error("unsupported session version {found}")]
    UnsupportedVersion { found: u64 },

    /// Unparseable container
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for saxsplot operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type alias for session codec operations
pub type SessionResult<T> = Result<T, SessionError>;
