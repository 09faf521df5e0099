//! Error types and exit-code mapping for `snare`.
//!
//! Line-level failures (malformed input, unknown methods) are answered
//! in-band with JSON-RPC errors and never surface here; this hierarchy
//! covers the faults that can actually take the process down.

use thiserror::Error;

// ============================================================================
// Exit Codes
// ============================================================================

/// Exit codes for `snare` CLI operations.
///
/// Clean input-closure shutdown is `SUCCESS`; any uncaught fault in the
/// main loop maps to `ERROR`.
pub struct ExitCode;

impl ExitCode {
    /// Successful execution (clean EOF shutdown).
    pub const SUCCESS: i32 = 0;

    /// Uncaught fault in the main loop.
    pub const ERROR: i32 = 1;

    /// Configuration error (invalid environment value).
    pub const CONFIG_ERROR: i32 = 2;

    /// I/O error on the transport.
    pub const IO_ERROR: i32 = 3;

    /// Usage error (invalid arguments).
    pub const USAGE_ERROR: i32 = 64;

    /// Interrupted by SIGINT (Ctrl+C).
    pub const INTERRUPTED: i32 = 130;

    /// Terminated by SIGTERM.
    pub const TERMINATED: i32 = 143;
}

// ============================================================================
// Top-Level Error
// ============================================================================

/// Top-level error type for `snare` operations.
#[derive(Debug, Error)]
pub enum SnareError {
    /// Configuration error that cannot be recovered by a fallback.
    #[error("configuration error: {0}")]
    Config(String),

    /// Transport layer error.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Uncaught fault in the main loop.
    #[error("fatal: {0}")]
    Fatal(String),
}

impl SnareError {
    /// Returns the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => ExitCode::CONFIG_ERROR,
            Self::Transport(_) | Self::Io(_) => ExitCode::IO_ERROR,
            Self::Json(_) | Self::Fatal(_) => ExitCode::ERROR,
        }
    }
}

// ============================================================================
// Transport Errors
// ============================================================================

/// Errors raised by the stdio transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Reading from stdin failed.
    #[error("failed to read from input: {0}")]
    Read(std::io::Error),

    /// Writing to stdout failed.
    #[error("failed to write to output: {0}")]
    Write(std::io::Error),

    /// A message could not be serialized for the wire.
    #[error("failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),
}
