//! Error handling for sndcore
//!
//! Every engine-reported failure is surfaced as a typed [`SoundError`]
//! carrying the engine's numeric code. Nothing is retried internally.
//! Short transfers and absent metadata records are not errors.

use std::path::PathBuf;

use thiserror::Error;

use crate::engine::{Command, ErrorCode};
use crate::format::OpenMode;

/// Result type alias for sndcore operations
pub type Result<T> = std::result::Result<T, SoundError>;

/// Main error type for sndcore operations
#[derive(Error, Debug)]
pub enum SoundError {
    // Lifecycle Errors
    #[error("Failed to open {}: {message}", path.display())]
    Open {
        path: PathBuf,
        code: ErrorCode,
        message: String,
    },

    #[error("Failed to close {}: {message}", path.display())]
    Close {
        path: PathBuf,
        code: ErrorCode,
        message: String,
    },

    #[error("Operation '{operation}' is not permitted on a handle opened for {mode}")]
    Mode {
        operation: &'static str,
        mode: OpenMode,
    },

    #[error("Operation '{operation}' attempted on a closed handle")]
    State { operation: &'static str },

    // Positioning Errors
    #[error("Seek failed: {reason}")]
    Seek { reason: String, code: ErrorCode },

    // Transfer Errors
    #[error("Transfer failed after {transferred} items: {message}")]
    Transfer {
        code: ErrorCode,
        message: String,
        transferred: usize,
    },

    #[error("Buffer of {len} items is not a whole number of {channels}-channel frames")]
    Misaligned { len: usize, channels: usize },

    // Command Errors
    #[error("Command {command} failed: {message}")]
    Command {
        command: Command,
        code: ErrorCode,
        message: String,
        /// Engine log text at the time of the failure
        log: String,
    },

    #[error("Invalid metadata record: {reason}")]
    InvalidRecord { reason: String },
}

impl SoundError {
    /// Get the error code tag for this error type
    pub fn error_code(&self) -> &'static str {
        match self {
            SoundError::Open { .. } => "OPEN_FAILED",
            SoundError::Close { .. } => "CLOSE_FAILED",
            SoundError::Mode { .. } => "MODE",
            SoundError::State { .. } => "STATE",
            SoundError::Seek { .. } => "SEEK",
            SoundError::Transfer { .. } => "TRANSFER",
            SoundError::Misaligned { .. } => "MISALIGNED",
            SoundError::Command { .. } => "COMMAND",
            SoundError::InvalidRecord { .. } => "INVALID_RECORD",
        }
    }

    /// The engine's numeric error code, for errors the engine reported
    pub fn engine_code(&self) -> Option<ErrorCode> {
        match self {
            SoundError::Open { code, .. }
            | SoundError::Close { code, .. }
            | SoundError::Seek { code, .. }
            | SoundError::Transfer { code, .. }
            | SoundError::Command { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Check if the caller can fix this error by changing its own request
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SoundError::Mode { .. }
                | SoundError::Seek { .. }
                | SoundError::Misaligned { .. }
                | SoundError::InvalidRecord { .. }
        )
    }

    pub(crate) fn invalid_record(reason: impl Into<String>) -> Self {
        SoundError::InvalidRecord {
            reason: reason.into(),
        }
    }
}
