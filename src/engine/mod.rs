//! Engine Interface
//!
//! The engine is the component that turns container bytes into PCM frames
//! and back. sndcore treats it as an opaque service:
//! - [`Engine`] opens sessions and answers session-less commands
//! - [`Session`] moves raw native samples, seeks, runs commands and closes
//!
//! Two engines ship with the crate:
//! - [`MemoryEngine`]: in-process volume, supports every command
//! - [`WavEngine`]: WAV files on disk via `hound`

pub mod command;
pub mod memory;
pub mod wav;

pub use command::Command;
pub use memory::MemoryEngine;
pub use wav::WavEngine;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::format::{NativeWidth, OpenMode, SoundInfo, Whence};

// ============================================================================
// Error codes
// ============================================================================

/// Numeric error code reported by an engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ErrorCode(pub i32);

impl ErrorCode {
    pub const NO_ERROR: ErrorCode = ErrorCode(0);
    pub const UNRECOGNISED_FORMAT: ErrorCode = ErrorCode(1);
    pub const SYSTEM: ErrorCode = ErrorCode(2);
    pub const MALFORMED_FILE: ErrorCode = ErrorCode(3);
    pub const UNSUPPORTED_ENCODING: ErrorCode = ErrorCode(4);

    pub const BAD_OPEN_MODE: ErrorCode = ErrorCode(10);
    pub const BAD_INFO: ErrorCode = ErrorCode(11);
    pub const NOT_READABLE: ErrorCode = ErrorCode(12);
    pub const NOT_WRITABLE: ErrorCode = ErrorCode(13);
    pub const NOT_SEEKABLE: ErrorCode = ErrorCode(14);
    pub const BAD_SEEK: ErrorCode = ErrorCode(15);
    pub const BAD_COMMAND_PARAM: ErrorCode = ErrorCode(16);
    pub const UNSUPPORTED_COMMAND: ErrorCode = ErrorCode(17);
    pub const BAD_BUFFER_WIDTH: ErrorCode = ErrorCode(18);

    pub fn is_error(self) -> bool {
        self != ErrorCode::NO_ERROR
    }

    /// Human readable description
    pub fn description(self) -> &'static str {
        match self {
            ErrorCode::NO_ERROR => "No error",
            ErrorCode::UNRECOGNISED_FORMAT => "Format not recognised",
            ErrorCode::SYSTEM => "System error",
            ErrorCode::MALFORMED_FILE => "Supported file format but file is malformed",
            ErrorCode::UNSUPPORTED_ENCODING => "Supported file format but unsupported encoding",
            ErrorCode::BAD_OPEN_MODE => "Open mode not supported for this file",
            ErrorCode::BAD_INFO => "Format descriptor is invalid for a new file",
            ErrorCode::NOT_READABLE => "File was not opened for reading",
            ErrorCode::NOT_WRITABLE => "File was not opened for writing",
            ErrorCode::NOT_SEEKABLE => "Stream is not seekable",
            ErrorCode::BAD_SEEK => "Seek position out of range",
            ErrorCode::BAD_COMMAND_PARAM => "Bad parameter passed to command",
            ErrorCode::UNSUPPORTED_COMMAND => "Command not supported by this engine or file",
            ErrorCode::BAD_BUFFER_WIDTH => "Raw buffer width does not match the native encoding",
            _ => "Unknown engine error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (code {})", self.description(), self.0)
    }
}

// ============================================================================
// Raw buffers
// ============================================================================

/// Native samples handed to an engine for writing
#[derive(Debug)]
pub enum RawBuffer<'a> {
    I16(&'a [i16]),
    I32(&'a [i32]),
    F32(&'a [f32]),
    F64(&'a [f64]),
}

/// Native sample storage an engine fills when reading
#[derive(Debug)]
pub enum RawBufferMut<'a> {
    I16(&'a mut [i16]),
    I32(&'a mut [i32]),
    F32(&'a mut [f32]),
    F64(&'a mut [f64]),
}

impl RawBuffer<'_> {
    pub fn len(&self) -> usize {
        match self {
            RawBuffer::I16(b) => b.len(),
            RawBuffer::I32(b) => b.len(),
            RawBuffer::F32(b) => b.len(),
            RawBuffer::F64(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> NativeWidth {
        match self {
            RawBuffer::I16(_) => NativeWidth::I16,
            RawBuffer::I32(_) => NativeWidth::I32,
            RawBuffer::F32(_) => NativeWidth::F32,
            RawBuffer::F64(_) => NativeWidth::F64,
        }
    }
}

impl RawBufferMut<'_> {
    pub fn len(&self) -> usize {
        match self {
            RawBufferMut::I16(b) => b.len(),
            RawBufferMut::I32(b) => b.len(),
            RawBufferMut::F32(b) => b.len(),
            RawBufferMut::F64(b) => b.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn width(&self) -> NativeWidth {
        match self {
            RawBufferMut::I16(_) => NativeWidth::I16,
            RawBufferMut::I32(_) => NativeWidth::I32,
            RawBufferMut::F32(_) => NativeWidth::F32,
            RawBufferMut::F64(_) => NativeWidth::F64,
        }
    }
}

// ============================================================================
// Engine traits
// ============================================================================

/// Opens sessions and answers commands that need no session
pub trait Engine {
    /// Open `path`
    ///
    /// For new files `info` carries the caller's descriptor. On success the
    /// engine overwrites `info` with the stream's actual description.
    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        info: &mut SoundInfo,
    ) -> std::result::Result<Box<dyn Session>, ErrorCode>;

    /// Session-less command (library version and the like)
    fn command(&self, command: Command, data: &mut [u8], arg: i32) -> i32;

    /// Text for an error code, used when no session exists to ask
    fn error_text(&self, code: ErrorCode) -> String {
        code.description().to_string()
    }
}

/// One open stream inside an engine
///
/// Sessions are not reentrant. The owning handle serializes every call.
/// Raw transfers move whole frames only; the buffer width must match the
/// stream's [`NativeWidth`].
pub trait Session: Send {
    /// Read native samples at the session position; returns items read
    ///
    /// A short count with [`Session::last_error`] clear means end of stream.
    fn read_raw(&mut self, buf: RawBufferMut<'_>) -> usize;

    /// Write native samples at the session position; returns items written
    fn write_raw(&mut self, buf: RawBuffer<'_>) -> usize;

    /// Reposition; returns the new absolute frame position
    fn seek(&mut self, frames: i64, whence: Whence) -> std::result::Result<u64, ErrorCode>;

    /// Run a command; see [`command`] for return conventions
    fn command(&mut self, command: Command, data: &mut [u8], arg: i32) -> i32;

    /// Code of the most recent failure
    fn last_error(&self) -> ErrorCode;

    /// Accumulated log text (open diagnostics, warnings)
    fn log_text(&self) -> String;

    /// Flush headers and release the stream
    ///
    /// Must not return until the flush is complete.
    fn close(&mut self) -> ErrorCode;
}
