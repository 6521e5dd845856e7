//! Frame position tracking
//!
//! The handle mirrors the engine's position so seeks can be validated before
//! they reach the engine and `seek(0, Current)` needs no engine call.

use serde::{Deserialize, Serialize};

use crate::engine::ErrorCode;
use crate::error::{Result, SoundError};
use crate::format::Whence;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cursor {
    position: u64,
    frames: u64,
    seekable: bool,
}

impl Cursor {
    pub fn new(frames: u64, seekable: bool) -> Self {
        Cursor {
            position: 0,
            frames,
            seekable,
        }
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn is_seekable(&self) -> bool {
        self.seekable
    }

    /// Frames left before end of stream
    pub fn remaining(&self) -> u64 {
        self.frames.saturating_sub(self.position)
    }

    pub fn advance_read(&mut self, frames: u64) {
        self.position = (self.position + frames).min(self.frames);
    }

    /// Move past written frames, growing the stream when writing at its end
    pub fn advance_write(&mut self, frames: u64) {
        self.position += frames;
        self.frames = self.frames.max(self.position);
    }

    pub fn set_position(&mut self, position: u64) {
        self.position = position;
    }

    /// Adopt a frame count reported by the engine
    pub fn set_frames(&mut self, frames: u64) {
        self.frames = frames;
        self.position = self.position.min(frames);
    }

    /// Cut the stream to `frames` and park the position there
    pub fn truncate(&mut self, frames: u64) {
        self.frames = frames;
        self.position = frames;
    }

    /// Absolute target of a seek request
    ///
    /// `can_read` gates `Whence::End`: a write-only stream has no readable
    /// end to measure from. Targets must land in `0..=frames`.
    pub fn resolve(&self, offset: i64, whence: Whence, can_read: bool) -> Result<u64> {
        if !self.seekable {
            return Err(SoundError::Seek {
                reason: "stream is not seekable".to_string(),
                code: ErrorCode::NOT_SEEKABLE,
            });
        }

        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i64,
            Whence::End if can_read => self.frames as i64,
            Whence::End => {
                return Err(SoundError::Seek {
                    reason: "seeking from the end requires a readable handle".to_string(),
                    code: ErrorCode::BAD_SEEK,
                })
            }
        };

        let target = base.checked_add(offset).ok_or_else(|| SoundError::Seek {
            reason: format!("offset {} overflows", offset),
            code: ErrorCode::BAD_SEEK,
        })?;

        if target < 0 || target as u64 > self.frames {
            return Err(SoundError::Seek {
                reason: format!(
                    "target frame {} outside 0..={} ({:?} {:+})",
                    target, self.frames, whence, offset
                ),
                code: ErrorCode::BAD_SEEK,
            });
        }

        Ok(target as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bounds() {
        let mut cursor = Cursor::new(100, true);
        cursor.set_position(40);

        assert_eq!(cursor.resolve(10, Whence::Start, true).unwrap(), 10);
        assert_eq!(cursor.resolve(-40, Whence::Current, true).unwrap(), 0);
        assert_eq!(cursor.resolve(0, Whence::End, true).unwrap(), 100);
        assert_eq!(cursor.resolve(100, Whence::Start, true).unwrap(), 100);

        assert!(cursor.resolve(-41, Whence::Current, true).is_err());
        assert!(cursor.resolve(1, Whence::End, true).is_err());
        assert!(cursor.resolve(i64::MAX, Whence::Current, true).is_err());
    }

    #[test]
    fn test_end_requires_read_access() {
        let cursor = Cursor::new(10, true);
        let err = cursor.resolve(-1, Whence::End, false).unwrap_err();
        assert_eq!(err.engine_code(), Some(ErrorCode::BAD_SEEK));
    }

    #[test]
    fn test_unseekable_rejects_everything() {
        let cursor = Cursor::new(10, false);
        let err = cursor.resolve(0, Whence::Current, true).unwrap_err();
        assert_eq!(err.engine_code(), Some(ErrorCode::NOT_SEEKABLE));
    }

    #[test]
    fn test_write_extends_and_truncate_parks() {
        let mut cursor = Cursor::new(0, true);
        cursor.advance_write(100);
        assert_eq!(cursor.frames(), 100);
        cursor.set_position(10);
        cursor.advance_write(5);
        assert_eq!(cursor.frames(), 100);

        cursor.truncate(20);
        assert_eq!((cursor.position(), cursor.frames()), (20, 20));
        cursor.advance_read(50);
        assert_eq!(cursor.remaining(), 0);
    }
}
