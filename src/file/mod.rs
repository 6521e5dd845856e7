//! File Handle
//!
//! [`SoundFile`] owns one engine session plus all per-handle state (format
//! descriptor, cursor, conversion settings). Every operation takes
//! `&mut self`, so calls into a session are serialized by construction.
//!
//! Lifecycle: `open` → any number of transfers, seeks and commands → `close`
//! (explicit, or on drop). Operations on a closed handle fail with
//! [`SoundError::State`].

mod chunks;
mod control;

pub use control::{engine_command, library_version, Ambisonic, EmbeddedFileInfo};

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cursor::Cursor;
use crate::engine::command::TRUE;
use crate::engine::{Command, Engine, ErrorCode, Session};
use crate::error::{Result, SoundError};
use crate::format::{OpenMode, SoundInfo, SubFormat, Whence};
use crate::transfer::{ConversionSettings, Sample, Stream};

/// An open sound file
pub struct SoundFile {
    session: Option<Box<dyn Session>>,
    path: PathBuf,
    mode: OpenMode,
    info: SoundInfo,
    subformat: SubFormat,
    cursor: Cursor,
    settings: ConversionSettings,
}

impl std::fmt::Debug for SoundFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoundFile")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("info", &self.info)
            .field("cursor", &self.cursor)
            .field("open", &self.session.is_some())
            .finish()
    }
}

impl SoundFile {
    /// Open `path` through `engine`
    ///
    /// For `Write` (and `ReadWrite` on a path that does not exist yet) `info`
    /// describes the new file; otherwise it is ignored and the engine's
    /// description is used.
    pub fn open(
        engine: &dyn Engine,
        path: impl AsRef<Path>,
        mode: OpenMode,
        info: SoundInfo,
    ) -> Result<Self> {
        let path = path.as_ref();

        if mode == OpenMode::Write {
            info.validate().map_err(|reason| SoundError::Open {
                path: path.to_path_buf(),
                code: ErrorCode::BAD_INFO,
                message: format!("invalid format descriptor: {}", reason),
            })?;
        }

        let mut actual = info;
        let mut session = engine
            .open(path, mode, &mut actual)
            .map_err(|code| SoundError::Open {
                path: path.to_path_buf(),
                code,
                message: engine.error_text(code),
            })?;

        let subformat = match actual.format.subtype() {
            Some(sub) if actual.channels >= 1 && actual.frames >= 0 => sub,
            _ => {
                let code = session.close();
                if code.is_error() {
                    warn!("Close after rejected open of {} failed: {}", path.display(), code);
                }
                return Err(SoundError::Open {
                    path: path.to_path_buf(),
                    code: ErrorCode::MALFORMED_FILE,
                    message: format!(
                        "engine reported an inconsistent descriptor ({} channels, {})",
                        actual.channels, actual.format
                    ),
                });
            }
        };

        let settings = ConversionSettings {
            normalize_float: session.command(Command::GET_NORM_FLOAT, &mut [], 0) == TRUE,
            normalize_double: session.command(Command::GET_NORM_DOUBLE, &mut [], 0) == TRUE,
            clipping: session.command(Command::GET_CLIPPING, &mut [], 0) == TRUE,
            ..ConversionSettings::default()
        };

        debug!(
            "Opened {} for {}: {} frames, {} Hz, {} channels, {}",
            path.display(),
            mode,
            actual.frames,
            actual.sample_rate,
            actual.channels,
            actual.format
        );

        Ok(SoundFile {
            session: Some(session),
            path: path.to_path_buf(),
            mode,
            info: actual,
            subformat,
            cursor: Cursor::new(actual.frames as u64, actual.seekable),
            settings,
        })
    }

    /// Open an existing file for reading
    pub fn open_read(engine: &dyn Engine, path: impl AsRef<Path>) -> Result<Self> {
        Self::open(engine, path, OpenMode::Read, SoundInfo::default())
    }

    /// Create a new file for writing
    pub fn create(engine: &dyn Engine, path: impl AsRef<Path>, info: SoundInfo) -> Result<Self> {
        Self::open(engine, path, OpenMode::Write, info)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Descriptor as of open (or the last [`SoundFile::refresh_info`])
    pub fn info(&self) -> &SoundInfo {
        &self.info
    }

    /// Current frame count, including frames written through this handle
    pub fn frames(&self) -> u64 {
        self.cursor.frames()
    }

    pub fn position(&self) -> u64 {
        self.cursor.position()
    }

    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    pub fn settings(&self) -> &ConversionSettings {
        &self.settings
    }

    fn live_session(&mut self, operation: &'static str) -> Result<&mut dyn Session> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(SoundError::State { operation }),
        }
    }

    fn require_open(&self, operation: &'static str) -> Result<()> {
        if self.session.is_none() {
            return Err(SoundError::State { operation });
        }
        Ok(())
    }

    fn require_read(&self, operation: &'static str) -> Result<()> {
        if !self.mode.can_read() {
            return Err(SoundError::Mode {
                operation,
                mode: self.mode,
            });
        }
        Ok(())
    }

    fn require_write(&self, operation: &'static str) -> Result<()> {
        if !self.mode.can_write() {
            return Err(SoundError::Mode {
                operation,
                mode: self.mode,
            });
        }
        Ok(())
    }

    fn stream(&mut self, operation: &'static str) -> Result<Stream<'_>> {
        let session = match self.session.as_deref_mut() {
            Some(session) => session,
            None => return Err(SoundError::State { operation }),
        };
        Ok(Stream {
            session,
            cursor: &mut self.cursor,
            settings: &self.settings,
            channels: self.info.channel_count(),
            subformat: self.subformat,
        })
    }

    /// Re-query the descriptor from the engine
    pub fn refresh_info(&mut self) -> Result<&SoundInfo> {
        let session = self.live_session("refresh_info")?;
        let mut buf = [0u8; SoundInfo::WIRE_SIZE];
        let ok = session.command(Command::GET_CURRENT_INFO, &mut buf, SoundInfo::WIRE_SIZE as i32)
            == TRUE;
        let decoded = if ok { SoundInfo::decode(&buf) } else { None };
        match decoded {
            Some(info) => {
                self.cursor.set_frames(info.frames.max(0) as u64);
                self.info = info;
                Ok(&self.info)
            }
            None => Err(control::command_error(session, Command::GET_CURRENT_INFO)),
        }
    }

    // ========================================================================
    // Transfers
    // ========================================================================

    /// Read up to `buf.len()` samples; fewer means end of stream
    pub fn read_items<T: Sample>(&mut self, buf: &mut [T]) -> Result<usize> {
        self.live_session("read")?;
        self.require_read("read")?;
        self.stream("read")?.read_items(buf)
    }

    /// Read whole frames; `buf.len()` must be a multiple of the channel count
    pub fn read_frames<T: Sample>(&mut self, buf: &mut [T]) -> Result<usize> {
        self.live_session("read")?;
        self.require_read("read")?;
        self.stream("read")?.read_frames(buf)
    }

    pub fn write_items<T: Sample>(&mut self, buf: &[T]) -> Result<usize> {
        self.live_session("write")?;
        self.require_write("write")?;
        self.stream("write")?.write_items(buf)
    }

    pub fn write_frames<T: Sample>(&mut self, buf: &[T]) -> Result<usize> {
        self.live_session("write")?;
        self.require_write("write")?;
        self.stream("write")?.write_frames(buf)
    }

    /// Reposition the shared read/write cursor; returns the new frame
    pub fn seek(&mut self, offset: i64, whence: Whence) -> Result<u64> {
        let can_read = self.mode.can_read();
        let target = self.cursor.resolve(offset, whence, can_read);
        let current = self.cursor.position();
        let session = self.live_session("seek")?;
        let target = target?;

        if target != current {
            session
                .seek(target as i64, Whence::Start)
                .map_err(|code| SoundError::Seek {
                    reason: format!("engine refused frame {}: {}", target, code.description()),
                    code,
                })?;
        }

        self.cursor.set_position(target);
        debug!("Seek {:?} {:+} -> frame {}", whence, offset, target);
        Ok(target)
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Flush and release the session; closing twice is a no-op
    pub fn close(&mut self) -> Result<()> {
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        let code = session.close();
        drop(session);

        if code.is_error() {
            return Err(SoundError::Close {
                path: self.path.clone(),
                code,
                message: code.description().to_string(),
            });
        }
        debug!("Closed {}", self.path.display());
        Ok(())
    }
}

impl Drop for SoundFile {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            warn!("{}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::format::MajorFormat;

    fn stereo_pcm16() -> SoundInfo {
        SoundInfo::new(44100, 2, MajorFormat::Wav | SubFormat::Pcm16)
    }

    #[test]
    fn test_open_rejects_invalid_descriptor() {
        let engine = MemoryEngine::new();
        let info = SoundInfo::new(44100, 0, MajorFormat::Wav | SubFormat::Pcm16);
        let err = SoundFile::create(&engine, "bad.wav", info).unwrap_err();
        assert_eq!(err.engine_code(), Some(ErrorCode::BAD_INFO));
        assert!(err.to_string().contains("channel count"));
    }

    #[test]
    fn test_open_missing_file() {
        let engine = MemoryEngine::new();
        let err = SoundFile::open_read(&engine, "missing.wav").unwrap_err();
        assert_eq!(err.error_code(), "OPEN_FAILED");
        assert_eq!(err.engine_code(), Some(ErrorCode::SYSTEM));
    }

    #[test]
    fn test_mode_errors() {
        let engine = MemoryEngine::new();
        let mut file = SoundFile::create(&engine, "w.wav", stereo_pcm16()).unwrap();
        let mut buf = [0i16; 4];
        assert!(matches!(
            file.read_frames(&mut buf),
            Err(SoundError::Mode { operation: "read", .. })
        ));
        file.write_frames(&buf).unwrap();
        file.close().unwrap();

        let mut file = SoundFile::open_read(&engine, "w.wav").unwrap();
        assert!(matches!(
            file.write_items(&buf),
            Err(SoundError::Mode { operation: "write", .. })
        ));
    }

    #[test]
    fn test_closed_handle_is_state_error() {
        let engine = MemoryEngine::new();
        let mut file = SoundFile::create(&engine, "c.wav", stereo_pcm16()).unwrap();
        file.close().unwrap();
        file.close().unwrap();
        assert!(!file.is_open());

        let err = file.write_frames(&[0i16; 2]).unwrap_err();
        assert!(matches!(err, SoundError::State { .. }));
        let err = file.seek(0, Whence::Start).unwrap_err();
        assert!(matches!(err, SoundError::State { operation: "seek" }));
    }

    #[test]
    fn test_drop_flushes() {
        let engine = MemoryEngine::new();
        {
            let mut file = SoundFile::create(&engine, "d.wav", stereo_pcm16()).unwrap();
            file.write_frames(&[1i16, 2, 3, 4]).unwrap();
        }
        assert_eq!(engine.stored_info("d.wav").unwrap().frames, 2);
    }

    #[test]
    fn test_refresh_info_tracks_writes() {
        let engine = MemoryEngine::new();
        let mut file =
            SoundFile::open(&engine, "r.wav", OpenMode::ReadWrite, stereo_pcm16()).unwrap();
        file.write_frames(&[0i16; 20]).unwrap();
        assert_eq!(file.info().frames, 0);
        assert_eq!(file.frames(), 10);
        assert_eq!(file.refresh_info().unwrap().frames, 10);
    }

    #[test]
    fn test_defaults_come_from_engine() {
        let engine = MemoryEngine::new();
        let file = SoundFile::create(&engine, "n.wav", stereo_pcm16()).unwrap();
        assert!(file.settings().normalize_float);
        assert!(file.settings().normalize_double);
        assert!(!file.settings().clipping);
    }
}
