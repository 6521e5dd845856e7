//! Typed engine commands on an open handle

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

use super::SoundFile;
use crate::engine::command::{self, AMBISONIC_B_FORMAT, AMBISONIC_NONE, TRUE};
use crate::engine::{Command, Engine, ErrorCode, Session};
use crate::error::{Result, SoundError};

/// Ambisonic tag of a WAVEX file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ambisonic {
    None,
    BFormat,
}

impl Ambisonic {
    pub fn raw(self) -> i32 {
        match self {
            Ambisonic::None => AMBISONIC_NONE,
            Ambisonic::BFormat => AMBISONIC_B_FORMAT,
        }
    }

    pub fn from_raw(code: i32) -> Option<Self> {
        match code {
            AMBISONIC_NONE => Some(Ambisonic::None),
            AMBISONIC_B_FORMAT => Some(Ambisonic::BFormat),
            _ => None,
        }
    }
}

/// Location of the audio payload inside its container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedFileInfo {
    pub offset: i64,
    pub length: i64,
}

pub(super) fn command_error(session: &dyn Session, command: Command) -> SoundError {
    let code = session.last_error();
    SoundError::Command {
        command,
        code,
        message: code.description().to_string(),
        log: session.log_text(),
    }
}

/// Session-less string query using the length-then-copy protocol
fn query_text(mut run: impl FnMut(&mut [u8]) -> i32) -> String {
    let len = run(&mut []).max(0) as usize;
    let mut buf = vec![0u8; len];
    let copied = run(&mut buf).clamp(0, len as i32) as usize;
    buf.truncate(copied);
    String::from_utf8_lossy(&buf).into_owned()
}

/// Version string of the engine's backing library
pub fn library_version(engine: &dyn Engine) -> String {
    query_text(|buf| {
        let len = buf.len() as i32;
        engine.command(Command::GET_LIB_VERSION, buf, len)
    })
}

/// Session-less command passthrough; the payload layout is the caller's business
pub fn engine_command(engine: &dyn Engine, command: Command, data: &mut [u8], arg: i32) -> i32 {
    engine.command(command, data, arg)
}

impl SoundFile {
    /// Run a command whose return value is meaningful; fails only when the
    /// engine flags an error
    fn flag_command(
        &mut self,
        operation: &'static str,
        command: Command,
        data: &mut [u8],
        arg: i32,
    ) -> Result<i32> {
        let session = self.live_session(operation)?;
        let result = session.command(command, data, arg);
        if session.last_error().is_error() {
            return Err(command_error(session, command));
        }
        Ok(result)
    }

    /// Run a command that returns 0 on success
    fn scalar_command(
        &mut self,
        operation: &'static str,
        command: Command,
        data: &mut [u8],
    ) -> Result<()> {
        let session = self.live_session(operation)?;
        let result = session.command(command, data, 0);
        if result != 0 || session.last_error().is_error() {
            return Err(command_error(session, command));
        }
        Ok(())
    }

    fn toggle(&mut self, operation: &'static str, command: Command, on: bool) -> Result<bool> {
        Ok(self.flag_command(operation, command, &mut [], on as i32)? == TRUE)
    }

    // ========================================================================
    // Conversion settings
    // ========================================================================

    /// Set `f32` normalization; returns the previous value
    pub fn set_float_normalization(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_float_normalization", Command::SET_NORM_FLOAT, on)?;
        let previous = self.settings.normalize_float;
        self.settings.normalize_float = on;
        Ok(previous)
    }

    pub fn float_normalization(&self) -> Result<bool> {
        self.require_open("float_normalization")?;
        Ok(self.settings.normalize_float)
    }

    /// Set `f64` normalization; returns the previous value
    pub fn set_double_normalization(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_double_normalization", Command::SET_NORM_DOUBLE, on)?;
        let previous = self.settings.normalize_double;
        self.settings.normalize_double = on;
        Ok(previous)
    }

    pub fn double_normalization(&self) -> Result<bool> {
        self.require_open("double_normalization")?;
        Ok(self.settings.normalize_double)
    }

    /// Clamp float-to-integer writes; returns the previous value
    pub fn set_clipping(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_clipping", Command::SET_CLIPPING, on)?;
        let previous = self.settings.clipping;
        self.settings.clipping = on;
        Ok(previous)
    }

    pub fn clipping(&self) -> Result<bool> {
        self.require_open("clipping")?;
        Ok(self.settings.clipping)
    }

    pub fn set_float_int_scale_read(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_float_int_scale_read", Command::SET_SCALE_FLOAT_INT_READ, on)?;
        let previous = self.settings.float_int_scale_read;
        self.settings.float_int_scale_read = on;
        Ok(previous)
    }

    pub fn set_int_float_scale_write(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_int_float_scale_write", Command::SET_SCALE_INT_FLOAT_WRITE, on)?;
        let previous = self.settings.int_float_scale_write;
        self.settings.int_float_scale_write = on;
        Ok(previous)
    }

    // ========================================================================
    // Header and length
    // ========================================================================

    /// Cut the stream to `frames`; the cursor moves to the new end
    pub fn truncate(&mut self, frames: u64) -> Result<()> {
        self.live_session("truncate")?;
        self.require_write("truncate")?;
        let Ok(count) = i64::try_from(frames) else {
            let session = self.live_session("truncate")?;
            return Err(SoundError::Command {
                command: Command::FILE_TRUNCATE,
                code: ErrorCode::BAD_COMMAND_PARAM,
                message: format!("{} frames is past the engine's range", frames),
                log: session.log_text(),
            });
        };
        let mut data = [0u8; 8];
        NativeEndian::write_i64(&mut data, count);
        self.scalar_command("truncate", Command::FILE_TRUNCATE, &mut data)?;
        self.cursor.truncate(frames);
        self.info.frames = count;
        Ok(())
    }

    pub fn update_header_now(&mut self) -> Result<()> {
        self.scalar_command("update_header_now", Command::UPDATE_HEADER_NOW, &mut [])
    }

    /// Rewrite the header after every write; returns the previous value
    pub fn set_update_header_auto(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_update_header_auto", Command::SET_UPDATE_HEADER_AUTO, on)
    }

    // ========================================================================
    // Diagnostics and signal statistics
    // ========================================================================

    /// Engine log text for this stream
    pub fn log_info(&mut self) -> Result<String> {
        let session = self.live_session("log_info")?;
        Ok(query_text(|buf| {
            let len = buf.len() as i32;
            session.command(Command::GET_LOG_INFO, buf, len)
        }))
    }

    pub fn calc_signal_max(&mut self) -> Result<f64> {
        self.signal_stat("calc_signal_max", Command::CALC_SIGNAL_MAX)
    }

    pub fn calc_norm_signal_max(&mut self) -> Result<f64> {
        self.signal_stat("calc_norm_signal_max", Command::CALC_NORM_SIGNAL_MAX)
    }

    pub fn calc_max_all_channels(&mut self) -> Result<Vec<f64>> {
        self.channel_stat("calc_max_all_channels", Command::CALC_MAX_ALL_CHANNELS)
    }

    pub fn calc_norm_max_all_channels(&mut self) -> Result<Vec<f64>> {
        self.channel_stat("calc_norm_max_all_channels", Command::CALC_NORM_MAX_ALL_CHANNELS)
    }

    fn signal_stat(&mut self, operation: &'static str, command: Command) -> Result<f64> {
        let mut data = [0u8; 8];
        self.scalar_command(operation, command, &mut data)?;
        Ok(NativeEndian::read_f64(&data))
    }

    fn channel_stat(&mut self, operation: &'static str, command: Command) -> Result<Vec<f64>> {
        let channels = self.info.channel_count();
        let mut data = vec![0u8; channels * 8];
        self.scalar_command(operation, command, &mut data)?;
        Ok(command::get_f64_vec(&data, channels).unwrap_or_default())
    }

    /// Peak stored in the file's peak chunk, if it has one
    pub fn signal_max(&mut self) -> Result<Option<f64>> {
        let mut data = [0u8; 8];
        let found = self.flag_command("signal_max", Command::GET_SIGNAL_MAX, &mut data, 0)?;
        Ok((found == TRUE).then(|| NativeEndian::read_f64(&data)))
    }

    /// Per-channel peaks stored in the file's peak chunk, if it has one
    pub fn max_all_channels(&mut self) -> Result<Option<Vec<f64>>> {
        let channels = self.info.channel_count();
        let mut data = vec![0u8; channels * 8];
        let found =
            self.flag_command("max_all_channels", Command::GET_MAX_ALL_CHANNELS, &mut data, 0)?;
        if found != TRUE {
            return Ok(None);
        }
        Ok(command::get_f64_vec(&data, channels))
    }

    /// Ask for a peak chunk on close; false if the encoding cannot carry one
    pub fn set_add_peak_chunk(&mut self, on: bool) -> Result<bool> {
        self.toggle("set_add_peak_chunk", Command::SET_ADD_PEAK_CHUNK, on)
    }

    // ========================================================================
    // Container specifics
    // ========================================================================

    /// Byte offset of sample data in a headerless file
    pub fn set_raw_start_offset(&mut self, offset: i64) -> Result<()> {
        let mut data = [0u8; 8];
        command::put_i64(&mut data, offset);
        self.scalar_command("set_raw_start_offset", Command::SET_RAW_START_OFFSET, &mut data)
    }

    /// Encoder quality in 0.0..=1.0 for variable bit rate codecs
    pub fn set_vbr_quality(&mut self, quality: f64) -> Result<()> {
        let mut data = [0u8; 8];
        command::put_f64(&mut data, quality);
        self.scalar_command("set_vbr_quality", Command::SET_VBR_ENCODING_QUALITY, &mut data)
    }

    /// Whether raw sample bytes are in the opposite of host byte order
    pub fn raw_needs_endswap(&mut self) -> Result<bool> {
        let result =
            self.flag_command("raw_needs_endswap", Command::RAW_DATA_NEEDS_ENDSWAP, &mut [], 0)?;
        Ok(result == TRUE)
    }

    pub fn embedded_file_info(&mut self) -> Result<EmbeddedFileInfo> {
        let mut data = [0u8; 16];
        self.scalar_command("embedded_file_info", Command::GET_EMBED_FILE_INFO, &mut data)?;
        Ok(EmbeddedFileInfo {
            offset: NativeEndian::read_i64(&data[0..8]),
            length: NativeEndian::read_i64(&data[8..16]),
        })
    }

    /// Ambisonic tag; `None` for containers other than WAVEX
    pub fn wavex_ambisonic(&mut self) -> Result<Option<Ambisonic>> {
        let result =
            self.flag_command("wavex_ambisonic", Command::WAVEX_GET_AMBISONIC, &mut [], 0)?;
        Ok(Ambisonic::from_raw(result))
    }

    /// Tag a WAVEX file; false if the container does not take the tag
    pub fn set_wavex_ambisonic(&mut self, ambisonic: Ambisonic) -> Result<bool> {
        let result = self.flag_command(
            "set_wavex_ambisonic",
            Command::WAVEX_SET_AMBISONIC,
            &mut [],
            ambisonic.raw(),
        )?;
        Ok(result == ambisonic.raw())
    }

    /// Untyped command passthrough
    ///
    /// The payload layout and return value are whatever the engine defines for
    /// `command`; nothing is checked or interpreted here.
    pub fn raw_command(&mut self, command: Command, data: &mut [u8], arg: i32) -> Result<i32> {
        let session = self.live_session("raw_command")?;
        Ok(session.command(command, data, arg))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::MemoryEngine;
    use crate::format::{FormatCode, MajorFormat, OpenMode, SoundInfo, SubFormat};

    fn open(engine: &MemoryEngine, path: &str, format: FormatCode, channels: i32) -> SoundFile {
        let info = SoundInfo::new(8000, channels, format);
        SoundFile::open(engine, path, OpenMode::ReadWrite, info).unwrap()
    }

    #[test]
    fn test_normalization_round_trip() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "n.wav", MajorFormat::Wav | SubFormat::Pcm16, 1);
        assert!(file.set_float_normalization(false).unwrap());
        assert!(!file.float_normalization().unwrap());
        assert!(!file.set_float_normalization(true).unwrap());
        assert!(file.float_normalization().unwrap());

        assert!(file.set_double_normalization(false).unwrap());
        assert!(!file.double_normalization().unwrap());
        assert!(!file.set_clipping(true).unwrap());
        assert!(file.clipping().unwrap());
    }

    #[test]
    fn test_settings_unavailable_after_close() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "c.wav", MajorFormat::Wav | SubFormat::Pcm16, 1);
        file.close().unwrap();

        for result in [
            file.float_normalization(),
            file.double_normalization(),
            file.clipping(),
        ] {
            assert!(matches!(result, Err(SoundError::State { .. })));
        }
        assert!(file.set_clipping(true).is_err());
    }

    #[test]
    fn test_failed_truncate_carries_log() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "t.raw", MajorFormat::Raw | SubFormat::Pcm16, 1);
        file.write_frames(&[0i16; 10]).unwrap();
        file.update_header_now().unwrap();

        match file.truncate(11).unwrap_err() {
            SoundError::Command {
                command, code, log, ..
            } => {
                assert_eq!(command, Command::FILE_TRUNCATE);
                assert_eq!(code, ErrorCode::BAD_COMMAND_PARAM);
                assert!(log.contains("Memory volume : t.raw"));
                assert!(log.contains("Header        : 10 frames"));
                assert!(log.contains("FILE_TRUNCATE : Bad parameter"));
            }
            other => panic!("Expected Command error, got: {:?}", other),
        }
        assert_eq!(file.frames(), 10);
    }

    #[test]
    fn test_truncate_beyond_signed_range() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "big.raw", MajorFormat::Raw | SubFormat::Pcm16, 1);
        file.write_frames(&[0i16; 4]).unwrap();

        let err = file.truncate(u64::MAX).unwrap_err();
        assert!(matches!(err, SoundError::Command { .. }));
        assert_eq!(err.engine_code(), Some(ErrorCode::BAD_COMMAND_PARAM));
        assert_eq!(file.frames(), 4);
        assert_eq!(file.position(), 4);
    }

    #[test]
    fn test_library_version() {
        let engine = MemoryEngine::new();
        let version = library_version(&engine);
        assert!(version.starts_with("sndcore-memory-"));
        assert_eq!(
            engine_command(&engine, Command::GET_LIB_VERSION, &mut [], 0) as usize,
            version.len()
        );
    }

    #[test]
    fn test_log_info() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "log.aiff", MajorFormat::Aiff | SubFormat::Pcm16, 1);
        assert!(file.log_info().unwrap().contains("log.aiff"));
    }

    #[test]
    fn test_ambisonic_only_on_wavex() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "a.wav", MajorFormat::WavEx | SubFormat::Float, 4);
        assert_eq!(file.wavex_ambisonic().unwrap(), Some(Ambisonic::None));
        assert!(file.set_wavex_ambisonic(Ambisonic::BFormat).unwrap());
        assert_eq!(file.wavex_ambisonic().unwrap(), Some(Ambisonic::BFormat));

        let mut plain = open(&engine, "b.wav", MajorFormat::Wav | SubFormat::Float, 4);
        assert_eq!(plain.wavex_ambisonic().unwrap(), None);
        assert!(!plain.set_wavex_ambisonic(Ambisonic::BFormat).unwrap());
    }

    #[test]
    fn test_container_specific_commands() {
        let engine = MemoryEngine::new();
        let mut raw = open(&engine, "x.raw", MajorFormat::Raw | SubFormat::Pcm16, 1);
        raw.set_raw_start_offset(128).unwrap();
        raw.write_frames(&[1i16; 10]).unwrap();
        assert_eq!(
            raw.embedded_file_info().unwrap(),
            EmbeddedFileInfo {
                offset: 128,
                length: 20
            }
        );
        let err = raw.set_vbr_quality(0.5).unwrap_err();
        assert_eq!(err.engine_code(), Some(ErrorCode::UNSUPPORTED_COMMAND));

        let mut flac = open(&engine, "x.flac", MajorFormat::Flac | SubFormat::Pcm16, 1);
        flac.set_vbr_quality(0.5).unwrap();
        assert!(flac.set_vbr_quality(1.5).is_err());
        assert!(flac.set_raw_start_offset(0).is_err());
    }

    #[test]
    fn test_endswap_follows_host() {
        let engine = MemoryEngine::new();
        let mut big = open(&engine, "e.aiff", MajorFormat::Aiff | SubFormat::Pcm16, 1);
        let mut little = open(&engine, "e.wav", MajorFormat::Wav | SubFormat::Pcm16, 1);
        let host_little = cfg!(target_endian = "little");
        assert_eq!(big.raw_needs_endswap().unwrap(), host_little);
        assert_eq!(little.raw_needs_endswap().unwrap(), !host_little);
    }

    #[test]
    fn test_raw_command_passthrough() {
        let engine = MemoryEngine::new();
        let mut file = open(&engine, "p.wav", MajorFormat::Wav | SubFormat::Pcm24, 2);
        let mut buf = [0u8; SoundInfo::WIRE_SIZE];
        let result = file.raw_command(Command::GET_CURRENT_INFO, &mut buf, 0).unwrap();
        assert_eq!(result, TRUE);
        assert_eq!(SoundInfo::decode(&buf).unwrap().channels, 2);
        assert_eq!(file.raw_command(Command(0x4242), &mut [], 0).unwrap(), 0);
    }
}
