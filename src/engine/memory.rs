//! In-process engine
//!
//! Streams live in a shared volume keyed by path. A session works on a private
//! copy of its stream and publishes it back on header updates and on close, so
//! a reopened path sees exactly what was last flushed.
//!
//! Samples are held as `f64`, which represents every native value exactly.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use super::command::{self, Command, AMBISONIC_B_FORMAT, AMBISONIC_NONE, FALSE, TRUE};
use super::{Engine, ErrorCode, RawBuffer, RawBufferMut, Session};
use crate::format::{Endianness, MajorFormat, NativeWidth, OpenMode, SoundInfo, SubFormat, Whence};
use crate::metadata::{BroadcastInfo, InstrumentInfo, LoopInfo, WireRecord};
use crate::transfer::convert::{read_scale, wrap_to_bits};

#[derive(Debug, Clone)]
struct StoredStream {
    info: SoundInfo,
    samples: Vec<f64>,
    loop_info: Option<Vec<u8>>,
    instrument: Option<Vec<u8>>,
    broadcast: Option<Vec<u8>>,
    peaks: Option<Vec<f64>>,
    ambisonic: i32,
    read_fault: Option<(u64, ErrorCode)>,
    write_limit: Option<u64>,
}

impl StoredStream {
    fn new(mut info: SoundInfo) -> Self {
        info.frames = 0;
        info.sections = 1;
        info.seekable = true;
        StoredStream {
            info,
            samples: Vec::new(),
            loop_info: None,
            instrument: None,
            broadcast: None,
            peaks: None,
            ambisonic: AMBISONIC_NONE,
            read_fault: None,
            write_limit: None,
        }
    }
}

type Volume = Arc<Mutex<HashMap<PathBuf, StoredStream>>>;

fn lock(volume: &Volume) -> MutexGuard<'_, HashMap<PathBuf, StoredStream>> {
    volume.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Engine backed by an in-process volume
///
/// Clones share the same volume.
#[derive(Debug, Clone, Default)]
pub struct MemoryEngine {
    volume: Volume,
}

impl MemoryEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: impl AsRef<Path>) -> bool {
        lock(&self.volume).contains_key(path.as_ref())
    }

    pub fn remove(&self, path: impl AsRef<Path>) -> bool {
        lock(&self.volume).remove(path.as_ref()).is_some()
    }

    /// Descriptor of a stored stream as last flushed
    pub fn stored_info(&self, path: impl AsRef<Path>) -> Option<SoundInfo> {
        lock(&self.volume).get(path.as_ref()).map(|s| s.info)
    }

    /// Make reads of a stored stream fail with `code` at `frame`
    pub fn fail_reads_at(&self, path: impl AsRef<Path>, frame: u64, code: ErrorCode) -> bool {
        match lock(&self.volume).get_mut(path.as_ref()) {
            Some(stream) => {
                stream.read_fault = Some((frame, code));
                true
            }
            None => false,
        }
    }

    /// Make a stored stream refuse (without error) writes past `frames`
    pub fn limit_writes(&self, path: impl AsRef<Path>, frames: u64) -> bool {
        match lock(&self.volume).get_mut(path.as_ref()) {
            Some(stream) => {
                stream.write_limit = Some(frames);
                true
            }
            None => false,
        }
    }

    fn version() -> String {
        format!("sndcore-memory-{}", env!("CARGO_PKG_VERSION"))
    }
}

impl Engine for MemoryEngine {
    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        info: &mut SoundInfo,
    ) -> std::result::Result<Box<dyn Session>, ErrorCode> {
        let mut volume = lock(&self.volume);
        let existing = volume.get(path).cloned();

        let stream = match (mode, existing) {
            (OpenMode::Read, Some(stream)) | (OpenMode::ReadWrite, Some(stream)) => stream,
            (OpenMode::Read, None) => return Err(ErrorCode::SYSTEM),
            (OpenMode::Write, _) | (OpenMode::ReadWrite, None) => {
                if !info.is_valid() {
                    return Err(ErrorCode::BAD_INFO);
                }
                let stream = StoredStream::new(*info);
                volume.insert(path.to_path_buf(), stream.clone());
                stream
            }
        };
        drop(volume);

        *info = stream.info;
        debug!("Memory volume opened {} for {}", path.display(), mode);

        Ok(Box::new(MemorySession {
            volume: Arc::clone(&self.volume),
            path: path.to_path_buf(),
            mode,
            log: format!(
                "Memory volume : {}\nFormat        : {}\nFrames        : {}\n",
                path.display(),
                stream.info.format,
                stream.info.frames
            ),
            stream,
            position: 0,
            error: ErrorCode::NO_ERROR,
            norm_float: true,
            norm_double: true,
            clipping: false,
            scale_float_int_read: false,
            scale_int_float_write: false,
            add_peak: false,
            auto_header: false,
            raw_offset: 0,
            vbr_quality: 0.0,
        }))
    }

    fn command(&self, command: Command, data: &mut [u8], _arg: i32) -> i32 {
        match command {
            Command::GET_LIB_VERSION => command::put_text(data, &Self::version()),
            _ => 0,
        }
    }
}

// ============================================================================
// Session
// ============================================================================

struct MemorySession {
    volume: Volume,
    path: PathBuf,
    mode: OpenMode,
    stream: StoredStream,
    position: u64,
    error: ErrorCode,
    log: String,
    norm_float: bool,
    norm_double: bool,
    clipping: bool,
    scale_float_int_read: bool,
    scale_int_float_write: bool,
    add_peak: bool,
    auto_header: bool,
    raw_offset: i64,
    vbr_quality: f64,
}

impl MemorySession {
    fn channels(&self) -> usize {
        self.stream.info.channel_count()
    }

    fn subformat(&self) -> SubFormat {
        self.stream.info.format.subtype().unwrap_or(SubFormat::Pcm16)
    }

    fn major(&self) -> MajorFormat {
        self.stream.info.format.major().unwrap_or(MajorFormat::Raw)
    }

    fn fail(&mut self, code: ErrorCode) -> i32 {
        self.error = code;
        1
    }

    fn flush(&mut self) {
        if !self.mode.can_write() {
            return;
        }
        if self.add_peak && self.subformat().is_float() {
            self.stream.peaks = Some(self.channel_peaks());
        }
        lock(&self.volume).insert(self.path.clone(), self.stream.clone());
    }

    fn channel_peaks(&self) -> Vec<f64> {
        let ch = self.channels();
        let mut peaks = vec![0.0f64; ch];
        for frame in self.stream.samples.chunks_exact(ch) {
            for (peak, &s) in peaks.iter_mut().zip(frame) {
                *peak = peak.max(s.abs());
            }
        }
        peaks
    }

    /// Full-scale divisor for normalized maxima
    fn full_scale(&self) -> f64 {
        let sub = self.subformat();
        if sub.is_float() {
            1.0
        } else {
            read_scale(sub.sample_bits())
        }
    }

    fn width_matches(&mut self, width: NativeWidth) -> bool {
        if width != self.subformat().native_width() {
            self.error = ErrorCode::BAD_BUFFER_WIDTH;
            return false;
        }
        true
    }

    fn chunk_supported(&self, command: Command) -> bool {
        let major = self.major();
        match command {
            Command::GET_BROADCAST_INFO | Command::SET_BROADCAST_INFO => major.is_wav_family(),
            _ => major.is_wav_family() || major == MajorFormat::Aiff,
        }
    }

    fn chunk_size(command: Command) -> usize {
        match command {
            Command::GET_LOOP_INFO | Command::SET_LOOP_INFO => LoopInfo::SIZE,
            Command::GET_INSTRUMENT | Command::SET_INSTRUMENT => InstrumentInfo::SIZE,
            _ => BroadcastInfo::SIZE,
        }
    }

    fn chunk_slot(&mut self, command: Command) -> &mut Option<Vec<u8>> {
        match command {
            Command::GET_LOOP_INFO | Command::SET_LOOP_INFO => &mut self.stream.loop_info,
            Command::GET_INSTRUMENT | Command::SET_INSTRUMENT => &mut self.stream.instrument,
            _ => &mut self.stream.broadcast,
        }
    }

    fn get_chunk(&mut self, command: Command, data: &mut [u8]) -> i32 {
        if !self.chunk_supported(command) {
            return FALSE;
        }
        let size = Self::chunk_size(command);
        if data.len() < size {
            self.error = ErrorCode::BAD_COMMAND_PARAM;
            return FALSE;
        }
        match self.chunk_slot(command) {
            Some(bytes) => {
                data[..size].copy_from_slice(&bytes[..size]);
                TRUE
            }
            None => FALSE,
        }
    }

    fn set_chunk(&mut self, command: Command, data: &[u8]) -> i32 {
        if !self.mode.can_write() {
            self.error = ErrorCode::NOT_WRITABLE;
            return FALSE;
        }
        if !self.chunk_supported(command) {
            return FALSE;
        }
        let size = Self::chunk_size(command);
        if data.len() < size {
            self.error = ErrorCode::BAD_COMMAND_PARAM;
            return FALSE;
        }
        *self.chunk_slot(command) = Some(data[..size].to_vec());
        TRUE
    }

    fn toggle(flag: &mut bool, arg: i32) -> i32 {
        let previous = *flag;
        *flag = arg != 0;
        if previous {
            TRUE
        } else {
            FALSE
        }
    }

    fn signal_max(&mut self, data: &mut [u8], normalized: bool) -> i32 {
        if !self.mode.can_read() {
            return self.fail(ErrorCode::NOT_READABLE);
        }
        let scale = if normalized { self.full_scale() } else { 1.0 };
        let max = self
            .stream
            .samples
            .iter()
            .fold(0.0f64, |m, s| m.max(s.abs()));
        if !command::put_f64(data, max / scale) {
            return self.fail(ErrorCode::BAD_COMMAND_PARAM);
        }
        0
    }

    fn max_all_channels(&mut self, data: &mut [u8], normalized: bool) -> i32 {
        if !self.mode.can_read() {
            return self.fail(ErrorCode::NOT_READABLE);
        }
        let scale = if normalized { self.full_scale() } else { 1.0 };
        let peaks: Vec<f64> = self.channel_peaks().iter().map(|p| p / scale).collect();
        if !command::put_f64_slice(data, &peaks) {
            return self.fail(ErrorCode::BAD_COMMAND_PARAM);
        }
        0
    }

    fn truncate(&mut self, data: &[u8]) -> i32 {
        if !self.mode.can_write() {
            return self.fail(ErrorCode::NOT_WRITABLE);
        }
        let frames = match command::get_i64(data) {
            Some(n) if n >= 0 && n <= self.stream.info.frames => n,
            _ => return self.fail(ErrorCode::BAD_COMMAND_PARAM),
        };
        self.stream.samples.truncate(frames as usize * self.channels());
        self.stream.info.frames = frames;
        self.position = frames as u64;
        self.note(format!("Truncated     : {} frames", frames));
        0
    }

    fn note(&mut self, line: String) {
        self.log.push_str(&line);
        self.log.push('\n');
    }

    fn dispatch(&mut self, command: Command, data: &mut [u8], arg: i32) -> i32 {
        match command {
            Command::GET_LIB_VERSION => command::put_text(data, &MemoryEngine::version()),
            Command::GET_LOG_INFO => command::put_text(data, &self.log),
            Command::GET_CURRENT_INFO => {
                if self.stream.info.encode(data) {
                    TRUE
                } else {
                    self.error = ErrorCode::BAD_COMMAND_PARAM;
                    FALSE
                }
            }

            Command::GET_NORM_FLOAT => self.norm_float as i32,
            Command::GET_NORM_DOUBLE => self.norm_double as i32,
            Command::SET_NORM_FLOAT => Self::toggle(&mut self.norm_float, arg),
            Command::SET_NORM_DOUBLE => Self::toggle(&mut self.norm_double, arg),
            Command::SET_SCALE_FLOAT_INT_READ => Self::toggle(&mut self.scale_float_int_read, arg),
            Command::SET_SCALE_INT_FLOAT_WRITE => {
                Self::toggle(&mut self.scale_int_float_write, arg)
            }
            Command::GET_CLIPPING => self.clipping as i32,
            Command::SET_CLIPPING => Self::toggle(&mut self.clipping, arg),

            Command::CALC_SIGNAL_MAX => self.signal_max(data, false),
            Command::CALC_NORM_SIGNAL_MAX => self.signal_max(data, true),
            Command::CALC_MAX_ALL_CHANNELS => self.max_all_channels(data, false),
            Command::CALC_NORM_MAX_ALL_CHANNELS => self.max_all_channels(data, true),
            Command::GET_SIGNAL_MAX => match &self.stream.peaks {
                Some(peaks) => {
                    let max = peaks.iter().fold(0.0f64, |m, &p| m.max(p));
                    if command::put_f64(data, max) {
                        TRUE
                    } else {
                        self.error = ErrorCode::BAD_COMMAND_PARAM;
                        FALSE
                    }
                }
                None => FALSE,
            },
            Command::GET_MAX_ALL_CHANNELS => match &self.stream.peaks {
                Some(peaks) => {
                    if command::put_f64_slice(data, peaks) {
                        TRUE
                    } else {
                        self.error = ErrorCode::BAD_COMMAND_PARAM;
                        FALSE
                    }
                }
                None => FALSE,
            },
            Command::SET_ADD_PEAK_CHUNK => {
                if !self.mode.can_write() || !self.subformat().is_float() {
                    return FALSE;
                }
                self.add_peak = arg != 0;
                TRUE
            }

            Command::UPDATE_HEADER_NOW => {
                self.flush();
                self.note(format!("Header        : {} frames", self.stream.info.frames));
                0
            }
            Command::SET_UPDATE_HEADER_AUTO => Self::toggle(&mut self.auto_header, arg),
            Command::FILE_TRUNCATE => self.truncate(data),

            Command::SET_RAW_START_OFFSET => {
                if self.major() != MajorFormat::Raw {
                    return self.fail(ErrorCode::UNSUPPORTED_COMMAND);
                }
                match command::get_i64(data) {
                    Some(offset) if offset >= 0 => {
                        self.raw_offset = offset;
                        0
                    }
                    _ => self.fail(ErrorCode::BAD_COMMAND_PARAM),
                }
            }
            Command::SET_VBR_ENCODING_QUALITY => {
                if self.major() != MajorFormat::Flac {
                    return self.fail(ErrorCode::UNSUPPORTED_COMMAND);
                }
                match command::get_f64(data) {
                    Some(q) if (0.0..=1.0).contains(&q) => {
                        self.vbr_quality = q;
                        0
                    }
                    _ => self.fail(ErrorCode::BAD_COMMAND_PARAM),
                }
            }
            Command::RAW_DATA_NEEDS_ENDSWAP => {
                let major = self.major();
                let stored = self.stream.info.format.endianness().resolve(major);
                if stored != Endianness::Cpu.resolve(major) {
                    TRUE
                } else {
                    FALSE
                }
            }
            Command::GET_EMBED_FILE_INFO => {
                let bytes = self.stream.samples.len() * self.subformat().bytes_per_sample();
                if data.len() < 16 {
                    return self.fail(ErrorCode::BAD_COMMAND_PARAM);
                }
                command::put_i64(&mut data[0..8], self.raw_offset);
                command::put_i64(&mut data[8..16], bytes as i64);
                0
            }

            Command::GET_LOOP_INFO | Command::GET_INSTRUMENT | Command::GET_BROADCAST_INFO => {
                self.get_chunk(command, data)
            }
            Command::SET_LOOP_INFO | Command::SET_INSTRUMENT | Command::SET_BROADCAST_INFO => {
                self.set_chunk(command, data)
            }

            Command::WAVEX_GET_AMBISONIC => {
                if self.major() != MajorFormat::WavEx {
                    return FALSE;
                }
                self.stream.ambisonic
            }
            Command::WAVEX_SET_AMBISONIC => {
                if self.major() != MajorFormat::WavEx || !self.mode.can_write() {
                    return FALSE;
                }
                if arg != AMBISONIC_NONE && arg != AMBISONIC_B_FORMAT {
                    self.error = ErrorCode::BAD_COMMAND_PARAM;
                    return FALSE;
                }
                self.stream.ambisonic = arg;
                arg
            }

            _ => {
                self.error = ErrorCode::UNSUPPORTED_COMMAND;
                0
            }
        }
    }
}

impl Session for MemorySession {
    fn read_raw(&mut self, buf: RawBufferMut<'_>) -> usize {
        self.error = ErrorCode::NO_ERROR;
        if !self.mode.can_read() {
            self.error = ErrorCode::NOT_READABLE;
            return 0;
        }
        if !self.width_matches(buf.width()) {
            return 0;
        }

        let ch = self.channels();
        let available = (self.stream.info.frames as u64).saturating_sub(self.position);
        let mut frames = (buf.len() / ch) as u64;
        frames = frames.min(available);
        if let Some((at, code)) = self.stream.read_fault {
            if self.position + frames > at {
                frames = at.saturating_sub(self.position);
                self.error = code;
                self.note(format!("Read fault    : frame {} : {}", at, code.description()));
            }
        }

        let start = self.position as usize * ch;
        let src = &self.stream.samples[start..start + frames as usize * ch];
        match buf {
            RawBufferMut::I16(dst) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s as i16),
            RawBufferMut::I32(dst) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s as i32),
            RawBufferMut::F32(dst) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s as f32),
            RawBufferMut::F64(dst) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s),
        }

        self.position += frames;
        src.len()
    }

    fn write_raw(&mut self, buf: RawBuffer<'_>) -> usize {
        self.error = ErrorCode::NO_ERROR;
        if !self.mode.can_write() {
            self.error = ErrorCode::NOT_WRITABLE;
            return 0;
        }
        if !self.width_matches(buf.width()) {
            return 0;
        }

        let ch = self.channels();
        let bits = self.subformat().sample_bits();
        let mut frames = (buf.len() / ch) as u64;
        if let Some(limit) = self.stream.write_limit {
            frames = frames.min(limit.saturating_sub(self.position));
        }

        let items = frames as usize * ch;
        let start = self.position as usize * ch;
        if self.stream.samples.len() < start + items {
            self.stream.samples.resize(start + items, 0.0);
        }
        let dst = &mut self.stream.samples[start..start + items];
        match buf {
            RawBuffer::I16(src) => dst
                .iter_mut()
                .zip(src)
                .for_each(|(d, &s)| *d = wrap_to_bits(s as i64, bits) as f64),
            RawBuffer::I32(src) => dst
                .iter_mut()
                .zip(src)
                .for_each(|(d, &s)| *d = wrap_to_bits(s as i64, bits) as f64),
            RawBuffer::F32(src) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s as f64),
            RawBuffer::F64(src) => dst.iter_mut().zip(src).for_each(|(d, &s)| *d = s),
        }

        self.position += frames;
        self.stream.info.frames = self.stream.info.frames.max(self.position as i64);
        if self.auto_header {
            self.flush();
        }
        items
    }

    fn seek(&mut self, frames: i64, whence: Whence) -> std::result::Result<u64, ErrorCode> {
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i64,
            Whence::End => self.stream.info.frames,
        };
        match base.checked_add(frames) {
            Some(target) if target >= 0 && target <= self.stream.info.frames => {
                self.position = target as u64;
                Ok(self.position)
            }
            _ => {
                self.error = ErrorCode::BAD_SEEK;
                Err(ErrorCode::BAD_SEEK)
            }
        }
    }

    fn command(&mut self, command: Command, data: &mut [u8], arg: i32) -> i32 {
        self.error = ErrorCode::NO_ERROR;
        let result = self.dispatch(command, data, arg);
        if self.error.is_error() {
            self.note(format!("{} : {}", command, self.error.description()));
        }
        result
    }

    fn last_error(&self) -> ErrorCode {
        self.error
    }

    fn log_text(&self) -> String {
        self.log.clone()
    }

    fn close(&mut self) -> ErrorCode {
        self.flush();
        debug!("Memory volume closed {}", self.path.display());
        ErrorCode::NO_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::FormatCode;

    fn new_info(format: FormatCode, channels: i32) -> SoundInfo {
        SoundInfo::new(44100, channels, format)
    }

    #[test]
    fn test_read_missing_path_fails() {
        let engine = MemoryEngine::new();
        let mut info = SoundInfo::default();
        let err = engine
            .open(Path::new("nope.wav"), OpenMode::Read, &mut info)
            .err();
        assert_eq!(err, Some(ErrorCode::SYSTEM));
    }

    #[test]
    fn test_write_rejects_bad_descriptor() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Flac | SubFormat::Double, 2);
        let err = engine
            .open(Path::new("bad.flac"), OpenMode::Write, &mut info)
            .err();
        assert_eq!(err, Some(ErrorCode::BAD_INFO));
        assert!(!engine.contains("bad.flac"));
    }

    #[test]
    fn test_session_flushes_on_close() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Wav | SubFormat::Pcm16, 2);
        let mut session = engine
            .open(Path::new("a.wav"), OpenMode::Write, &mut info)
            .unwrap();
        assert!(info.seekable);

        assert_eq!(session.write_raw(RawBuffer::I16(&[1, 2, 3, 4, 5])), 4);
        assert_eq!(engine.stored_info("a.wav").unwrap().frames, 0);
        assert_eq!(session.close(), ErrorCode::NO_ERROR);
        assert_eq!(engine.stored_info("a.wav").unwrap().frames, 2);
    }

    #[test]
    fn test_width_mismatch_sets_error() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Aiff | SubFormat::Pcm24, 1);
        let mut session = engine
            .open(Path::new("w.aiff"), OpenMode::ReadWrite, &mut info)
            .unwrap();
        assert_eq!(session.write_raw(RawBuffer::I16(&[1])), 0);
        assert_eq!(session.last_error(), ErrorCode::BAD_BUFFER_WIDTH);
    }

    #[test]
    fn test_integer_writes_wrap_to_subtype() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Raw | SubFormat::PcmS8, 1);
        let mut session = engine
            .open(Path::new("s8.raw"), OpenMode::ReadWrite, &mut info)
            .unwrap();
        session.write_raw(RawBuffer::I16(&[200, -5]));
        session.seek(0, Whence::Start).unwrap();

        let mut out = [0i16; 2];
        assert_eq!(session.read_raw(RawBufferMut::I16(&mut out)), 2);
        assert_eq!(out, [-56, -5]);
    }

    #[test]
    fn test_toggles_return_previous() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Wav | SubFormat::Float, 1);
        let mut session = engine
            .open(Path::new("f.wav"), OpenMode::Write, &mut info)
            .unwrap();
        assert_eq!(session.command(Command::GET_NORM_FLOAT, &mut [], 0), TRUE);
        assert_eq!(session.command(Command::SET_NORM_FLOAT, &mut [], 0), TRUE);
        assert_eq!(session.command(Command::SET_NORM_FLOAT, &mut [], 1), FALSE);
        assert_eq!(session.command(Command::GET_CLIPPING, &mut [], 0), FALSE);
    }

    #[test]
    fn test_unknown_command() {
        let engine = MemoryEngine::new();
        let mut info = new_info(MajorFormat::Wav | SubFormat::Pcm16, 1);
        let mut session = engine
            .open(Path::new("u.wav"), OpenMode::Write, &mut info)
            .unwrap();
        assert_eq!(session.command(Command(0x7777), &mut [], 0), 0);
        assert_eq!(session.last_error(), ErrorCode::UNSUPPORTED_COMMAND);
    }

    #[test]
    fn test_library_version_text() {
        let engine = MemoryEngine::new();
        let len = engine.command(Command::GET_LIB_VERSION, &mut [], 0);
        let mut buf = vec![0u8; len as usize];
        engine.command(Command::GET_LIB_VERSION, &mut buf, 0);
        assert!(String::from_utf8(buf).unwrap().starts_with("sndcore-memory-"));
    }
}
