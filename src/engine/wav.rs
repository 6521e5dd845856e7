//! WAV engine backed by `hound`
//!
//! Reads 8/16/24/32-bit integer and 32-bit float WAV files with random access.
//! Writes are sequential (new files only); the header is rewritten on
//! `UPDATE_HEADER_NOW` and finalized on close. WAV chunks beyond `fmt ` and
//! `data` are not handled, so every metadata record reads as absent.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use tracing::{debug, warn};

use super::command::{self, Command, FALSE, TRUE};
use super::{Engine, ErrorCode, RawBuffer, RawBufferMut, Session};
use crate::format::{Endianness, MajorFormat, OpenMode, SoundInfo, SubFormat, Whence};
use crate::transfer::convert::read_scale;

/// Engine for WAV files on disk
#[derive(Debug, Clone, Copy, Default)]
pub struct WavEngine;

impl WavEngine {
    pub fn new() -> Self {
        WavEngine
    }

    fn version() -> String {
        format!("sndcore-wav-{} (hound)", env!("CARGO_PKG_VERSION"))
    }
}

fn map_hound_error(err: &hound::Error) -> ErrorCode {
    match err {
        hound::Error::IoError(_) => ErrorCode::SYSTEM,
        hound::Error::FormatError(_) => ErrorCode::MALFORMED_FILE,
        hound::Error::Unsupported => ErrorCode::UNSUPPORTED_ENCODING,
        hound::Error::TooWide => ErrorCode::BAD_BUFFER_WIDTH,
        _ => ErrorCode::UNRECOGNISED_FORMAT,
    }
}

fn subformat_of(spec: &WavSpec) -> Option<SubFormat> {
    match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 8) => Some(SubFormat::PcmU8),
        (SampleFormat::Int, 16) => Some(SubFormat::Pcm16),
        (SampleFormat::Int, 24) => Some(SubFormat::Pcm24),
        (SampleFormat::Int, 32) => Some(SubFormat::Pcm32),
        (SampleFormat::Float, 32) => Some(SubFormat::Float),
        _ => None,
    }
}

fn spec_for(info: &SoundInfo) -> std::result::Result<WavSpec, ErrorCode> {
    if !info.is_valid() {
        return Err(ErrorCode::BAD_INFO);
    }
    if info.format.major() != Some(MajorFormat::Wav)
        || !matches!(info.format.endianness(), Endianness::File | Endianness::Little)
    {
        return Err(ErrorCode::UNRECOGNISED_FORMAT);
    }
    let (sample_format, bits_per_sample) = match info.format.subtype() {
        Some(SubFormat::PcmU8) => (SampleFormat::Int, 8),
        Some(SubFormat::Pcm16) => (SampleFormat::Int, 16),
        Some(SubFormat::Pcm24) => (SampleFormat::Int, 24),
        Some(SubFormat::Pcm32) => (SampleFormat::Int, 32),
        Some(SubFormat::Float) => (SampleFormat::Float, 32),
        _ => return Err(ErrorCode::UNSUPPORTED_ENCODING),
    };
    Ok(WavSpec {
        channels: info.channels as u16,
        sample_rate: info.sample_rate as u32,
        bits_per_sample,
        sample_format,
    })
}

impl Engine for WavEngine {
    fn open(
        &self,
        path: &Path,
        mode: OpenMode,
        info: &mut SoundInfo,
    ) -> std::result::Result<Box<dyn Session>, ErrorCode> {
        let (stream, actual) = match mode {
            OpenMode::Read => {
                let reader = WavReader::open(path).map_err(|e| map_hound_error(&e))?;
                let spec = reader.spec();
                let sub = subformat_of(&spec).ok_or(ErrorCode::UNSUPPORTED_ENCODING)?;
                let actual = SoundInfo {
                    frames: reader.duration() as i64,
                    sample_rate: spec.sample_rate as i32,
                    channels: spec.channels as i32,
                    format: MajorFormat::Wav | sub,
                    sections: 1,
                    seekable: true,
                };
                (WavStream::Reader(reader), actual)
            }
            OpenMode::Write => {
                let spec = spec_for(info)?;
                let writer = WavWriter::create(path, spec).map_err(|e| map_hound_error(&e))?;
                let actual = SoundInfo {
                    frames: 0,
                    sections: 1,
                    seekable: false,
                    ..*info
                };
                (WavStream::Writer(Some(writer)), actual)
            }
            OpenMode::ReadWrite => return Err(ErrorCode::BAD_OPEN_MODE),
        };

        *info = actual;
        debug!("Opened WAV {} for {}", path.display(), mode);

        Ok(Box::new(WavSession {
            path: path.to_path_buf(),
            log: format!(
                "File : {}\nFormat : {}\nChannels : {}\nSample Rate : {}\nFrames : {}\n",
                path.display(),
                actual.format,
                actual.channels,
                actual.sample_rate,
                actual.frames
            ),
            stream,
            info: actual,
            position: 0,
            error: ErrorCode::NO_ERROR,
            norm_float: true,
            norm_double: true,
            clipping: false,
            scale_float_int_read: false,
            scale_int_float_write: false,
            auto_header: false,
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

enum WavStream {
    Reader(WavReader<BufReader<File>>),
    /// `None` once finalized
    Writer(Option<WavWriter<BufWriter<File>>>),
}

struct WavSession {
    path: PathBuf,
    stream: WavStream,
    info: SoundInfo,
    position: u64,
    error: ErrorCode,
    log: String,
    norm_float: bool,
    norm_double: bool,
    clipping: bool,
    scale_float_int_read: bool,
    scale_int_float_write: bool,
    auto_header: bool,
}

impl WavSession {
    fn channels(&self) -> usize {
        self.info.channel_count()
    }

    fn subformat(&self) -> SubFormat {
        self.info.format.subtype().unwrap_or(SubFormat::Pcm16)
    }

    fn fail(&mut self, code: ErrorCode) -> i32 {
        self.error = code;
        1
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

    fn flush_header(&mut self) -> i32 {
        if let WavStream::Writer(Some(writer)) = &mut self.stream {
            if let Err(e) = writer.flush() {
                return self.fail(map_hound_error(&e));
            }
        }
        0
    }

    /// Per-channel absolute maxima, read from a fresh reader so the
    /// session position is untouched
    fn scan_peaks(&mut self) -> Option<Vec<f64>> {
        if !matches!(self.stream, WavStream::Reader(_)) {
            self.error = ErrorCode::NOT_READABLE;
            return None;
        }
        let mut reader = match WavReader::open(&self.path) {
            Ok(reader) => reader,
            Err(e) => {
                self.error = map_hound_error(&e);
                return None;
            }
        };

        let ch = self.channels();
        let mut peaks = vec![0.0f64; ch];
        let mut scan = |i: usize, value: f64| {
            let peak = &mut peaks[i % ch];
            *peak = peak.max(value.abs());
        };
        let result = if self.subformat().is_float() {
            reader
                .samples::<f32>()
                .enumerate()
                .try_for_each(|(i, s)| s.map(|v| scan(i, v as f64)))
        } else {
            reader
                .samples::<i32>()
                .enumerate()
                .try_for_each(|(i, s)| s.map(|v| scan(i, v as f64)))
        };

        match result {
            Ok(()) => Some(peaks),
            Err(e) => {
                self.error = map_hound_error(&e);
                None
            }
        }
    }

    fn full_scale(&self) -> f64 {
        let sub = self.subformat();
        if sub.is_float() {
            1.0
        } else {
            read_scale(sub.sample_bits())
        }
    }
}

/// Fill `dst` from a sample iterator; returns items read or the first error
fn fill<T, S>(
    dst: &mut [T],
    samples: impl Iterator<Item = hound::Result<S>>,
    cast: impl Fn(S) -> T,
) -> (usize, Option<hound::Error>) {
    let mut n = 0;
    for (d, s) in dst.iter_mut().zip(samples) {
        match s {
            Ok(v) => *d = cast(v),
            Err(e) => return (n, Some(e)),
        }
        n += 1;
    }
    (n, None)
}

impl Session for WavSession {
    fn read_raw(&mut self, buf: RawBufferMut<'_>) -> usize {
        self.error = ErrorCode::NO_ERROR;
        let ch = self.channels();
        let sub = self.subformat();
        let available = (self.info.frames as u64).saturating_sub(self.position) as usize;
        let items = (buf.len() / ch).min(available) * ch;

        let WavStream::Reader(reader) = &mut self.stream else {
            self.error = ErrorCode::NOT_READABLE;
            return 0;
        };
        if buf.width() != sub.native_width() {
            self.error = ErrorCode::BAD_BUFFER_WIDTH;
            return 0;
        }

        let (n, err) = match buf {
            RawBufferMut::I16(dst) => fill(&mut dst[..items], reader.samples::<i16>(), |v| v),
            RawBufferMut::I32(dst) => fill(&mut dst[..items], reader.samples::<i32>(), |v| v),
            RawBufferMut::F32(dst) => fill(&mut dst[..items], reader.samples::<f32>(), |v| v),
            RawBufferMut::F64(_) => (0, Some(hound::Error::Unsupported)),
        };

        let frames = n / ch;
        self.position += frames as u64;
        if n % ch != 0 {
            // Back to the frame boundary the position reports
            if let Err(e) = reader.seek(self.position as u32) {
                warn!("Rewind in {} failed: {}", self.path.display(), e);
            }
        }
        if let Some(e) = err {
            self.error = map_hound_error(&e);
        } else if n % ch != 0 {
            self.error = ErrorCode::MALFORMED_FILE;
        }
        frames * ch
    }

    fn write_raw(&mut self, buf: RawBuffer<'_>) -> usize {
        self.error = ErrorCode::NO_ERROR;
        let ch = self.channels();
        let sub = self.subformat();
        let items = buf.len() / ch * ch;

        let WavStream::Writer(Some(writer)) = &mut self.stream else {
            self.error = ErrorCode::NOT_WRITABLE;
            return 0;
        };
        if buf.width() != sub.native_width() {
            self.error = ErrorCode::BAD_BUFFER_WIDTH;
            return 0;
        }

        let mut written = 0;
        let mut failure = None;
        match buf {
            RawBuffer::I16(src) if sub == SubFormat::PcmU8 => {
                for &s in &src[..items] {
                    if let Err(e) = writer.write_sample(s as i8) {
                        failure = Some(e);
                        break;
                    }
                    written += 1;
                }
            }
            RawBuffer::I16(src) => {
                for &s in &src[..items] {
                    if let Err(e) = writer.write_sample(s) {
                        failure = Some(e);
                        break;
                    }
                    written += 1;
                }
            }
            RawBuffer::I32(src) => {
                for &s in &src[..items] {
                    if let Err(e) = writer.write_sample(s) {
                        failure = Some(e);
                        break;
                    }
                    written += 1;
                }
            }
            RawBuffer::F32(src) => {
                for &s in &src[..items] {
                    if let Err(e) = writer.write_sample(s) {
                        failure = Some(e);
                        break;
                    }
                    written += 1;
                }
            }
            RawBuffer::F64(_) => failure = Some(hound::Error::Unsupported),
        }

        let frames = written / ch;
        self.position += frames as u64;
        self.info.frames = self.position as i64;
        if let Some(e) = failure {
            self.error = map_hound_error(&e);
        } else if self.auto_header {
            self.flush_header();
        }
        written
    }

    fn seek(&mut self, frames: i64, whence: Whence) -> std::result::Result<u64, ErrorCode> {
        let WavStream::Reader(reader) = &mut self.stream else {
            self.error = ErrorCode::NOT_SEEKABLE;
            return Err(ErrorCode::NOT_SEEKABLE);
        };
        let base = match whence {
            Whence::Start => 0,
            Whence::Current => self.position as i64,
            Whence::End => self.info.frames,
        };
        let target = match base.checked_add(frames) {
            Some(t) if t >= 0 && t <= self.info.frames => t as u64,
            _ => {
                self.error = ErrorCode::BAD_SEEK;
                return Err(ErrorCode::BAD_SEEK);
            }
        };
        if let Err(e) = reader.seek(target as u32) {
            warn!("Seek in {} failed: {}", self.path.display(), e);
            self.error = ErrorCode::SYSTEM;
            return Err(ErrorCode::SYSTEM);
        }
        self.position = target;
        Ok(target)
    }

    fn command(&mut self, command: Command, data: &mut [u8], arg: i32) -> i32 {
        self.error = ErrorCode::NO_ERROR;
        match command {
            Command::GET_LIB_VERSION => command::put_text(data, &WavEngine::version()),
            Command::GET_LOG_INFO => command::put_text(data, &self.log),
            Command::GET_CURRENT_INFO => {
                if self.info.encode(data) {
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

            Command::CALC_SIGNAL_MAX | Command::CALC_NORM_SIGNAL_MAX => {
                let scale = if command == Command::CALC_NORM_SIGNAL_MAX {
                    self.full_scale()
                } else {
                    1.0
                };
                let Some(peaks) = self.scan_peaks() else {
                    return 1;
                };
                let max = peaks.iter().fold(0.0f64, |m, &p| m.max(p));
                if !command::put_f64(data, max / scale) {
                    return self.fail(ErrorCode::BAD_COMMAND_PARAM);
                }
                0
            }
            Command::CALC_MAX_ALL_CHANNELS | Command::CALC_NORM_MAX_ALL_CHANNELS => {
                let scale = if command == Command::CALC_NORM_MAX_ALL_CHANNELS {
                    self.full_scale()
                } else {
                    1.0
                };
                let Some(peaks) = self.scan_peaks() else {
                    return 1;
                };
                let peaks: Vec<f64> = peaks.iter().map(|p| p / scale).collect();
                if !command::put_f64_slice(data, &peaks) {
                    return self.fail(ErrorCode::BAD_COMMAND_PARAM);
                }
                0
            }

            Command::UPDATE_HEADER_NOW => self.flush_header(),
            Command::SET_UPDATE_HEADER_AUTO => Self::toggle(&mut self.auto_header, arg),
            Command::RAW_DATA_NEEDS_ENDSWAP => {
                if Endianness::Cpu.resolve(MajorFormat::Wav) == Endianness::Little {
                    FALSE
                } else {
                    TRUE
                }
            }
            Command::GET_EMBED_FILE_INFO => {
                let length = match std::fs::metadata(&self.path) {
                    Ok(meta) => meta.len() as i64,
                    Err(_) => return self.fail(ErrorCode::SYSTEM),
                };
                if data.len() < 16 {
                    return self.fail(ErrorCode::BAD_COMMAND_PARAM);
                }
                command::put_i64(&mut data[0..8], 0);
                command::put_i64(&mut data[8..16], length);
                0
            }

            // No peak chunk, no side chunks
            Command::GET_SIGNAL_MAX
            | Command::GET_MAX_ALL_CHANNELS
            | Command::SET_ADD_PEAK_CHUNK
            | Command::GET_LOOP_INFO
            | Command::SET_LOOP_INFO
            | Command::GET_INSTRUMENT
            | Command::SET_INSTRUMENT
            | Command::GET_BROADCAST_INFO
            | Command::SET_BROADCAST_INFO
            | Command::WAVEX_GET_AMBISONIC
            | Command::WAVEX_SET_AMBISONIC => FALSE,

            _ => {
                self.error = ErrorCode::UNSUPPORTED_COMMAND;
                0
            }
        }
    }

    fn last_error(&self) -> ErrorCode {
        self.error
    }

    fn log_text(&self) -> String {
        self.log.clone()
    }

    fn close(&mut self) -> ErrorCode {
        if let WavStream::Writer(slot) = &mut self.stream {
            if let Some(writer) = slot.take() {
                if let Err(e) = writer.finalize() {
                    warn!("Failed to finalize {}: {}", self.path.display(), e);
                    self.error = map_hound_error(&e);
                    return self.error;
                }
            }
        }
        debug!("Closed WAV {}", self.path.display());
        ErrorCode::NO_ERROR
    }
}
