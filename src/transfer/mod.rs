//! Typed Sample Transfer
//!
//! Moves samples between caller buffers of any [`Sample`] width and an
//! engine session, one generic path for all widths:
//! - items: raw scalar counts; a trailing partial frame is allowed
//! - frames: buffer length must be a whole number of frames
//!
//! Samples cross the engine boundary in the session's native width and are
//! converted here according to the rules in [`convert`].

pub mod convert;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cursor::Cursor;
use crate::engine::{RawBuffer, RawBufferMut, Session};
use crate::error::{Result, SoundError};
use crate::format::{NativeWidth, SubFormat};

/// Native values staged per engine call
const SCRATCH_ITEMS: usize = 8192;

// ============================================================================
// Sample trait
// ============================================================================

/// Width tag of a caller buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleKind {
    I16,
    I32,
    F32,
    F64,
}

mod sealed {
    pub trait Sealed {}
    impl Sealed for i16 {}
    impl Sealed for i32 {}
    impl Sealed for f32 {}
    impl Sealed for f64 {}
}

/// A caller-side sample type: `i16`, `i32`, `f32` or `f64`
///
/// Native integers are passed as an `i32` holding a `bits`-wide value
/// (unshifted); native floats as an `f64`.
pub trait Sample: sealed::Sealed + Copy + Default + PartialEq + std::fmt::Debug + Send + 'static {
    const KIND: SampleKind;

    fn from_native_int(value: i32, bits: u32, settings: &ConversionSettings) -> Self;

    fn from_native_float(value: f64, settings: &ConversionSettings) -> Self;

    fn to_native_int(self, bits: u32, settings: &ConversionSettings) -> i32;

    fn to_native_float(self, settings: &ConversionSettings) -> f64;
}

/// Per-handle conversion flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConversionSettings {
    /// Scale `f32` transfers so native full scale maps to [-1.0, 1.0]
    pub normalize_float: bool,
    /// Scale `f64` transfers so native full scale maps to [-1.0, 1.0]
    pub normalize_double: bool,
    /// Clamp float-to-integer writes to the native range
    pub clipping: bool,
    /// Scale native float data to integer full scale on integer reads
    pub float_int_scale_read: bool,
    /// Scale integer buffers to [-1.0, 1.0] on writes to native float data
    pub int_float_scale_write: bool,
}

impl ConversionSettings {
    /// Normalization flag that applies to a caller width
    pub fn normalization(&self, kind: SampleKind) -> bool {
        match kind {
            SampleKind::F32 => self.normalize_float,
            SampleKind::F64 => self.normalize_double,
            SampleKind::I16 | SampleKind::I32 => false,
        }
    }
}

// ============================================================================
// Native scratch
// ============================================================================

/// Staging buffer in the session's native width
enum Scratch {
    I16(Vec<i16>),
    I32(Vec<i32>),
    F32(Vec<f32>),
    F64(Vec<f64>),
}

impl Scratch {
    fn new(width: NativeWidth, len: usize) -> Self {
        match width {
            NativeWidth::I16 => Scratch::I16(vec![0; len]),
            NativeWidth::I32 => Scratch::I32(vec![0; len]),
            NativeWidth::F32 => Scratch::F32(vec![0.0; len]),
            NativeWidth::F64 => Scratch::F64(vec![0.0; len]),
        }
    }

    fn read(&mut self, session: &mut dyn Session, items: usize) -> usize {
        match self {
            Scratch::I16(v) => session.read_raw(RawBufferMut::I16(&mut v[..items])),
            Scratch::I32(v) => session.read_raw(RawBufferMut::I32(&mut v[..items])),
            Scratch::F32(v) => session.read_raw(RawBufferMut::F32(&mut v[..items])),
            Scratch::F64(v) => session.read_raw(RawBufferMut::F64(&mut v[..items])),
        }
    }

    fn write(&self, session: &mut dyn Session, items: usize) -> usize {
        match self {
            Scratch::I16(v) => session.write_raw(RawBuffer::I16(&v[..items])),
            Scratch::I32(v) => session.write_raw(RawBuffer::I32(&v[..items])),
            Scratch::F32(v) => session.write_raw(RawBuffer::F32(&v[..items])),
            Scratch::F64(v) => session.write_raw(RawBuffer::F64(&v[..items])),
        }
    }

    /// Convert the first `dst.len()` native values into `dst`
    fn decode<T: Sample>(&self, dst: &mut [T], bits: u32, settings: &ConversionSettings) {
        match self {
            Scratch::I16(v) => {
                for (d, &s) in dst.iter_mut().zip(v) {
                    *d = T::from_native_int(s as i32, bits, settings);
                }
            }
            Scratch::I32(v) => {
                for (d, &s) in dst.iter_mut().zip(v) {
                    *d = T::from_native_int(s, bits, settings);
                }
            }
            Scratch::F32(v) => {
                for (d, &s) in dst.iter_mut().zip(v) {
                    *d = T::from_native_float(s as f64, settings);
                }
            }
            Scratch::F64(v) => {
                for (d, &s) in dst.iter_mut().zip(v) {
                    *d = T::from_native_float(s, settings);
                }
            }
        }
    }

    /// Convert `src` into the first native values, then silence up to `items`
    fn encode<T: Sample>(
        &mut self,
        src: &[T],
        items: usize,
        bits: u32,
        settings: &ConversionSettings,
    ) {
        match self {
            Scratch::I16(v) => {
                for (d, &s) in v.iter_mut().zip(src) {
                    *d = s.to_native_int(bits, settings) as i16;
                }
                v[src.len()..items].fill(0);
            }
            Scratch::I32(v) => {
                for (d, &s) in v.iter_mut().zip(src) {
                    *d = s.to_native_int(bits, settings);
                }
                v[src.len()..items].fill(0);
            }
            Scratch::F32(v) => {
                for (d, &s) in v.iter_mut().zip(src) {
                    *d = s.to_native_float(settings) as f32;
                }
                v[src.len()..items].fill(0.0);
            }
            Scratch::F64(v) => {
                for (d, &s) in v.iter_mut().zip(src) {
                    *d = s.to_native_float(settings);
                }
                v[src.len()..items].fill(0.0);
            }
        }
    }
}

// ============================================================================
// Stream
// ============================================================================

/// Borrowed view of everything a transfer touches
pub(crate) struct Stream<'a> {
    pub session: &'a mut dyn Session,
    pub cursor: &'a mut Cursor,
    pub settings: &'a ConversionSettings,
    pub channels: usize,
    pub subformat: SubFormat,
}

impl Stream<'_> {
    fn scratch_frames(&self) -> usize {
        (SCRATCH_ITEMS / self.channels).max(1)
    }

    fn fault(&self, transferred: usize) -> SoundError {
        let code = self.session.last_error();
        SoundError::Transfer {
            code,
            message: code.description().to_string(),
            transferred,
        }
    }

    fn check_frames(&self, len: usize) -> Result<()> {
        if len % self.channels != 0 {
            return Err(SoundError::Misaligned {
                len,
                channels: self.channels,
            });
        }
        Ok(())
    }

    /// Read up to `buf.len()` items; the cursor advances by every frame
    /// touched, including a trailing partial one
    pub fn read_items<T: Sample>(&mut self, buf: &mut [T]) -> Result<usize> {
        let ch = self.channels;
        let bits = self.subformat.sample_bits();
        let mut scratch = Scratch::new(
            self.subformat.native_width(),
            self.scratch_frames().min(buf.len().div_ceil(ch)) * ch,
        );
        let mut done = 0;

        while done < buf.len() {
            let frames = (buf.len() - done).div_ceil(ch).min(self.scratch_frames());
            let requested = frames * ch;
            let got = scratch.read(self.session, requested);
            let got_frames = got / ch;
            let copy = (got_frames * ch).min(buf.len() - done);

            scratch.decode(&mut buf[done..done + copy], bits, self.settings);
            self.cursor.advance_read(got_frames as u64);
            done += copy;

            if got < requested {
                if self.session.last_error().is_error() {
                    return Err(self.fault(done));
                }
                break;
            }
        }

        Ok(done)
    }

    /// Read whole frames; returns the frame count
    pub fn read_frames<T: Sample>(&mut self, buf: &mut [T]) -> Result<usize> {
        self.check_frames(buf.len())?;
        Ok(self.read_items(buf)? / self.channels)
    }

    /// Write `buf`; a trailing partial frame is completed with silence
    pub fn write_items<T: Sample>(&mut self, buf: &[T]) -> Result<usize> {
        let ch = self.channels;
        let bits = self.subformat.sample_bits();
        let mut scratch = Scratch::new(
            self.subformat.native_width(),
            self.scratch_frames().min(buf.len().div_ceil(ch)) * ch,
        );
        let mut done = 0;

        while done < buf.len() {
            let take = (buf.len() - done).min(self.scratch_frames() * ch);
            let requested = take.div_ceil(ch) * ch;

            scratch.encode(&buf[done..done + take], requested, bits, self.settings);
            let put = scratch.write(self.session, requested);
            let put_frames = put / ch;

            self.cursor.advance_write(put_frames as u64);
            done += (put_frames * ch).min(take);

            if put < requested {
                if self.session.last_error().is_error() {
                    return Err(self.fault(done));
                }
                warn!(
                    "Short write: engine accepted {} of {} items",
                    done,
                    buf.len()
                );
                break;
            }
        }

        Ok(done)
    }

    /// Write whole frames; returns the frame count
    pub fn write_frames<T: Sample>(&mut self, buf: &[T]) -> Result<usize> {
        self.check_frames(buf.len())?;
        Ok(self.write_items(buf)? / self.channels)
    }
}

// ============================================================================
// Tests
// ============================================================================
