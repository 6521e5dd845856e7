//! Format descriptor and format codes
//!
//! A [`FormatCode`] packs a major container type, a sample subtype and an
//! endianness flag into one `i32`, using the bit layout shared by the common
//! sound-file libraries so codes stay wire compatible:
//!
//! | Bits         | Meaning     |
//! |--------------|-------------|
//! | `0x0000FFFF` | subtype     |
//! | `0x0FFF0000` | major type  |
//! | `0x30000000` | endianness  |
//!
//! [`MajorFormat`] and [`SubFormat`] are closed enums; combining them with `|`
//! yields a `FormatCode`, so an invalid bit pattern cannot be built by
//! accident at the API boundary.

use std::fmt;
use std::ops::BitOr;

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

/// Subtype bits of a format code
pub const SUBMASK: i32 = 0x0000_FFFF;
/// Major type bits of a format code
pub const TYPEMASK: i32 = 0x0FFF_0000;
/// Endianness bits of a format code
pub const ENDMASK: i32 = 0x3000_0000;

/// Highest channel count an engine is expected to accept
pub const MAX_CHANNELS: i32 = 1024;

// ============================================================================
// Major formats
// ============================================================================

/// Container type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorFormat {
    Wav,
    Aiff,
    Au,
    Raw,
    W64,
    WavEx,
    Flac,
    Caf,
    Rf64,
}

impl MajorFormat {
    /// All major formats, in code order
    pub const ALL: [MajorFormat; 9] = [
        MajorFormat::Wav,
        MajorFormat::Aiff,
        MajorFormat::Au,
        MajorFormat::Raw,
        MajorFormat::W64,
        MajorFormat::WavEx,
        MajorFormat::Flac,
        MajorFormat::Caf,
        MajorFormat::Rf64,
    ];

    /// Raw bit pattern (within [`TYPEMASK`])
    pub const fn bits(self) -> i32 {
        match self {
            MajorFormat::Wav => 0x01_0000,
            MajorFormat::Aiff => 0x02_0000,
            MajorFormat::Au => 0x03_0000,
            MajorFormat::Raw => 0x04_0000,
            MajorFormat::W64 => 0x0B_0000,
            MajorFormat::WavEx => 0x13_0000,
            MajorFormat::Flac => 0x17_0000,
            MajorFormat::Caf => 0x18_0000,
            MajorFormat::Rf64 => 0x22_0000,
        }
    }

    /// Decode the major type bits of a raw code
    pub fn from_bits(code: i32) -> Option<MajorFormat> {
        let bits = code & TYPEMASK;
        MajorFormat::ALL.into_iter().find(|m| m.bits() == bits)
    }

    /// True for the RIFF-derived containers (WAV, WAVEX, W64, RF64)
    pub fn is_wav_family(self) -> bool {
        matches!(
            self,
            MajorFormat::Wav | MajorFormat::WavEx | MajorFormat::W64 | MajorFormat::Rf64
        )
    }

    /// Byte order the container uses when the code says `Endianness::File`
    pub fn default_endianness(self) -> Endianness {
        match self {
            MajorFormat::Aiff | MajorFormat::Au | MajorFormat::Caf => Endianness::Big,
            _ => Endianness::Little,
        }
    }

    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            MajorFormat::Wav | MajorFormat::WavEx => "wav",
            MajorFormat::Aiff => "aiff",
            MajorFormat::Au => "au",
            MajorFormat::Raw => "raw",
            MajorFormat::W64 => "w64",
            MajorFormat::Flac => "flac",
            MajorFormat::Caf => "caf",
            MajorFormat::Rf64 => "rf64",
        }
    }

    /// Whether this container can hold the given subtype
    pub fn supports(self, sub: SubFormat) -> bool {
        use SubFormat::*;
        match self {
            MajorFormat::Wav | MajorFormat::WavEx | MajorFormat::W64 | MajorFormat::Rf64 => {
                !matches!(sub, PcmS8)
            }
            MajorFormat::Aiff | MajorFormat::Raw => true,
            MajorFormat::Au | MajorFormat::Caf => !matches!(sub, PcmU8),
            MajorFormat::Flac => matches!(sub, PcmS8 | Pcm16 | Pcm24),
        }
    }
}

impl fmt::Display for MajorFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MajorFormat::Wav => "WAV",
            MajorFormat::Aiff => "AIFF",
            MajorFormat::Au => "AU",
            MajorFormat::Raw => "RAW",
            MajorFormat::W64 => "W64",
            MajorFormat::WavEx => "WAVEX",
            MajorFormat::Flac => "FLAC",
            MajorFormat::Caf => "CAF",
            MajorFormat::Rf64 => "RF64",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Subformats
// ============================================================================

/// Sample encoding inside the container
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubFormat {
    PcmS8,
    Pcm16,
    Pcm24,
    Pcm32,
    PcmU8,
    Float,
    Double,
}

/// Width of the raw buffers an engine exchanges for a subformat
///
/// Integer encodings of 16 bits or less travel in `i16`, wider ones in `i32`.
/// Values are in native units (a 24-bit sample is carried unshifted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NativeWidth {
    I16,
    I32,
    F32,
    F64,
}

impl SubFormat {
    /// All subformats, in code order
    pub const ALL: [SubFormat; 7] = [
        SubFormat::PcmS8,
        SubFormat::Pcm16,
        SubFormat::Pcm24,
        SubFormat::Pcm32,
        SubFormat::PcmU8,
        SubFormat::Float,
        SubFormat::Double,
    ];

    /// Raw bit pattern (within [`SUBMASK`])
    pub const fn bits(self) -> i32 {
        match self {
            SubFormat::PcmS8 => 0x0001,
            SubFormat::Pcm16 => 0x0002,
            SubFormat::Pcm24 => 0x0003,
            SubFormat::Pcm32 => 0x0004,
            SubFormat::PcmU8 => 0x0005,
            SubFormat::Float => 0x0006,
            SubFormat::Double => 0x0007,
        }
    }

    /// Decode the subtype bits of a raw code
    pub fn from_bits(code: i32) -> Option<SubFormat> {
        let bits = code & SUBMASK;
        SubFormat::ALL.into_iter().find(|s| s.bits() == bits)
    }

    /// Bits per sample of the native encoding
    pub const fn sample_bits(self) -> u32 {
        match self {
            SubFormat::PcmS8 | SubFormat::PcmU8 => 8,
            SubFormat::Pcm16 => 16,
            SubFormat::Pcm24 => 24,
            SubFormat::Pcm32 | SubFormat::Float => 32,
            SubFormat::Double => 64,
        }
    }

    /// Bytes one sample occupies on disk
    pub const fn bytes_per_sample(self) -> usize {
        (self.sample_bits() / 8) as usize
    }

    pub const fn is_float(self) -> bool {
        matches!(self, SubFormat::Float | SubFormat::Double)
    }

    /// Raw buffer width used to move this encoding across the engine boundary
    pub const fn native_width(self) -> NativeWidth {
        match self {
            SubFormat::PcmS8 | SubFormat::PcmU8 | SubFormat::Pcm16 => NativeWidth::I16,
            SubFormat::Pcm24 | SubFormat::Pcm32 => NativeWidth::I32,
            SubFormat::Float => NativeWidth::F32,
            SubFormat::Double => NativeWidth::F64,
        }
    }
}

impl fmt::Display for SubFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubFormat::PcmS8 => "Signed 8 bit PCM",
            SubFormat::Pcm16 => "Signed 16 bit PCM",
            SubFormat::Pcm24 => "Signed 24 bit PCM",
            SubFormat::Pcm32 => "Signed 32 bit PCM",
            SubFormat::PcmU8 => "Unsigned 8 bit PCM",
            SubFormat::Float => "32 bit float",
            SubFormat::Double => "64 bit float",
        };
        write!(f, "{}", name)
    }
}

// ============================================================================
// Endianness
// ============================================================================

/// Byte order flag of a format code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Whatever the container defaults to
    #[default]
    File,
    Little,
    Big,
    /// Host byte order
    Cpu,
}

impl Endianness {
    pub const fn bits(self) -> i32 {
        match self {
            Endianness::File => 0,
            Endianness::Little => 0x1000_0000,
            Endianness::Big => 0x2000_0000,
            Endianness::Cpu => 0x3000_0000,
        }
    }

    pub fn from_bits(code: i32) -> Endianness {
        match code & ENDMASK {
            0x1000_0000 => Endianness::Little,
            0x2000_0000 => Endianness::Big,
            0x3000_0000 => Endianness::Cpu,
            _ => Endianness::File,
        }
    }

    /// Resolve `File` and `Cpu` to a concrete byte order
    pub fn resolve(self, major: MajorFormat) -> Endianness {
        match self {
            Endianness::File => major.default_endianness(),
            Endianness::Cpu if cfg!(target_endian = "big") => Endianness::Big,
            Endianness::Cpu => Endianness::Little,
            other => other,
        }
    }
}

// ============================================================================
// Format code
// ============================================================================

/// Packed major type | subtype | endianness code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormatCode(i32);

impl FormatCode {
    /// Build a code from its parts
    pub const fn new(major: MajorFormat, sub: SubFormat) -> Self {
        FormatCode(major.bits() | sub.bits())
    }

    /// Wrap a raw code as received from an engine or a caller
    ///
    /// No validation happens here; use [`FormatCode::major`] and
    /// [`FormatCode::subtype`] (or [`SoundInfo::validate`]) before relying on it.
    pub const fn from_raw(code: i32) -> Self {
        FormatCode(code)
    }

    pub const fn raw(self) -> i32 {
        self.0
    }

    pub fn with_endianness(self, endianness: Endianness) -> Self {
        FormatCode((self.0 & !ENDMASK) | endianness.bits())
    }

    pub fn major(self) -> Option<MajorFormat> {
        MajorFormat::from_bits(self.0)
    }

    pub fn subtype(self) -> Option<SubFormat> {
        SubFormat::from_bits(self.0)
    }

    pub fn endianness(self) -> Endianness {
        Endianness::from_bits(self.0)
    }
}

impl From<FormatCode> for i32 {
    fn from(code: FormatCode) -> i32 {
        code.0
    }
}

impl BitOr<SubFormat> for MajorFormat {
    type Output = FormatCode;

    fn bitor(self, sub: SubFormat) -> FormatCode {
        FormatCode::new(self, sub)
    }
}

impl BitOr<Endianness> for FormatCode {
    type Output = FormatCode;

    fn bitor(self, endianness: Endianness) -> FormatCode {
        self.with_endianness(endianness)
    }
}

impl fmt::Display for FormatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.major(), self.subtype()) {
            (Some(major), Some(sub)) => write!(f, "{} ({})", major, sub),
            _ => write!(f, "unknown format 0x{:08x}", self.0),
        }
    }
}

// ============================================================================
// Open mode and seek origin
// ============================================================================

/// Access mode of a handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpenMode {
    #[default]
    Read,
    Write,
    ReadWrite,
}

impl OpenMode {
    pub fn can_read(self) -> bool {
        matches!(self, OpenMode::Read | OpenMode::ReadWrite)
    }

    pub fn can_write(self) -> bool {
        matches!(self, OpenMode::Write | OpenMode::ReadWrite)
    }
}

impl fmt::Display for OpenMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpenMode::Read => write!(f, "read"),
            OpenMode::Write => write!(f, "write"),
            OpenMode::ReadWrite => write!(f, "read/write"),
        }
    }
}

/// Reference point of a seek offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Whence {
    Start,
    Current,
    End,
}

// ============================================================================
// Sound info (format descriptor)
// ============================================================================

/// Description of an open stream
///
/// For files opened for reading the engine fills every field. For new files
/// the caller supplies `sample_rate`, `channels` and `format`; the rest is
/// filled in by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SoundInfo {
    pub frames: i64,
    pub sample_rate: i32,
    pub channels: i32,
    pub format: FormatCode,
    pub sections: i32,
    pub seekable: bool,
}

impl SoundInfo {
    /// Size of the fixed-width record exchanged by the current-info command
    pub const WIRE_SIZE: usize = 32;

    /// Descriptor for a new file
    pub fn new(sample_rate: i32, channels: i32, format: FormatCode) -> Self {
        SoundInfo {
            frames: 0,
            sample_rate,
            channels,
            format,
            sections: 0,
            seekable: false,
        }
    }

    /// Channel count as a buffer stride
    pub fn channel_count(&self) -> usize {
        self.channels.max(1) as usize
    }

    /// Check that the descriptor can be used to create a file
    ///
    /// Requires one known major type, one known subtype the container can
    /// hold, a byte order the container accepts and a sane channel count.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.channels < 1 || self.channels > MAX_CHANNELS {
            return Err(format!(
                "channel count {} outside 1..={}",
                self.channels, MAX_CHANNELS
            ));
        }
        if self.sample_rate <= 0 {
            return Err(format!("sample rate {} must be positive", self.sample_rate));
        }
        let major = self
            .format
            .major()
            .ok_or_else(|| format!("unknown major format in 0x{:08x}", self.format.raw()))?;
        let sub = self
            .format
            .subtype()
            .ok_or_else(|| format!("unknown subtype in 0x{:08x}", self.format.raw()))?;
        if !major.supports(sub) {
            return Err(format!("{} cannot hold {}", major, sub));
        }
        let endianness = self.format.endianness();
        match major {
            MajorFormat::Flac if endianness != Endianness::File => {
                Err("FLAC does not take an endianness flag".to_string())
            }
            m if m.is_wav_family() && endianness == Endianness::Big => {
                Err(format!("{} cannot be big endian", m))
            }
            _ => Ok(()),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Duration in seconds, or 0.0 for an unknown rate
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate <= 0 {
            return 0.0;
        }
        self.frames as f64 / self.sample_rate as f64
    }

    /// Encode into the fixed-width record layout (host byte order)
    ///
    /// `frames` at 0, then `sample_rate`, `channels`, `format`, `sections`,
    /// `seekable` as 32-bit words, padded to 8-byte alignment.
    pub fn encode(&self, out: &mut [u8]) -> bool {
        if out.len() < Self::WIRE_SIZE {
            return false;
        }
        NativeEndian::write_i64(&mut out[0..8], self.frames);
        NativeEndian::write_i32(&mut out[8..12], self.sample_rate);
        NativeEndian::write_i32(&mut out[12..16], self.channels);
        NativeEndian::write_i32(&mut out[16..20], self.format.raw());
        NativeEndian::write_i32(&mut out[20..24], self.sections);
        NativeEndian::write_i32(&mut out[24..28], self.seekable as i32);
        out[28..Self::WIRE_SIZE].fill(0);
        true
    }

    /// Decode from the fixed-width record layout
    pub fn decode(buf: &[u8]) -> Option<SoundInfo> {
        if buf.len() < Self::WIRE_SIZE {
            return None;
        }
        Some(SoundInfo {
            frames: NativeEndian::read_i64(&buf[0..8]),
            sample_rate: NativeEndian::read_i32(&buf[8..12]),
            channels: NativeEndian::read_i32(&buf[12..16]),
            format: FormatCode::from_raw(NativeEndian::read_i32(&buf[16..20])),
            sections: NativeEndian::read_i32(&buf[20..24]),
            seekable: NativeEndian::read_i32(&buf[24..28]) != 0,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
