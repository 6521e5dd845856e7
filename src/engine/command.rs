//! Engine command codes
//!
//! Every control operation crosses the engine boundary as a command code, a
//! byte buffer and an integer argument. The codes follow the numbering used by
//! the established sound-file libraries, so raw codes can be passed through
//! unchanged.
//!
//! Return conventions differ per command:
//! - boolean toggles return [`TRUE`] / [`FALSE`] (setters return the previous
//!   value unless noted)
//! - record gets return [`TRUE`] when the chunk is present, [`FALSE`] when not
//! - record sets return [`TRUE`] when the container accepted the record
//! - scalar operations (truncate, offsets, quality, maxima) return 0 on success
//! - string queries return the number of bytes available or copied

use std::fmt;

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

pub const TRUE: i32 = 1;
pub const FALSE: i32 = 0;

/// Ambisonic tag values carried by the WAVEX ambisonic commands
pub const AMBISONIC_NONE: i32 = 0x40;
pub const AMBISONIC_B_FORMAT: i32 = 0x41;

/// A command code
///
/// Known codes are associated constants; any other `i32` can still be wrapped
/// for the raw passthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Command(pub i32);

impl Command {
    pub const GET_LIB_VERSION: Command = Command(0x1000);
    pub const GET_LOG_INFO: Command = Command(0x1001);
    pub const GET_CURRENT_INFO: Command = Command(0x1002);

    pub const GET_NORM_DOUBLE: Command = Command(0x1010);
    pub const GET_NORM_FLOAT: Command = Command(0x1011);
    pub const SET_NORM_DOUBLE: Command = Command(0x1012);
    pub const SET_NORM_FLOAT: Command = Command(0x1013);
    pub const SET_SCALE_FLOAT_INT_READ: Command = Command(0x1014);
    pub const SET_SCALE_INT_FLOAT_WRITE: Command = Command(0x1015);

    pub const CALC_SIGNAL_MAX: Command = Command(0x1040);
    pub const CALC_NORM_SIGNAL_MAX: Command = Command(0x1041);
    pub const CALC_MAX_ALL_CHANNELS: Command = Command(0x1042);
    pub const CALC_NORM_MAX_ALL_CHANNELS: Command = Command(0x1043);
    pub const GET_SIGNAL_MAX: Command = Command(0x1044);
    pub const GET_MAX_ALL_CHANNELS: Command = Command(0x1045);

    pub const SET_ADD_PEAK_CHUNK: Command = Command(0x1050);

    pub const UPDATE_HEADER_NOW: Command = Command(0x1060);
    pub const SET_UPDATE_HEADER_AUTO: Command = Command(0x1061);

    pub const FILE_TRUNCATE: Command = Command(0x1080);

    pub const SET_RAW_START_OFFSET: Command = Command(0x1090);

    pub const GET_EMBED_FILE_INFO: Command = Command(0x10B0);

    pub const SET_CLIPPING: Command = Command(0x10C0);
    pub const GET_CLIPPING: Command = Command(0x10C1);

    pub const GET_INSTRUMENT: Command = Command(0x10D0);
    pub const SET_INSTRUMENT: Command = Command(0x10D1);

    pub const GET_LOOP_INFO: Command = Command(0x10E0);
    pub const SET_LOOP_INFO: Command = Command(0x10E1);

    pub const GET_BROADCAST_INFO: Command = Command(0x10F0);
    pub const SET_BROADCAST_INFO: Command = Command(0x10F1);

    pub const RAW_DATA_NEEDS_ENDSWAP: Command = Command(0x1110);

    pub const WAVEX_SET_AMBISONIC: Command = Command(0x1200);
    pub const WAVEX_GET_AMBISONIC: Command = Command(0x1201);

    pub const SET_VBR_ENCODING_QUALITY: Command = Command(0x1300);

    pub const fn code(self) -> i32 {
        self.0
    }

    /// Symbolic name for known codes
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Command::GET_LIB_VERSION => "GET_LIB_VERSION",
            Command::GET_LOG_INFO => "GET_LOG_INFO",
            Command::GET_CURRENT_INFO => "GET_CURRENT_INFO",
            Command::GET_NORM_DOUBLE => "GET_NORM_DOUBLE",
            Command::GET_NORM_FLOAT => "GET_NORM_FLOAT",
            Command::SET_NORM_DOUBLE => "SET_NORM_DOUBLE",
            Command::SET_NORM_FLOAT => "SET_NORM_FLOAT",
            Command::SET_SCALE_FLOAT_INT_READ => "SET_SCALE_FLOAT_INT_READ",
            Command::SET_SCALE_INT_FLOAT_WRITE => "SET_SCALE_INT_FLOAT_WRITE",
            Command::CALC_SIGNAL_MAX => "CALC_SIGNAL_MAX",
            Command::CALC_NORM_SIGNAL_MAX => "CALC_NORM_SIGNAL_MAX",
            Command::CALC_MAX_ALL_CHANNELS => "CALC_MAX_ALL_CHANNELS",
            Command::CALC_NORM_MAX_ALL_CHANNELS => "CALC_NORM_MAX_ALL_CHANNELS",
            Command::GET_SIGNAL_MAX => "GET_SIGNAL_MAX",
            Command::GET_MAX_ALL_CHANNELS => "GET_MAX_ALL_CHANNELS",
            Command::SET_ADD_PEAK_CHUNK => "SET_ADD_PEAK_CHUNK",
            Command::UPDATE_HEADER_NOW => "UPDATE_HEADER_NOW",
            Command::SET_UPDATE_HEADER_AUTO => "SET_UPDATE_HEADER_AUTO",
            Command::FILE_TRUNCATE => "FILE_TRUNCATE",
            Command::SET_RAW_START_OFFSET => "SET_RAW_START_OFFSET",
            Command::GET_EMBED_FILE_INFO => "GET_EMBED_FILE_INFO",
            Command::SET_CLIPPING => "SET_CLIPPING",
            Command::GET_CLIPPING => "GET_CLIPPING",
            Command::GET_INSTRUMENT => "GET_INSTRUMENT",
            Command::SET_INSTRUMENT => "SET_INSTRUMENT",
            Command::GET_LOOP_INFO => "GET_LOOP_INFO",
            Command::SET_LOOP_INFO => "SET_LOOP_INFO",
            Command::GET_BROADCAST_INFO => "GET_BROADCAST_INFO",
            Command::SET_BROADCAST_INFO => "SET_BROADCAST_INFO",
            Command::RAW_DATA_NEEDS_ENDSWAP => "RAW_DATA_NEEDS_ENDSWAP",
            Command::WAVEX_SET_AMBISONIC => "WAVEX_SET_AMBISONIC",
            Command::WAVEX_GET_AMBISONIC => "WAVEX_GET_AMBISONIC",
            Command::SET_VBR_ENCODING_QUALITY => "SET_VBR_ENCODING_QUALITY",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

// ============================================================================
// Scalar payloads
// ============================================================================

/// Write a 64-bit integer payload; false if the buffer is too small
pub(crate) fn put_i64(data: &mut [u8], value: i64) -> bool {
    if data.len() < 8 {
        return false;
    }
    NativeEndian::write_i64(&mut data[..8], value);
    true
}

pub(crate) fn get_i64(data: &[u8]) -> Option<i64> {
    (data.len() >= 8).then(|| NativeEndian::read_i64(&data[..8]))
}

/// Write a double payload; false if the buffer is too small
pub(crate) fn put_f64(data: &mut [u8], value: f64) -> bool {
    if data.len() < 8 {
        return false;
    }
    NativeEndian::write_f64(&mut data[..8], value);
    true
}

pub(crate) fn get_f64(data: &[u8]) -> Option<f64> {
    (data.len() >= 8).then(|| NativeEndian::read_f64(&data[..8]))
}

/// Write one double per channel; false if the buffer is too small
pub(crate) fn put_f64_slice(data: &mut [u8], values: &[f64]) -> bool {
    if data.len() < values.len() * 8 {
        return false;
    }
    NativeEndian::write_f64_into(values, &mut data[..values.len() * 8]);
    true
}

pub(crate) fn get_f64_vec(data: &[u8], count: usize) -> Option<Vec<f64>> {
    if data.len() < count * 8 {
        return None;
    }
    let mut values = vec![0.0; count];
    NativeEndian::read_f64_into(&data[..count * 8], &mut values);
    Some(values)
}

/// Copy a string reply, returning the byte count the caller should see
///
/// An empty buffer asks for the full length; otherwise as many bytes as fit
/// are copied and that count is returned.
pub(crate) fn put_text(data: &mut [u8], text: &str) -> i32 {
    let bytes = text.as_bytes();
    if data.is_empty() {
        return bytes.len() as i32;
    }
    let n = bytes.len().min(data.len());
    data[..n].copy_from_slice(&bytes[..n]);
    n as i32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_display() {
        assert_eq!(Command::FILE_TRUNCATE.to_string(), "FILE_TRUNCATE");
        assert_eq!(Command(0x7777).to_string(), "0x7777");
        assert_eq!(Command::GET_LIB_VERSION.code(), 0x1000);
    }

    #[test]
    fn test_scalar_payloads() {
        let mut buf = [0u8; 16];
        assert!(put_i64(&mut buf, -20));
        assert_eq!(get_i64(&buf), Some(-20));
        assert!(put_f64(&mut buf[8..], 0.5));
        assert_eq!(get_f64(&buf[8..]), Some(0.5));
        assert!(!put_i64(&mut buf[..4], 1));
        assert_eq!(get_f64(&buf[..7]), None);
    }

    #[test]
    fn test_channel_payloads() {
        let mut buf = [0u8; 24];
        assert!(put_f64_slice(&mut buf, &[0.25, -1.0, 3.5]));
        assert_eq!(get_f64_vec(&buf, 3), Some(vec![0.25, -1.0, 3.5]));
        assert!(!put_f64_slice(&mut buf[..16], &[0.0; 3]));
    }

    #[test]
    fn test_put_text_length_protocol() {
        assert_eq!(put_text(&mut [], "engine-1.0"), 10);
        let mut buf = [0u8; 6];
        assert_eq!(put_text(&mut buf, "engine-1.0"), 6);
        assert_eq!(&buf, b"engine");
    }
}
