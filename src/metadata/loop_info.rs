//! Loop and tempo hints

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

use super::{check_len, WireRecord};
use crate::engine::Command;
use crate::error::Result;

/// Loop playback mode, shared by loop info and instrument loops
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopMode {
    #[default]
    None,
    Forward,
    Backward,
    Alternating,
    /// Code outside the known set, kept as read
    Unknown(i32),
}

impl LoopMode {
    pub fn raw(self) -> i32 {
        match self {
            LoopMode::None => 800,
            LoopMode::Forward => 801,
            LoopMode::Backward => 802,
            LoopMode::Alternating => 803,
            LoopMode::Unknown(code) => code,
        }
    }

    pub fn from_raw(code: i32) -> Self {
        match code {
            800 => LoopMode::None,
            801 => LoopMode::Forward,
            802 => LoopMode::Backward,
            803 => LoopMode::Alternating,
            other => LoopMode::Unknown(other),
        }
    }
}

/// Musical hints for looped material
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LoopInfo {
    pub time_sig_num: i16,
    pub time_sig_den: i16,
    pub mode: LoopMode,
    /// Beat count; 0 for one-shots
    pub beats: i32,
    /// Tempo hint, not authoritative
    pub bpm: f32,
    /// MIDI note number, or -1
    pub root_key: i32,
    pub future: [i32; 6],
}

impl WireRecord for LoopInfo {
    const SIZE: usize = 44;
    const GET: Command = Command::GET_LOOP_INFO;
    const SET: Command = Command::SET_LOOP_INFO;

    fn encode(&self, out: &mut [u8]) -> Result<()> {
        check_len(out.len(), Self::SIZE, "loop info")?;
        NativeEndian::write_i16(&mut out[0..2], self.time_sig_num);
        NativeEndian::write_i16(&mut out[2..4], self.time_sig_den);
        NativeEndian::write_i32(&mut out[4..8], self.mode.raw());
        NativeEndian::write_i32(&mut out[8..12], self.beats);
        NativeEndian::write_f32(&mut out[12..16], self.bpm);
        NativeEndian::write_i32(&mut out[16..20], self.root_key);
        NativeEndian::write_i32_into(&self.future, &mut out[20..44]);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf.len(), Self::SIZE, "loop info")?;
        let mut future = [0i32; 6];
        NativeEndian::read_i32_into(&buf[20..44], &mut future);
        Ok(LoopInfo {
            time_sig_num: NativeEndian::read_i16(&buf[0..2]),
            time_sig_den: NativeEndian::read_i16(&buf[2..4]),
            mode: LoopMode::from_raw(NativeEndian::read_i32(&buf[4..8])),
            beats: NativeEndian::read_i32(&buf[8..12]),
            bpm: NativeEndian::read_f32(&buf[12..16]),
            root_key: NativeEndian::read_i32(&buf[16..20]),
            future,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        let info = LoopInfo {
            time_sig_num: 7,
            time_sig_den: 8,
            mode: LoopMode::Backward,
            beats: 14,
            bpm: 132.5,
            root_key: 60,
            future: [1, 2, 3, 4, 5, 6],
        };
        let bytes = info.to_bytes().unwrap();
        assert_eq!(bytes.len(), 44);
        assert_eq!(NativeEndian::read_i16(&bytes[2..4]), 8);
        assert_eq!(NativeEndian::read_i32(&bytes[4..8]), 802);
        assert_eq!(NativeEndian::read_i32(&bytes[40..44]), 6);
        assert_eq!(LoopInfo::decode(&bytes).unwrap(), info);
    }

    #[test]
    fn test_unknown_mode_is_preserved() {
        assert_eq!(LoopMode::from_raw(42), LoopMode::Unknown(42));
        assert_eq!(LoopMode::Unknown(42).raw(), 42);
        assert_eq!(LoopMode::from_raw(803), LoopMode::Alternating);
    }

    #[test]
    fn test_short_buffer_rejected() {
        let err = LoopInfo::decode(&[0u8; 40]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RECORD");
    }
}
