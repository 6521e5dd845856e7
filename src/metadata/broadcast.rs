//! Broadcast wave extension record

use byteorder::{ByteOrder, NativeEndian};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use super::{check_len, FixedText, WireRecord};
use crate::engine::Command;
use crate::error::Result;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Coding history capacity in the wire record
pub const CODING_HISTORY_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BroadcastInfo {
    pub description: FixedText<256>,
    pub originator: FixedText<32>,
    pub originator_reference: FixedText<32>,
    /// `YYYY-MM-DD`
    pub origination_date: FixedText<10>,
    /// `HH:MM:SS`
    pub origination_time: FixedText<8>,
    pub time_reference_low: u32,
    pub time_reference_high: u32,
    pub version: i16,
    pub umid: FixedText<64>,
    pub loudness_value: i16,
    pub loudness_range: i16,
    pub max_true_peak_level: i16,
    pub max_momentary_loudness: i16,
    pub max_short_term_loudness: i16,
    pub coding_history: FixedText<CODING_HISTORY_CAPACITY>,
}

impl BroadcastInfo {
    /// Sample count since midnight of the first sample
    pub fn time_reference(&self) -> u64 {
        ((self.time_reference_high as u64) << 32) | self.time_reference_low as u64
    }

    pub fn set_time_reference(&mut self, samples: u64) {
        self.time_reference_low = samples as u32;
        self.time_reference_high = (samples >> 32) as u32;
    }

    pub fn set_origination(&mut self, at: NaiveDateTime) {
        self.origination_date = FixedText::new(at.format(DATE_FORMAT).to_string());
        self.origination_time = FixedText::new(at.format(TIME_FORMAT).to_string());
    }

    /// Parse the origination fields; `None` if either is malformed
    pub fn origination(&self) -> Option<NaiveDateTime> {
        let date =
            NaiveDate::parse_from_str(&self.origination_date.to_string_lossy(), DATE_FORMAT).ok()?;
        let time =
            NaiveTime::parse_from_str(&self.origination_time.to_string_lossy(), TIME_FORMAT).ok()?;
        Some(date.and_time(time))
    }
}

impl WireRecord for BroadcastInfo {
    const SIZE: usize = 864;
    const GET: Command = Command::GET_BROADCAST_INFO;
    const SET: Command = Command::SET_BROADCAST_INFO;

    fn encode(&self, out: &mut [u8]) -> Result<()> {
        check_len(out.len(), Self::SIZE, "broadcast info")?;
        out[..Self::SIZE].fill(0);

        self.description.write_wire(&mut out[0..256]);
        self.originator.write_wire(&mut out[256..288]);
        self.originator_reference.write_wire(&mut out[288..320]);
        self.origination_date.write_wire(&mut out[320..330]);
        self.origination_time.write_wire(&mut out[330..338]);
        NativeEndian::write_u32(&mut out[340..344], self.time_reference_low);
        NativeEndian::write_u32(&mut out[344..348], self.time_reference_high);
        NativeEndian::write_i16(&mut out[348..350], self.version);
        self.umid.write_wire(&mut out[350..414]);
        NativeEndian::write_i16(&mut out[414..416], self.loudness_value);
        NativeEndian::write_i16(&mut out[416..418], self.loudness_range);
        NativeEndian::write_i16(&mut out[418..420], self.max_true_peak_level);
        NativeEndian::write_i16(&mut out[420..422], self.max_momentary_loudness);
        NativeEndian::write_i16(&mut out[422..424], self.max_short_term_loudness);
        NativeEndian::write_u32(&mut out[604..608], self.coding_history.len() as u32);
        self.coding_history.write_wire(&mut out[608..864]);
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf.len(), Self::SIZE, "broadcast info")?;
        let history_len = NativeEndian::read_u32(&buf[604..608]) as usize;

        Ok(BroadcastInfo {
            description: FixedText::from_wire(&buf[0..256]),
            originator: FixedText::from_wire(&buf[256..288]),
            originator_reference: FixedText::from_wire(&buf[288..320]),
            origination_date: FixedText::from_wire(&buf[320..330]),
            origination_time: FixedText::from_wire(&buf[330..338]),
            time_reference_low: NativeEndian::read_u32(&buf[340..344]),
            time_reference_high: NativeEndian::read_u32(&buf[344..348]),
            version: NativeEndian::read_i16(&buf[348..350]),
            umid: FixedText::from_wire(&buf[350..414]),
            loudness_value: NativeEndian::read_i16(&buf[414..416]),
            loudness_range: NativeEndian::read_i16(&buf[416..418]),
            max_true_peak_level: NativeEndian::read_i16(&buf[418..420]),
            max_momentary_loudness: NativeEndian::read_i16(&buf[420..422]),
            max_short_term_loudness: NativeEndian::read_i16(&buf[422..424]),
            coding_history: FixedText::from_wire_with_len(&buf[608..864], history_len),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_time_reference_halves() {
        let mut info = BroadcastInfo::default();
        info.set_time_reference(0x0000_0002_8000_0001);
        assert_eq!(info.time_reference_high, 2);
        assert_eq!(info.time_reference_low, 0x8000_0001);
        assert_eq!(info.time_reference(), 0x0000_0002_8000_0001);
    }

    #[test]
    fn test_origination_via_chrono() {
        let at = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(17, 5, 0)
            .unwrap();
        let mut info = BroadcastInfo::default();
        info.set_origination(at);
        assert_eq!(info.origination_date.to_string(), "2024-03-09");
        assert_eq!(info.origination_time.to_string(), "17:05:00");
        assert_eq!(info.origination(), Some(at));

        info.origination_time = FixedText::new("noon");
        assert_eq!(info.origination(), None);
    }

    #[test]
    fn test_wire_layout() {
        let mut info = BroadcastInfo {
            description: "Interview, take 2".into(),
            originator: "Field recorder".into(),
            originator_reference: "REF-0001".into(),
            version: 2,
            loudness_value: -2300,
            max_short_term_loudness: -1500,
            coding_history: "A=PCM,F=48000,W=24,M=mono".into(),
            ..BroadcastInfo::default()
        };
        info.set_time_reference(48_000 * 3600);

        let bytes = info.to_bytes().unwrap();
        assert_eq!(bytes.len(), 864);
        assert_eq!(&bytes[288..296], b"REF-0001");
        assert_eq!(NativeEndian::read_i16(&bytes[348..350]), 2);
        assert_eq!(NativeEndian::read_i16(&bytes[414..416]), -2300);
        assert_eq!(NativeEndian::read_u32(&bytes[604..608]), 25);
        assert_eq!(BroadcastInfo::decode(&bytes).unwrap(), info);
    }

    #[test]
    fn test_long_text_is_truncated() {
        let info = BroadcastInfo {
            originator: "x".repeat(40).into(),
            coding_history: "h".repeat(300).into(),
            ..BroadcastInfo::default()
        };
        let decoded = BroadcastInfo::decode(&info.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded.originator.len(), 32);
        assert_eq!(decoded.coding_history.len(), CODING_HISTORY_CAPACITY);
    }

    #[test]
    fn test_history_length_is_clamped() {
        let mut bytes = BroadcastInfo::default().to_bytes().unwrap();
        bytes[608..611].copy_from_slice(b"abc");
        NativeEndian::write_u32(&mut bytes[604..608], 10_000);
        let decoded = BroadcastInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.coding_history.to_string(), "abc");

        NativeEndian::write_u32(&mut bytes[604..608], 2);
        let decoded = BroadcastInfo::decode(&bytes).unwrap();
        assert_eq!(decoded.coding_history.to_string(), "ab");
    }
}
