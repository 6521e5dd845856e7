//! Sampler instrument record

use byteorder::{ByteOrder, NativeEndian};
use serde::{Deserialize, Serialize};

use super::{check_len, LoopMode, WireRecord};
use crate::engine::Command;
use crate::error::{Result, SoundError};

/// Loop slots in the wire record
pub const MAX_LOOPS: usize = 16;

const LOOPS_OFFSET: usize = 16;
const LOOP_STRIDE: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentLoop {
    pub mode: LoopMode,
    pub start: u32,
    pub end: u32,
    /// Play count; 0 loops forever
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct InstrumentInfo {
    pub gain: i32,
    pub base_note: u8,
    pub detune: i8,
    pub velocity_lo: u8,
    pub velocity_hi: u8,
    pub key_lo: u8,
    pub key_hi: u8,
    /// At most [`MAX_LOOPS`]
    pub loops: Vec<InstrumentLoop>,
}

impl WireRecord for InstrumentInfo {
    const SIZE: usize = LOOPS_OFFSET + MAX_LOOPS * LOOP_STRIDE;
    const GET: Command = Command::GET_INSTRUMENT;
    const SET: Command = Command::SET_INSTRUMENT;

    fn encode(&self, out: &mut [u8]) -> Result<()> {
        check_len(out.len(), Self::SIZE, "instrument")?;
        if self.loops.len() > MAX_LOOPS {
            return Err(SoundError::invalid_record(format!(
                "instrument has {} loops, at most {} fit",
                self.loops.len(),
                MAX_LOOPS
            )));
        }

        out[..Self::SIZE].fill(0);
        NativeEndian::write_i32(&mut out[0..4], self.gain);
        out[4] = self.base_note;
        out[5] = self.detune as u8;
        out[6] = self.velocity_lo;
        out[7] = self.velocity_hi;
        out[8] = self.key_lo;
        out[9] = self.key_hi;
        NativeEndian::write_i32(&mut out[12..16], self.loops.len() as i32);

        for (i, lp) in self.loops.iter().enumerate() {
            let slot = &mut out[LOOPS_OFFSET + i * LOOP_STRIDE..][..LOOP_STRIDE];
            NativeEndian::write_i32(&mut slot[0..4], lp.mode.raw());
            NativeEndian::write_u32(&mut slot[4..8], lp.start);
            NativeEndian::write_u32(&mut slot[8..12], lp.end);
            NativeEndian::write_u32(&mut slot[12..16], lp.count);
        }
        Ok(())
    }

    fn decode(buf: &[u8]) -> Result<Self> {
        check_len(buf.len(), Self::SIZE, "instrument")?;
        let count = NativeEndian::read_i32(&buf[12..16]).clamp(0, MAX_LOOPS as i32) as usize;

        let loops = (0..count)
            .map(|i| {
                let slot = &buf[LOOPS_OFFSET + i * LOOP_STRIDE..][..LOOP_STRIDE];
                InstrumentLoop {
                    mode: LoopMode::from_raw(NativeEndian::read_i32(&slot[0..4])),
                    start: NativeEndian::read_u32(&slot[4..8]),
                    end: NativeEndian::read_u32(&slot[8..12]),
                    count: NativeEndian::read_u32(&slot[12..16]),
                }
            })
            .collect();

        Ok(InstrumentInfo {
            gain: NativeEndian::read_i32(&buf[0..4]),
            base_note: buf[4],
            detune: buf[5] as i8,
            velocity_lo: buf[6],
            velocity_hi: buf[7],
            key_lo: buf[8],
            key_hi: buf[9],
            loops,
        })
    }
}
