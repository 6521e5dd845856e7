//! Metadata Records
//!
//! Optional side records exchanged with the engine as fixed-width byte
//! buffers (host byte order, C struct layout including padding):
//! - [`LoopInfo`]: tempo and loop hints, 44 bytes
//! - [`InstrumentInfo`]: sampler instrument and loops, 272 bytes
//! - [`BroadcastInfo`]: broadcast wave extension, 864 bytes

pub mod broadcast;
pub mod instrument;
pub mod loop_info;
pub mod text;

pub use broadcast::BroadcastInfo;
pub use instrument::{InstrumentInfo, InstrumentLoop};
pub use loop_info::{LoopInfo, LoopMode};
pub use text::FixedText;

use crate::engine::Command;
use crate::error::{Result, SoundError};

/// A record with a fixed wire layout and a get/set command pair
pub trait WireRecord: Sized {
    /// Exact buffer size the engine expects
    const SIZE: usize;
    const GET: Command;
    const SET: Command;

    /// Fill `out` (at least [`WireRecord::SIZE`] bytes)
    fn encode(&self, out: &mut [u8]) -> Result<()>;

    fn decode(buf: &[u8]) -> Result<Self>;

    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut out = vec![0u8; Self::SIZE];
        self.encode(&mut out)?;
        Ok(out)
    }
}

pub(crate) fn check_len(len: usize, size: usize, what: &str) -> Result<()> {
    if len < size {
        return Err(SoundError::invalid_record(format!(
            "{} buffer holds {} bytes, need {}",
            what, len, size
        )));
    }
    Ok(())
}
