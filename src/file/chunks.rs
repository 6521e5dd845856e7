//! Metadata record exchange on an open handle
//!
//! A get returns `Ok(None)` when the file has no such chunk. A set returns
//! `Ok(false)` when the container cannot carry the chunk.

use super::control::command_error;
use super::SoundFile;
use crate::engine::command::TRUE;
use crate::error::Result;
use crate::metadata::{BroadcastInfo, InstrumentInfo, LoopInfo, WireRecord};

impl SoundFile {
    fn get_record<R: WireRecord>(&mut self, operation: &'static str) -> Result<Option<R>> {
        let session = self.live_session(operation)?;
        let mut buf = vec![0u8; R::SIZE];
        let found = session.command(R::GET, &mut buf, R::SIZE as i32);
        if session.last_error().is_error() {
            return Err(command_error(session, R::GET));
        }
        if found != TRUE {
            return Ok(None);
        }
        R::decode(&buf).map(Some)
    }

    fn set_record<R: WireRecord>(&mut self, operation: &'static str, record: &R) -> Result<bool> {
        self.live_session(operation)?;
        self.require_write(operation)?;
        let mut buf = record.to_bytes()?;
        let session = self.live_session(operation)?;
        let accepted = session.command(R::SET, &mut buf, R::SIZE as i32);
        if session.last_error().is_error() {
            return Err(command_error(session, R::SET));
        }
        Ok(accepted == TRUE)
    }

    pub fn loop_info(&mut self) -> Result<Option<LoopInfo>> {
        self.get_record("loop_info")
    }

    pub fn set_loop_info(&mut self, info: &LoopInfo) -> Result<bool> {
        self.set_record("set_loop_info", info)
    }

    pub fn instrument(&mut self) -> Result<Option<InstrumentInfo>> {
        self.get_record("instrument")
    }

    /// Fails with [`crate::SoundError::InvalidRecord`] for more than 16 loops
    pub fn set_instrument(&mut self, instrument: &InstrumentInfo) -> Result<bool> {
        self.set_record("set_instrument", instrument)
    }

    pub fn broadcast_info(&mut self) -> Result<Option<BroadcastInfo>> {
        self.get_record("broadcast_info")
    }

    /// Text beyond a field's capacity was already truncated when the record
    /// was built
    pub fn set_broadcast_info(&mut self, info: &BroadcastInfo) -> Result<bool> {
        self.set_record("set_broadcast_info", info)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::MemoryEngine;
    use crate::error::SoundError;
    use crate::file::SoundFile;
    use crate::format::{MajorFormat, OpenMode, SoundInfo, SubFormat};
    use crate::metadata::{InstrumentInfo, InstrumentLoop, LoopInfo, LoopMode};

    #[test]
    fn test_absent_chunks_are_none() {
        let engine = MemoryEngine::new();
        let info = SoundInfo::new(44100, 1, MajorFormat::Wav | SubFormat::Pcm16);
        let mut file = SoundFile::open(&engine, "m.wav", OpenMode::ReadWrite, info).unwrap();
        assert!(file.loop_info().unwrap().is_none());
        assert!(file.instrument().unwrap().is_none());
        assert!(file.broadcast_info().unwrap().is_none());
    }

    #[test]
    fn test_set_requires_write_mode() {
        let engine = MemoryEngine::new();
        let info = SoundInfo::new(44100, 1, MajorFormat::Wav | SubFormat::Pcm16);
        SoundFile::create(&engine, "ro.wav", info).unwrap().close().unwrap();

        let mut file = SoundFile::open_read(&engine, "ro.wav").unwrap();
        let err = file.set_loop_info(&LoopInfo::default()).unwrap_err();
        assert!(matches!(err, SoundError::Mode { .. }));
    }

    #[test]
    fn test_unsupported_container_rejects_set() {
        let engine = MemoryEngine::new();
        let info = SoundInfo::new(44100, 1, MajorFormat::Au | SubFormat::Pcm16);
        let mut file = SoundFile::create(&engine, "x.au", info).unwrap();
        let accepted = file
            .set_loop_info(&LoopInfo {
                mode: LoopMode::Forward,
                ..LoopInfo::default()
            })
            .unwrap();
        assert!(!accepted);
    }

    #[test]
    fn test_oversized_instrument_rejected_before_engine() {
        let engine = MemoryEngine::new();
        let info = SoundInfo::new(44100, 1, MajorFormat::Aiff | SubFormat::Pcm16);
        let mut file = SoundFile::create(&engine, "i.aiff", info).unwrap();
        let inst = InstrumentInfo {
            loops: vec![InstrumentLoop::default(); 17],
            ..InstrumentInfo::default()
        };
        let err = file.set_instrument(&inst).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_RECORD");
    }
}
