//! sndcore - Typed Sample Transfer over Sound-File Engines
//!
//! sndcore sits between a calling program and an opaque sound-file engine
//! (the component that actually parses and encodes containers). It provides:
//! 1. Typed sample transfer - item and frame oriented reads and writes over
//!    `i16`, `i32`, `f32` and `f64` buffers, whatever the native encoding
//! 2. A single shared cursor with start/current/end seeking
//! 3. Metadata marshalling - loop, instrument and broadcast records exchanged
//!    with the engine as fixed-width binary records
//!
//! # Architecture
//!
//! - [`engine`]: the engine interface plus two engines, an in-memory
//!   reference engine and a WAV engine backed by `hound`
//! - [`transfer`]: sample conversion and the generic read/write path
//! - [`metadata`]: host records and their wire codecs
//! - [`file`]: the [`SoundFile`] handle composing all of the above
//!
//! # Example
//!
//! ```
//! use sndcore::{MajorFormat, MemoryEngine, OpenMode, SoundFile, SoundInfo, SubFormat, Whence};
//!
//! let engine = MemoryEngine::new();
//! let info = SoundInfo::new(44100, 2, MajorFormat::Wav | SubFormat::Pcm16);
//!
//! let mut file = SoundFile::open(&engine, "tone.wav", OpenMode::ReadWrite, info)?;
//! file.write_frames(&[0i16, 0, 1000, -1000, 2000, -2000])?;
//! file.seek(0, Whence::Start)?;
//!
//! let mut frames = [0i32; 6];
//! assert_eq!(file.read_frames(&mut frames)?, 3);
//! assert_eq!(frames[2], 1000 << 16);
//! file.close()?;
//! # Ok::<(), sndcore::SoundError>(())
//! ```

pub mod cli;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod file;
pub mod format;
pub mod metadata;
pub mod options;
pub mod transfer;

pub use cursor::Cursor;
pub use engine::{Command, Engine, ErrorCode, MemoryEngine, Session, WavEngine};
pub use error::{Result, SoundError};
pub use file::{engine_command, library_version, Ambisonic, EmbeddedFileInfo, SoundFile};
pub use format::{Endianness, FormatCode, MajorFormat, OpenMode, SoundInfo, SubFormat, Whence};
pub use metadata::{BroadcastInfo, FixedText, InstrumentInfo, InstrumentLoop, LoopInfo, LoopMode};
pub use options::OpenOptions;
pub use transfer::{ConversionSettings, Sample, SampleKind};
