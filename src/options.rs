//! Open configuration
//!
//! [`OpenOptions`] gathers everything needed to open a handle in one
//! serializable value, so a configuration can be stored alongside other
//! settings and replayed later.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::Result;
use crate::file::SoundFile;
use crate::format::{OpenMode, SoundInfo};

/// Builder for [`SoundFile`]
///
/// Overrides left as `None` keep the engine's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenOptions {
    pub mode: OpenMode,
    /// Descriptor for new files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub info: Option<SoundInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub float_normalization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_normalization: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipping: Option<bool>,
}

impl OpenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Options for creating a file described by `info`
    pub fn write(info: SoundInfo) -> Self {
        OpenOptions {
            mode: OpenMode::Write,
            info: Some(info),
            ..Self::default()
        }
    }

    pub fn mode(mut self, mode: OpenMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn info(mut self, info: SoundInfo) -> Self {
        self.info = Some(info);
        self
    }

    pub fn float_normalization(mut self, on: bool) -> Self {
        self.float_normalization = Some(on);
        self
    }

    pub fn double_normalization(mut self, on: bool) -> Self {
        self.double_normalization = Some(on);
        self
    }

    pub fn clipping(mut self, on: bool) -> Self {
        self.clipping = Some(on);
        self
    }

    /// Open `path` and apply the overrides
    pub fn open(&self, engine: &dyn Engine, path: impl AsRef<Path>) -> Result<SoundFile> {
        let mut file = SoundFile::open(engine, path, self.mode, self.info.unwrap_or_default())?;
        if let Some(on) = self.float_normalization {
            file.set_float_normalization(on)?;
        }
        if let Some(on) = self.double_normalization {
            file.set_double_normalization(on)?;
        }
        if let Some(on) = self.clipping {
            file.set_clipping(on)?;
        }
        Ok(file)
    }
}
