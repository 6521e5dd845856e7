//! CLI Command Implementations
//!
//! Implements the actual logic for each CLI command. Files are opened through
//! the WAV engine.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};
use serde::Serialize;
use walkdir::WalkDir;

use crate::engine::WavEngine;
use crate::file::{library_version, SoundFile};
use crate::format::SoundInfo;

/// What `info` reports for one file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub format: String,
    pub info: SoundInfo,
    pub duration_secs: f64,
}

impl FileReport {
    pub fn inspect(path: &Path) -> crate::Result<Self> {
        let file = SoundFile::open_read(&WavEngine, path)?;
        let info = *file.info();
        Ok(FileReport {
            path: path.to_path_buf(),
            format: info.format.to_string(),
            info,
            duration_secs: info.duration_secs(),
        })
    }
}

fn is_wav(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("wav"))
        .unwrap_or(false)
}

/// Expand directory arguments into the WAV files they contain
pub fn collect_paths(paths: &[PathBuf], recursive: bool) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        let depth = if recursive { usize::MAX } else { 1 };
        for entry in WalkDir::new(path).max_depth(depth).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_wav(entry.path()) => {
                    files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => warn!("Skipping unreadable entry: {}", e),
            }
        }
    }
    files
}

/// Print the descriptor of every file; returns the number that failed
pub fn show_info(paths: &[PathBuf], recursive: bool, json: bool) -> Result<usize> {
    let files = collect_paths(paths, recursive);
    info!("Inspecting {} file(s)", files.len());

    let mut failures = 0;
    for path in &files {
        match FileReport::inspect(path) {
            Ok(report) if json => {
                println!("{}", serde_json::to_string(&report).context("Failed to encode report")?);
            }
            Ok(report) => {
                println!("{}", report.path.display());
                println!("  Format:      {}", report.format);
                println!("  Sample rate: {} Hz", report.info.sample_rate);
                println!("  Channels:    {}", report.info.channels);
                println!("  Frames:      {}", report.info.frames);
                println!("  Duration:    {:.3} s", report.duration_secs);
            }
            Err(e) => {
                warn!("{}", e);
                failures += 1;
            }
        }
    }

    Ok(failures)
}

/// Print per-channel peaks of one file
pub fn show_peaks(path: &Path, normalized: bool) -> Result<()> {
    let mut file = SoundFile::open_read(&WavEngine, path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let peaks = if normalized {
        file.calc_norm_max_all_channels()?
    } else {
        file.calc_max_all_channels()?
    };

    println!("{}", path.display());
    for (channel, peak) in peaks.iter().enumerate() {
        println!("  Channel {}: {:.6}", channel + 1, peak);
    }
    file.close()?;
    Ok(())
}

pub fn show_version() {
    println!("{}", library_version(&WavEngine));
}
