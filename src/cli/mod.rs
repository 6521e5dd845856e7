//! CLI Module
//!
//! Command-line interface for inspecting sound files through sndcore.

pub mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// sndcore-info - inspect sound files through the sndcore engines
#[derive(Parser, Debug)]
#[command(name = "sndcore-info")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the format descriptor of WAV files
    #[command(name = "info")]
    Info {
        /// Files or directories to inspect
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Emit one JSON report per line
        #[arg(long)]
        json: bool,
    },

    /// Scan a WAV file and print per-channel peaks
    #[command(name = "peak")]
    Peak {
        /// File to scan
        path: PathBuf,

        /// Report peaks relative to full scale
        #[arg(short, long)]
        normalized: bool,
    },

    /// Print the engine library version
    #[command(name = "version")]
    Version,
}
