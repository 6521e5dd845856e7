//! sndcore-info - Sound File Inspector
//!
//! Command-line front end for the sndcore library.

use clap::Parser;
use env_logger::Env;
use log::{debug, info};

use sndcore::cli::{commands, Cli, Commands};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_filter)).init();

    debug!("sndcore-info v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Info {
            paths,
            recursive,
            json,
        }) => {
            let failures = commands::show_info(&paths, recursive, json)?;
            if failures > 0 {
                anyhow::bail!("{} file(s) could not be inspected", failures);
            }
            Ok(())
        }
        Some(Commands::Peak { path, normalized }) => commands::show_peaks(&path, normalized),
        Some(Commands::Version) => {
            commands::show_version();
            Ok(())
        }
        None => {
            info!("No command given");
            println!("sndcore-info v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for available commands");
            Ok(())
        }
    }
}
