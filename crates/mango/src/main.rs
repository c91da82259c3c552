//! mango - Go Version Manager
//!
//! Installs Go releases side by side and switches between them.

use std::sync::Arc;

use clap::{CommandFactory, Parser};
use clap_complete::CompleteEnv;
use log::{debug, warn};

use mango_core::Toolchain;
use mango_godev::GoDevSource;
use mango_platform::{HostBinaryProbe, MangoPaths, clean_cache};

mod cli;
mod commands;
mod complete;
mod error;
mod logging;
mod progress;
mod settings;

use cli::{Cli, Commands};
use error::StartupError;
use settings::Settings;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    CompleteEnv::with_factory(Cli::command).complete();

    let cli = Cli::parse();

    if let Commands::Completion { shell } = cli.command {
        if let Err(error) = commands::completion(shell, &mut std::io::stdout()) {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
        return;
    }

    let toolchain = match startup(cli.verbose) {
        Ok(toolchain) => toolchain,
        Err(error) => {
            println!("Error: {error}");
            std::process::exit(1);
        }
    };

    let mut stdout = std::io::stdout().lock();
    if let Err(error) = commands::run(cli.command, &toolchain, &mut stdout).await {
        warn!("Failed to write command output: {error}");
    }
}

/// Locate the root, load settings, start logging, wipe the cache and wire up
/// the toolchain.
fn startup(verbose: bool) -> Result<Toolchain, StartupError> {
    let paths = MangoPaths::discover()?;

    let (settings, settings_error) = match Settings::load(&paths.settings_file()) {
        Ok(settings) => (settings, None),
        Err(error) => (Settings::default(), Some(error)),
    };

    logging::init_logging(
        &paths.log_file(),
        settings.debug_logging,
        verbose,
        settings.max_log_size_bytes,
    );
    if let Some(error) = settings_error {
        warn!("Using default settings: {error}");
    }

    match clean_cache(&paths.cache_dir) {
        Ok(report) if report.is_clean() => {
            debug!("Cache cleaned, {} entries removed", report.removed);
        }
        Ok(report) => {
            for (path, error) in &report.failures {
                println!("Error removing {}: {error}", path.display());
            }
        }
        Err(error) => println!("Error reading cache directory: {error}"),
    }

    paths.ensure_dirs().map_err(|source| StartupError::Layout {
        path: paths.root.clone(),
        source,
    })?;

    let source = GoDevSource::with_timeouts(
        &settings.download_base_url,
        settings.http_timeout(),
        settings.connect_timeout(),
    )?;

    Ok(Toolchain::new(
        paths,
        Arc::new(source),
        settings.archive_target(),
        Arc::new(HostBinaryProbe::host()),
    ))
}
