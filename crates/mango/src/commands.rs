//! Command handlers. Every outcome, success or failure, is rendered as
//! human-readable lines on the given writer; failures do not change the
//! process exit status.

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::Shell;
use log::warn;

use mango_core::{InstallReport, InstallRequest, Toolchain, UninstallReport, parse_version};
use mango_model::{GoVersion, MangoError};

use crate::cli::{Cli, Commands};
use crate::progress::InstallProgressBar;

const INSTALL_HINT: &str = "Use 'mango install <version>' to add Go versions.";

pub async fn run(command: Commands, toolchain: &Toolchain, out: &mut impl Write) -> io::Result<()> {
    match command {
        Commands::Install { version, activate } => install(toolchain, &version, activate, out).await,
        Commands::Uninstall { version } => uninstall(toolchain, &version, out),
        Commands::Use { version } => use_version(toolchain, &version, out).await,
        Commands::List => list(toolchain, out),
        Commands::Version => version(toolchain, out),
        Commands::Completion { shell } => completion(shell, out),
    }
}

pub fn completion(shell: Shell, out: &mut impl Write) -> io::Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, out);
    Ok(())
}

async fn install(
    toolchain: &Toolchain,
    input: &str,
    activate: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    let request = match InstallRequest::parse(input) {
        Ok(request) => request,
        Err(_) => {
            return writeln!(
                out,
                "Invalid Go version: use a specific version or 'latest' for the most recent version."
            );
        }
    };

    let bar = InstallProgressBar::stderr();
    let progress = |event| bar.handle(event);
    let result = toolchain.install(&request, activate, &progress).await;
    bar.finish();

    match result {
        Ok(report) => render_install_report(&report, activate, out),
        Err(MangoError::AlreadyInstalled { version }) => {
            writeln!(out, "Go version {version} is already installed.")
        }
        Err(MangoError::Unavailable { version }) => writeln!(
            out,
            "Go version {version} is not available, refer to the official download page for available options."
        ),
        Err(error) => writeln!(out, "Error installing Go: {error}"),
    }
}

fn render_install_report(
    report: &InstallReport,
    activate: bool,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Go version {} is now installed.", report.version)?;
    match &report.activation {
        Ok(Some(active)) => writeln!(out, "Go environment is using version {active}"),
        Ok(None) => Ok(()),
        Err(error) if activate => {
            writeln!(out, "Error switching to Go {}: {error}", report.version)
        }
        Err(error) => writeln!(out, "Error auto-switching versions after download: {error}"),
    }
}

fn uninstall(toolchain: &Toolchain, input: &str, out: &mut impl Write) -> io::Result<()> {
    let Ok(version) = parse_version(input) else {
        return writeln!(
            out,
            "Invalid Go version: use 'mango list' to view installed versions to uninstall."
        );
    };

    match toolchain.uninstall(&version) {
        Ok(report) => render_uninstall_report(&report, out),
        Err(MangoError::NotInstalled { version }) => {
            writeln!(out, "Go version {version} is not installed.")
        }
        Err(error) => writeln!(out, "Error uninstalling Go {version}: {error}"),
    }
}

fn render_uninstall_report(report: &UninstallReport, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Go version {} was uninstalled.", report.version)?;
    if let Some(error) = &report.cleanup_error {
        writeln!(out, "Error cleaning symlinks: {error}")?;
    }
    match &report.auto_switch {
        Ok(Some(active)) => writeln!(out, "Go environment is using version {active}"),
        Ok(None) => Ok(()),
        Err(error) => writeln!(out, "Error auto-switching versions after uninstall: {error}"),
    }
}

async fn use_version(toolchain: &Toolchain, input: &str, out: &mut impl Write) -> io::Result<()> {
    let Ok(request) = InstallRequest::parse(input) else {
        return writeln!(out, "Invalid Go version specified.");
    };

    match toolchain.use_version(&request).await {
        Ok(installed) => writeln!(
            out,
            "Go environment is using version {}",
            installed.version
        ),
        Err(MangoError::NotInstalled { version }) => writeln!(
            out,
            "Go version {version} couldn't be found, use 'mango install {version}' to download it."
        ),
        Err(MangoError::Unavailable { .. }) => writeln!(
            out,
            "Unsupported Go version, refer to the official download page for available options."
        ),
        Err(MangoError::Network { .. }) => writeln!(
            out,
            "Error checking version availability, please try again or check your internet connection."
        ),
        Err(error) => writeln!(out, "{error}"),
    }
}

fn list(toolchain: &Toolchain, out: &mut impl Write) -> io::Result<()> {
    let versions = match toolchain.list() {
        Ok(versions) => versions,
        Err(error) => return writeln!(out, "Error listing Go versions: {error}"),
    };
    if versions.is_empty() {
        return writeln!(out, "{INSTALL_HINT}");
    }

    let active = active_version(toolchain);
    writeln!(out, "Installed Go Versions:")?;
    for version in &versions {
        let marker = if active.as_ref() == Some(version) { "*" } else { " " };
        writeln!(out, "{marker} {version}")?;
    }
    Ok(())
}

fn active_version(toolchain: &Toolchain) -> Option<GoVersion> {
    match toolchain.current() {
        Ok(version) => Some(version),
        Err(MangoError::NotSet) => None,
        Err(error) => {
            warn!("Could not determine the active version: {error}");
            None
        }
    }
}

fn version(toolchain: &Toolchain, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Mango: {}", env!("CARGO_PKG_VERSION"))?;
    match toolchain.current() {
        Ok(version) => writeln!(out, "Go: {version}"),
        Err(MangoError::NotSet) => writeln!(out, "{INSTALL_HINT}"),
        Err(error) => writeln!(out, "Error retrieving Go version: {error}"),
    }
}
