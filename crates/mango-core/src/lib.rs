//! Version management for mango.
//!
//! This crate holds the logic that is independent of the command line and of
//! the concrete release source:
//! - The on-disk version store and the active link set over it.
//! - Identifier validation against the upstream release index.
//! - Download, extraction and registration of new versions.

mod extract;
mod installer;
mod resolver;
mod store;
mod switcher;
mod toolchain;
mod validator;

/// Tar.gz extractor that strips the archive's top-level directory.
pub use extract::TarGzExtractor;
/// Install requests, reports and the installer pipeline.
pub use installer::{InstallReport, InstallRequest, Installer, LATEST, ProgressFn};
/// Reads the active version from the primary link.
pub use resolver::{ActiveVersionResolver, PRIMARY_EXECUTABLE};
/// Installed version records.
pub use store::VersionStore;
/// Link switching, auto-switch policy and uninstall.
pub use switcher::{UninstallReport, VersionSwitcher};
/// Facade used by the command layer.
pub use toolchain::Toolchain;
/// Identifier syntax and upstream availability checks.
pub use validator::{VersionValidator, is_version, parse_version};
