//! Activation state over the shared `bin` directory.
//!
//! The link set is either unset or points entirely into one installed
//! version. [`VersionSwitcher::switch_to`] is the only code that creates
//! links; [`VersionSwitcher::clear`] and the stale-link sweep inside a switch
//! are the only code that removes them.

use std::path::{Path, PathBuf};

use log::{debug, info, warn};

use mango_model::{GoVersion, InstalledVersion, MangoError};
use mango_platform::MANAGER_EXECUTABLE;

use crate::resolver::ActiveVersionResolver;
use crate::store::VersionStore;

const STAGING_SUFFIX: &str = ".mango-new";

/// What happened during an uninstall besides the removal itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub version: GoVersion,
    pub was_active: bool,
    /// Failure while clearing the links of the removed version, if any.
    pub cleanup_error: Option<MangoError>,
    /// Outcome of the auto-switch that follows every uninstall.
    pub auto_switch: Result<Option<GoVersion>, MangoError>,
}

#[derive(Clone)]
pub struct VersionSwitcher {
    store: VersionStore,
    resolver: ActiveVersionResolver,
    bin_dir: PathBuf,
}

impl VersionSwitcher {
    pub fn new(store: VersionStore, bin_dir: impl Into<PathBuf>) -> Self {
        let bin_dir = bin_dir.into();
        Self {
            resolver: ActiveVersionResolver::new(&bin_dir),
            store,
            bin_dir,
        }
    }

    #[must_use]
    pub fn store(&self) -> &VersionStore {
        &self.store
    }

    #[must_use]
    pub fn resolver(&self) -> &ActiveVersionResolver {
        &self.resolver
    }

    /// Point every link in the shared `bin` directory at `version`.
    ///
    /// The full link plan is computed before anything is touched. Each link
    /// is then replaced by renaming a freshly created symlink over it, so a
    /// link is never missing while the switch runs. Links that still point
    /// into other versions are removed afterwards. Every link is attempted;
    /// failures are reported together.
    ///
    /// # Errors
    /// Returns [`MangoError::NotInstalled`] if the version is absent, or an
    /// I/O error naming every link that could not be updated.
    pub fn switch_to(&self, version: &GoVersion) -> Result<InstalledVersion, MangoError> {
        let installed = self.store.get(version)?;
        if installed.executables.is_empty() {
            return Err(MangoError::io(
                std::io::ErrorKind::NotFound,
                format!(
                    "Go {version} has no executables in {}",
                    installed.bin_dir().display()
                ),
            ));
        }

        std::fs::create_dir_all(&self.bin_dir).map_err(|error| {
            MangoError::io_with_path("failed to create", &self.bin_dir, &error)
        })?;

        let plan: Vec<(PathBuf, &Path)> = installed
            .executables
            .iter()
            .map(|exe| (self.bin_dir.join(&exe.name), exe.path.as_path()))
            .collect();

        let mut failures = Vec::new();
        for (link, target) in &plan {
            if let Err(error) = replace_link(link, target) {
                failures.push(error);
            }
        }

        let keep = installed.path.clone();
        failures.extend(self.remove_links_into_store(|target| !target.starts_with(&keep)));

        if !failures.is_empty() {
            return Err(aggregate(version, &failures));
        }

        info!(
            "Switched to Go {version} ({} executables)",
            installed.executables.len()
        );
        Ok(installed)
    }

    /// Activate the only installed version; do nothing with zero or several.
    ///
    /// # Errors
    /// Returns an error if listing the store or switching fails.
    pub fn auto_switch(&self) -> Result<Option<GoVersion>, MangoError> {
        let mut versions = self.store.list()?;
        if versions.len() != 1 {
            debug!(
                "Auto-switch skipped: {} versions installed",
                versions.len()
            );
            return Ok(None);
        }

        let version = versions.remove(0);
        self.switch_to(&version)?;
        info!("Auto-switched to Go {version}");
        Ok(Some(version))
    }

    /// Remove every active link, leaving the manager's own binary in place.
    ///
    /// An entry is removed when it is runnable or when it is a symlink into
    /// the version store, dangling or not. Returns the number removed.
    ///
    /// # Errors
    /// Returns an error if the directory cannot be read or an entry cannot be
    /// removed.
    pub fn clear(&self) -> Result<usize, MangoError> {
        let entries = match std::fs::read_dir(&self.bin_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(0),
            Err(error) => {
                return Err(MangoError::io_with_path("failed to read", &self.bin_dir, &error));
            }
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            if entry.file_name() == MANAGER_EXECUTABLE || entry.file_type()?.is_dir() {
                continue;
            }
            let path = entry.path();
            let into_store = std::fs::read_link(&path)
                .is_ok_and(|target| target.starts_with(self.store.root()));
            if !into_store && !self.store.probe().is_runnable(&path) {
                continue;
            }

            std::fs::remove_file(&path).map_err(|error| {
                MangoError::io_with_path("error removing symlink", &path, &error)
            })?;
            removed += 1;
        }

        info!("Cleared {removed} active links");
        Ok(removed)
    }

    /// Remove `version`, clearing its links first if it is the active one,
    /// then run the auto-switch policy.
    ///
    /// # Errors
    /// Returns [`MangoError::NotInstalled`] or an I/O error from the removal.
    /// Cleanup and auto-switch failures are returned in the report instead.
    pub fn uninstall(&self, version: &GoVersion) -> Result<UninstallReport, MangoError> {
        if !self.store.is_installed(version) {
            return Err(MangoError::not_installed(version));
        }

        let was_active = match self.resolver.current() {
            Ok(active) => active == *version,
            Err(MangoError::NotSet) => false,
            Err(error) => {
                warn!("Could not determine the active version before uninstall: {error}");
                false
            }
        };

        let cleanup_error = if was_active {
            self.clear().err()
        } else {
            None
        };

        self.store.remove(version)?;

        let auto_switch = self.auto_switch();
        if let Err(error) = &auto_switch {
            warn!("Auto-switch after uninstalling {version} failed: {error}");
        }

        Ok(UninstallReport {
            version: version.clone(),
            was_active,
            cleanup_error,
            auto_switch,
        })
    }

    fn remove_links_into_store(&self, stale: impl Fn(&Path) -> bool) -> Vec<MangoError> {
        let Ok(entries) = std::fs::read_dir(&self.bin_dir) else {
            return Vec::new();
        };

        let mut failures = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            let Ok(target) = std::fs::read_link(&path) else {
                continue;
            };
            if !target.starts_with(self.store.root()) || !stale(&target) {
                continue;
            }
            debug!("Removing stale link {}", path.display());
            if let Err(error) = std::fs::remove_file(&path) {
                failures.push(MangoError::io_with_path(
                    "error removing stale link",
                    &path,
                    &error,
                ));
            }
        }
        failures
    }
}

fn replace_link(link: &Path, target: &Path) -> Result<(), MangoError> {
    let file_name = link
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = link.with_file_name(format!(".{file_name}{STAGING_SUFFIX}"));

    if std::fs::symlink_metadata(&staged).is_ok() {
        std::fs::remove_file(&staged).map_err(|error| {
            MangoError::io_with_path("error removing leftover link", &staged, &error)
        })?;
    }

    create_symlink(target, &staged).map_err(|error| {
        MangoError::io_with_path(
            &format!("error creating symlink to {} at", target.display()),
            &staged,
            &error,
        )
    })?;

    if let Err(error) = std::fs::rename(&staged, link) {
        if let Err(cleanup) = std::fs::remove_file(&staged) {
            warn!("Failed to remove {}: {cleanup}", staged.display());
        }
        return Err(MangoError::io_with_path("error replacing", link, &error));
    }

    mark_executable(target)
        .map_err(|error| MangoError::io_with_path("error setting permissions on", target, &error))?;

    debug!("Linked {} -> {}", link.display(), target.display());
    Ok(())
}

#[cfg(unix)]
fn create_symlink(target: &Path, link: &Path) -> std::io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn create_symlink(_target: &Path, _link: &Path) -> std::io::Result<()> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "symlinks are only supported on unix hosts",
    ))
}

#[cfg(unix)]
fn mark_executable(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
}

#[cfg(not(unix))]
fn mark_executable(_path: &Path) -> std::io::Result<()> {
    Ok(())
}

fn aggregate(version: &GoVersion, failures: &[MangoError]) -> MangoError {
    let kind = match failures.first() {
        Some(MangoError::Io { kind, .. }) => *kind,
        _ => std::io::ErrorKind::Other,
    };
    let details: Vec<String> = failures.iter().map(ToString::to_string).collect();
    MangoError::io(
        kind,
        format!(
            "switching to Go {version} failed for {} link(s): {}",
            failures.len(),
            details.join("; ")
        ),
    )
}
