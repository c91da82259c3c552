use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use mango_model::{Executable, GoVersion, InstalledVersion, MangoError};
use mango_platform::ExecutableProbe;

/// Directory-per-version record of what is installed. No policy lives here.
#[derive(Clone)]
pub struct VersionStore {
    version_dir: PathBuf,
    probe: Arc<dyn ExecutableProbe>,
}

impl VersionStore {
    pub fn new(version_dir: impl Into<PathBuf>, probe: Arc<dyn ExecutableProbe>) -> Self {
        Self {
            version_dir: version_dir.into(),
            probe,
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.version_dir
    }

    #[must_use]
    pub fn probe(&self) -> &dyn ExecutableProbe {
        self.probe.as_ref()
    }

    #[must_use]
    pub fn version_path(&self, version: &GoVersion) -> PathBuf {
        self.version_dir.join(version.as_str())
    }

    #[must_use]
    pub fn bin_path(&self, version: &GoVersion) -> PathBuf {
        self.version_path(version).join("bin")
    }

    /// Installed versions, newest first.
    ///
    /// # Errors
    /// Returns an error if the store directory exists but cannot be read.
    pub fn list(&self) -> Result<Vec<GoVersion>, MangoError> {
        let entries = match std::fs::read_dir(&self.version_dir) {
            Ok(entries) => entries,
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => {
                return Err(MangoError::io_with_path(
                    "failed to read",
                    &self.version_dir,
                    &error,
                ));
            }
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            match name.to_str().map(str::parse::<GoVersion>) {
                Some(Ok(version)) => versions.push(version),
                _ => debug!("Ignoring non-version entry {}", name.to_string_lossy()),
            }
        }

        versions.sort_by(|a, b| b.cmp(a));
        Ok(versions)
    }

    #[must_use]
    pub fn is_installed(&self, version: &GoVersion) -> bool {
        self.version_path(version).is_dir()
    }

    /// # Errors
    /// Returns [`MangoError::NotInstalled`] if absent, or an I/O error.
    pub fn remove(&self, version: &GoVersion) -> Result<(), MangoError> {
        if !self.is_installed(version) {
            return Err(MangoError::not_installed(version));
        }
        let path = self.version_path(version);
        std::fs::remove_dir_all(&path).map_err(|error| {
            MangoError::io_with_path("failed to remove version", &path, &error)
        })?;
        info!("Removed Go {version} from {}", path.display());
        Ok(())
    }

    /// Runnable binaries in the version's `bin` directory, sorted by name.
    ///
    /// # Errors
    /// Returns an I/O error if the directory cannot be read.
    pub fn executables_of(&self, version: &GoVersion) -> Result<Vec<Executable>, MangoError> {
        let bin = self.bin_path(version);
        let entries = std::fs::read_dir(&bin)
            .map_err(|error| MangoError::io_with_path("failed to read", &bin, &error))?;

        let mut executables = Vec::new();
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if !self.probe.is_runnable(&path) {
                debug!("Skipping non-executable {}", path.display());
                continue;
            }
            executables.push(Executable {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
            });
        }

        executables.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(executables)
    }

    /// # Errors
    /// Returns [`MangoError::NotInstalled`] if absent, or an I/O error while
    /// listing executables.
    pub fn get(&self, version: &GoVersion) -> Result<InstalledVersion, MangoError> {
        if !self.is_installed(version) {
            return Err(MangoError::not_installed(version));
        }
        Ok(InstalledVersion {
            version: version.clone(),
            path: self.version_path(version),
            executables: self.executables_of(version)?,
        })
    }

    /// Move a fully extracted directory into the store in one rename.
    ///
    /// # Errors
    /// Returns [`MangoError::AlreadyInstalled`] if the version is present, or an
    /// I/O error if the move fails.
    pub fn register(
        &self,
        version: &GoVersion,
        staged: &Path,
    ) -> Result<InstalledVersion, MangoError> {
        if self.is_installed(version) {
            return Err(MangoError::already_installed(version));
        }
        std::fs::create_dir_all(&self.version_dir).map_err(|error| {
            MangoError::io_with_path("failed to create", &self.version_dir, &error)
        })?;

        let dest = self.version_path(version);
        std::fs::rename(staged, &dest).map_err(|error| {
            MangoError::io_with_path("failed to move extracted files to", &dest, &error)
        })?;
        info!("Registered Go {version} at {}", dest.display());

        self.get(version)
    }
}
