use std::path::Path;
use std::sync::Arc;

use log::{debug, info, warn};

use mango_model::{
    ArchiveExtractor, GoVersion, InstallProgress, InstalledVersion, MangoError, ReleaseSource,
};
use mango_platform::MangoPaths;

use crate::switcher::VersionSwitcher;
use crate::validator::{VersionValidator, parse_version};

pub const LATEST: &str = "latest";

/// What the user asked for on `install` or `use`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallRequest {
    Latest,
    Version(GoVersion),
}

impl InstallRequest {
    /// # Errors
    /// Returns [`MangoError::InvalidVersion`] for anything other than
    /// `latest` or a version identifier.
    pub fn parse(input: &str) -> Result<Self, MangoError> {
        if input.trim() == LATEST {
            return Ok(Self::Latest);
        }
        parse_version(input).map(Self::Version)
    }
}

/// Receives [`InstallProgress`] events while an install runs.
pub type ProgressFn<'a> = &'a (dyn Fn(InstallProgress) + Send + Sync);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub version: GoVersion,
    pub installed: InstalledVersion,
    /// Activation that followed the install. `Ok(None)` means auto-switch
    /// had nothing to do.
    pub activation: Result<Option<GoVersion>, MangoError>,
}

pub struct Installer {
    paths: MangoPaths,
    switcher: VersionSwitcher,
    validator: Arc<VersionValidator>,
    source: Arc<dyn ReleaseSource>,
    extractor: Arc<dyn ArchiveExtractor>,
}

impl Installer {
    pub fn new(
        paths: MangoPaths,
        switcher: VersionSwitcher,
        validator: Arc<VersionValidator>,
        source: Arc<dyn ReleaseSource>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Self {
        Self {
            paths,
            switcher,
            validator,
            source,
            extractor,
        }
    }

    /// Download, extract and register a version, then activate it
    /// (`activate_after`) or run the auto-switch policy.
    ///
    /// A failed activation is reported in [`InstallReport::activation`] and
    /// does not undo the install.
    ///
    /// # Errors
    /// Returns [`MangoError::AlreadyInstalled`] (checked before any network
    /// call for explicit versions), [`MangoError::Unavailable`] when the
    /// version is not published, or the network, extraction or I/O failure
    /// that stopped the install.
    pub async fn install(
        &self,
        request: &InstallRequest,
        activate_after: bool,
        progress: ProgressFn<'_>,
    ) -> Result<InstallReport, MangoError> {
        progress(InstallProgress::Resolving);
        let store = self.switcher.store();

        let (version, locator) = match request {
            InstallRequest::Latest => {
                let latest = self.validator.resolve_latest().await?;
                if store.is_installed(&latest.version) {
                    return Err(MangoError::already_installed(&latest.version));
                }
                (latest.version, latest.locator)
            }
            InstallRequest::Version(version) => {
                if store.is_installed(version) {
                    return Err(MangoError::already_installed(version));
                }
                if !self.validator.is_published(version).await? {
                    return Err(MangoError::unavailable(version));
                }
                (version.clone(), self.validator.archive_locator(version))
            }
        };

        let installed = self.fetch_and_register(&version, &locator, progress).await?;
        info!("Installed Go {version}");

        let activation = if activate_after {
            progress(InstallProgress::Activating {
                version: version.clone(),
            });
            self.switcher
                .switch_to(&version)
                .map(|_| Some(version.clone()))
        } else {
            self.switcher.auto_switch()
        };
        if let Err(error) = &activation {
            warn!("Go {version} installed but activation failed: {error}");
        }

        Ok(InstallReport {
            version,
            installed,
            activation,
        })
    }

    async fn fetch_and_register(
        &self,
        version: &GoVersion,
        locator: &str,
        progress: ProgressFn<'_>,
    ) -> Result<InstalledVersion, MangoError> {
        let archive = self.paths.cache_entry(version.as_str());
        let staging = self.paths.staging_dir(version.as_str());

        std::fs::create_dir_all(&self.paths.cache_dir).map_err(|error| {
            MangoError::io_with_path("failed to create", &self.paths.cache_dir, &error)
        })?;

        let on_transfer = |downloaded: u64, total: u64| {
            progress(InstallProgress::Downloading { downloaded, total });
        };
        debug!("Downloading {locator} from {}", self.source.name());
        let bytes = match self
            .source
            .fetch_archive(locator, &archive, &on_transfer)
            .await
        {
            Ok(bytes) => bytes,
            Err(error) => {
                discard_file(&archive);
                return Err(error);
            }
        };
        debug!("Downloaded {bytes} bytes to {}", archive.display());

        discard_dir(&staging);
        let on_entry = |processed: usize, total: usize| {
            progress(InstallProgress::Extracting { processed, total });
        };
        let registered = self
            .extractor
            .extract(&archive, &staging, &on_entry)
            .and_then(|_| self.switcher.store().register(version, &staging));

        discard_file(&archive);
        if registered.is_err() {
            discard_dir(&staging);
        }
        registered
    }
}

fn discard_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => warn!("Failed to remove {}: {error}", path.display()),
    }
}

fn discard_dir(path: &Path) {
    match std::fs::remove_dir_all(path) {
        Ok(()) => debug!("Removed {}", path.display()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => {}
        Err(error) => warn!("Failed to remove {}: {error}", path.display()),
    }
}

#[cfg(test)]
mod tests {
    use mango_model::MangoError;

    use super::InstallRequest;

    #[test]
    fn parses_latest_and_identifiers() {
        assert_eq!(InstallRequest::parse("latest"), Ok(InstallRequest::Latest));
        assert_eq!(
            InstallRequest::parse("1.22.0"),
            Ok(InstallRequest::Version(
                "1.22.0".parse().expect("valid version in test")
            ))
        );
    }

    #[test]
    fn rejects_everything_else() {
        for input in ["Latest", "go1.22.0", "1.2.3.4", "stable"] {
            assert_eq!(
                InstallRequest::parse(input),
                Err(MangoError::invalid_version(input))
            );
        }
    }
}
