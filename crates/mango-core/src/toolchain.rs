use std::sync::Arc;

use log::info;

use mango_model::{
    ArchiveExtractor, ArchiveTarget, GoVersion, InstalledVersion, MangoError, ReleaseSource,
};
use mango_platform::{ExecutableProbe, MangoPaths};

use crate::extract::TarGzExtractor;
use crate::installer::{InstallReport, InstallRequest, Installer, ProgressFn};
use crate::store::VersionStore;
use crate::switcher::{UninstallReport, VersionSwitcher};
use crate::validator::VersionValidator;

/// Everything a command needs, wired over one root.
pub struct Toolchain {
    switcher: VersionSwitcher,
    validator: Arc<VersionValidator>,
    installer: Installer,
}

impl Toolchain {
    pub fn new(
        paths: MangoPaths,
        source: Arc<dyn ReleaseSource>,
        target: ArchiveTarget,
        probe: Arc<dyn ExecutableProbe>,
    ) -> Self {
        Self::with_extractor(paths, source, target, probe, Arc::new(TarGzExtractor))
    }

    pub fn with_extractor(
        paths: MangoPaths,
        source: Arc<dyn ReleaseSource>,
        target: ArchiveTarget,
        probe: Arc<dyn ExecutableProbe>,
        extractor: Arc<dyn ArchiveExtractor>,
    ) -> Self {
        let store = VersionStore::new(&paths.version_dir, probe);
        let switcher = VersionSwitcher::new(store, &paths.bin_dir);
        let validator = Arc::new(VersionValidator::new(source.clone(), target));
        let installer = Installer::new(
            paths,
            switcher.clone(),
            validator.clone(),
            source,
            extractor,
        );
        Self {
            switcher,
            validator,
            installer,
        }
    }

    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn list(&self) -> Result<Vec<GoVersion>, MangoError> {
        self.switcher.store().list()
    }

    /// # Errors
    /// Returns [`MangoError::NotSet`] when nothing is active.
    pub fn current(&self) -> Result<GoVersion, MangoError> {
        self.switcher.resolver().current()
    }

    /// # Errors
    /// See [`Installer::install`].
    pub async fn install(
        &self,
        request: &InstallRequest,
        activate_after: bool,
        progress: ProgressFn<'_>,
    ) -> Result<InstallReport, MangoError> {
        self.installer
            .install(request, activate_after, progress)
            .await
    }

    /// # Errors
    /// See [`VersionSwitcher::uninstall`].
    pub fn uninstall(&self, version: &GoVersion) -> Result<UninstallReport, MangoError> {
        self.switcher.uninstall(version)
    }

    /// Activate an installed version. The links are untouched on every
    /// error path.
    ///
    /// # Errors
    /// Returns [`MangoError::Unavailable`] when the version is not published
    /// upstream, [`MangoError::NotInstalled`] when it is published but not
    /// installed, or the failure from resolving `latest` or switching.
    pub async fn use_version(
        &self,
        request: &InstallRequest,
    ) -> Result<InstalledVersion, MangoError> {
        let version = match request {
            InstallRequest::Latest => self.validator.resolve_latest().await?.version,
            InstallRequest::Version(version) => version.clone(),
        };

        if self.switcher.store().is_installed(&version) {
            let installed = self.switcher.switch_to(&version)?;
            info!("Now using Go {version}");
            return Ok(installed);
        }

        if matches!(request, InstallRequest::Version(_))
            && !self.validator.is_published(&version).await?
        {
            return Err(MangoError::unavailable(&version));
        }
        Err(MangoError::not_installed(&version))
    }
}
