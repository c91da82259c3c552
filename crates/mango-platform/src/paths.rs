use std::path::PathBuf;
use thiserror::Error;

/// Environment variable that overrides the default `~/.mango` root.
pub const ROOT_ENV: &str = "MANGO_DIR";

/// Name of the manager's own binary inside `<root>/bin`.
pub const MANAGER_EXECUTABLE: &str = "mango";

const ROOT_DIR_NAME: &str = ".mango";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathsError {
    #[error("Cannot determine your home directory. 'mango' requires access to this location.")]
    HomeDirUnavailable,
    #[error("Missing '{}' directory. Please ensure 'mango' was installed correctly.", .0.display())]
    MissingRoot(PathBuf),
    #[error("'{}' exists but is not a directory.", .0.display())]
    RootNotDirectory(PathBuf),
}

/// On-disk layout shared by every component.
///
/// ```text
/// <root>/bin/<exe>              active links
/// <root>/version/<id>/bin/...   installed versions
/// <root>/cache/<id>             downloaded archives
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MangoPaths {
    pub root: PathBuf,
    pub bin_dir: PathBuf,
    pub version_dir: PathBuf,
    pub cache_dir: PathBuf,
}

impl MangoPaths {
    #[must_use]
    pub fn from_root(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            bin_dir: root.join("bin"),
            version_dir: root.join("version"),
            cache_dir: root.join("cache"),
            root,
        }
    }

    /// Locate the root from `$MANGO_DIR` or `~/.mango`.
    ///
    /// # Errors
    /// Returns an error when no home directory is known or the root does not
    /// exist. Nothing can run without it.
    pub fn discover() -> Result<Self, PathsError> {
        Self::resolve(
            std::env::var_os(ROOT_ENV).map(PathBuf::from),
            dirs::home_dir(),
        )
    }

    /// Same as [`MangoPaths::discover`] with the inputs spelled out. A
    /// relative root is made absolute against the working directory, since
    /// link targets are written from it.
    ///
    /// # Errors
    /// See [`MangoPaths::discover`].
    pub fn resolve(
        override_root: Option<PathBuf>,
        home: Option<PathBuf>,
    ) -> Result<Self, PathsError> {
        let root = match override_root.filter(|p| !p.as_os_str().is_empty()) {
            Some(root) => root,
            None => home
                .ok_or(PathsError::HomeDirUnavailable)?
                .join(ROOT_DIR_NAME),
        };

        match std::fs::metadata(&root) {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Err(PathsError::RootNotDirectory(root)),
            Err(_) => return Err(PathsError::MissingRoot(root)),
        }

        let root = std::path::absolute(&root).map_err(|_| PathsError::MissingRoot(root))?;
        Ok(Self::from_root(root))
    }

    #[must_use]
    pub fn settings_file(&self) -> PathBuf {
        self.root.join("settings.json")
    }

    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.root.join("mango.log")
    }

    #[must_use]
    pub fn cache_entry(&self, version: &str) -> PathBuf {
        self.cache_dir.join(version)
    }

    /// Scratch directory an archive is unpacked into before it joins the store.
    #[must_use]
    pub fn staging_dir(&self, version: &str) -> PathBuf {
        self.cache_dir.join(format!("{version}.extract"))
    }

    /// Create `bin`, `version` and `cache` under the root.
    ///
    /// # Errors
    /// Returns an error if any directory cannot be created.
    pub fn ensure_dirs(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.bin_dir)?;
        std::fs::create_dir_all(&self.version_dir)?;
        std::fs::create_dir_all(&self.cache_dir)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use super::{MangoPaths, PathsError};

    #[test]
    fn layout_is_derived_from_root() {
        let paths = MangoPaths::from_root("/opt/mango");

        assert_eq!(paths.bin_dir, Path::new("/opt/mango/bin"));
        assert_eq!(paths.version_dir, Path::new("/opt/mango/version"));
        assert_eq!(paths.cache_dir, Path::new("/opt/mango/cache"));
        assert_eq!(paths.settings_file(), Path::new("/opt/mango/settings.json"));
        assert_eq!(paths.log_file(), Path::new("/opt/mango/mango.log"));
        assert_eq!(
            paths.staging_dir("1.22.0"),
            Path::new("/opt/mango/cache/1.22.0.extract")
        );
    }

    #[test]
    fn resolve_prefers_override_root() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        let paths = MangoPaths::resolve(
            Some(temp.path().to_path_buf()),
            Some(PathBuf::from("/nonexistent-home")),
        )
        .expect("existing override root resolves");

        assert_eq!(paths.root, temp.path());
    }

    #[test]
    fn resolve_makes_relative_override_absolute() {
        let temp = tempfile::tempdir_in(".").expect("tempdir should be created");
        let name = temp.path().file_name().expect("tempdir has a name");

        let paths = MangoPaths::resolve(Some(PathBuf::from(name)), None)
            .expect("relative override root resolves");

        let cwd = std::env::current_dir().expect("working directory is known");
        assert!(paths.root.is_absolute());
        assert_eq!(paths.root, cwd.join(name));
        assert_eq!(paths.bin_dir, cwd.join(name).join("bin"));
    }

    #[test]
    fn resolve_falls_back_to_dot_mango_in_home() {
        let home = tempfile::tempdir().expect("tempdir should be created");
        std::fs::create_dir(home.path().join(".mango")).expect("root should be created");

        let paths = MangoPaths::resolve(Some(PathBuf::new()), Some(home.path().to_path_buf()))
            .expect("home root resolves");

        assert_eq!(paths.root, home.path().join(".mango"));
    }

    #[test]
    fn resolve_fails_fast_when_root_is_missing() {
        let home = tempfile::tempdir().expect("tempdir should be created");

        let error = MangoPaths::resolve(None, Some(home.path().to_path_buf()))
            .expect_err("missing root is fatal");

        assert_eq!(error, PathsError::MissingRoot(home.path().join(".mango")));
    }

    #[test]
    fn resolve_rejects_file_root() {
        let home = tempfile::tempdir().expect("tempdir should be created");
        let root = home.path().join("root-file");
        std::fs::write(&root, b"").expect("file should be written");

        let error = MangoPaths::resolve(Some(root.clone()), None).expect_err("file root is fatal");

        assert_eq!(error, PathsError::RootNotDirectory(root));
    }

    #[test]
    fn resolve_without_home_reports_it() {
        assert_eq!(
            MangoPaths::resolve(None, None),
            Err(PathsError::HomeDirUnavailable)
        );
    }

    #[test]
    fn ensure_dirs_creates_layout() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let paths = MangoPaths::from_root(temp.path());

        paths.ensure_dirs().expect("layout should be created");

        assert!(paths.bin_dir.is_dir());
        assert!(paths.version_dir.is_dir());
        assert!(paths.cache_dir.is_dir());
    }
}
