use std::path::{Path, PathBuf};

use mango_model::{GoVersion, MangoError};

/// Executable whose link decides which version is active.
pub const PRIMARY_EXECUTABLE: &str = "go";

/// Reads the active version back out of the link layout.
#[derive(Debug, Clone)]
pub struct ActiveVersionResolver {
    link: PathBuf,
}

impl ActiveVersionResolver {
    pub fn new(bin_dir: impl AsRef<Path>) -> Self {
        Self {
            link: bin_dir.as_ref().join(PRIMARY_EXECUTABLE),
        }
    }

    /// The version `<bin>/go` points into.
    ///
    /// The owning version is the grandparent directory name of the link
    /// target (`<store>/<id>/bin/go`); the target itself is not re-checked.
    ///
    /// # Errors
    /// Returns [`MangoError::NotSet`] when the link does not exist, and an
    /// I/O error when it exists but cannot be interpreted.
    pub fn current(&self) -> Result<GoVersion, MangoError> {
        match std::fs::symlink_metadata(&self.link) {
            Ok(_) => {}
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                return Err(MangoError::NotSet);
            }
            Err(error) => {
                return Err(MangoError::io_with_path(
                    "error checking",
                    &self.link,
                    &error,
                ));
            }
        }

        let target = std::fs::read_link(&self.link).map_err(|error| {
            MangoError::io_with_path("error reading link", &self.link, &error)
        })?;

        let name = target
            .parent()
            .and_then(Path::parent)
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .ok_or_else(|| self.unrecognized(&target))?;

        name.parse().map_err(|_| self.unrecognized(&target))
    }

    fn unrecognized(&self, target: &Path) -> MangoError {
        MangoError::io(
            std::io::ErrorKind::InvalidData,
            format!(
                "{} points at {}, which is not inside a version directory",
                self.link.display(),
                target.display()
            ),
        )
    }
}
