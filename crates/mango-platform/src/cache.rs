use std::path::{Path, PathBuf};

use log::{debug, warn};

#[derive(Debug, Default)]
pub struct CacheCleanReport {
    pub removed: usize,
    pub failures: Vec<(PathBuf, std::io::Error)>,
}

impl CacheCleanReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Remove everything under the cache directory.
///
/// Runs before any command, so partial downloads and abandoned extraction
/// staging never survive into the next invocation. A missing cache directory
/// counts as already clean. Failures on single entries are collected and the
/// sweep continues.
///
/// # Errors
/// Returns an error only when the directory exists but cannot be listed.
pub fn clean_cache(cache_dir: &Path) -> std::io::Result<CacheCleanReport> {
    let mut report = CacheCleanReport::default();

    let entries = match std::fs::read_dir(cache_dir) {
        Ok(entries) => entries,
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(error) => return Err(error),
    };

    for entry in entries {
        let entry = entry?;
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());

        let result = if is_dir {
            std::fs::remove_dir_all(&path)
        } else {
            std::fs::remove_file(&path)
        };

        match result {
            Ok(()) => {
                debug!("Removed cache entry {}", path.display());
                report.removed += 1;
            }
            Err(error) => {
                warn!("Error removing {}: {error}", path.display());
                report.failures.push((path, error));
            }
        }
    }

    Ok(report)
}
