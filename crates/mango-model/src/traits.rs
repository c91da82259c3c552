use async_trait::async_trait;
use std::path::Path;

use crate::error::MangoError;

/// Receives byte counts while an archive downloads. `total` is 0 when the
/// server did not declare a length.
pub trait TransferObserver: Send + Sync {
    fn on_transfer(&self, downloaded: u64, total: u64);
}

impl<F> TransferObserver for F
where
    F: Fn(u64, u64) + Send + Sync,
{
    fn on_transfer(&self, downloaded: u64, total: u64) {
        self(downloaded, total);
    }
}

/// Called once per processed archive entry.
pub trait ExtractObserver: Send + Sync {
    fn on_entry(&self, processed: usize, total: usize);
}

impl<F> ExtractObserver for F
where
    F: Fn(usize, usize) + Send + Sync,
{
    fn on_entry(&self, processed: usize, total: usize) {
        self(processed, total);
    }
}

/// Where releases come from: an index page listing published versions and
/// the archives themselves.
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    fn name(&self) -> &'static str;

    /// Fetch the raw upstream listing of published releases.
    async fn fetch_index(&self) -> Result<String, MangoError>;

    /// Download the archive at `locator` into `dest`, returning the number of
    /// bytes written.
    async fn fetch_archive(
        &self,
        locator: &str,
        dest: &Path,
        observer: &dyn TransferObserver,
    ) -> Result<u64, MangoError>;
}

pub trait ArchiveExtractor: Send + Sync {
    /// Unpack `archive` into `target`, returning the number of entries written.
    ///
    /// # Errors
    /// Returns [`MangoError::Extract`] when the archive cannot be read or an
    /// entry cannot be written.
    fn extract(
        &self,
        archive: &Path,
        target: &Path,
        observer: &dyn ExtractObserver,
    ) -> Result<usize, MangoError>;
}
