use std::sync::Arc;

use log::{debug, info};
use regex::Regex;
use tokio::sync::OnceCell;

use mango_model::{ArchiveTarget, GoVersion, LatestRelease, MangoError, ReleaseSource};

/// Syntactic check only: one to three dot-separated, all-digit components.
#[must_use]
pub fn is_version(input: &str) -> bool {
    input.parse::<GoVersion>().is_ok()
}

/// Parse command-line input, ignoring surrounding whitespace and reporting
/// the whole input on failure.
///
/// # Errors
/// Returns [`MangoError::InvalidVersion`] when `input` is not an identifier.
pub fn parse_version(input: &str) -> Result<GoVersion, MangoError> {
    let input = input.trim();
    input
        .parse()
        .map_err(|_| MangoError::invalid_version(input))
}

/// Answers "does this identifier exist upstream" and "what is the newest
/// release" against the release index.
pub struct VersionValidator {
    source: Arc<dyn ReleaseSource>,
    target: ArchiveTarget,
    latest: OnceCell<LatestRelease>,
}

impl VersionValidator {
    pub fn new(source: Arc<dyn ReleaseSource>, target: ArchiveTarget) -> Self {
        Self {
            source,
            target,
            latest: OnceCell::new(),
        }
    }

    /// Download path of the archive for `version` on the configured target.
    #[must_use]
    pub fn archive_locator(&self, version: &GoVersion) -> String {
        format!("/dl/go{version}.{}.tar.gz", self.target.suffix())
    }

    /// # Errors
    /// Returns [`MangoError::Network`] if the index cannot be fetched.
    pub async fn is_published(&self, version: &GoVersion) -> Result<bool, MangoError> {
        let index = self.source.fetch_index().await?;
        let marker = Regex::new(&format!(
            r#"<div class="toggle(?:Visible)?" id="go{}">"#,
            regex::escape(version.as_str())
        ))
        .map_err(|error| MangoError::parse("release index", error.to_string()))?;

        let published = marker.is_match(&index);
        debug!(
            "Go {version} {} on {}",
            if published { "is published" } else { "is not published" },
            self.source.name()
        );
        Ok(published)
    }

    /// Newest release for the configured target. Fetched at most once per
    /// validator; later calls return the memoized value.
    ///
    /// # Errors
    /// Returns [`MangoError::Network`] if the index cannot be fetched, or
    /// [`MangoError::Parse`] if no download link for the target is found.
    pub async fn resolve_latest(&self) -> Result<LatestRelease, MangoError> {
        let latest = self
            .latest
            .get_or_try_init(|| async {
                let index = self.source.fetch_index().await?;
                let latest = self.scrape_latest(&index)?;
                info!(
                    "Latest Go release for {} is {}",
                    self.target.suffix(),
                    latest.version
                );
                Ok::<_, MangoError>(latest)
            })
            .await?;
        Ok(latest.clone())
    }

    fn scrape_latest(&self, index: &str) -> Result<LatestRelease, MangoError> {
        let pattern = Regex::new(&format!(
            r#"<a\s+class="download downloadBox"\s+href="(/dl/go(\d+(?:\.\d+){{0,2}})\.{}-{}\.tar\.gz)">"#,
            regex::escape(&self.target.os),
            regex::escape(&self.target.arch),
        ))
        .map_err(|error| MangoError::parse("release index", error.to_string()))?;

        let captures = pattern.captures(index).ok_or_else(|| {
            MangoError::parse(
                "release index",
                format!("no download link for {}", self.target.suffix()),
            )
        })?;

        let version = captures[2]
            .parse::<GoVersion>()
            .map_err(|error| MangoError::parse("release index", error.to_string()))?;

        Ok(LatestRelease {
            version,
            locator: captures[1].to_string(),
        })
    }
}
