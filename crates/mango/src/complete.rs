//! Shell completion of installed version identifiers.

use std::ffi::OsStr;
use std::path::Path;
use std::sync::Arc;

use clap_complete::engine::CompletionCandidate;

use mango_core::VersionStore;
use mango_platform::{HostBinaryProbe, MangoPaths};

/// Installed versions starting with what has been typed so far. Completion
/// must never fail loudly, so a missing root yields no candidates.
pub fn installed_versions(current: &OsStr) -> Vec<CompletionCandidate> {
    let Ok(paths) = MangoPaths::discover() else {
        return Vec::new();
    };
    version_candidates(&paths.version_dir, &current.to_string_lossy())
        .into_iter()
        .map(CompletionCandidate::new)
        .collect()
}

fn version_candidates(version_dir: &Path, prefix: &str) -> Vec<String> {
    let store = VersionStore::new(version_dir, Arc::new(HostBinaryProbe::host()));
    store
        .list()
        .unwrap_or_default()
        .into_iter()
        .map(|version| version.to_string())
        .filter(|version| version.starts_with(prefix))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::version_candidates;

    #[test]
    fn candidates_are_installed_versions_matching_the_prefix() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let version_dir = temp.path().join("version");
        for name in ["1.21.0", "1.22.0", "1.9.4", "not-a-version"] {
            std::fs::create_dir_all(version_dir.join(name)).expect("version dir created");
        }
        std::fs::write(version_dir.join("1.23.0"), b"stray file").expect("stray file written");

        assert_eq!(
            version_candidates(&version_dir, ""),
            ["1.22.0", "1.21.0", "1.9.4"]
        );
        assert_eq!(version_candidates(&version_dir, "1.2"), ["1.22.0", "1.21.0"]);
        assert_eq!(version_candidates(&version_dir, "1.22"), ["1.22.0"]);
        assert!(version_candidates(&version_dir, "2").is_empty());
    }

    #[test]
    fn missing_store_has_no_candidates() {
        let temp = tempfile::tempdir().expect("tempdir should be created");

        assert!(version_candidates(&temp.path().join("version"), "").is_empty());
    }
}
