use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// A Go release identifier: `MAJOR`, `MAJOR.MINOR` or `MAJOR.MINOR.PATCH`.
///
/// Two identifiers are equal only when their string forms are equal. Ordering
/// compares the numeric components, so `1.21.0` sorts after `1.9.0`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GoVersion {
    raw: String,
}

impl GoVersion {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.raw.split('.')
    }
}

fn cmp_numeric(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

impl Ord for GoVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.components();
        let mut right = other.components();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match cmp_numeric(a, b) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                },
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (None, None) => return self.raw.cmp(&other.raw),
            }
        }
    }
}

impl PartialOrd for GoVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for GoVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionComponent {
    Major,
    Minor,
    Patch,
}

impl fmt::Display for VersionComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Major => write!(f, "major"),
            Self::Minor => write!(f, "minor"),
            Self::Patch => write!(f, "patch"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionParseError {
    #[error("Expected MAJOR[.MINOR[.PATCH]] format, got: {input}")]
    InvalidFormat { input: String },
    #[error("Invalid {component} version: {value:?}")]
    InvalidComponent {
        component: VersionComponent,
        value: String,
    },
}

impl FromStr for GoVersion {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('.').collect();
        if parts.len() > 3 {
            return Err(VersionParseError::InvalidFormat {
                input: s.to_string(),
            });
        }

        let components = [
            VersionComponent::Major,
            VersionComponent::Minor,
            VersionComponent::Patch,
        ];
        for (part, component) in parts.iter().zip(components) {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(VersionParseError::InvalidComponent {
                    component,
                    value: (*part).to_string(),
                });
            }
        }

        Ok(Self { raw: s.to_string() })
    }
}

/// Operating system and architecture pair used to pick release archives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveTarget {
    pub os: String,
    pub arch: String,
}

impl ArchiveTarget {
    #[must_use]
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// Suffix used in archive names, for example `linux-amd64`.
    #[must_use]
    pub fn suffix(&self) -> String {
        format!("{}-{}", self.os, self.arch)
    }
}

impl Default for ArchiveTarget {
    fn default() -> Self {
        Self::new("linux", "amd64")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Executable {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledVersion {
    pub version: GoVersion,
    pub path: PathBuf,
    pub executables: Vec<Executable>,
}

impl InstalledVersion {
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.path.join("bin")
    }
}

/// Newest published release as scraped from the upstream index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestRelease {
    pub version: GoVersion,
    pub locator: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallProgress {
    Resolving,
    Downloading { downloaded: u64, total: u64 },
    Extracting { processed: usize, total: usize },
    Activating { version: GoVersion },
}
