use std::path::Path;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MangoError {
    #[error("Go version {version} is not installed")]
    NotInstalled { version: String },

    #[error("Go version {version} is already installed")]
    AlreadyInstalled { version: String },

    #[error("Invalid Go version: {input}")]
    InvalidVersion { input: String },

    #[error("Go version {version} is not available upstream")]
    Unavailable { version: String },

    #[error("Network error during {operation}: {details}")]
    Network {
        operation: &'static str,
        details: String,
    },

    #[error("Could not parse {operation} response: {details}")]
    Parse {
        operation: &'static str,
        details: String,
    },

    #[error("No Go version is active")]
    NotSet,

    #[error("IO error ({kind}): {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("Extraction failed: {details}")]
    Extract { details: String },
}

impl MangoError {
    pub fn not_installed(version: impl ToString) -> Self {
        Self::NotInstalled {
            version: version.to_string(),
        }
    }

    pub fn already_installed(version: impl ToString) -> Self {
        Self::AlreadyInstalled {
            version: version.to_string(),
        }
    }

    pub fn invalid_version(input: impl Into<String>) -> Self {
        Self::InvalidVersion {
            input: input.into(),
        }
    }

    pub fn unavailable(version: impl ToString) -> Self {
        Self::Unavailable {
            version: version.to_string(),
        }
    }

    pub fn network(operation: &'static str, details: impl Into<String>) -> Self {
        Self::Network {
            operation,
            details: details.into(),
        }
    }

    pub fn network_from<E>(operation: &'static str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::network(operation, error.to_string())
    }

    pub fn parse(operation: &'static str, details: impl Into<String>) -> Self {
        Self::Parse {
            operation,
            details: details.into(),
        }
    }

    pub fn extract(details: impl Into<String>) -> Self {
        Self::Extract {
            details: details.into(),
        }
    }

    pub fn extract_from<E>(context: &str, error: E) -> Self
    where
        E: std::fmt::Display,
    {
        Self::extract(format!("{context}: {error}"))
    }

    pub fn io(kind: std::io::ErrorKind, message: impl Into<String>) -> Self {
        Self::Io {
            kind,
            message: message.into(),
        }
    }

    /// Wrap an I/O error, prefixing the message with what was being done and where.
    pub fn io_with_path(context: &str, path: &Path, source: &std::io::Error) -> Self {
        Self::io(
            source.kind(),
            format!("{context} {}: {source}", path.display()),
        )
    }
}

impl From<std::io::Error> for MangoError {
    fn from(err: std::io::Error) -> Self {
        MangoError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}
