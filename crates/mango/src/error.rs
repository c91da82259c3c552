use mango_model::MangoError;
use mango_platform::PathsError;

/// Failures that stop mango before any command runs.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Paths(#[from] PathsError),

    #[error("failed to prepare {}: {source}", path.display())]
    Layout {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Source(#[from] MangoError),
}
