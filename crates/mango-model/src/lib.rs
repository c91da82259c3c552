mod error;
mod traits;
mod types;

pub use error::MangoError;
pub use traits::{ArchiveExtractor, ExtractObserver, ReleaseSource, TransferObserver};
pub use types::{
    ArchiveTarget, Executable, GoVersion, InstallProgress, InstalledVersion, LatestRelease,
    VersionComponent, VersionParseError,
};
