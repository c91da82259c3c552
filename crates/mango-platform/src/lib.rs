mod cache;
mod paths;
mod probe;

pub use cache::{CacheCleanReport, clean_cache};
pub use paths::{MANAGER_EXECUTABLE, MangoPaths, PathsError, ROOT_ENV};
pub use probe::{BinaryFormat, ExecutableProbe, HostBinaryProbe};
