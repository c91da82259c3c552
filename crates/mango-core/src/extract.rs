use std::fs::File;
use std::path::{Component, Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, warn};
use tar::{Archive, EntryType};

use mango_model::{ArchiveExtractor, ExtractObserver, MangoError};

/// Unpacks `.tar.gz` release archives.
///
/// Release archives wrap everything in one top-level directory (`go/`).
/// That directory is stripped so files land directly under the target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TarGzExtractor;

impl TarGzExtractor {
    fn open(archive: &Path) -> Result<Archive<GzDecoder<File>>, MangoError> {
        let file = File::open(archive).map_err(|error| {
            MangoError::extract_from(&format!("error opening {}", archive.display()), error)
        })?;
        Ok(Archive::new(GzDecoder::new(file)))
    }

    /// Number of entries in the archive, used as the progress total.
    ///
    /// # Errors
    /// Returns [`MangoError::Extract`] if the archive is unreadable.
    pub fn count_entries(archive: &Path) -> Result<usize, MangoError> {
        let mut tar = Self::open(archive)?;
        let mut count = 0;
        for entry in tar
            .entries()
            .map_err(|error| MangoError::extract_from("error reading archive", error))?
        {
            entry.map_err(|error| MangoError::extract_from("error reading tar entry", error))?;
            count += 1;
        }
        Ok(count)
    }
}

impl ArchiveExtractor for TarGzExtractor {
    fn extract(
        &self,
        archive: &Path,
        target: &Path,
        observer: &dyn ExtractObserver,
    ) -> Result<usize, MangoError> {
        let total = Self::count_entries(archive)?;
        let mut tar = Self::open(archive)?;

        std::fs::create_dir_all(target).map_err(|error| {
            MangoError::extract_from(&format!("error creating {}", target.display()), error)
        })?;

        let mut prefix: Option<PathBuf> = None;
        let mut processed = 0;

        for entry in tar
            .entries()
            .map_err(|error| MangoError::extract_from("error reading archive", error))?
        {
            let mut entry =
                entry.map_err(|error| MangoError::extract_from("error reading tar entry", error))?;
            let entry_type = entry.header().entry_type();
            let raw_path = entry
                .path()
                .map_err(|error| MangoError::extract_from("invalid entry path", error))?
                .into_owned();

            processed += 1;
            observer.on_entry(processed, total);

            let Some(path) = normalized(&raw_path) else {
                warn!("Skipping archive entry with unsafe path {}", raw_path.display());
                continue;
            };

            if prefix.is_none() {
                prefix = top_level_dir(&path, entry_type.is_dir());
                if let Some(prefix) = &prefix {
                    debug!("Stripping archive prefix {}", prefix.display());
                }
            }

            let relative = match &prefix {
                Some(prefix) => path.strip_prefix(prefix).unwrap_or(&path),
                None => &path,
            };
            if relative.as_os_str().is_empty() {
                continue;
            }
            if let Some(link) = symlinked_ancestor(target, relative) {
                return Err(MangoError::extract(format!(
                    "entry {} would be written through symlink {}",
                    raw_path.display(),
                    link.display()
                )));
            }
            let out = target.join(relative);

            match entry_type {
                EntryType::Directory => {
                    std::fs::create_dir_all(&out).map_err(|error| {
                        MangoError::extract_from(&format!("error creating {}", out.display()), error)
                    })?;
                }
                EntryType::Regular | EntryType::Continuous | EntryType::Symlink => {
                    if let Some(parent) = out.parent() {
                        std::fs::create_dir_all(parent).map_err(|error| {
                            MangoError::extract_from(
                                &format!("error creating {}", parent.display()),
                                error,
                            )
                        })?;
                    }
                    entry.unpack(&out).map_err(|error| {
                        MangoError::extract_from(&format!("error writing {}", out.display()), error)
                    })?;
                }
                other => debug!("Skipping {other:?} entry {}", raw_path.display()),
            }
        }

        debug!("Extraction complete to {}", target.display());
        Ok(processed)
    }
}

/// Drops `.` components; rejects absolute paths and `..`.
fn normalized(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(out)
}

/// First directory between `target` and `relative` that is a symlink. An
/// entry below such a link could land outside `target`.
fn symlinked_ancestor(target: &Path, relative: &Path) -> Option<PathBuf> {
    let mut current = target.to_path_buf();
    let parent = relative.parent()?;
    for component in parent.components() {
        current.push(component);
        match std::fs::symlink_metadata(&current) {
            Ok(meta) if meta.file_type().is_symlink() => return Some(current),
            Ok(_) => {}
            Err(_) => return None,
        }
    }
    None
}

/// The wrapping directory: the first entry itself when it is a directory,
/// otherwise its leading component when it is nested.
fn top_level_dir(path: &Path, is_dir: bool) -> Option<PathBuf> {
    let mut components = path.components();
    let first = PathBuf::from(components.next()?.as_os_str());
    if is_dir || components.next().is_some() {
        Some(first)
    } else {
        None
    }
}
