#![allow(dead_code)]

use std::io::Write as _;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use mango_core::Toolchain;
use mango_model::{ArchiveTarget, MangoError, ReleaseSource, TransferObserver};
use mango_platform::{BinaryFormat, HostBinaryProbe, MangoPaths};
use tempfile::TempDir;

pub const ELF_EXEC: [u8; 20] = [
    0x7f, b'E', b'L', b'F', 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 2, 0, 0x3e, 0,
];

/// In-memory release source: a download page listing `published` with
/// `latest` featured, and one archive served for every locator.
pub struct FakeSource {
    index: String,
    archive: Vec<u8>,
    pub index_calls: AtomicUsize,
    pub archive_calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(latest: &str, published: &[&str]) -> Arc<Self> {
        Self::serving(latest, published, go_archive())
    }

    /// Same listing, but every download returns `archive` verbatim.
    pub fn serving(latest: &str, published: &[&str], archive: Vec<u8>) -> Arc<Self> {
        let mut index = format!(
            "<a class=\"download downloadBox\" href=\"/dl/go{latest}.linux-amd64.tar.gz\">\n\
             <div class=\"toggleVisible\" id=\"go{latest}\">\n"
        );
        for version in published {
            index.push_str(&format!("<div class=\"toggle\" id=\"go{version}\">\n"));
        }
        Arc::new(Self {
            index,
            archive,
            index_calls: AtomicUsize::new(0),
            archive_calls: AtomicUsize::new(0),
        })
    }

    pub fn network_calls(&self) -> usize {
        self.index_calls.load(Ordering::SeqCst) + self.archive_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseSource for FakeSource {
    fn name(&self) -> &'static str {
        "fake"
    }

    async fn fetch_index(&self) -> Result<String, MangoError> {
        self.index_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.index.clone())
    }

    async fn fetch_archive(
        &self,
        locator: &str,
        dest: &Path,
        observer: &dyn TransferObserver,
    ) -> Result<u64, MangoError> {
        self.archive_calls.fetch_add(1, Ordering::SeqCst);
        assert!(
            locator.starts_with("/dl/go") && locator.ends_with(".linux-amd64.tar.gz"),
            "unexpected locator {locator}"
        );
        std::fs::write(dest, &self.archive)?;
        let total = self.archive.len() as u64;
        observer.on_transfer(total, total);
        Ok(total)
    }
}

/// A minimal release archive: `go/bin/go`, `go/bin/gofmt` and a text file.
pub fn go_archive() -> Vec<u8> {
    let mut builder = tar::Builder::new(GzEncoder::new(Vec::new(), Compression::fast()));

    let mut dir = tar::Header::new_gnu();
    dir.set_entry_type(tar::EntryType::Directory);
    dir.set_mode(0o755);
    dir.set_size(0);
    for name in ["go/", "go/bin/"] {
        builder
            .append_data(&mut dir.clone(), name, std::io::empty())
            .expect("dir entry appended");
    }

    for (name, bytes, mode) in [
        ("go/bin/go", &ELF_EXEC[..], 0o755),
        ("go/bin/gofmt", &ELF_EXEC[..], 0o755),
        ("go/VERSION", &b"go\n"[..], 0o644),
    ] {
        let mut header = tar::Header::new_gnu();
        header.set_entry_type(tar::EntryType::Regular);
        header.set_mode(mode);
        header.set_size(bytes.len() as u64);
        builder
            .append_data(&mut header, name, bytes)
            .expect("file entry appended");
    }

    let mut encoder = builder.into_inner().expect("tar finished");
    encoder.flush().expect("gzip flushed");
    encoder.finish().expect("gzip finished")
}

pub struct Fixture {
    pub root: TempDir,
    pub source: Arc<FakeSource>,
    pub toolchain: Toolchain,
}

impl Fixture {
    pub fn new(source: Arc<FakeSource>) -> Self {
        let root = tempfile::tempdir().expect("tempdir should be created");
        let paths = MangoPaths::from_root(root.path());
        paths.ensure_dirs().expect("layout created");
        let toolchain = Toolchain::new(
            paths,
            source.clone(),
            ArchiveTarget::default(),
            Arc::new(HostBinaryProbe::new(BinaryFormat::Elf)),
        );
        Self {
            root,
            source,
            toolchain,
        }
    }

    pub fn bin(&self, name: &str) -> std::path::PathBuf {
        self.root.path().join("bin").join(name)
    }
}

pub fn quiet(_: mango_model::InstallProgress) {}
