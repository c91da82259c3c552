use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Answers "can the host run this file as a native program".
pub trait ExecutableProbe: Send + Sync {
    fn is_runnable(&self, path: &Path) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryFormat {
    Elf,
    MachO,
}

const ELF_MAGIC: [u8; 4] = [0x7f, b'E', b'L', b'F'];
const ET_EXEC: u16 = 2;
const ET_DYN: u16 = 3;

const MH_MAGIC: u32 = 0xfeed_face;
const MH_MAGIC_64: u32 = 0xfeed_facf;
const MH_EXECUTE: u32 = 2;

/// Sniffs the file header instead of trusting names or permission bits.
/// Scripts and data files are never considered runnable.
#[derive(Debug, Clone, Copy)]
pub struct HostBinaryProbe {
    format: BinaryFormat,
}

impl HostBinaryProbe {
    #[must_use]
    pub fn new(format: BinaryFormat) -> Self {
        Self { format }
    }

    #[must_use]
    pub fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::new(BinaryFormat::MachO)
        } else {
            Self::new(BinaryFormat::Elf)
        }
    }

    fn header(path: &Path) -> Option<[u8; 20]> {
        let mut file = File::open(path).ok()?;
        if !file.metadata().ok()?.is_file() {
            return None;
        }
        let mut buf = [0_u8; 20];
        file.read_exact(&mut buf).ok()?;
        Some(buf)
    }
}

impl Default for HostBinaryProbe {
    fn default() -> Self {
        Self::host()
    }
}

impl ExecutableProbe for HostBinaryProbe {
    fn is_runnable(&self, path: &Path) -> bool {
        let Some(header) = Self::header(path) else {
            return false;
        };
        match self.format {
            BinaryFormat::Elf => is_elf_program(&header),
            BinaryFormat::MachO => is_macho_program(&header),
        }
    }
}

fn is_elf_program(header: &[u8; 20]) -> bool {
    if header[..4] != ELF_MAGIC {
        return false;
    }
    let raw = [header[16], header[17]];
    let e_type = match header[5] {
        1 => u16::from_le_bytes(raw),
        2 => u16::from_be_bytes(raw),
        _ => return false,
    };
    e_type == ET_EXEC || e_type == ET_DYN
}

fn is_macho_program(header: &[u8; 20]) -> bool {
    let magic_bytes = [header[0], header[1], header[2], header[3]];
    let filetype_bytes = [header[12], header[13], header[14], header[15]];

    let filetype = match u32::from_le_bytes(magic_bytes) {
        MH_MAGIC | MH_MAGIC_64 => u32::from_le_bytes(filetype_bytes),
        _ => match u32::from_be_bytes(magic_bytes) {
            MH_MAGIC | MH_MAGIC_64 => u32::from_be_bytes(filetype_bytes),
            _ => return false,
        },
    };
    filetype == MH_EXECUTE
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::{BinaryFormat, ExecutableProbe, HostBinaryProbe};

    fn elf_header(e_type: u16) -> Vec<u8> {
        let mut bytes = vec![0_u8; 64];
        bytes[..4].copy_from_slice(&[0x7f, b'E', b'L', b'F']);
        bytes[4] = 2;
        bytes[5] = 1;
        bytes[6] = 1;
        bytes[16..18].copy_from_slice(&e_type.to_le_bytes());
        bytes
    }

    fn write(dir: &Path, name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, bytes).expect("fixture should be written");
        path
    }

    #[test]
    fn elf_executables_and_shared_objects_are_runnable() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let probe = HostBinaryProbe::new(BinaryFormat::Elf);

        assert!(probe.is_runnable(&write(temp.path(), "go", &elf_header(2))));
        assert!(probe.is_runnable(&write(temp.path(), "gofmt", &elf_header(3))));
    }

    #[test]
    fn elf_relocatable_objects_are_not_runnable() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let probe = HostBinaryProbe::new(BinaryFormat::Elf);

        assert!(!probe.is_runnable(&write(temp.path(), "main.o", &elf_header(1))));
    }

    #[test]
    fn big_endian_elf_is_read_with_its_byte_order() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let mut header = elf_header(0);
        header[5] = 2;
        header[16..18].copy_from_slice(&2_u16.to_be_bytes());

        assert!(
            HostBinaryProbe::new(BinaryFormat::Elf)
                .is_runnable(&write(temp.path(), "go", &header))
        );
    }

    #[test]
    fn scripts_text_and_short_files_are_not_runnable() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let probe = HostBinaryProbe::new(BinaryFormat::Elf);

        assert!(!probe.is_runnable(&write(
            temp.path(),
            "script.sh",
            b"#!/bin/sh\necho this is a shell script that is long enough\n"
        )));
        assert!(!probe.is_runnable(&write(temp.path(), "tiny", b"\x7fELF")));
        assert!(!probe.is_runnable(&temp.path().join("missing")));
        assert!(!probe.is_runnable(temp.path()));
    }

    #[test]
    fn macho_executables_are_runnable_on_macho_hosts() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let mut header = vec![0_u8; 32];
        header[..4].copy_from_slice(&0xfeed_facf_u32.to_le_bytes());
        header[12..16].copy_from_slice(&2_u32.to_le_bytes());
        let path = write(temp.path(), "go", &header);

        assert!(HostBinaryProbe::new(BinaryFormat::MachO).is_runnable(&path));
        assert!(!HostBinaryProbe::new(BinaryFormat::Elf).is_runnable(&path));
    }

    #[cfg(unix)]
    #[test]
    fn symlinks_are_followed() {
        let temp = tempfile::tempdir().expect("tempdir should be created");
        let target = write(temp.path(), "go", &elf_header(2));
        let link = temp.path().join("link");
        std::os::unix::fs::symlink(&target, &link).expect("symlink should be created");

        assert!(HostBinaryProbe::new(BinaryFormat::Elf).is_runnable(&link));
    }
}
