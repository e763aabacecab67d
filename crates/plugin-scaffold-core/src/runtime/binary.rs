//! Executable architecture detection from PE header bytes

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Upper bound on bytes read from an executable
const MAX_HEADER_BYTES: u64 = 4096;

/// Offset of `e_lfanew`, the PE header pointer inside the DOS header
const PE_POINTER_OFFSET: usize = 0x3C;

/// Smallest buffer that can hold a DOS header including `e_lfanew`
pub const MIN_HEADER_LEN: usize = PE_POINTER_OFFSET + 4;

const MACHINE_I386: u16 = 0x014C;
const MACHINE_AMD64: u16 = 0x8664;

/// Target architecture of a game executable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Architecture {
    X86,
    X64,
    #[default]
    Unknown,
}

impl Architecture {
    pub fn as_str(&self) -> &'static str {
        match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the architecture of the executable at `path`.
///
/// Never fails: unreadable or malformed files yield [`Architecture::Unknown`].
pub fn detect_architecture(path: &Path) -> Architecture {
    let mut buf = Vec::new();
    let read = File::open(path).and_then(|f| f.take(MAX_HEADER_BYTES).read_to_end(&mut buf));

    match read {
        Ok(_) => {
            let arch = architecture_from_bytes(&buf);
            tracing::debug!(path = %path.display(), %arch, "inspected executable header");
            arch
        }
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "could not read executable");
            Architecture::Unknown
        }
    }
}

/// Parse the machine type out of raw PE header bytes
pub fn architecture_from_bytes(bytes: &[u8]) -> Architecture {
    machine_type(bytes)
        .map(|machine| match machine {
            MACHINE_I386 => Architecture::X86,
            MACHINE_AMD64 => Architecture::X64,
            _ => Architecture::Unknown,
        })
        .unwrap_or(Architecture::Unknown)
}

fn machine_type(bytes: &[u8]) -> Option<u16> {
    if bytes.len() < MIN_HEADER_LEN || !bytes.starts_with(b"MZ") {
        return None;
    }

    let pe_offset = read_u32_le(bytes, PE_POINTER_OFFSET)? as usize;
    let signature = bytes.get(pe_offset..pe_offset.checked_add(4)?)?;
    if signature != b"PE\0\0" {
        return None;
    }

    read_u16_le(bytes, pe_offset.checked_add(4)?)
}

fn read_u16_le(bytes: &[u8], at: usize) -> Option<u16> {
    let raw = bytes.get(at..at.checked_add(2)?)?;
    Some(u16::from_le_bytes([raw[0], raw[1]]))
}

fn read_u32_le(bytes: &[u8], at: usize) -> Option<u32> {
    let raw = bytes.get(at..at.checked_add(4)?)?;
    Some(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}

#[cfg(test)]
pub(crate) fn pe_header(machine: u16) -> Vec<u8> {
    let pe_offset: u32 = 0x80;
    let mut bytes = vec![0u8; 0x100];
    bytes[0..2].copy_from_slice(b"MZ");
    bytes[PE_POINTER_OFFSET..PE_POINTER_OFFSET + 4].copy_from_slice(&pe_offset.to_le_bytes());
    let at = pe_offset as usize;
    bytes[at..at + 4].copy_from_slice(b"PE\0\0");
    bytes[at + 4..at + 6].copy_from_slice(&machine.to_le_bytes());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_x86_and_x64() {
        assert_eq!(
            architecture_from_bytes(&pe_header(MACHINE_I386)),
            Architecture::X86
        );
        assert_eq!(
            architecture_from_bytes(&pe_header(MACHINE_AMD64)),
            Architecture::X64
        );
    }

    #[test]
    fn test_unrecognized_machine_is_unknown() {
        // ARM64
        assert_eq!(
            architecture_from_bytes(&pe_header(0xAA64)),
            Architecture::Unknown
        );
    }

    #[test]
    fn test_short_buffers_are_unknown() {
        let full = pe_header(MACHINE_AMD64);
        for len in 0..MIN_HEADER_LEN {
            assert_eq!(architecture_from_bytes(&full[..len]), Architecture::Unknown);
        }
    }

    #[test]
    fn test_pe_offset_past_end_is_unknown() {
        let mut bytes = pe_header(MACHINE_AMD64);
        bytes[PE_POINTER_OFFSET..PE_POINTER_OFFSET + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(architecture_from_bytes(&bytes), Architecture::Unknown);

        // Signature present but machine field truncated
        let truncated = &pe_header(MACHINE_AMD64)[..0x85];
        assert_eq!(architecture_from_bytes(truncated), Architecture::Unknown);
    }

    #[test]
    fn test_missing_signatures_are_unknown() {
        let mut no_mz = pe_header(MACHINE_AMD64);
        no_mz[0] = b'X';
        assert_eq!(architecture_from_bytes(&no_mz), Architecture::Unknown);

        let mut no_pe = pe_header(MACHINE_AMD64);
        no_pe[0x80] = b'X';
        assert_eq!(architecture_from_bytes(&no_pe), Architecture::Unknown);
    }

    #[test]
    fn test_detect_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("Game.exe");
        std::fs::write(&exe, pe_header(MACHINE_I386)).unwrap();

        assert_eq!(detect_architecture(&exe), Architecture::X86);
        assert_eq!(
            detect_architecture(&dir.path().join("missing.exe")),
            Architecture::Unknown
        );
    }
}
