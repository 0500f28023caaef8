//! Central-directory reader for archives that may repeat entry names.
//!
//! Entries are listed in central directory order, duplicates included, which
//! is what `inspect` and the assembly checks need.

use super::ArchiveError;
use super::manifest::{MANIFEST_PATH, parse_manifest};
use flate2::read::DeflateDecoder;
use jarsmith_api::ManifestAttributes;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;
const END_OF_CENTRAL_DIR_LEN: usize = 22;
const LOCAL_HEADER_LEN: usize = 30;
const CENTRAL_HEADER_LEN: usize = 46;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryInfo {
    pub name: String,
    pub method: u16,
    pub crc32: u32,
    pub compressed_size: u32,
    pub size: u32,
    /// Offset of the local header.
    pub offset: u32,
}

impl EntryInfo {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }

    pub fn method_name(&self) -> &'static str {
        match self.method {
            0 => "stored",
            8 => "deflated",
            _ => "other",
        }
    }
}

/// An archive held in memory together with its parsed central directory.
pub struct JarContents {
    path: PathBuf,
    bytes: Vec<u8>,
    entries: Vec<EntryInfo>,
}

impl JarContents {
    pub fn open(path: &Path) -> Result<Self, ArchiveError> {
        let bytes = std::fs::read(path).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_bytes(path, bytes)
    }

    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, ArchiveError> {
        let entries = parse_central_directory(&bytes).map_err(|source| ArchiveError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            bytes,
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> &[EntryInfo] {
        &self.entries
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Decompresses one entry and checks its CRC.
    pub fn read(&self, entry: &EntryInfo) -> io::Result<Vec<u8>> {
        let start = entry.offset as usize;
        let header = self
            .bytes
            .get(start..start + LOCAL_HEADER_LEN)
            .ok_or_else(|| corrupt("local header out of bounds"))?;
        if u32_at(header, 0) != LOCAL_HEADER_SIG {
            return Err(corrupt("bad local header signature"));
        }
        let name_len = u16_at(header, 26) as usize;
        let extra_len = u16_at(header, 28) as usize;
        let data_start = start + LOCAL_HEADER_LEN + name_len + extra_len;
        let raw = self
            .bytes
            .get(data_start..data_start + entry.compressed_size as usize)
            .ok_or_else(|| corrupt("entry data out of bounds"))?;

        let data = match entry.method {
            0 => raw.to_vec(),
            8 => {
                let mut out = Vec::with_capacity(entry.size as usize);
                DeflateDecoder::new(raw).read_to_end(&mut out)?;
                out
            }
            other => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("compression method {} for {}", other, entry.name),
                ));
            }
        };

        if crc32fast::hash(&data) != entry.crc32 {
            return Err(corrupt(&format!("CRC mismatch for {}", entry.name)));
        }
        Ok(data)
    }

    /// Every copy of `name`, in archive order.
    pub fn read_all(&self, name: &str) -> io::Result<Vec<Vec<u8>>> {
        self.entries
            .iter()
            .filter(|e| e.name == name)
            .map(|e| self.read(e))
            .collect()
    }

    /// Main section of the first `META-INF/MANIFEST.MF`, if any.
    pub fn manifest(&self) -> Result<Option<ManifestAttributes>, ArchiveError> {
        let Some(entry) = self.entries.iter().find(|e| e.name == MANIFEST_PATH) else {
            return Ok(None);
        };
        let bytes = self.read(entry).map_err(|source| ArchiveError::Read {
            path: self.path.clone(),
            source,
        })?;
        Ok(Some(parse_manifest(&bytes)?))
    }
}

fn parse_central_directory(bytes: &[u8]) -> io::Result<Vec<EntryInfo>> {
    let eocd = find_end_of_central_directory(bytes)?;
    let count = u16_at(bytes, eocd + 10) as usize;
    let mut cursor = u32_at(bytes, eocd + 16) as usize;

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let header = bytes
            .get(cursor..cursor + CENTRAL_HEADER_LEN)
            .ok_or_else(|| corrupt("central directory out of bounds"))?;
        if u32_at(header, 0) != CENTRAL_HEADER_SIG {
            return Err(corrupt("bad central directory signature"));
        }
        let name_len = u16_at(header, 28) as usize;
        let extra_len = u16_at(header, 30) as usize;
        let comment_len = u16_at(header, 32) as usize;
        let name_start = cursor + CENTRAL_HEADER_LEN;
        let name = bytes
            .get(name_start..name_start + name_len)
            .ok_or_else(|| corrupt("entry name out of bounds"))?;

        entries.push(EntryInfo {
            name: String::from_utf8_lossy(name).into_owned(),
            method: u16_at(header, 10),
            crc32: u32_at(header, 16),
            compressed_size: u32_at(header, 20),
            size: u32_at(header, 24),
            offset: u32_at(header, 42),
        });
        cursor = name_start + name_len + extra_len + comment_len;
    }
    Ok(entries)
}

fn find_end_of_central_directory(bytes: &[u8]) -> io::Result<usize> {
    if bytes.len() < END_OF_CENTRAL_DIR_LEN {
        return Err(corrupt("too short to be a zip archive"));
    }
    // The record is followed by a comment of at most u16::MAX bytes
    let last = bytes.len() - END_OF_CENTRAL_DIR_LEN;
    let first = last.saturating_sub(u16::MAX as usize);
    (first..=last)
        .rev()
        .find(|&at| u32_at(bytes, at) == END_OF_CENTRAL_DIR_SIG)
        .ok_or_else(|| corrupt("end of central directory not found"))
}

fn u16_at(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn u32_at(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn corrupt(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}
