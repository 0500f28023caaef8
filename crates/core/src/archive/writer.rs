//! Streaming jar (zip) writer that accepts repeated entry names.
//!
//! Entries are written in call order and every call produces its own local
//! header and central directory record, so two entries may share a name.
//! Readers that index by name see the last one.
//!
//! Layout per entry: `[local header:30][name][data]`, followed at the end by
//! the central directory and the end-of-central-directory record. Only the
//! classic (non-zip64) format is produced.

use flate2::write::DeflateEncoder;
use std::io::{self, Write};

const LOCAL_HEADER_SIG: u32 = 0x0403_4b50;
const CENTRAL_HEADER_SIG: u32 = 0x0201_4b50;
const END_OF_CENTRAL_DIR_SIG: u32 = 0x0605_4b50;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;

/// General purpose flag bit 11: names are UTF-8.
const FLAG_UTF8: u16 = 1 << 11;
const VERSION_MADE_BY: u16 = 20;
const VERSION_STORED: u16 = 10;
const VERSION_DEFLATED: u16 = 20;
const DIRECTORY_ATTRIBUTE: u32 = 0x10;

/// Fixed entry timestamp (1980-02-01 00:00:00, MS-DOS encoding) so identical
/// inputs produce byte-identical archives.
const DOS_TIME: u16 = 0;
const DOS_DATE: u16 = (2 << 5) | 1;

const MAX_ENTRIES: usize = u16::MAX as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    Stored,
    /// Deflate, falling back to stored when deflate does not shrink the data.
    #[default]
    Deflated,
}

struct CentralRecord {
    name: String,
    method: u16,
    crc32: u32,
    compressed_size: u32,
    size: u32,
    offset: u32,
    directory: bool,
}

pub struct JarWriter<W: Write> {
    out: W,
    position: u64,
    records: Vec<CentralRecord>,
    compression: Compression,
}

impl<W: Write> JarWriter<W> {
    pub fn new(out: W) -> Self {
        Self::with_compression(out, Compression::default())
    }

    pub fn with_compression(out: W, compression: Compression) -> Self {
        Self {
            out,
            position: 0,
            records: Vec::new(),
            compression,
        }
    }

    pub fn entry_count(&self) -> usize {
        self.records.len()
    }

    /// Adds a directory entry; a trailing `/` is appended when missing.
    pub fn add_directory(&mut self, name: &str) -> io::Result<()> {
        let mut name = name.to_string();
        if !name.ends_with('/') {
            name.push('/');
        }
        self.write_entry(name, &[], 0, METHOD_STORED, 0, true)
    }

    pub fn add_file(&mut self, name: &str, data: &[u8]) -> io::Result<()> {
        let crc32 = crc32fast::hash(data);
        let size = data.len() as u64;
        if self.compression == Compression::Deflated {
            let mut encoder = DeflateEncoder::new(Vec::new(), flate2::Compression::default());
            encoder.write_all(data)?;
            let deflated = encoder.finish()?;
            if deflated.len() < data.len() {
                return self.write_entry(
                    name.to_string(),
                    &deflated,
                    size,
                    METHOD_DEFLATED,
                    crc32,
                    false,
                );
            }
        }
        self.write_entry(name.to_string(), data, size, METHOD_STORED, crc32, false)
    }

    fn write_entry(
        &mut self,
        name: String,
        payload: &[u8],
        size: u64,
        method: u16,
        crc32: u32,
        directory: bool,
    ) -> io::Result<()> {
        if self.records.len() >= MAX_ENTRIES {
            return Err(limit_error(format!(
                "more than {} entries need the zip64 format",
                MAX_ENTRIES
            )));
        }
        let name_len = checked_u16(name.len(), "entry name length")?;
        let offset = checked_u32(self.position, "entry offset")?;
        let compressed_size = checked_u32(payload.len() as u64, "compressed entry size")?;
        let size = checked_u32(size, "entry size")?;

        let mut header = Vec::with_capacity(30 + name.len());
        put_u32(&mut header, LOCAL_HEADER_SIG);
        put_u16(&mut header, version_needed(method));
        put_u16(&mut header, FLAG_UTF8);
        put_u16(&mut header, method);
        put_u16(&mut header, DOS_TIME);
        put_u16(&mut header, DOS_DATE);
        put_u32(&mut header, crc32);
        put_u32(&mut header, compressed_size);
        put_u32(&mut header, size);
        put_u16(&mut header, name_len);
        put_u16(&mut header, 0);
        header.extend_from_slice(name.as_bytes());

        self.out.write_all(&header)?;
        self.out.write_all(payload)?;
        self.position += (header.len() + payload.len()) as u64;

        self.records.push(CentralRecord {
            name,
            method,
            crc32,
            compressed_size,
            size,
            offset,
            directory,
        });
        Ok(())
    }

    /// Writes the central directory and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        let directory_offset = checked_u32(self.position, "central directory offset")?;
        let mut directory = Vec::new();

        for record in &self.records {
            put_u32(&mut directory, CENTRAL_HEADER_SIG);
            put_u16(&mut directory, VERSION_MADE_BY);
            put_u16(&mut directory, version_needed(record.method));
            put_u16(&mut directory, FLAG_UTF8);
            put_u16(&mut directory, record.method);
            put_u16(&mut directory, DOS_TIME);
            put_u16(&mut directory, DOS_DATE);
            put_u32(&mut directory, record.crc32);
            put_u32(&mut directory, record.compressed_size);
            put_u32(&mut directory, record.size);
            put_u16(&mut directory, record.name.len() as u16);
            put_u16(&mut directory, 0); // extra length
            put_u16(&mut directory, 0); // comment length
            put_u16(&mut directory, 0); // disk number start
            put_u16(&mut directory, 0); // internal attributes
            put_u32(
                &mut directory,
                if record.directory {
                    DIRECTORY_ATTRIBUTE
                } else {
                    0
                },
            );
            put_u32(&mut directory, record.offset);
            directory.extend_from_slice(record.name.as_bytes());
        }

        let directory_size = checked_u32(directory.len() as u64, "central directory size")?;
        checked_u32(self.position + directory.len() as u64, "archive size")?;
        let count = self.records.len() as u16;

        put_u32(&mut directory, END_OF_CENTRAL_DIR_SIG);
        put_u16(&mut directory, 0); // this disk
        put_u16(&mut directory, 0); // disk with central directory
        put_u16(&mut directory, count);
        put_u16(&mut directory, count);
        put_u32(&mut directory, directory_size);
        put_u32(&mut directory, directory_offset);
        put_u16(&mut directory, 0); // comment length

        self.out.write_all(&directory)?;
        self.out.flush()?;
        Ok(self.out)
    }
}

fn version_needed(method: u16) -> u16 {
    if method == METHOD_DEFLATED {
        VERSION_DEFLATED
    } else {
        VERSION_STORED
    }
}

fn put_u16(buf: &mut Vec<u8>, value: u16) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_le_bytes());
}

fn checked_u16(value: usize, what: &str) -> io::Result<u16> {
    u16::try_from(value).map_err(|_| limit_error(format!("{} {} exceeds the zip format", what, value)))
}

fn checked_u32(value: u64, what: &str) -> io::Result<u32> {
    u32::try_from(value)
        .map_err(|_| limit_error(format!("{} {} needs the zip64 format", what, value)))
}

fn limit_error(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}
