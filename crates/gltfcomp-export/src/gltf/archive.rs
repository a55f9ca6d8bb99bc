//! ZIP bundling of export output
//!
//! A minimal writer for the classic (non-ZIP64) container: every entry is
//! deflated, followed by the central directory and its end record.

use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Local file header signature
const LOCAL_HEADER_SIGNATURE: u32 = 0x04034B50;

/// Central directory file header signature
const CD_SIGNATURE: u32 = 0x02014B50;

/// End of central directory signature
const EOCD_SIGNATURE: u32 = 0x06054B50;

const METHOD_DEFLATE: u16 = 8;
const VERSION_NEEDED: u16 = 20;
/// Entry names are UTF-8
const FLAG_UTF8: u16 = 0x0800;
/// 1980-01-01 00:00 in DOS date format
const DOS_DATE: u16 = (1 << 5) | 1;

/// Archive writing errors
#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Archive limit exceeded: {0}")]
    TooLarge(String),

    #[error("Invalid entry name: {0}")]
    InvalidName(PathBuf),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;

struct CentralEntry {
    name: String,
    crc32: u32,
    compressed_size: u32,
    uncompressed_size: u32,
    local_header_offset: u32,
}

/// Streaming ZIP writer
pub struct ZipWriter<W: Write> {
    writer: W,
    offset: u64,
    entries: Vec<CentralEntry>,
}

impl<W: Write> ZipWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            offset: 0,
            entries: Vec::new(),
        }
    }

    /// Deflate `data` and append it as entry `name`
    pub fn add_file(&mut self, name: &str, data: &[u8]) -> ArchiveResult<()> {
        let crc32 = {
            let mut hasher = crc32fast::Hasher::new();
            hasher.update(data);
            hasher.finalize()
        };

        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data)?;
        let compressed = encoder.finish()?;

        let entry = CentralEntry {
            name: name.to_string(),
            crc32,
            compressed_size: to_u32(compressed.len() as u64, "entry size")?,
            uncompressed_size: to_u32(data.len() as u64, "entry size")?,
            local_header_offset: to_u32(self.offset, "archive size")?,
        };
        let name_len = to_u16(name.len(), "entry name length")?;

        let mut header = Vec::with_capacity(30 + name.len());
        header.extend_from_slice(&LOCAL_HEADER_SIGNATURE.to_le_bytes());
        header.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        header.extend_from_slice(&FLAG_UTF8.to_le_bytes());
        header.extend_from_slice(&METHOD_DEFLATE.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes()); // mod time
        header.extend_from_slice(&DOS_DATE.to_le_bytes());
        header.extend_from_slice(&entry.crc32.to_le_bytes());
        header.extend_from_slice(&entry.compressed_size.to_le_bytes());
        header.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
        header.extend_from_slice(&name_len.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes()); // extra length
        header.extend_from_slice(name.as_bytes());

        self.writer.write_all(&header)?;
        self.writer.write_all(&compressed)?;
        self.offset += (header.len() + compressed.len()) as u64;
        self.entries.push(entry);

        Ok(())
    }

    /// Write the central directory and return the inner writer
    pub fn finish(mut self) -> ArchiveResult<W> {
        let cd_offset = to_u32(self.offset, "archive size")?;
        let mut cd = Vec::new();

        for entry in &self.entries {
            cd.extend_from_slice(&CD_SIGNATURE.to_le_bytes());
            cd.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // version made by
            cd.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
            cd.extend_from_slice(&FLAG_UTF8.to_le_bytes());
            cd.extend_from_slice(&METHOD_DEFLATE.to_le_bytes());
            cd.extend_from_slice(&0u16.to_le_bytes());
            cd.extend_from_slice(&DOS_DATE.to_le_bytes());
            cd.extend_from_slice(&entry.crc32.to_le_bytes());
            cd.extend_from_slice(&entry.compressed_size.to_le_bytes());
            cd.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            cd.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            cd.extend_from_slice(&0u16.to_le_bytes()); // extra length
            cd.extend_from_slice(&0u16.to_le_bytes()); // comment length
            cd.extend_from_slice(&0u16.to_le_bytes()); // disk start
            cd.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
            cd.extend_from_slice(&0u32.to_le_bytes()); // external attributes
            cd.extend_from_slice(&entry.local_header_offset.to_le_bytes());
            cd.extend_from_slice(entry.name.as_bytes());
        }

        let count = to_u16(self.entries.len(), "entry count")?;
        let cd_size = to_u32(cd.len() as u64, "central directory size")?;

        let mut eocd = Vec::with_capacity(22);
        eocd.extend_from_slice(&EOCD_SIGNATURE.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // this disk
        eocd.extend_from_slice(&0u16.to_le_bytes()); // central directory disk
        eocd.extend_from_slice(&count.to_le_bytes());
        eocd.extend_from_slice(&count.to_le_bytes());
        eocd.extend_from_slice(&cd_size.to_le_bytes());
        eocd.extend_from_slice(&cd_offset.to_le_bytes());
        eocd.extend_from_slice(&0u16.to_le_bytes()); // comment length

        self.writer.write_all(&cd)?;
        self.writer.write_all(&eocd)?;
        self.writer.flush()?;

        Ok(self.writer)
    }
}

fn to_u32(value: u64, what: &str) -> ArchiveResult<u32> {
    u32::try_from(value).map_err(|_| ArchiveError::TooLarge(format!("{} {}", what, value)))
}

fn to_u16(value: usize, what: &str) -> ArchiveResult<u16> {
    u16::try_from(value).map_err(|_| ArchiveError::TooLarge(format!("{} {}", what, value)))
}

/// Bundle `files` into a new archive at `archive_path`, stored by file name
pub fn bundle(archive_path: &Path, files: &[PathBuf]) -> ArchiveResult<()> {
    let mut zip = ZipWriter::new(BufWriter::new(File::create(archive_path)?));

    for file in files {
        let name = file
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| ArchiveError::InvalidName(file.clone()))?;
        let data = fs::read(file)?;
        zip.add_file(name, &data)?;
    }

    zip.finish()?;
    Ok(())
}
