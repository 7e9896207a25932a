//! Random-access byte sources backing a reader.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Mutex;

use super::error::{Result, SzstError};

/// Capability set required of the underlying medium: positioned reads plus a
/// length query. Any type providing both can back a reader.
pub trait SourceAccessor {
    /// Read exactly `buf.len()` bytes starting at `offset`.
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// Total length of the source in bytes.
    fn total_length(&self) -> u64;
}

/// File-backed source.
///
/// Positioned reads are serialized behind a mutex (seek + read_exact), so a
/// single source is safe to share across threads. The length is captured at
/// open time; the archive is assumed immutable while a reader holds it.
#[derive(Debug)]
pub struct FileSource {
    file: Mutex<File>,
    len: u64,
}

impl FileSource {
    /// Open the file at `path` as a random-access source.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or its length queried.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let len = file.metadata()?.len();
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }
}

impl SourceAccessor for FileSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let mut file = self.file.lock().map_err(|_| SzstError::LockPoisoned)?;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)?;
        Ok(())
    }

    fn total_length(&self) -> u64 {
        self.len
    }
}

/// In-memory source over an owned byte buffer.
#[derive(Debug)]
pub struct MemorySource {
    data: Vec<u8>,
}

impl MemorySource {
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<Vec<u8>> for MemorySource {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl SourceAccessor for MemorySource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        let slice = usize::try_from(offset)
            .ok()
            .and_then(|start| start.checked_add(buf.len()).map(|end| (start, end)))
            .and_then(|(start, end)| self.data.get(start..end));
        match slice {
            Some(slice) => {
                buf.copy_from_slice(slice);
                Ok(())
            }
            None => Err(SzstError::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "read past end of in-memory source",
            ))),
        }
    }

    fn total_length(&self) -> u64 {
        self.data.len() as u64
    }
}
