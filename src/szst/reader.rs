//! Reader handle: lifecycle, offset resolution, and range assembly.

use std::path::Path;
use std::sync::{Arc, Mutex};

use log::info;

use super::cache::FrameCache;
use super::error::{Result, SzstError};
use super::frame;
use super::index::FrameIndex;
use super::models::FrameMeta;
use super::seek_table;
use super::source::{FileSource, SourceAccessor};

/// Decoded frames kept around by default for repeated reads.
pub const DEFAULT_CACHE_CAPACITY: usize = 8;

/// The main reader for seekable zstd archives.
///
/// Owns one random-access source and the frame index built from its seek
/// table. Byte ranges of the decompressed stream are served by decoding only
/// the frames that overlap the request.
///
/// All read methods take `&self`: the source serializes its own positioned
/// reads and the frame cache sits behind a mutex, so one reader can be
/// shared across threads.
#[derive(Debug)]
pub struct SzstReader<S: SourceAccessor> {
    source: Option<S>,
    index: FrameIndex,
    cache: Mutex<FrameCache>,
}

impl SzstReader<FileSource> {
    /// Open the archive at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or is not a valid
    /// seekable archive.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening seekable archive: {}", path.display());
        Self::new(FileSource::open(path)?)
    }
}

impl<S: SourceAccessor> SzstReader<S> {
    /// Attach to `source`, parse its seek table, and build the frame index.
    ///
    /// # Errors
    /// Returns an error if the source is not a seekable archive, its trailer
    /// is truncated or corrupt, or the source cannot be read.
    pub fn new(source: S) -> Result<Self> {
        Self::with_cache_capacity(source, DEFAULT_CACHE_CAPACITY)
    }

    /// Like [`SzstReader::new`] with an explicit frame-cache capacity.
    /// Capacity 0 disables caching; output is identical either way.
    pub fn with_cache_capacity(source: S, capacity: usize) -> Result<Self> {
        let table = seek_table::parse(&source)?;
        let index = FrameIndex::build(&table)?;

        info!(
            "Archive opened: {} frames, {} decompressed bytes, checksums={}",
            index.frame_count(),
            index.total_size(),
            table.has_checksums
        );

        Ok(Self {
            source: Some(source),
            index,
            cache: Mutex::new(FrameCache::new(capacity)),
        })
    }

    /// Total size of the decompressed logical stream.
    ///
    /// # Errors
    /// Returns `Closed` if the reader has been closed.
    pub fn size(&self) -> Result<u64> {
        self.ensure_open()?;
        Ok(self.index.total_size())
    }

    /// Number of frames in the archive.
    ///
    /// # Errors
    /// Returns `Closed` if the reader has been closed.
    pub fn frame_count(&self) -> Result<u32> {
        self.ensure_open()?;
        Ok(self.index.frame_count())
    }

    /// Placement metadata for every frame, in archive order.
    pub fn frames(&self) -> &[FrameMeta] {
        self.index.frames()
    }

    /// Read the decompressed bytes in `[start, end)`.
    ///
    /// Decodes only the frames overlapping the range, in order. The result
    /// holds exactly `end - start` bytes; a partial range is never returned.
    ///
    /// # Errors
    /// - `OutOfRange` if `start > end` or `end` exceeds the stream size.
    /// - `Closed` if the reader has been closed.
    /// - Decode failures propagate as `InvalidFormat` or `ChecksumMismatch`.
    pub fn read_range(&self, start: u64, end: u64) -> Result<Vec<u8>> {
        let source = self.source.as_ref().ok_or(SzstError::Closed)?;
        let total = self.index.total_size();
        if start > end || end > total {
            return Err(SzstError::OutOfRange {
                start,
                end,
                size: total,
            });
        }
        if start == end {
            return Ok(Vec::new());
        }

        let first = self.index.locate(start)?;
        let last = self.index.locate(end - 1)?;

        let mut out = Vec::with_capacity((end - start) as usize);
        for frame_id in first..=last {
            let meta = self.index.frame(frame_id);
            if meta.decompressed_size == 0 {
                continue;
            }
            let bytes = self.frame_bytes(source, frame_id, meta)?;
            let lo = (start.max(meta.decompressed_offset) - meta.decompressed_offset) as usize;
            let hi = (end.min(meta.decompressed_end()) - meta.decompressed_offset) as usize;
            out.extend_from_slice(&bytes[lo..hi]);
        }

        debug_assert_eq!(out.len() as u64, end - start);
        Ok(out)
    }

    /// Read up to `buf.len()` decompressed bytes starting at `offset`,
    /// clamped to the end of the stream. Returns the number of bytes read;
    /// 0 once `offset` is at or past the end.
    ///
    /// # Errors
    /// Same failure modes as [`SzstReader::read_range`].
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let total = self.size()?;
        if offset >= total || buf.is_empty() {
            return Ok(0);
        }
        let end = total.min(offset.saturating_add(buf.len() as u64));
        let data = self.read_range(offset, end)?;
        buf[..data.len()].copy_from_slice(&data);
        Ok(data.len())
    }

    /// Read several ranges sequentially, failing fast on the first error.
    ///
    /// # Errors
    /// Same failure modes as [`SzstReader::read_range`].
    pub fn read_ranges(&self, ranges: &[(u64, u64)]) -> Result<Vec<Vec<u8>>> {
        ranges
            .iter()
            .map(|&(start, end)| self.read_range(start, end))
            .collect()
    }

    /// Release the underlying source. Idempotent; subsequent reads fail
    /// with `Closed`. Dropping the reader releases the source as well.
    pub fn close(&mut self) {
        self.source = None;
    }

    fn ensure_open(&self) -> Result<()> {
        if self.source.is_none() {
            return Err(SzstError::Closed);
        }
        Ok(())
    }

    /// Fetch a frame's decoded bytes through the cache. Decoding runs
    /// outside the cache lock so concurrent readers of distinct frames do
    /// not serialize on decompression.
    fn frame_bytes(&self, source: &S, frame_id: usize, meta: &FrameMeta) -> Result<Arc<Vec<u8>>> {
        {
            let mut cache = self.cache.lock().map_err(|_| SzstError::LockPoisoned)?;
            if let Some(bytes) = cache.get(frame_id) {
                return Ok(bytes);
            }
        }

        let bytes = Arc::new(frame::decode_frame(source, frame_id, meta)?);

        let mut cache = self.cache.lock().map_err(|_| SzstError::LockPoisoned)?;
        cache.insert(frame_id, Arc::clone(&bytes));
        Ok(bytes)
    }
}
