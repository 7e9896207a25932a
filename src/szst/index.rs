//! Frame index construction and offset lookup.

use log::debug;

use super::error::{Result, SzstError};
use super::models::{FrameMeta, SeekTable};

/// Immutable index mapping decompressed offsets to frames.
///
/// Built once per opened source by prefix-summing the seek table's record
/// sizes; read-only afterward.
#[derive(Debug)]
pub struct FrameIndex {
    frames: Vec<FrameMeta>,
    total_size: u64,
}

impl FrameIndex {
    /// Build the index from a parsed seek table.
    ///
    /// # Errors
    /// Returns `InvalidFormat` if the cumulative compressed size disagrees
    /// with where the trailer actually begins, or if a prefix sum overflows.
    pub fn build(table: &SeekTable) -> Result<Self> {
        let mut frames = Vec::with_capacity(table.records.len());
        let mut compressed_offset: u64 = 0;
        let mut decompressed_offset: u64 = 0;

        for record in &table.records {
            let meta = FrameMeta {
                compressed_offset,
                compressed_size: u64::from(record.compressed_size),
                decompressed_offset,
                decompressed_size: u64::from(record.decompressed_size),
                checksum: record.checksum,
            };
            compressed_offset = compressed_offset
                .checked_add(meta.compressed_size)
                .ok_or_else(|| {
                    SzstError::InvalidFormat("Compressed frame sizes overflow".to_string())
                })?;
            decompressed_offset = decompressed_offset
                .checked_add(meta.decompressed_size)
                .ok_or_else(|| {
                    SzstError::InvalidFormat("Decompressed frame sizes overflow".to_string())
                })?;
            frames.push(meta);
        }

        if compressed_offset != table.frames_end {
            return Err(SzstError::InvalidFormat(format!(
                "Frame sizes cover {} bytes but the seek table starts at offset {}",
                compressed_offset, table.frames_end
            )));
        }

        debug!(
            "Frame index built: {} frames, {} decompressed bytes",
            frames.len(),
            decompressed_offset
        );

        Ok(Self {
            frames,
            total_size: decompressed_offset,
        })
    }

    /// Total size of the logical decompressed stream.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Number of frames in the archive.
    pub fn frame_count(&self) -> u32 {
        self.frames.len() as u32
    }

    pub fn frames(&self) -> &[FrameMeta] {
        &self.frames
    }

    pub fn frame(&self, frame_id: usize) -> &FrameMeta {
        &self.frames[frame_id]
    }

    /// Find the frame owning the byte at `offset` in the decompressed stream.
    ///
    /// Binary search over the cumulative decompressed boundaries; never
    /// resolves to a frame with an empty contribution.
    ///
    /// # Errors
    /// Returns `OutOfRange` if `offset >= total_size()`.
    pub fn locate(&self, offset: u64) -> Result<usize> {
        if offset >= self.total_size {
            return Err(SzstError::OutOfRange {
                start: offset,
                end: offset.saturating_add(1),
                size: self.total_size,
            });
        }
        // First frame whose end lies past the offset owns it.
        Ok(self
            .frames
            .partition_point(|frame| frame.decompressed_end() <= offset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::szst::models::FrameRecord;

    fn table(records: &[(u32, u32)]) -> SeekTable {
        SeekTable {
            records: records
                .iter()
                .map(|&(c, d)| FrameRecord {
                    compressed_size: c,
                    decompressed_size: d,
                    checksum: None,
                })
                .collect(),
            has_checksums: false,
            frames_end: records.iter().map(|&(c, _)| u64::from(c)).sum(),
        }
    }

    #[test]
    fn prefix_sums_and_totals() {
        let index = FrameIndex::build(&table(&[(10, 7), (20, 5)])).unwrap();
        assert_eq!(index.total_size(), 12);
        assert_eq!(index.frame_count(), 2);
        assert_eq!(index.frame(1).compressed_offset, 10);
        assert_eq!(index.frame(1).decompressed_offset, 7);
        assert_eq!(index.frame(1).decompressed_end(), 12);
    }

    #[test]
    fn locate_picks_owning_frame() {
        let index = FrameIndex::build(&table(&[(10, 7), (20, 5)])).unwrap();
        assert_eq!(index.locate(0).unwrap(), 0);
        assert_eq!(index.locate(6).unwrap(), 0);
        assert_eq!(index.locate(7).unwrap(), 1);
        assert_eq!(index.locate(11).unwrap(), 1);
        assert!(matches!(
            index.locate(12),
            Err(SzstError::OutOfRange { size: 12, .. })
        ));
    }

    #[test]
    fn locate_skips_empty_frames() {
        // A zero-contribution frame wedged between two real ones.
        let index = FrameIndex::build(&table(&[(10, 4), (9, 0), (20, 4)])).unwrap();
        assert_eq!(index.locate(3).unwrap(), 0);
        assert_eq!(index.locate(4).unwrap(), 2);
    }

    #[test]
    fn zero_frames_degenerate() {
        let index = FrameIndex::build(&table(&[])).unwrap();
        assert_eq!(index.total_size(), 0);
        assert_eq!(index.frame_count(), 0);
        assert!(index.locate(0).is_err());
    }

    #[test]
    fn rejects_coverage_mismatch() {
        let mut t = table(&[(10, 7)]);
        t.frames_end = 11;
        assert!(matches!(
            FrameIndex::build(&t),
            Err(SzstError::InvalidFormat(_))
        ));
    }
}
