//! # Seek Table Parsing
//!
//! Locates and validates the trailer appended to a seekable archive, then
//! decodes its frame records. The trailer is a zstd skippable frame, so
//! decoders unaware of the extension skip it cleanly.
//!
//! ## Trailer Structure (little-endian)
//!
//! ```text
//! +----------------------+
//! | Skippable_Magic      | 4 bytes (0x184D2A5E)
//! +----------------------+
//! | Frame_Size           | 4 bytes (= N * entry_size + 9)
//! +----------------------+
//! | Seek_Table_Entries   | N * 8 or 12 bytes
//! +----------------------+
//! | Number_Of_Frames     | 4 bytes
//! +----------------------+
//! | Descriptor           | 1 byte
//! +----------------------+
//! | Seekable_Magic       | 4 bytes (0x8F92EAB1)
//! +----------------------+
//! ```
//!
//! Each entry is `compressed_size: u32`, `decompressed_size: u32`, followed
//! by `checksum: u32` iff bit 7 of the descriptor is set. Descriptor bits
//! 6..2 are reserved and must be zero; bits 1..0 are ignored.

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use log::{debug, info};

use super::error::{Result, SzstError};
use super::models::{FrameRecord, SeekTable};
use super::source::SourceAccessor;

/// Magic number opening the skippable frame that holds the seek table.
pub const SKIPPABLE_MAGIC: u32 = 0x184D_2A5E;

/// Magic number closing the seek-table footer.
pub const SEEKABLE_MAGIC: u32 = 0x8F92_EAB1;

/// Fixed footer width: frame count (4) + descriptor (1) + magic (4).
pub const FOOTER_SIZE: u64 = 9;

/// Skippable frame header width: magic (4) + frame size (4).
pub const SKIPPABLE_HEADER_SIZE: u64 = 8;

const CHECKSUM_FLAG: u8 = 0x80;
const RESERVED_MASK: u8 = 0x7C;

/// Locate and parse the seek table at the end of `source`.
///
/// Pure parsing: the only side effects are positioned reads on the source.
///
/// # Errors
/// Returns `InvalidFormat` if the source is not a seekable archive, or if
/// the trailer is truncated or internally inconsistent.
pub fn parse<S: SourceAccessor>(source: &S) -> Result<SeekTable> {
    let total_len = source.total_length();
    if total_len < SKIPPABLE_HEADER_SIZE + FOOTER_SIZE {
        return Err(SzstError::InvalidFormat(format!(
            "Source of {} bytes is too short to hold a seek table",
            total_len
        )));
    }

    // Fixed-width footer window at the very end of the source.
    let mut footer = [0u8; FOOTER_SIZE as usize];
    source.read_at(total_len - FOOTER_SIZE, &mut footer)?;

    let footer_magic = LittleEndian::read_u32(&footer[5..9]);
    if footer_magic != SEEKABLE_MAGIC {
        return Err(SzstError::InvalidFormat(format!(
            "Seek table footer magic mismatch: expected {:#010x}, got {:#010x}",
            SEEKABLE_MAGIC, footer_magic
        )));
    }

    let num_frames = LittleEndian::read_u32(&footer[0..4]);
    let descriptor = footer[4];
    if descriptor & RESERVED_MASK != 0 {
        return Err(SzstError::InvalidFormat(format!(
            "Reserved seek table descriptor bits set: {:#04x}",
            descriptor
        )));
    }
    let has_checksums = descriptor & CHECKSUM_FLAG != 0;
    let entry_size: u64 = if has_checksums { 12 } else { 8 };

    debug!(
        "Seek table footer: frames={}, checksums={}, descriptor={:#04x}",
        num_frames, has_checksums, descriptor
    );

    let payload_len = u64::from(num_frames) * entry_size;
    let trailer_len = SKIPPABLE_HEADER_SIZE + payload_len + FOOTER_SIZE;
    if trailer_len > total_len {
        return Err(SzstError::InvalidFormat(format!(
            "Seek table of {} bytes does not fit in source of {} bytes",
            trailer_len, total_len
        )));
    }
    let frames_end = total_len - trailer_len;

    // The trailer must open with a skippable frame header whose declared
    // size covers exactly the entries plus the footer.
    let mut header = [0u8; SKIPPABLE_HEADER_SIZE as usize];
    source.read_at(frames_end, &mut header)?;

    let header_magic = LittleEndian::read_u32(&header[0..4]);
    if header_magic != SKIPPABLE_MAGIC {
        return Err(SzstError::InvalidFormat(format!(
            "Seek table header magic mismatch: expected {:#010x}, got {:#010x}",
            SKIPPABLE_MAGIC, header_magic
        )));
    }
    let declared_size = u64::from(LittleEndian::read_u32(&header[4..8]));
    if declared_size != payload_len + FOOTER_SIZE {
        return Err(SzstError::InvalidFormat(format!(
            "Seek table frame size mismatch: declared {}, computed {}",
            declared_size,
            payload_len + FOOTER_SIZE
        )));
    }

    let mut payload = vec![0u8; payload_len as usize];
    source.read_at(frames_end + SKIPPABLE_HEADER_SIZE, &mut payload)?;

    let mut records = Vec::with_capacity(num_frames as usize);
    let mut reader = payload.as_slice();
    while !reader.is_empty() {
        let compressed_size = reader.read_u32::<LittleEndian>()?;
        let decompressed_size = reader.read_u32::<LittleEndian>()?;
        let checksum = if has_checksums {
            Some(reader.read_u32::<LittleEndian>()?)
        } else {
            None
        };
        records.push(FrameRecord {
            compressed_size,
            decompressed_size,
            checksum,
        });
    }

    info!(
        "Seek table parsed: {} frames, {} payload bytes, checksums={}",
        records.len(),
        frames_end,
        has_checksums
    );

    Ok(SeekTable {
        records,
        has_checksums,
        frames_end,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::szst::source::MemorySource;
    use byteorder::WriteBytesExt;

    fn trailer(records: &[(u32, u32)], descriptor: u8) -> Vec<u8> {
        let entry_size = if descriptor & CHECKSUM_FLAG != 0 { 12 } else { 8 };
        let mut out = Vec::new();
        out.write_u32::<LittleEndian>(SKIPPABLE_MAGIC).unwrap();
        out.write_u32::<LittleEndian>((records.len() * entry_size + 9) as u32)
            .unwrap();
        for &(c, d) in records {
            out.write_u32::<LittleEndian>(c).unwrap();
            out.write_u32::<LittleEndian>(d).unwrap();
            if descriptor & CHECKSUM_FLAG != 0 {
                out.write_u32::<LittleEndian>(0).unwrap();
            }
        }
        out.write_u32::<LittleEndian>(records.len() as u32).unwrap();
        out.write_u8(descriptor).unwrap();
        out.write_u32::<LittleEndian>(SEEKABLE_MAGIC).unwrap();
        out
    }

    #[test]
    fn parses_empty_table() {
        let source = MemorySource::new(trailer(&[], 0));
        let table = parse(&source).unwrap();
        assert!(table.records.is_empty());
        assert!(!table.has_checksums);
        assert_eq!(table.frames_end, 0);
    }

    #[test]
    fn parses_records_and_flags() {
        let mut data = vec![0xAB; 30];
        data.extend_from_slice(&trailer(&[(10, 100), (20, 200)], CHECKSUM_FLAG));
        let table = parse(&MemorySource::new(data)).unwrap();
        assert_eq!(table.records.len(), 2);
        assert!(table.has_checksums);
        assert_eq!(table.frames_end, 30);
        assert_eq!(table.records[1].compressed_size, 20);
        assert_eq!(table.records[1].decompressed_size, 200);
        assert_eq!(table.records[1].checksum, Some(0));
    }

    #[test]
    fn rejects_bad_footer_magic() {
        let mut data = trailer(&[], 0);
        let last = data.len() - 1;
        data[last] ^= 0xFF;
        let err = parse(&MemorySource::new(data)).unwrap_err();
        assert!(matches!(err, SzstError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_reserved_descriptor_bits() {
        let data = trailer(&[], 0x04);
        let err = parse(&MemorySource::new(data)).unwrap_err();
        assert!(matches!(err, SzstError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_short_source() {
        let err = parse(&MemorySource::new(vec![0u8; 10])).unwrap_err();
        assert!(matches!(err, SzstError::InvalidFormat(_)));
    }

    #[test]
    fn rejects_table_larger_than_source() {
        // Footer claims 1000 frames but the source only holds the trailer.
        let mut data = trailer(&[], 0);
        let len = data.len();
        LittleEndian::write_u32(&mut data[len - 9..len - 5], 1000);
        let err = parse(&MemorySource::new(data)).unwrap_err();
        assert!(matches!(err, SzstError::InvalidFormat(_)));
    }
}
