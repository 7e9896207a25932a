//! Single-frame decoding (read + decompress + verification)

use log::trace;
use twox_hash::XxHash64;

use super::error::{Result, SzstError};
use super::models::FrameMeta;
use super::source::SourceAccessor;

/// Decode one frame: read its compressed bytes from the source, decompress,
/// and verify length and (when present) checksum.
///
/// Purely functional per call; callers may cache the result.
///
/// # Errors
/// - `InvalidFormat` if zstd reports corruption or the decoded length does
///   not match the seek table.
/// - `ChecksumMismatch` if the decoded bytes fail integrity verification.
pub fn decode_frame<S: SourceAccessor>(
    source: &S,
    frame_id: usize,
    meta: &FrameMeta,
) -> Result<Vec<u8>> {
    // Skippable frames are recorded with no decompressed contribution.
    if meta.decompressed_size == 0 {
        return Ok(Vec::new());
    }

    trace!(
        "Decoding frame {}: {} compressed bytes at offset {}",
        frame_id,
        meta.compressed_size,
        meta.compressed_offset
    );

    let mut compressed = vec![0u8; meta.compressed_size as usize];
    source.read_at(meta.compressed_offset, &mut compressed)?;

    let decompressed = zstd::decode_all(compressed.as_slice()).map_err(|e| {
        SzstError::InvalidFormat(format!("Frame {} failed to decompress: {}", frame_id, e))
    })?;

    if decompressed.len() as u64 != meta.decompressed_size {
        return Err(SzstError::InvalidFormat(format!(
            "Frame {} decompressed to {} bytes, seek table declares {}",
            frame_id,
            decompressed.len(),
            meta.decompressed_size
        )));
    }

    if let Some(expected) = meta.checksum {
        let actual = frame_checksum(&decompressed);
        if actual != expected {
            return Err(SzstError::ChecksumMismatch {
                frame: frame_id,
                expected,
                actual,
            });
        }
    }

    Ok(decompressed)
}

/// Integrity value stored per frame: low 32 bits of XXH64 (seed 0) over the
/// frame's decompressed bytes.
pub fn frame_checksum(decompressed: &[u8]) -> u32 {
    (XxHash64::oneshot(0, decompressed) & 0xFFFF_FFFF) as u32
}
