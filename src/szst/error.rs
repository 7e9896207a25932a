//! Custom error types for the szst-reader crate.

use thiserror::Error;

/// The primary error type for all operations in this crate.
#[derive(Debug, Error)]
pub enum SzstError {
    /// An error originating from I/O operations.
    #[error("I/O error: {0:?}")]
    Io(#[from] std::io::Error),

    /// The file is structurally invalid or does not conform to the seekable
    /// archive format (bad magic, truncated trailer, malformed record, or
    /// corruption reported by the zstd decoder).
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A frame's decoded bytes failed integrity verification.
    #[error("Checksum mismatch in frame {frame}: expected {expected:#010x}, got {actual:#010x}")]
    ChecksumMismatch {
        frame: usize,
        expected: u32,
        actual: u32,
    },

    /// A requested range lies outside the decompressed stream.
    #[error("Requested range [{start}, {end}) exceeds decompressed size {size}")]
    OutOfRange { start: u64, end: u64, size: u64 },

    /// An operation was invoked on a reader that has already been closed.
    #[error("Reader has been closed")]
    Closed,

    /// A mutex lock was poisoned, indicating a panic in another thread holding the lock.
    #[error("A mutex lock was poisoned, indicating a panic in another thread holding the lock.")]
    LockPoisoned,
}

/// A convenience `Result` type alias using the crate's `SzstError` type.
pub type Result<T> = std::result::Result<T, SzstError>;
