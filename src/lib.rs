//! # szst-reader
//!
//! A random-access reader for seekable zstd archives (`.szst`): files made
//! of independently decodable zstd frames with an appended seek table held
//! in a skippable frame.
//!
//! Any byte range of the decompressed stream can be fetched by decoding only
//! the frames that overlap it:
//!
//! ```no_run
//! use szst_reader::SzstReader;
//!
//! let reader = SzstReader::open("archive.szst").unwrap();
//! println!("{} bytes in {} frames", reader.size().unwrap(), reader.frame_count().unwrap());
//! let bytes = reader.read_range(1024, 2048).unwrap();
//! # let _ = bytes;
//! ```
pub mod szst;

// Re-export the main types for convenience
pub use szst::{
    error::{Result, SzstError},
    models::{FrameMeta, FrameRecord, SeekTable},
    source::{FileSource, MemorySource, SourceAccessor},
    SzstReader,
};
