//! Core seekable-archive reader module

pub mod error;
pub mod models;
pub mod source;

mod cache;
mod frame;
mod index;
mod reader;
mod seek_table;

pub use error::{Result, SzstError};
pub use reader::{SzstReader, DEFAULT_CACHE_CAPACITY};
pub use seek_table::{SEEKABLE_MAGIC, SKIPPABLE_MAGIC};
