//! Async record streaming
//!
//! Decoding of NDJSON / JSON array bodies and handling of downloaded bulk
//! archives.

pub mod decoder;
pub mod file_ops;

use std::pin::Pin;

use futures::Stream;

use crate::error::Result;

pub use decoder::{decode_records, decode_single, decode_value};
pub use file_ops::{DownloadWorkspace, download_to_file, extract_single_json, stream_archive_records};

/// Boxed, lazily evaluated stream of decoded records
pub type RecordStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;
