//! Incremental JSON record decoding
//!
//! Bodies are either newline-delimited JSON (one object per line) or a single
//! top-level JSON array. The format is picked from the first non-whitespace
//! byte. Records are yielded one at a time so the whole body never has to be
//! held in memory.

use std::io;
use std::time::Instant;

use async_stream::try_stream;
use futures::Stream;
use serde::de::DeserializeOwned;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_util::sync::CancellationToken;

use crate::error::{DawaError, Result};
use crate::transport::cancellable;

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyFormat {
    Empty,
    Lines,
    Array,
}

/// Decode a single JSON value, failing on `null`
pub fn decode_value<T: DeserializeOwned>(bytes: &[u8], source: &str) -> Result<T> {
    let value: Option<T> = serde_json::from_slice(bytes)?;
    value.ok_or_else(|| DawaError::empty_result(format!("Received empty value from {source}")))
}

/// Decode a complete response body holding exactly one value
///
/// Empty bodies and `null` are both reported as [`DawaError::EmptyResult`].
pub fn decode_single<T: DeserializeOwned>(bytes: &[u8], source: &str) -> Result<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(DawaError::empty_result(format!("Received empty body from {source}")));
    }
    decode_value(bytes, source)
}

/// Stream records of type `T` out of an NDJSON or JSON array body
///
/// `source` names the body in log lines and error messages.
pub fn decode_records<'a, T, R>(
    reader: R,
    cancel: CancellationToken,
    source: String,
) -> impl Stream<Item = Result<T>> + Send + 'a
where
    T: DeserializeOwned + Send + 'a,
    R: AsyncBufRead + Unpin + Send + 'a,
{
    try_stream! {
        let started = Instant::now();
        let mut reader = reader;
        let mut count = 0usize;

        match cancellable(&cancel, detect_format(&mut reader)).await?? {
            BodyFormat::Empty => {}
            BodyFormat::Lines => {
                let mut lines = reader.lines();
                while let Some(line) = cancellable(&cancel, lines.next_line()).await?? {
                    if line.trim().is_empty() {
                        Err::<(), _>(DawaError::empty_result(format!("Blank line in {source}")))?;
                    }
                    count += 1;
                    yield decode_value::<T>(line.as_bytes(), &source)?;
                }
            }
            BodyFormat::Array => {
                let mut elements = ArrayElements::new(reader);
                while let Some(element) = cancellable(&cancel, elements.next_element()).await?? {
                    count += 1;
                    yield decode_value::<T>(&element, &source)?;
                }
            }
        }

        log::debug!("Decoded {count} records from {source} in {:?}", started.elapsed());
    }
}

/// Skip leading whitespace (and a UTF-8 BOM) and look at the first byte
async fn detect_format<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<BodyFormat> {
    loop {
        let buffer = reader.fill_buf().await?;
        if buffer.is_empty() {
            return Ok(BodyFormat::Empty);
        }

        let skipped = buffer
            .iter()
            .take_while(|&&b| b.is_ascii_whitespace() || UTF8_BOM.contains(&b))
            .count();

        if skipped < buffer.len() {
            let format = if buffer[skipped] == b'[' {
                BodyFormat::Array
            } else {
                BodyFormat::Lines
            };
            // The opening bracket belongs to the framing, not to the first element
            let consumed = if format == BodyFormat::Array { skipped + 1 } else { skipped };
            reader.consume(consumed);
            return Ok(format);
        }

        reader.consume(skipped);
    }
}

fn malformed(message: &str) -> DawaError {
    DawaError::Decode(serde_json::Error::io(io::Error::new(io::ErrorKind::InvalidData, message)))
}

/// Splits the elements of a top-level JSON array without parsing them
///
/// Tracks nesting depth and string state, so commas and brackets inside
/// nested values or string literals are not mistaken for separators.
struct ArrayElements<R> {
    reader: R,
    pending: Vec<u8>,
    depth: usize,
    in_string: bool,
    escaped: bool,
    after_comma: bool,
    finished: bool,
}

impl<R: AsyncBufRead + Unpin> ArrayElements<R> {
    const fn new(reader: R) -> Self {
        Self {
            reader,
            pending: Vec::new(),
            depth: 0,
            in_string: false,
            escaped: false,
            after_comma: false,
            finished: false,
        }
    }

    async fn next_element(&mut self) -> Result<Option<Vec<u8>>> {
        if self.finished {
            self.ensure_exhausted().await?;
            return Ok(None);
        }

        loop {
            let buffer = self.reader.fill_buf().await?;
            if buffer.is_empty() {
                return Err(DawaError::Decode(serde_json::Error::io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "unterminated JSON array",
                ))));
            }

            let mut consumed = 0;
            let mut outcome = None;
            let mut trailing_comma = false;

            for &byte in buffer {
                consumed += 1;

                if self.in_string {
                    self.pending.push(byte);
                    if self.escaped {
                        self.escaped = false;
                    } else if byte == b'\\' {
                        self.escaped = true;
                    } else if byte == b'"' {
                        self.in_string = false;
                    }
                    continue;
                }

                match byte {
                    b'"' => {
                        self.in_string = true;
                        self.pending.push(byte);
                    }
                    b'{' | b'[' => {
                        self.depth += 1;
                        self.pending.push(byte);
                    }
                    b']' if self.depth == 0 => {
                        self.finished = true;
                        let element = Self::finish_element(std::mem::take(&mut self.pending), true);
                        trailing_comma = element.is_none() && self.after_comma;
                        outcome = Some(element);
                        break;
                    }
                    b'}' | b']' => {
                        self.depth = self.depth.saturating_sub(1);
                        self.pending.push(byte);
                    }
                    b',' if self.depth == 0 => {
                        self.after_comma = true;
                        outcome = Some(Self::finish_element(std::mem::take(&mut self.pending), false));
                        break;
                    }
                    _ => self.pending.push(byte),
                }
            }

            self.reader.consume(consumed);

            if trailing_comma {
                return Err(malformed("trailing comma in JSON array"));
            }
            if let Some(element) = outcome {
                if element.is_none() {
                    self.ensure_exhausted().await?;
                }
                return Ok(element);
            }
        }
    }

    /// Fail on anything but whitespace after the closing bracket
    async fn ensure_exhausted(&mut self) -> Result<()> {
        loop {
            let buffer = self.reader.fill_buf().await?;
            if buffer.is_empty() {
                return Ok(());
            }
            if !buffer.iter().all(u8::is_ascii_whitespace) {
                return Err(malformed("trailing characters after JSON array"));
            }
            let len = buffer.len();
            self.reader.consume(len);
        }
    }

    /// Hand out the buffered element
    ///
    /// At the closing bracket an all-whitespace buffer means the array ended
    /// (or was empty). Before a comma it is an empty element, which is passed
    /// on so decoding reports it.
    fn finish_element(element: Vec<u8>, closing: bool) -> Option<Vec<u8>> {
        if closing && element.iter().all(u8::is_ascii_whitespace) {
            None
        } else {
            Some(element)
        }
    }
}
