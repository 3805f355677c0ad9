use std::io::{self, Cursor, Write};
use std::sync::{Arc, Mutex, Once};

use bytes::Bytes;
use dawa_address::transport::{ByteStream, Transport, TransportFuture};
use dawa_address::{CancellationToken, DawaError};

/// Size of the chunks a mocked body is split into, to exercise incremental decoding
const BODY_CHUNK_SIZE: usize = 7;

static LOGGING: Once = Once::new();

/// Install `env_logger` once for the test binary
pub fn init_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Canned response served by [`MockTransport`]
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl MockResponse {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self::ok(value.to_string())
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
        }
    }
}

type Handler = Box<dyn Fn(&str) -> MockResponse + Send + Sync>;

/// In-memory transport that records every requested URL
pub struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new(handler: impl Fn(&str) -> MockResponse + Send + Sync + 'static) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// URLs requested so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

impl Transport for MockTransport {
    fn get<'a>(&'a self, url: &'a str, cancel: &'a CancellationToken) -> TransportFuture<'a> {
        Box::pin(async move {
            if cancel.is_cancelled() {
                return Err(DawaError::Cancelled);
            }
            self.requests.lock().unwrap().push(url.to_string());

            let response = (self.handler)(url);
            if !(200..300).contains(&response.status) {
                return Err(DawaError::HttpStatus {
                    url: url.to_string(),
                    status: response.status,
                });
            }

            let chunks: Vec<io::Result<Bytes>> = response
                .body
                .chunks(BODY_CHUNK_SIZE)
                .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
                .collect();
            Ok(Box::pin(futures::stream::iter(chunks)) as ByteStream)
        })
    }
}

/// Value of a query parameter
pub fn query_param<'a>(url: &'a str, name: &str) -> Option<&'a str> {
    let (_, query) = url.split_once('?')?;
    query.split('&').find_map(|pair| match pair.split_once('=') {
        Some((key, value)) if key == name => Some(value),
        _ => None,
    })
}

/// Deterministic UUID for fixture number `n`
pub fn fixture_id(kind: u16, n: usize) -> String {
    format!("00000000-0000-4000-{kind:04}-{n:012}")
}

/// ZIP archive holding one file
pub fn zip_archive(file_name: &str, content: &str) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    writer
        .start_file(file_name, zip::write::FileOptions::default())
        .unwrap();
    writer.write_all(content.as_bytes()).unwrap();
    writer.finish().unwrap().into_inner()
}
