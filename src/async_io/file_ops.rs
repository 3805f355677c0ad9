//! Async operations for downloaded bulk archives
//!
//! Archives are written into a private temporary directory, the single JSON
//! entry is extracted next to it and then streamed through the record
//! decoder. The directory is removed when the owning stream is dropped.

use std::path::{Path, PathBuf};
use std::time::Instant;

use async_stream::try_stream;
use futures::{Stream, StreamExt, pin_mut};
use serde::de::DeserializeOwned;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

use crate::async_io::decoder::decode_records;
use crate::error::Result;
use crate::transport::{Transport, cancellable, get_with_cancel};
use crate::utils::{log_operation_complete, log_operation_start, log_warning, redact_url};

const TEMP_DIR_PREFIX: &str = "dawa-download-";
const ARCHIVE_FILE_NAME: &str = "download.zip";
const EXTRACT_DIR_NAME: &str = "extracted";

/// Private, uniquely named working directory for one bulk download
///
/// Deleted recursively on drop.
#[derive(Debug)]
pub struct DownloadWorkspace {
    dir: tempfile::TempDir,
}

impl DownloadWorkspace {
    /// Create a workspace under `parent`, or the system temp dir
    pub fn create(parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_DIR_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        log::debug!("Created download workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    /// Root of the workspace
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Where the downloaded archive is stored
    #[must_use]
    pub fn archive_path(&self) -> PathBuf {
        self.path().join(ARCHIVE_FILE_NAME)
    }

    /// Where archive entries are extracted to
    #[must_use]
    pub fn extract_dir(&self) -> PathBuf {
        self.path().join(EXTRACT_DIR_NAME)
    }
}

/// Download a body to `path`, chunk by chunk
///
/// # Returns
/// Number of bytes written
pub async fn download_to_file<T: Transport + ?Sized>(
    transport: &T,
    url: &str,
    path: &Path,
    cancel: &CancellationToken,
) -> Result<u64> {
    let mut body = get_with_cancel(transport, url, cancel).await?;
    let mut file = File::create(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create file {}: {}", path.display(), e))?;

    let mut written = 0u64;
    while let Some(chunk) = cancellable(cancel, body.next()).await? {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;

    log::debug!("Downloaded {written} bytes to {}", path.display());
    Ok(written)
}

/// Extract the JSON entry of a downloaded archive into `target_dir`
///
/// Runs on the blocking pool. The first `.json` entry wins; further ones
/// are ignored with a warning.
///
/// # Returns
/// Path of the extracted file
pub async fn extract_single_json(archive_path: PathBuf, target_dir: PathBuf) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || extract_single_json_blocking(&archive_path, &target_dir))
        .await
        .map_err(|e| anyhow::anyhow!("Task join error: {e}"))?
}

fn extract_single_json_blocking(archive_path: &Path, target_dir: &Path) -> Result<PathBuf> {
    let file = std::fs::File::open(archive_path)
        .map_err(|e| anyhow::anyhow!("Failed to open archive {}: {}", archive_path.display(), e))?;
    let mut archive = zip::ZipArchive::new(std::io::BufReader::new(file))?;

    let json_entries: Vec<usize> = (0..archive.len())
        .filter(|&index| {
            archive.by_index(index).is_ok_and(|entry| {
                !entry.is_dir() && entry.name().to_ascii_lowercase().ends_with(".json")
            })
        })
        .collect();

    let Some(&index) = json_entries.first() else {
        return Err(crate::error::DawaError::FileNotFound(format!(
            "no JSON entry in archive {}",
            archive_path.display()
        )));
    };
    if json_entries.len() > 1 {
        log_warning(
            "Archive holds more than one JSON entry, using the first",
            Some(&archive_path.display().to_string()),
        );
    }

    let mut entry = archive.by_index(index)?;
    // Only the file name is kept so entry paths can never escape the target dir
    let file_name = Path::new(entry.name())
        .file_name()
        .map_or_else(|| "data.json".into(), std::ffi::OsStr::to_os_string);

    std::fs::create_dir_all(target_dir)?;
    let target = target_dir.join(file_name);
    let mut output = std::fs::File::create(&target)?;
    std::io::copy(&mut entry, &mut output)?;

    Ok(target)
}

/// Open an extracted file for buffered async reading
pub async fn open_json_file(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open file {}: {}", path.display(), e))?;
    Ok(BufReader::new(file))
}

/// Download a zipped JSON file and stream its records
///
/// The download workspace lives inside the stream, so it is removed when
/// the stream completes, fails or is dropped early.
pub fn stream_archive_records<'a, T, Tr>(
    transport: &'a Tr,
    url: String,
    temp_parent: Option<PathBuf>,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<T>> + Send + 'a
where
    T: DeserializeOwned + Send + 'static,
    Tr: Transport + ?Sized,
{
    try_stream! {
        let started = Instant::now();
        let workspace = DownloadWorkspace::create(temp_parent.as_deref())?;

        log_operation_start("Downloading archive", &url);
        download_to_file(transport, &url, &workspace.archive_path(), &cancel).await?;

        let json_path = extract_single_json(workspace.archive_path(), workspace.extract_dir()).await?;
        let reader = open_json_file(&json_path).await?;

        let records = decode_records::<T, _>(reader, cancel.clone(), json_path.display().to_string());
        pin_mut!(records);

        let mut count = 0usize;
        while let Some(record) = records.next().await {
            count += 1;
            yield record?;
        }

        log_operation_complete("streamed", &redact_url(&url), count, Some(started.elapsed()));
        drop(workspace);
    }
}
