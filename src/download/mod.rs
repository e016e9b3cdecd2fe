//! arXiv PDF download via the `arxiv-downloader` CLI tool.
//!
//! Downloading is delegated entirely to an external executable: this module
//! builds the PDF URL, spawns the tool with a destination directory, and
//! reports success or failure from the process exit code.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

/// Name of the external download tool on PATH.
const DOWNLOADER_BIN: &str = "arxiv-downloader";

/// Errors that can occur while downloading a PDF.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The tool could not be spawned (missing binary, permissions)
    #[error("Failed to run {DOWNLOADER_BIN}: {0}")]
    Spawn(#[from] std::io::Error),

    /// The tool ran but exited with a non-zero status
    #[error("{DOWNLOADER_BIN} failed: {0}")]
    ToolFailed(String),
}

/// Result type for download operations.
pub type DownloadResult<T> = Result<T, DownloadError>;

/// The PDF URL for an arXiv id.
pub fn arxiv_pdf_url(arxiv_id: &str) -> String {
    format!("https://arxiv.org/pdf/{arxiv_id}")
}

/// Download the PDF for `arxiv_id` into `download_dir`.
///
/// Runs `arxiv-downloader <url> -d <dir>` and waits for it to finish.
/// Success is signaled solely by the tool's exit status; on failure the
/// tool's stderr is folded into the error.
///
/// # Returns
/// The directory the tool was asked to download into.
pub async fn download_arxiv_pdf(
    arxiv_id: &str,
    download_dir: &Path,
) -> DownloadResult<PathBuf> {
    run_downloader(DOWNLOADER_BIN, arxiv_id, download_dir).await
}

async fn run_downloader(
    bin: &str,
    arxiv_id: &str,
    download_dir: &Path,
) -> DownloadResult<PathBuf> {
    let url = arxiv_pdf_url(arxiv_id);
    debug!(arxiv_id, dir = %download_dir.display(), "starting PDF download");

    let output = Command::new(bin)
        .arg(&url)
        .arg("-d")
        .arg(download_dir)
        .output()
        .await?;

    if output.status.success() {
        Ok(download_dir.to_path_buf())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = if stderr.trim().is_empty() {
            format!("exit status {}", output.status)
        } else {
            stderr.trim().to_string()
        };
        warn!(arxiv_id, %detail, "PDF download failed");
        Err(DownloadError::ToolFailed(detail))
    }
}
