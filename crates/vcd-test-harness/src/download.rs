// crates/vcd-test-harness/src/download.rs
// ============================================================================
// Module: Fixture Download
// Description: Streams a remote file to disk over HTTP.
// Purpose: Fetch the suite OVA when it is not already present locally.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! OVA images are large, so the body is streamed straight into the target
//! file instead of being buffered. The file is created only once the server
//! has answered with a success status; a failed transfer removes the partial
//! file.

use std::fs::File;
use std::io::BufWriter;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;
use tracing::debug;

use crate::platform::user_agent;

/// Download failures.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The HTTP client could not be built or the request failed.
    #[error("request to {url} failed: {message}")]
    Request {
        /// Requested URL.
        url: String,
        /// Transport error text.
        message: String,
    },
    /// The server answered with a non-success status.
    #[error("request to {url} returned status {status}")]
    Status {
        /// Requested URL.
        url: String,
        /// HTTP status code.
        status: u16,
    },
    /// The target file could not be written.
    #[error("could not write {path}: {message}")]
    Io {
        /// Target path.
        path: String,
        /// I/O error text.
        message: String,
    },
}

/// Downloads `url` into `path` and returns the number of bytes written.
///
/// # Errors
///
/// Returns [`DownloadError`] when the request fails, the status is not a
/// success, or the file cannot be written.
pub fn download_file(path: &Path, url: &str) -> Result<u64, DownloadError> {
    let request_error = |message: String| DownloadError::Request {
        url: url.to_string(),
        message,
    };
    let io_error = |err: std::io::Error| DownloadError::Io {
        path: path.display().to_string(),
        message: err.to_string(),
    };

    let client = Client::builder()
        .timeout(Option::<Duration>::None)
        .user_agent(user_agent())
        .build()
        .map_err(|err| request_error(err.to_string()))?;
    let mut response = client.get(url).send().map_err(|err| request_error(err.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(DownloadError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    let copied = response
        .copy_to(&mut writer)
        .map_err(|err| request_error(err.to_string()))
        .and_then(|bytes| writer.flush().map(|()| bytes).map_err(io_error));
    match copied {
        Ok(bytes) => {
            debug!(bytes, path = %path.display(), "download complete");
            Ok(bytes)
        }
        Err(err) => {
            drop(writer);
            let _ = std::fs::remove_file(path);
            Err(err)
        }
    }
}
