use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {status} for {url}")]
    Status { status: u16, url: String },
    #[error("read failed: {0}")]
    Io(#[from] std::io::Error),
}

/// The external page-fetching collaborator. Blocking by design: the pipeline
/// is a synchronous request/response loop, and timeout policy belongs to the
/// implementation behind this seam.
pub trait PageFetcher {
    fn fetch_page(&mut self, url: &str) -> Result<String, FetchError>;
}

/// Serves a saved results page from disk regardless of the requested URL.
/// Useful for offline ingestion and for driving the pipeline in tests.
pub struct FileFetcher {
    path: PathBuf,
}

impl FileFetcher {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl PageFetcher for FileFetcher {
    fn fetch_page(&mut self, _url: &str) -> Result<String, FetchError> {
        Ok(std::fs::read_to_string(&self.path)?)
    }
}
