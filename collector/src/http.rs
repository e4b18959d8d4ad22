use std::time::Duration;

use reqwest::blocking::Client;
use stash::fetch::{FetchError, PageFetcher};

/// Blocking HTTP fetcher for live search pages.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout_secs: u64) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(5))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch_page(&mut self, url: &str) -> Result<String, FetchError> {
        let resp = self
            .client
            .get(url)
            .send()
            .map_err(|e| FetchError::Request(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { status: status.as_u16(), url: url.to_string() });
        }
        resp.text().map_err(|e| FetchError::Request(e.to_string()))
    }
}
