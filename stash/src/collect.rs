use thiserror::Error;
use url::Url;

use crate::extract;
use crate::fetch::{FetchError, PageFetcher};
use crate::normalize;
use crate::page;
use crate::record::RawItem;
use crate::store::{CollectionStore, StoreError};

/// One validated collection invocation: where to fetch from and which genre
/// label to stamp on the extracted records.
#[derive(Debug, Clone)]
pub struct ScrapeRequest {
    pub url: String,
    pub genre: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrapeOutcome {
    /// Items found on the page.
    pub scraped: usize,
    /// Records the merge actually added to the collection.
    pub added: usize,
}

#[derive(Debug, Error)]
pub enum CollectError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Run one full collection pass: validate, fetch, parse, extract, normalize,
/// merge, persist. Validation and fetch failures abort before the merge, so
/// a failed invocation never modifies the store.
pub fn collect<F: PageFetcher>(
    store: &CollectionStore,
    fetcher: &mut F,
    request: &ScrapeRequest,
) -> Result<ScrapeOutcome, CollectError> {
    validate(request)?;
    let html = fetcher.fetch_page(&request.url)?;
    let items = page::parse_search_page(&html);
    ingest(store, &items, &request.genre)
}

/// Ingest pre-fragmented items (e.g. a JSONL handoff from an external
/// fetcher process) through the same extract-normalize-merge pipeline.
pub fn collect_items(
    store: &CollectionStore,
    items: &[RawItem],
    genre: &str,
) -> Result<ScrapeOutcome, CollectError> {
    if genre.trim().is_empty() {
        return Err(CollectError::InvalidRequest("genre must not be empty".into()));
    }
    ingest(store, items, genre)
}

fn ingest(
    store: &CollectionStore,
    items: &[RawItem],
    genre: &str,
) -> Result<ScrapeOutcome, CollectError> {
    let batch = normalize::normalize_batch(&extract::extract_batch(items, genre));
    let added = store.merge(&batch)?;
    tracing::info!(genre, scraped = items.len(), added, "collection pass complete");
    Ok(ScrapeOutcome { scraped: items.len(), added })
}

fn validate(request: &ScrapeRequest) -> Result<(), CollectError> {
    if request.url.trim().is_empty() {
        return Err(CollectError::InvalidRequest("url must not be empty".into()));
    }
    if request.genre.trim().is_empty() {
        return Err(CollectError::InvalidRequest("genre must not be empty".into()));
    }
    let url = Url::parse(&request.url)
        .map_err(|e| CollectError::InvalidRequest(format!("unparseable url: {e}")))?;
    let on_imdb = url
        .host_str()
        .map(|h| h == "imdb.com" || h.ends_with(".imdb.com"))
        .unwrap_or(false);
    if !on_imdb || !url.path().contains("/search/") {
        return Err(CollectError::InvalidRequest(
            "expected an imdb.com search url".into(),
        ));
    }
    Ok(())
}
