use std::fs;

use tempfile::tempdir;

use stash::collect::{collect, collect_items, CollectError, ScrapeRequest};
use stash::fetch::{FetchError, FileFetcher, PageFetcher};
use stash::record::RawItem;
use stash::store::CollectionStore;

const SEARCH_URL: &str = "https://www.imdb.com/search/title/?genres=action";

const PAGE: &str = r#"
    <html><body><ul>
      <li class="ipc-metadata-list-summary-item__c">
        <h3 class="ipc-title__text">1. Mad Max: Fury Road</h3>
        <span class="dli-title-metadata-item">2015</span>
        <span class="dli-title-metadata-item">2h</span>
        <span class="dli-title-metadata-item">R</span>
        <span class="ipc-rating-star ipc-rating-star--base" aria-label="Rating: 8.1"></span>
        <span class="ipc-rating-star--voteCount">(1.1M)</span>
      </li>
      <li class="ipc-metadata-list-summary-item__c">
        <h3 class="ipc-title__text">2. The Raid</h3>
        <span class="dli-title-metadata-item">2011</span>
        <span class="dli-title-metadata-item">1h 41m</span>
        <span class="dli-title-metadata-item">R</span>
        <span class="ipc-rating-star ipc-rating-star--base" aria-label="Rating: 7.6"></span>
        <span class="ipc-rating-star--voteCount">(98K)</span>
      </li>
    </ul></body></html>"#;

struct FailingFetcher;

impl PageFetcher for FailingFetcher {
    fn fetch_page(&mut self, url: &str) -> Result<String, FetchError> {
        Err(FetchError::Status { status: 503, url: url.to_string() })
    }
}

#[test]
fn collect_runs_the_full_pipeline_and_is_idempotent() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("page.html");
    fs::write(&page_path, PAGE).unwrap();
    let store = CollectionStore::open(dir.path().join("movies.csv")).unwrap();
    let mut fetcher = FileFetcher::new(&page_path);
    let request = ScrapeRequest { url: SEARCH_URL.into(), genre: "Action".into() };

    let outcome = collect(&store, &mut fetcher, &request).unwrap();
    assert_eq!(outcome.scraped, 2);
    assert_eq!(outcome.added, 2);

    let records = store.snapshot();
    assert_eq!(records[0].title.as_deref(), Some("Mad Max: Fury Road"));
    assert_eq!(records[0].year, Some(2015));
    assert_eq!(records[0].rating, Some(8.1));
    assert_eq!(records[0].vote_count, Some(1_100_000));
    assert_eq!(records[0].duration_min, Some(120));
    assert_eq!(records[0].censor.as_deref(), Some("R"));
    assert_eq!(records[0].genre, "Action");
    assert_eq!(records[1].duration_min, Some(101));

    // Same page again: everything is a duplicate.
    let repeat = collect(&store, &mut fetcher, &request).unwrap();
    assert_eq!(repeat.scraped, 2);
    assert_eq!(repeat.added, 0);
    assert_eq!(store.len(), 2);
}

#[test]
fn collected_records_survive_a_store_reopen() {
    let dir = tempdir().unwrap();
    let page_path = dir.path().join("page.html");
    fs::write(&page_path, PAGE).unwrap();
    let store_path = dir.path().join("movies.csv");
    {
        let store = CollectionStore::open(&store_path).unwrap();
        let mut fetcher = FileFetcher::new(&page_path);
        let request = ScrapeRequest { url: SEARCH_URL.into(), genre: "Action".into() };
        collect(&store, &mut fetcher, &request).unwrap();
    }

    let reopened = CollectionStore::open(&store_path).unwrap();
    let records = reopened.snapshot();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].title.as_deref(), Some("Mad Max: Fury Road"));
    assert_eq!(records[0].vote_count, Some(1_100_000));
    assert_eq!(records[1].duration_min, Some(101));
}

#[test]
fn invalid_request_is_rejected_before_any_fetch() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("movies.csv");
    let store = CollectionStore::open(&store_path).unwrap();
    // A fetcher pointing at a path that does not exist: validation must
    // reject the request before the fetch is ever attempted.
    let mut fetcher = FileFetcher::new(dir.path().join("missing.html"));

    let request = ScrapeRequest {
        url: "https://www.imdb.com/title/tt0468569/".into(),
        genre: "Action".into(),
    };
    let err = collect(&store, &mut fetcher, &request).unwrap_err();
    assert!(matches!(err, CollectError::InvalidRequest(_)));
    assert!(store.is_empty());
    assert!(!store_path.exists());
}

#[test]
fn fetch_failure_leaves_the_store_untouched() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("movies.csv");
    let store = CollectionStore::open(&store_path).unwrap();

    let request = ScrapeRequest { url: SEARCH_URL.into(), genre: "Action".into() };
    let err = collect(&store, &mut FailingFetcher, &request).unwrap_err();
    assert!(matches!(err, CollectError::Fetch(_)));
    assert!(store.is_empty());
    assert!(!store_path.exists());
}

#[test]
fn item_batches_ingest_through_the_same_pipeline() {
    let dir = tempdir().unwrap();
    let store = CollectionStore::open(dir.path().join("movies.csv")).unwrap();
    let items = vec![
        RawItem {
            title: Some("3. Heat".into()),
            metadata: vec!["1995".into(), "2h 50m".into(), "R".into()],
            rating: Some("Rating: 8.3".into()),
            vote_count: Some("(712K)".into()),
        },
        // Rating element missing: the record is still collected.
        RawItem {
            title: Some("4. Ronin".into()),
            metadata: vec!["1998".into(), "2h 2m".into()],
            rating: None,
            vote_count: Some("(89K)".into()),
        },
    ];

    let outcome = collect_items(&store, &items, "Crime").unwrap();
    assert_eq!(outcome.added, 2);
    let records = store.snapshot();
    assert_eq!(records[0].title.as_deref(), Some("Heat"));
    assert_eq!(records[0].duration_min, Some(170));
    assert_eq!(records[1].title.as_deref(), Some("Ronin"));
    assert_eq!(records[1].rating, None);

    let err = collect_items(&store, &items, "").unwrap_err();
    assert!(matches!(err, CollectError::InvalidRequest(_)));
    assert_eq!(store.len(), 2);
}
