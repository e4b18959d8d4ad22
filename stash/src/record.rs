use serde::{Deserialize, Serialize};

use crate::normalize;

/// One search-result entry as handed over by the page fetcher side: the raw
/// text fragments of a single item, nothing parsed yet. Serializes so an
/// external fetcher process can pass batches over as JSON Lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    /// Metadata strip fragments (release year, runtime, certificate). Order
    /// as found on the page; the extractor does not trust it.
    #[serde(default)]
    pub metadata: Vec<String>,
    /// Rating label, e.g. "Rating: 8.5".
    pub rating: Option<String>,
    /// Vote-count label verbatim, e.g. "(1.2K)".
    pub vote_count: Option<String>,
}

/// Extracted fields of one movie, still strings. Also the row shape of the
/// persisted CSV. A missing page element is `None`, never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    #[serde(rename = "Title")]
    pub title: Option<String>,
    #[serde(rename = "Year")]
    pub year: Option<String>,
    #[serde(rename = "Duration")]
    pub duration: Option<String>,
    #[serde(rename = "Censor")]
    pub censor: Option<String>,
    #[serde(rename = "Rating")]
    pub rating: Option<String>,
    #[serde(rename = "Vote Count")]
    pub vote_count: Option<String>,
    #[serde(rename = "Genre")]
    pub genre: String,
}

/// Typed form of a record. Any field that failed coercion is `None`; a
/// genuine zero is always distinguishable from absence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Dedup key within a collection when present. Records without a title
    /// are kept but never participate in deduplication.
    pub title: Option<String>,
    pub year: Option<i32>,
    pub rating: Option<f32>,
    pub vote_count: Option<u64>,
    pub duration_min: Option<u32>,
    pub censor: Option<String>,
    pub genre: String,
}

impl NormalizedRecord {
    /// True when every field the analysis view depends on is present.
    pub fn is_complete(&self) -> bool {
        self.title.is_some()
            && self.year.is_some()
            && self.rating.is_some()
            && self.vote_count.is_some()
            && self.duration_min.is_some()
    }

    /// Render back to the raw row shape. Normalizing the result reproduces
    /// the same typed values, which is what keeps the persisted store
    /// lossless across sessions.
    pub fn to_raw(&self) -> MovieRecord {
        MovieRecord {
            title: self.title.clone(),
            year: self.year.map(|y| y.to_string()),
            duration: self.duration_min.map(normalize::format_duration),
            censor: self.censor.clone(),
            rating: self.rating.map(|r| r.to_string()),
            vote_count: self.vote_count.map(|v| v.to_string()),
            genre: self.genre.clone(),
        }
    }
}
