use lazy_static::lazy_static;
use regex::Regex;

use crate::normalize;
use crate::record::{MovieRecord, RawItem};

lazy_static! {
    // "12. Movie Name" list numbering on result pages.
    static ref RANK_PREFIX_RE: Regex = Regex::new(r"^\d+\.\s*").expect("valid regex");
    // A release year, tolerating the range form series entries carry.
    static ref YEAR_RE: Regex = Regex::new(r"^\d{4}(?:\s*[–-]\s*(?:\d{4})?)?$").expect("valid regex");
}

/// Pull the six target fields out of one raw item. Absent sub-elements
/// resolve to absent fields; nothing in here can fail the item as a whole.
pub fn extract(item: &RawItem, genre: &str) -> MovieRecord {
    let slots = decode_metadata(&item.metadata);
    MovieRecord {
        title: item.title.as_deref().map(strip_rank_prefix),
        year: slots.year,
        duration: slots.runtime,
        censor: slots.certificate,
        rating: item.rating.as_deref().map(strip_rating_label),
        vote_count: item.vote_count.clone(),
        genre: genre.to_string(),
    }
}

pub fn extract_batch(items: &[RawItem], genre: &str) -> Vec<MovieRecord> {
    items.iter().map(|item| extract(item, genre)).collect()
}

#[derive(Default)]
struct MetadataSlots {
    year: Option<String>,
    runtime: Option<String>,
    certificate: Option<String>,
}

/// Assign metadata fragments to semantic slots by shape instead of by
/// position, so a reordered metadata strip cannot land a certificate in the
/// duration column. First matching fragment per slot wins; fragments beyond
/// the three slots are dropped.
fn decode_metadata(fragments: &[String]) -> MetadataSlots {
    let mut slots = MetadataSlots::default();
    for fragment in fragments {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            continue;
        }
        if slots.year.is_none() && YEAR_RE.is_match(fragment) {
            slots.year = Some(fragment.to_string());
        } else if slots.runtime.is_none() && normalize::parse_duration(fragment).is_some() {
            slots.runtime = Some(fragment.to_string());
        } else if slots.certificate.is_none() {
            slots.certificate = Some(fragment.to_string());
        }
    }
    slots
}

fn strip_rank_prefix(title: &str) -> String {
    RANK_PREFIX_RE.replace(title.trim(), "").into_owned()
}

fn strip_rating_label(label: &str) -> String {
    let label = label.trim();
    label.strip_prefix("Rating: ").unwrap_or(label).to_string()
}
