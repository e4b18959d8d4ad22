use lazy_static::lazy_static;
use regex::Regex;

use crate::record::{MovieRecord, NormalizedRecord};

lazy_static! {
    static ref DURATION_RE: Regex =
        Regex::new(r"^(?:(\d+)\s*h)?\s*(?:(\d+)\s*m)?$").expect("valid regex");
}

/// Coerce one raw record into its typed form. Every coercion failure turns
/// into an absent field; normalization never rejects a record outright.
pub fn normalize(record: &MovieRecord) -> NormalizedRecord {
    NormalizedRecord {
        title: record.title.clone(),
        year: record.year.as_deref().and_then(parse_year),
        rating: record.rating.as_deref().and_then(parse_rating),
        vote_count: record.vote_count.as_deref().and_then(parse_vote_count),
        duration_min: record.duration.as_deref().and_then(parse_duration),
        censor: record.censor.clone(),
        genre: record.genre.clone(),
    }
}

pub fn normalize_batch(batch: &[MovieRecord]) -> Vec<NormalizedRecord> {
    batch.iter().map(normalize).collect()
}

pub fn parse_year(text: &str) -> Option<i32> {
    text.trim().parse().ok()
}

pub fn parse_rating(text: &str) -> Option<f32> {
    text.trim().parse::<f32>().ok().filter(|r| r.is_finite())
}

/// Parse a vote-count label. Surrounding whitespace and parentheses are
/// stripped; a trailing `K`/`M`/`B` applies its decimal scale ("2.5K" is
/// 2500 votes, not 2). Without a scale suffix the remainder must be a plain
/// non-negative integer.
pub fn parse_vote_count(text: &str) -> Option<u64> {
    let cleaned = text.trim().trim_matches(|c| c == '(' || c == ')').trim();
    if cleaned.is_empty() {
        return None;
    }
    let (stem, scale) = if let Some(s) = cleaned.strip_suffix('K') {
        (s, Some(1_000.0))
    } else if let Some(s) = cleaned.strip_suffix('M') {
        (s, Some(1_000_000.0))
    } else if let Some(s) = cleaned.strip_suffix('B') {
        (s, Some(1_000_000_000.0))
    } else {
        (cleaned, None)
    };
    match scale {
        Some(mult) => {
            let value: f64 = stem.trim().parse().ok()?;
            if !value.is_finite() || value < 0.0 {
                return None;
            }
            let scaled = (value * mult).round();
            if scaled > u64::MAX as f64 {
                return None;
            }
            Some(scaled as u64)
        }
        None => stem.parse().ok(),
    }
}

/// Parse a runtime of the form "<H>h <M>m" with either component optional
/// ("2h 15m", "2h", "90m") into total minutes. Anything else, bare numbers
/// included, is malformed and yields `None`.
pub fn parse_duration(text: &str) -> Option<u32> {
    let caps = DURATION_RE.captures(text.trim())?;
    let hours = caps.get(1);
    let minutes = caps.get(2);
    if hours.is_none() && minutes.is_none() {
        return None;
    }
    let hours: u32 = match hours {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    let minutes: u32 = match minutes {
        Some(m) => m.as_str().parse().ok()?,
        None => 0,
    };
    hours.checked_mul(60)?.checked_add(minutes)
}

/// Inverse of `parse_duration` for the persisted form: `format_duration(n)`
/// always parses back to `n`.
pub fn format_duration(total_minutes: u32) -> String {
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if hours > 0 && minutes > 0 {
        format!("{hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h")
    } else {
        format!("{minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_forms_parse_to_minutes() {
        assert_eq!(parse_duration("2h 15m"), Some(135));
        assert_eq!(parse_duration("90m"), Some(90));
        assert_eq!(parse_duration("2h"), Some(120));
        assert_eq!(parse_duration("  1h 1m "), Some(61));
    }

    #[test]
    fn malformed_durations_are_absent() {
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("90"), None);
        assert_eq!(parse_duration("PG-13"), None);
        assert_eq!(parse_duration("2h 15m extra"), None);
    }

    #[test]
    fn duration_rendering_parses_back() {
        for minutes in [0, 45, 60, 135] {
            assert_eq!(parse_duration(&format_duration(minutes)), Some(minutes));
        }
    }

    #[test]
    fn vote_count_strips_wrappers() {
        assert_eq!(parse_vote_count("(1200)"), Some(1200));
        assert_eq!(parse_vote_count("  (45)  "), Some(45));
        assert_eq!(parse_vote_count("873"), Some(873));
    }

    #[test]
    fn vote_count_applies_scale_suffixes() {
        assert_eq!(parse_vote_count("2.5K"), Some(2500));
        assert_eq!(parse_vote_count("(1.2K)"), Some(1200));
        assert_eq!(parse_vote_count("3M"), Some(3_000_000));
        assert_eq!(parse_vote_count("1B"), Some(1_000_000_000));
    }

    #[test]
    fn vote_count_rejects_garbage() {
        assert_eq!(parse_vote_count(""), None);
        assert_eq!(parse_vote_count("abc"), None);
        assert_eq!(parse_vote_count("2.5k"), None); // scale letters are uppercase on the site
        assert_eq!(parse_vote_count("12.5"), None); // fractional votes make no sense unscaled
        assert_eq!(parse_vote_count("1,234"), None);
        assert_eq!(parse_vote_count("K"), None);
    }

    #[test]
    fn year_and_rating_coerce_or_vanish() {
        assert_eq!(parse_year("2024"), Some(2024));
        assert_eq!(parse_year(" 1999 "), Some(1999));
        assert_eq!(parse_year("TBA"), None);
        assert_eq!(parse_rating("8.5"), Some(8.5));
        assert_eq!(parse_rating("9"), Some(9.0));
        assert_eq!(parse_rating("unrated"), None);
        assert_eq!(parse_rating("NaN"), None);
        assert_eq!(parse_rating("inf"), None);
    }

    #[test]
    fn normalize_is_idempotent_over_raw_rendering() {
        let raw = MovieRecord {
            title: Some("Heat".into()),
            year: Some("1995".into()),
            duration: Some("2h 50m".into()),
            censor: Some("R".into()),
            rating: Some("8.3".into()),
            vote_count: Some("(712K)".into()),
            genre: "Crime".into(),
        };
        let once = normalize(&raw);
        let twice = normalize(&once.to_raw());
        assert_eq!(once, twice);
        assert_eq!(once.duration_min, Some(170));
        assert_eq!(once.vote_count, Some(712_000));
    }

    #[test]
    fn idempotence_holds_for_partially_absent_records() {
        let raw = MovieRecord {
            title: Some("Untitled Project".into()),
            duration: Some("90m".into()),
            genre: "Drama".into(),
            ..Default::default()
        };
        let once = normalize(&raw);
        let twice = normalize(&once.to_raw());
        assert_eq!(once, twice);
        assert_eq!(once.year, None);
        assert_eq!(once.duration_min, Some(90));
    }
}
