use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use crate::record::NormalizedRecord;

/// Constraints applied conjunctively over the analysis view. An empty genre
/// set matches nothing.
#[derive(Debug, Clone)]
pub struct FilterSpec {
    pub genres: HashSet<String>,
    pub min_rating: f32,
    pub min_votes: u64,
    pub min_duration: u32,
    pub max_duration: u32,
}

impl FilterSpec {
    /// A spec that keeps every record of the given genres.
    pub fn for_genres<I, S>(genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            genres: genres.into_iter().map(Into::into).collect(),
            min_rating: 0.0,
            min_votes: 0,
            min_duration: 0,
            max_duration: u32::MAX,
        }
    }
}

/// The filtered, analysis-ready subset of a collection, in collection order.
/// Every record in here is complete (title, year, rating, votes, duration
/// all present), so the aggregates below never see an absent field. All
/// aggregates recompute from scratch per call; nothing is cached.
#[derive(Debug, Clone)]
pub struct FilteredView {
    records: Vec<NormalizedRecord>,
}

/// Build the analysis view: drop incomplete records, then keep those
/// matching every constraint of the spec.
pub fn run(collection: &[NormalizedRecord], spec: &FilterSpec) -> FilteredView {
    let records: Vec<NormalizedRecord> = collection
        .iter()
        .filter(|r| r.is_complete() && matches(r, spec))
        .cloned()
        .collect();
    tracing::debug!(collection = collection.len(), view = records.len(), "built filtered view");
    FilteredView { records }
}

fn matches(record: &NormalizedRecord, spec: &FilterSpec) -> bool {
    let (Some(rating), Some(votes), Some(duration)) =
        (record.rating, record.vote_count, record.duration_min)
    else {
        return false;
    };
    spec.genres.contains(&record.genre)
        && rating >= spec.min_rating
        && votes >= spec.min_votes
        && duration >= spec.min_duration
        && duration <= spec.max_duration
}

impl FilteredView {
    pub fn records(&self) -> &[NormalizedRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Top `n` by rating, descending. The sort is stable, so ties keep
    /// collection order.
    pub fn top_by_rating(&self, n: usize) -> Vec<&NormalizedRecord> {
        self.top_by(n, |r| r.rating.map(f64::from))
    }

    /// Top `n` by vote count, descending, ties in collection order.
    pub fn top_by_votes(&self, n: usize) -> Vec<&NormalizedRecord> {
        self.top_by(n, |r| r.vote_count.map(|v| v as f64))
    }

    fn top_by<F>(&self, n: usize, key: F) -> Vec<&NormalizedRecord>
    where
        F: Fn(&NormalizedRecord) -> Option<f64>,
    {
        let mut ranked: Vec<&NormalizedRecord> = self.records.iter().collect();
        ranked.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
        ranked.truncate(n);
        ranked
    }

    /// Per-genre record with the maximum rating; the first occurrence in
    /// collection order wins ties. Empty view yields an empty map.
    pub fn top_rated_per_genre(&self) -> BTreeMap<String, &NormalizedRecord> {
        let mut best: BTreeMap<String, &NormalizedRecord> = BTreeMap::new();
        for record in &self.records {
            best.entry(record.genre.clone())
                .and_modify(|current| {
                    if record.rating > current.rating {
                        *current = record;
                    }
                })
                .or_insert(record);
        }
        best
    }

    pub fn votes_per_genre(&self) -> BTreeMap<String, u64> {
        let mut sums: BTreeMap<String, u64> = BTreeMap::new();
        for record in &self.records {
            let votes = record.vote_count.unwrap_or(0);
            *sums.entry(record.genre.clone()).or_insert(0) += votes;
        }
        sums
    }

    pub fn mean_rating_per_genre(&self) -> BTreeMap<String, f64> {
        self.mean_per_genre(|r| r.rating.map(f64::from))
    }

    pub fn mean_duration_per_genre(&self) -> BTreeMap<String, f64> {
        self.mean_per_genre(|r| r.duration_min.map(f64::from))
    }

    fn mean_per_genre<F>(&self, value: F) -> BTreeMap<String, f64>
    where
        F: Fn(&NormalizedRecord) -> Option<f64>,
    {
        let mut acc: BTreeMap<String, (f64, usize)> = BTreeMap::new();
        for record in &self.records {
            if let Some(v) = value(record) {
                let entry = acc.entry(record.genre.clone()).or_insert((0.0, 0));
                entry.0 += v;
                entry.1 += 1;
            }
        }
        acc.into_iter().map(|(g, (sum, n))| (g, sum / n as f64)).collect()
    }

    pub fn count_per_genre(&self) -> BTreeMap<String, usize> {
        let mut counts: BTreeMap<String, usize> = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.genre.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Record with the minimum duration; `None` is the no-data condition of
    /// an empty view. First occurrence wins ties.
    pub fn shortest(&self) -> Option<&NormalizedRecord> {
        self.extreme_by_duration(|candidate, best| candidate < best)
    }

    /// Record with the maximum duration; `None` on an empty view. First
    /// occurrence wins ties.
    pub fn longest(&self) -> Option<&NormalizedRecord> {
        self.extreme_by_duration(|candidate, best| candidate > best)
    }

    fn extreme_by_duration<F>(&self, better: F) -> Option<&NormalizedRecord>
    where
        F: Fn(u32, u32) -> bool,
    {
        let mut result: Option<&NormalizedRecord> = None;
        for record in &self.records {
            let Some(duration) = record.duration_min else { continue };
            match result.and_then(|r| r.duration_min) {
                Some(best) if !better(duration, best) => {}
                _ => result = Some(record),
            }
        }
        result
    }
}
