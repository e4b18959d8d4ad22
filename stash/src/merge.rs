use std::collections::HashSet;

use crate::record::NormalizedRecord;

/// Titles currently taken in a collection. Records without a title never
/// enter the key set.
pub fn title_set(records: &[NormalizedRecord]) -> HashSet<String> {
    records.iter().filter_map(|r| r.title.clone()).collect()
}

/// Pick the incoming records whose title is not already taken. The key set
/// is advanced as records are selected, so a title repeated within one batch
/// is kept only at its first occurrence. Untitled records always pass.
pub fn select_new(
    existing_titles: &HashSet<String>,
    incoming: &[NormalizedRecord],
) -> Vec<NormalizedRecord> {
    let mut taken = existing_titles.clone();
    let mut selected = Vec::new();
    for record in incoming {
        match &record.title {
            Some(title) => {
                if taken.insert(title.clone()) {
                    selected.push(record.clone());
                }
            }
            None => selected.push(record.clone()),
        }
    }
    selected
}

/// Append the non-duplicate part of `incoming` to `existing`, preserving
/// incoming order, and return how many records were actually added. Existing
/// records are never updated or removed, even when an incoming record
/// carries different field values for the same title.
pub fn merge(existing: &mut Vec<NormalizedRecord>, incoming: &[NormalizedRecord]) -> usize {
    let selected = select_new(&title_set(existing), incoming);
    let added = selected.len();
    existing.extend(selected);
    tracing::debug!(incoming = incoming.len(), added, total = existing.len(), "merged batch");
    added
}
