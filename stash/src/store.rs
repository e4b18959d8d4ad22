use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::RwLock;
use thiserror::Error;

use crate::merge;
use crate::normalize;
use crate::record::{MovieRecord, NormalizedRecord};

const HEADER: [&str; 7] = ["Title", "Year", "Duration", "Censor", "Rating", "Vote Count", "Genre"];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store io: {0}")]
    Io(#[from] std::io::Error),
    #[error("store csv: {0}")]
    Csv(#[from] csv::Error),
}

/// CSV-backed collection of normalized records. The file is read in full
/// when the store is opened (absent file means an empty collection) and
/// rewritten in full after every merge; the rewrite goes through a temp file
/// plus rename so a crash mid-write never leaves a truncated store behind.
///
/// The lock makes the read-merge-write sequence exclusive: queries take
/// snapshots concurrently, merges do not overlap with anything.
pub struct CollectionStore {
    path: PathBuf,
    records: RwLock<Vec<NormalizedRecord>>,
}

impl CollectionStore {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let mut reader = csv::Reader::from_path(&path)?;
            let mut records = Vec::new();
            for row in reader.deserialize::<MovieRecord>() {
                records.push(normalize::normalize(&row?));
            }
            records
        } else {
            Vec::new()
        };
        tracing::info!(path = %path.display(), records = records.len(), "opened collection store");
        Ok(Self { path, records: RwLock::new(records) })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone of the current collection for read-side queries.
    pub fn snapshot(&self) -> Vec<NormalizedRecord> {
        self.records.read().clone()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Merge a normalized batch into the collection and persist the result.
    /// Holds the write lock across the whole read-merge-write sequence.
    /// Returns the number of records actually added.
    pub fn merge(&self, incoming: &[NormalizedRecord]) -> Result<usize, StoreError> {
        let mut records = self.records.write();
        // Merge into a candidate and persist that first; the in-memory
        // collection advances only once the new file is in place, so a
        // failed write never leaves memory ahead of disk.
        let mut candidate = records.clone();
        let added = merge::merge(&mut candidate, incoming);
        self.persist(&candidate)?;
        *records = candidate;
        tracing::info!(added, total = records.len(), "collection persisted");
        Ok(added)
    }

    fn persist(&self, records: &[NormalizedRecord]) -> Result<(), StoreError> {
        let tmp = self.path.with_extension("csv.tmp");
        {
            let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(&tmp)?;
            // Header goes out unconditionally; an empty collection still
            // persists as a valid store file.
            writer.write_record(HEADER)?;
            for record in records {
                writer.serialize(record.to_raw())?;
            }
            writer.flush()?;
        }
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}
