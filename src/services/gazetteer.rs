//! Gazetteer index keyed by stemmed place names.

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;

use thiserror::Error;

use crate::models::{LocationId, LocationRecord};
use crate::services::normalize::normalize;
use crate::services::stemmer::{stem_key, Stemmer};

/// Errors from loading the gazetteer or building its index.
#[derive(Debug, Error)]
pub enum GazetteerError {
    #[error("Failed to read gazetteer {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed gazetteer file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record #{position} in {path}: {reason}")]
    InvalidRecord {
        path: PathBuf,
        position: usize,
        reason: String,
    },

    #[error("No gazetteer files matching '{prefix}*' in {dir}")]
    NoFiles { dir: PathBuf, prefix: String },

    #[error("Gazetteer is empty")]
    Empty,
}

/// Read-only index from stem key to location records.
///
/// Records are kept in insertion order. Several records may share a key;
/// lookups yield all of them in insertion order. Records whose name has no
/// stem key stay listed but can never be hit by stemmed matching, and a name
/// that normalizes to nothing is not matchable literally either.
#[derive(Debug, Clone)]
pub struct GazetteerIndex {
    records: Vec<LocationRecord>,
    by_key: HashMap<String, Vec<usize>>,
    keys: HashSet<String>,
    by_id: HashMap<LocationId, usize>,
    literal: Vec<usize>,
}

impl GazetteerIndex {
    /// Build the index. Fails when there are no records at all.
    pub fn build(
        records: Vec<LocationRecord>,
        stemmer: &dyn Stemmer,
    ) -> Result<Self, GazetteerError> {
        if records.is_empty() {
            return Err(GazetteerError::Empty);
        }

        let mut by_key: HashMap<String, Vec<usize>> = HashMap::new();
        let mut keys = HashSet::new();
        let mut by_id = HashMap::with_capacity(records.len());
        let mut literal = Vec::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            by_id.entry(record.id).or_insert(position);

            let normalized = normalize(&record.name);
            if !normalized.is_empty() && !record.canonical_name.is_empty() {
                literal.push(position);
            }

            let key = stem_key(stemmer, &normalized);
            if key.is_empty() {
                tracing::debug!(
                    "Location {} ({:?}) has no stem key, skipping stemmed index",
                    record.id,
                    record.name
                );
                continue;
            }
            by_key.entry(key.clone()).or_default().push(position);
            keys.insert(key);
        }

        tracing::debug!(
            records = records.len(),
            keys = keys.len(),
            stemmer = stemmer.stemmer_id(),
            "Built gazetteer index"
        );

        Ok(Self {
            records,
            by_key,
            keys,
            by_id,
            literal,
        })
    }

    /// All records in insertion order.
    pub fn records(&self) -> &[LocationRecord] {
        &self.records
    }

    pub fn keys(&self) -> &HashSet<String> {
        &self.keys
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    /// Records stored under `key`, in insertion order.
    pub fn get(&self, key: &str) -> impl Iterator<Item = &LocationRecord> + '_ {
        self.by_key
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&position| &self.records[position])
    }

    /// Records eligible for literal matching, in insertion order.
    pub fn literal_records(&self) -> impl Iterator<Item = &LocationRecord> + '_ {
        self.literal.iter().map(move |&position| &self.records[position])
    }

    /// First record with the given id.
    pub fn location(&self, id: LocationId) -> Option<&LocationRecord> {
        self.by_id.get(&id).map(|&position| &self.records[position])
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Keys shared by more than one record.
    pub fn ambiguous_keys(&self) -> Vec<(&str, usize)> {
        let mut ambiguous: Vec<(&str, usize)> = self
            .by_key
            .iter()
            .filter(|(_, positions)| positions.len() > 1)
            .map(|(key, positions)| (key.as_str(), positions.len()))
            .collect();
        ambiguous.sort();
        ambiguous
    }

    /// Number of records that never made it into the key views.
    pub fn unkeyed_count(&self) -> usize {
        let keyed: usize = self.by_key.values().map(Vec::len).sum();
        self.records.len() - keyed
    }
}
