//! Identity keyed, insertion ordered collection of discovered networks.
//!
//! A network keeps the position it was first seen at for as long as the
//! collection lives, so rows already on screen never move. Later observations
//! of the same identity refresh its fields in place (see
//! [`NetworkRecord::refresh_from`]).

use std::collections::HashMap;

use airmap_common::network::record::NetworkRecord;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeStats {
    pub added: usize,
    pub refreshed: usize,
}

impl MergeStats {
    pub fn changed(&self) -> bool {
        self.added + self.refreshed > 0
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NetworkCollection {
    records: Vec<NetworkRecord>,
    index: HashMap<String, usize>,
}

impl NetworkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds `incoming` into the collection.
    pub fn merge<I>(&mut self, incoming: I) -> MergeStats
    where
        I: IntoIterator<Item = NetworkRecord>,
    {
        let mut stats = MergeStats::default();

        for record in incoming {
            match self.index.get(&record.identity) {
                Some(&pos) => {
                    if self.records[pos].refresh_from(record) {
                        stats.refreshed += 1;
                    }
                }
                None => {
                    self.index.insert(record.identity.clone(), self.records.len());
                    self.records.push(record);
                    stats.added += 1;
                }
            }
        }

        stats
    }

    pub fn get(&self, identity: &str) -> Option<&NetworkRecord> {
        self.index.get(identity).map(|&pos| &self.records[pos])
    }

    pub fn records(&self) -> &[NetworkRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

impl FromIterator<NetworkRecord> for NetworkCollection {
    fn from_iter<T: IntoIterator<Item = NetworkRecord>>(iter: T) -> Self {
        let mut collection = NetworkCollection::new();
        collection.merge(iter);
        collection
    }
}

/// Returns `existing` with `incoming` merged in, leaving `existing` untouched.
pub fn merge<I>(existing: &NetworkCollection, incoming: I) -> NetworkCollection
where
    I: IntoIterator<Item = NetworkRecord>,
{
    let mut merged = existing.clone();
    merged.merge(incoming);
    merged
}
