//! Storage seam between the ledger logic and the host's key-value store

use crate::error::{StateError, StateResult};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::ops::Bound;

/// A raw record: key and serialized value
pub type KeyValue = (String, Vec<u8>);

/// Lazy, finite sequence of records produced by a prefix scan.
///
/// Dropping the iterator releases the underlying cursor.
pub type StateIter<'a> = Box<dyn Iterator<Item = StateResult<KeyValue>> + 'a>;

/// Ordered key-value store holding the world state
pub trait StateStore {
    /// Read a value, `None` if the key is absent
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>>;

    /// Scan every record whose key starts with `prefix`, in key order
    fn scan_prefix(&self, prefix: &str) -> StateResult<StateIter<'_>>;

    /// Apply a batch of writes atomically: either all land or none do.
    ///
    /// Fails with `StateError::Conflict`, writing nothing, when a value in
    /// the batch's read set changed after it was read.
    fn commit(&mut self, batch: WriteBatch) -> StateResult<()>;

    /// Write a single value
    fn put(&mut self, key: impl Into<String>, value: Vec<u8>) -> StateResult<()>
    where
        Self: Sized,
    {
        let mut batch = WriteBatch::new();
        batch.put(key, value);
        self.commit(batch)
    }
}

/// Values a transaction observed in the store.
///
/// Only the first observation of a key or range is kept: that is the value
/// the transaction's writes were computed from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadSet {
    keys: BTreeMap<String, Option<Vec<u8>>>,
    ranges: BTreeMap<String, Vec<KeyValue>>,
}

impl ReadSet {
    pub fn record_key(&mut self, key: &str, value: Option<&Vec<u8>>) {
        self.keys
            .entry(key.to_string())
            .or_insert_with(|| value.cloned());
    }

    pub fn record_range(&mut self, prefix: &str, records: &[KeyValue]) {
        self.ranges
            .entry(prefix.to_string())
            .or_insert_with(|| records.to_vec());
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.ranges.is_empty()
    }

    /// Check every observation against the current contents of `store`
    pub fn validate<S: StateStore + ?Sized>(&self, store: &S) -> StateResult<()> {
        for (key, seen) in &self.keys {
            if store.get(key)? != *seen {
                return Err(StateError::Conflict(format!("{:?}", key)));
            }
        }
        for (prefix, seen) in &self.ranges {
            let current = store.scan_prefix(prefix)?.collect::<StateResult<Vec<_>>>()?;
            if current != *seen {
                return Err(StateError::Conflict(format!("range {:?}", prefix)));
            }
        }
        Ok(())
    }
}

/// Ordered set of pending writes, with the reads they depend on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteBatch {
    writes: BTreeMap<String, Vec<u8>>,
    reads: ReadSet,
}

impl WriteBatch {
    /// Create an empty batch
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the reads the writes were computed from
    pub fn with_reads(mut self, reads: ReadSet) -> Self {
        self.reads = reads;
        self
    }

    pub fn reads(&self) -> &ReadSet {
        &self.reads
    }

    /// Stage a write; a later write to the same key replaces the earlier one
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.insert(key.into(), value);
    }

    /// Look up a staged write
    pub fn get(&self, key: &str) -> Option<&Vec<u8>> {
        self.writes.get(key)
    }

    /// Staged writes under `prefix`, in key order
    pub fn with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = (&'a String, &'a Vec<u8>)> + 'a {
        self.writes
            .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix))
    }

    /// No writes staged
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }
}

impl IntoIterator for WriteBatch {
    type Item = (String, Vec<u8>);
    type IntoIter = btree_map::IntoIter<String, Vec<u8>>;

    fn into_iter(self) -> Self::IntoIter {
        self.writes.into_iter()
    }
}
