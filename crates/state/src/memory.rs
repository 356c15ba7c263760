//! In-memory world state
//!
//! Ordered map backed store, used for tests and embedding.

use crate::error::StateResult;
use crate::store::{StateIter, StateStore, WriteBatch};
use std::collections::BTreeMap;
use std::ops::Bound;

/// In-memory ordered key-value store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl StateStore for MemoryStore {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        Ok(self.data.get(key).cloned())
    }

    fn scan_prefix(&self, prefix: &str) -> StateResult<StateIter<'_>> {
        let prefix = prefix.to_string();
        let iter = self
            .data
            .range::<str, _>((Bound::Included(prefix.as_str()), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(prefix.as_str()))
            .map(|(key, value)| Ok((key.clone(), value.clone())));

        Ok(Box::new(iter))
    }

    fn commit(&mut self, batch: WriteBatch) -> StateResult<()> {
        batch.reads().validate(&*self)?;
        self.data.extend(batch);
        Ok(())
    }
}
