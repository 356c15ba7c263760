//! Write-buffered transaction over a `StateStore`
//!
//! All writes of one ledger operation are staged here and handed to
//! `StateStore::commit` as a single batch. Reads see staged writes first.
//! Every value fetched from the store is recorded in the batch's read set,
//! so the store can refuse the commit if another writer got there first.
//! Dropping the transaction without calling `into_batch` discards it.

use crate::error::{StateError, StateResult};
use crate::store::{KeyValue, ReadSet, StateIter, StateStore, WriteBatch};
use std::cell::RefCell;
use std::collections::BTreeMap;

/// Read-your-writes overlay on top of a store
pub struct Transaction<'a, S: StateStore + ?Sized> {
    store: &'a S,
    writes: WriteBatch,
    reads: RefCell<ReadSet>,
}

impl<'a, S: StateStore + ?Sized> Transaction<'a, S> {
    /// Begin a transaction reading from `store`
    pub fn begin(store: &'a S) -> Self {
        Self {
            store,
            writes: WriteBatch::new(),
            reads: RefCell::new(ReadSet::default()),
        }
    }

    /// Read a value, preferring a staged write
    pub fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        if let Some(value) = self.writes.get(key) {
            return Ok(Some(value.clone()));
        }
        let value = self.store.get(key)?;
        self.reads.borrow_mut().record_key(key, value.as_ref());
        Ok(value)
    }

    pub fn exists(&self, key: &str) -> StateResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    /// Stage a write
    pub fn put(&mut self, key: impl Into<String>, value: Vec<u8>) {
        self.writes.put(key, value);
    }

    /// Scan by prefix, merging staged writes over stored records.
    ///
    /// The stored range is read in full so it can be recorded.
    pub fn scan_prefix(&self, prefix: &str) -> StateResult<StateIter<'_>> {
        let stored = self
            .store
            .scan_prefix(prefix)?
            .collect::<StateResult<Vec<KeyValue>>>()?;
        self.reads.borrow_mut().record_range(prefix, &stored);

        let mut merged: BTreeMap<String, Vec<u8>> = stored.into_iter().collect();
        for (key, value) in self.writes.with_prefix(prefix) {
            merged.insert(key.clone(), value.clone());
        }

        Ok(Box::new(merged.into_iter().map(Ok::<KeyValue, StateError>)))
    }

    /// Finish the transaction, yielding its writes and reads for commit
    pub fn into_batch(self) -> WriteBatch {
        self.writes.with_reads(self.reads.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::{make_key, partial_key};
    use crate::memory::MemoryStore;

    #[test]
    fn test_read_your_writes() {
        let mut store = MemoryStore::new();
        store.put("REQUEST_NO", b"1".to_vec()).unwrap();

        let mut tx = Transaction::begin(&store);
        assert_eq!(tx.get("REQUEST_NO").unwrap(), Some(b"1".to_vec()));

        tx.put("REQUEST_NO", b"2".to_vec());
        assert_eq!(tx.get("REQUEST_NO").unwrap(), Some(b"2".to_vec()));

        let batch = tx.into_batch();
        assert_eq!(batch.len(), 1);
        assert!(!batch.reads().is_empty());
    }

    #[test]
    fn test_drop_discards_writes() {
        let mut store = MemoryStore::new();
        {
            let mut tx = Transaction::begin(&store);
            tx.put("REQUEST_NO", b"5".to_vec());
        }
        assert_eq!(store.get("REQUEST_NO").unwrap(), None);

        let batch = {
            let mut tx = Transaction::begin(&store);
            tx.put("REQUEST_NO", b"5".to_vec());
            tx.into_batch()
        };
        store.commit(batch).unwrap();
        assert_eq!(store.get("REQUEST_NO").unwrap(), Some(b"5".to_vec()));
    }

    #[test]
    fn test_scan_merges_staged_writes() {
        let mut store = MemoryStore::new();
        store
            .put(make_key("MEMBER", &["M1"]).unwrap(), b"old".to_vec())
            .unwrap();
        store
            .put(make_key("MEMBER", &["M3"]).unwrap(), b"three".to_vec())
            .unwrap();

        let mut tx = Transaction::begin(&store);
        tx.put(make_key("MEMBER", &["M1"]).unwrap(), b"new".to_vec());
        tx.put(make_key("MEMBER", &["M2"]).unwrap(), b"two".to_vec());
        tx.put(make_key("TRANSFER", &["TRANSFER_1"]).unwrap(), b"t".to_vec());

        let prefix = partial_key("MEMBER", &[]).unwrap();
        let values: Vec<Vec<u8>> = tx
            .scan_prefix(&prefix)
            .unwrap()
            .map(|kv| kv.unwrap().1)
            .collect();

        assert_eq!(
            values,
            vec![b"new".to_vec(), b"two".to_vec(), b"three".to_vec()]
        );
    }

    #[test]
    fn test_commit_refused_after_concurrent_write() {
        let mut store = MemoryStore::new();
        store.put("REQUEST_NO", b"0".to_vec()).unwrap();

        let stale = {
            let mut tx = Transaction::begin(&store);
            tx.get("REQUEST_NO").unwrap();
            tx.put("REQUEST_NO", b"1".to_vec());
            tx.into_batch()
        };
        store.put("REQUEST_NO", b"1".to_vec()).unwrap();

        let err = store.commit(stale).unwrap_err();
        assert!(err.is_conflict());
        assert_eq!(store.get("REQUEST_NO").unwrap(), Some(b"1".to_vec()));
    }

    #[test]
    fn test_blind_writes_do_not_conflict() {
        let mut store = MemoryStore::new();
        let batch = {
            let mut tx = Transaction::begin(&store);
            tx.put("REQUEST_NO", b"7".to_vec());
            tx.into_batch()
        };
        store.put("REQUEST_NO", b"3".to_vec()).unwrap();
        store.commit(batch).unwrap();
        assert_eq!(store.get("REQUEST_NO").unwrap(), Some(b"7".to_vec()));
    }
}
