//! SQLite-backed world state

use crate::error::{StateError, StateResult};
use crate::store::{KeyValue, StateIter, StateStore, WriteBatch};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Rows fetched per round trip of a prefix scan
const SCAN_PAGE_SIZE: usize = 256;

/// How long a commit waits for another process holding the write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable world state in a single SQLite table.
///
/// Keys are stored as BLOBs so ordering is plain byte order, which matches
/// the UTF-8 ordering of the in-memory store. Several processes may share
/// one database file: commits take the write lock up front and re-check the
/// batch's read set under it.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    pub fn open<P: AsRef<Path>>(path: P) -> StateResult<Self> {
        Self::with_connection(Connection::open(path)?)
    }

    /// Create an in-memory store (for testing)
    pub fn in_memory() -> StateResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StateResult<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS world_state (
                key BLOB PRIMARY KEY,
                value BLOB NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }
}

fn decode_key(raw: Vec<u8>) -> StateResult<String> {
    String::from_utf8(raw).map_err(|e| StateError::Corrupt(format!("non UTF-8 key: {}", e)))
}

/// Keyset-paginated cursor over `[lower, upper)`.
///
/// Each page is a fresh query starting after the last key seen, so no
/// statement stays open between calls to `next`.
struct RangeScan<'c> {
    conn: &'c Connection,
    lower: Vec<u8>,
    upper: Vec<u8>,
    last: Option<Vec<u8>>,
    page: std::vec::IntoIter<(Vec<u8>, Vec<u8>)>,
    exhausted: bool,
}

impl<'c> RangeScan<'c> {
    fn new(conn: &'c Connection, prefix: &str) -> Self {
        // 0xFF never occurs in UTF-8, so prefix||0xFF bounds every extension of prefix
        let lower = prefix.as_bytes().to_vec();
        let mut upper = lower.clone();
        upper.push(0xFF);

        Self {
            conn,
            lower,
            upper,
            last: None,
            page: Vec::new().into_iter(),
            exhausted: false,
        }
    }

    fn fetch_page(&mut self) -> StateResult<()> {
        let (sql, start) = match &self.last {
            Some(last) => (
                "SELECT key, value FROM world_state
                 WHERE key > ?1 AND key < ?2 ORDER BY key LIMIT ?3",
                last,
            ),
            None => (
                "SELECT key, value FROM world_state
                 WHERE key >= ?1 AND key < ?2 ORDER BY key LIMIT ?3",
                &self.lower,
            ),
        };

        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params![start, self.upper, SCAN_PAGE_SIZE as i64], |row| {
                Ok((row.get::<_, Vec<u8>>(0)?, row.get::<_, Vec<u8>>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        self.exhausted = rows.len() < SCAN_PAGE_SIZE;
        if let Some((key, _)) = rows.last() {
            self.last = Some(key.clone());
        }
        self.page = rows.into_iter();
        Ok(())
    }
}

impl Iterator for RangeScan<'_> {
    type Item = StateResult<KeyValue>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, value)) = self.page.next() {
                return Some(decode_key(key).map(|key| (key, value)));
            }
            if self.exhausted {
                return None;
            }
            if let Err(e) = self.fetch_page() {
                self.exhausted = true;
                return Some(Err(e));
            }
        }
    }
}

impl StateStore for SqliteStore {
    fn get(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM world_state WHERE key = ?1",
                params![key.as_bytes()],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn scan_prefix(&self, prefix: &str) -> StateResult<StateIter<'_>> {
        Ok(Box::new(RangeScan::new(&self.conn, prefix)))
    }

    fn commit(&mut self, batch: WriteBatch) -> StateResult<()> {
        if batch.is_empty() {
            return Ok(());
        }

        // Dropping `tx` on any error path rolls it back
        let tx = Transaction::new_unchecked(&self.conn, TransactionBehavior::Immediate)?;
        batch.reads().validate(&*self)?;

        debug!(writes = batch.len(), "Committing world state batch");
        {
            let mut stmt =
                tx.prepare("INSERT OR REPLACE INTO world_state (key, value) VALUES (?1, ?2)")?;
            for (key, value) in batch {
                stmt.execute(params![key.as_bytes(), value])?;
            }
        }
        tx.commit()?;
        Ok(())
    }
}
