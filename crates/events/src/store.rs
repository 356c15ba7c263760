//! JSONL event log writer
//!
//! One file per UTC day, named `YYYY-MM-DD.jsonl`. The day is taken from the
//! envelope timestamp, so events land in the file of the transaction that
//! produced them. Every line is flushed before `append` returns.

use crate::error::EventError;
use crate::event::EventEnvelope;
use crate::sink::EventSink;
use chrono::NaiveDate;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

struct DayFile {
    day: NaiveDate,
    writer: BufWriter<File>,
}

/// Append-only event log
pub struct JsonlEventStore {
    dir: PathBuf,
    open: Option<DayFile>,
}

impl JsonlEventStore {
    /// Open a log rooted at `dir`, creating the directory if needed
    pub fn new(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            open: None,
        })
    }

    pub fn append(&mut self, envelope: &EventEnvelope) -> Result<(), EventError> {
        let writer = self.writer_for(envelope.timestamp.date_naive())?;
        serde_json::to_writer(&mut *writer, envelope)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    fn writer_for(&mut self, day: NaiveDate) -> Result<&mut BufWriter<File>, EventError> {
        let current = match self.open.take() {
            Some(file) if file.day == day => file,
            previous => {
                if let Some(mut stale) = previous {
                    stale.writer.flush()?;
                }
                let path = self.file_path(day);
                let file = OpenOptions::new().create(true).append(true).open(&path)?;
                debug!(path = %path.display(), "Opened event log file");
                DayFile {
                    day,
                    writer: BufWriter::new(file),
                }
            }
        };
        Ok(&mut self.open.insert(current).writer)
    }

    /// File receiving the events of `day`
    pub fn file_path(&self, day: NaiveDate) -> PathBuf {
        self.dir.join(format!("{}.jsonl", day.format("%Y-%m-%d")))
    }

    /// Flush and release the open file
    pub fn close(&mut self) -> Result<(), EventError> {
        if let Some(mut file) = self.open.take() {
            file.writer.flush()?;
        }
        Ok(())
    }
}

impl EventSink for JsonlEventStore {
    fn emit(&mut self, envelope: &EventEnvelope) -> Result<(), EventError> {
        self.append(envelope)
    }
}

impl Drop for JsonlEventStore {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
