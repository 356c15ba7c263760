//! JSONL event reader
//!
//! Files are read in name order, which is date order for `YYYY-MM-DD.jsonl`.
//! Blank lines are skipped; any other unparsable line is an error carrying
//! its file and 1-based line number.

use crate::error::EventError;
use crate::event::EventEnvelope;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Sequential reader over the daily event files
pub struct EventReader {
    files: Vec<PathBuf>,
}

impl EventReader {
    /// Collect the `.jsonl` files of `dir`; a missing directory reads as empty
    pub fn from_directory(dir: impl AsRef<Path>) -> Result<Self, EventError> {
        let dir = dir.as_ref();
        if !dir.exists() {
            return Ok(Self { files: Vec::new() });
        }

        let mut files = std::fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.path()))
            .collect::<Result<Vec<_>, _>>()?;
        files.retain(|path| path.extension().is_some_and(|ext| ext == "jsonl"));
        files.sort();

        Ok(Self { files })
    }

    /// Read every event, oldest file first
    pub fn read_all(&self) -> Result<Vec<EventEnvelope>, EventError> {
        let mut events = Vec::new();
        self.for_each_line(|file, line, text| {
            let envelope: EventEnvelope = serde_json::from_str(text).map_err(|source| EventError::InvalidLine {
                file: file.display().to_string(),
                line,
                source,
            })?;
            events.push(envelope);
            Ok(())
        })?;
        Ok(events)
    }

    /// Events with the given wire name
    pub fn read_named(&self, name: &str) -> Result<Vec<EventEnvelope>, EventError> {
        let mut events = self.read_all()?;
        events.retain(|envelope| envelope.name() == name);
        Ok(events)
    }

    fn for_each_line(
        &self,
        mut visit: impl FnMut(&Path, usize, &str) -> Result<(), EventError>,
    ) -> Result<(), EventError> {
        for path in &self.files {
            let reader = BufReader::new(File::open(path)?);
            for (index, line) in reader.lines().enumerate() {
                let line = line?;
                let text = line.trim();
                if !text.is_empty() {
                    visit(path, index + 1, text)?;
                }
            }
        }
        Ok(())
    }
}
