//! Event destinations

use crate::error::EventError;
use crate::event::EventEnvelope;
use std::sync::{Arc, Mutex};

/// Destination for committed ledger events
pub trait EventSink: Send {
    /// Deliver one event
    fn emit(&mut self, envelope: &EventEnvelope) -> Result<(), EventError>;
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _envelope: &EventEnvelope) -> Result<(), EventError> {
        Ok(())
    }
}

/// Records events in memory.
///
/// Clones share the same buffer, so a test can keep one handle while the
/// ledger owns another.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<EventEnvelope>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events
    pub fn events(&self) -> Vec<EventEnvelope> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Wire names of the recorded events, in order
    pub fn names(&self) -> Vec<&'static str> {
        self.events().iter().map(EventEnvelope::name).collect()
    }

    pub fn len(&self) -> usize {
        self.events().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn emit(&mut self, envelope: &EventEnvelope) -> Result<(), EventError> {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(envelope.clone());
        Ok(())
    }
}
