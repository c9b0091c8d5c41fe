//! Append-only event log.
//!
//! One [`EventRecord`] per accepted operation, in acceptance order. The log
//! is an observability sink: appending never fails, and external
//! [`EventSink`] subscribers that fail are logged and skipped.

use chrono::{DateTime, Utc};
use granthub_types::{EventRecord, LedgerEvent, Result};

/// External subscriber notified after each append.
pub trait EventSink: Send {
    fn publish(&mut self, record: &EventRecord) -> Result<()>;
}

/// In-memory append-only log with optional subscribers.
#[derive(Default)]
pub struct EventLog {
    records: Vec<EventRecord>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber. It only sees records appended afterwards.
    pub fn subscribe(&mut self, sink: Box<dyn EventSink>) {
        self.sinks.push(sink);
    }

    /// Append an event and fan it out to subscribers. Returns its sequence.
    pub fn append(&mut self, event: LedgerEvent, at: DateTime<Utc>) -> u64 {
        let sequence = self.records.len() as u64;
        let record = EventRecord {
            sequence,
            recorded_at: at,
            event,
        };

        tracing::info!(
            seq = sequence,
            kind = record.event.kind(),
            actor = %record.event.actor(),
            amount = %record.event.amount(),
            "Ledger event"
        );

        for sink in &mut self.sinks {
            if let Err(err) = sink.publish(&record) {
                tracing::warn!(seq = sequence, error = %err, "Event sink failed; continuing");
            }
        }

        self.records.push(record);
        sequence
    }

    #[must_use]
    pub fn records(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records with `sequence >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[EventRecord] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.records.len());
        &self.records[start..]
    }

    #[must_use]
    pub fn last(&self) -> Option<&EventRecord> {
        self.records.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl std::fmt::Debug for EventLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("records", &self.records.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}
