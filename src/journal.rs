//! Structured event journal
//!
//! The operator-facing trail: one fixed-format line per event, severity
//! filtered. Line format (column widths are part of the contract — downstream
//! tooling splits on them):
//!
//! ```text
//! 2025-07-15T14:23:01.001Z [INFO ] [TRACKING  ] EVT_TRACK_NEW       src_id=1 ...
//! ```
//!
//! - UTC timestamp, ISO-8601, millisecond precision, trailing `Z`
//! - severity padded to 5 characters inside brackets
//! - category padded to 10 characters inside brackets
//! - event name padded/truncated to exactly 20 characters
//!
//! The journal is handed around as `Arc<EventJournal>`; one mutex serializes
//! filter-check and write so concurrent callers emit whole lines.

use crate::protocol::{EventCategory, Severity};
use chrono::Utc;
use parking_lot::Mutex;
use std::io::Write;

struct Inner {
    level: Severity,
    sink: Box<dyn Write + Send>,
}

/// Severity-filtered fixed-format line emitter
pub struct EventJournal {
    inner: Mutex<Inner>,
}

impl EventJournal {
    /// Create a journal writing to stdout at INFO level
    pub fn new() -> Self {
        Self::with_sink(Box::new(std::io::stdout()))
    }

    /// Create a journal writing to an arbitrary sink at INFO level
    pub fn with_sink(sink: Box<dyn Write + Send>) -> Self {
        EventJournal {
            inner: Mutex::new(Inner {
                level: Severity::Info,
                sink,
            }),
        }
    }

    /// Replace the output sink
    pub fn set_sink(&self, sink: Box<dyn Write + Send>) {
        self.inner.lock().sink = sink;
    }

    pub fn set_level(&self, level: Severity) {
        self.inner.lock().level = level;
    }

    pub fn level(&self) -> Severity {
        self.inner.lock().level
    }

    /// Emit one journal line if `sev` passes the level filter.
    ///
    /// Write failures are swallowed: the journal is an observability surface
    /// and must never take the ingest path down.
    pub fn log(&self, sev: Severity, cat: EventCategory, event_name: &str, detail: &str) {
        let mut inner = self.inner.lock();
        if sev < inner.level {
            return;
        }

        let ts = Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        let _ = writeln!(
            inner.sink,
            "{} [{}] [{}] {:<20.20}{}",
            ts,
            sev.padded(),
            cat.padded(),
            event_name,
            detail
        );
    }
}

impl Default for EventJournal {
    fn default() -> Self {
        Self::new()
    }
}
