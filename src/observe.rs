//! # Observability Module
//!
//! Sink di logging esplicito, creato una volta dal CLI e passato ai componenti
//! (Discoverer, WorkerPool, CompressionJob, ClipCompressor) invece di un logger globale.
//!
//! ## Livelli:
//! - `Discovery` (1): dettaglio per singolo file durante la discovery
//! - `Job` (2): dettaglio per singolo job di compressione
//! - `Lifecycle` (3): milestone del processo
//! - `Fatal` (4): errori fatali e conflitti di configurazione
//!
//! La verbosità `-v` ripetuta abbassa la soglia: `max(4 - n, 1)`.

use std::fmt;
use std::sync::Mutex;
use tracing::level_filters::LevelFilter;
use tracing::{debug, error, info, trace};

/// Severity of an event, from per-file detail up to fatal errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    Discovery = 1,
    Job = 2,
    Lifecycle = 3,
    Fatal = 4,
}

impl LogLevel {
    /// Minimum level shown for a given number of `-v` flags.
    pub fn threshold(verbose_count: u8) -> Self {
        match 4u8.saturating_sub(verbose_count).max(1) {
            1 => Self::Discovery,
            2 => Self::Job,
            3 => Self::Lifecycle,
            _ => Self::Fatal,
        }
    }

    /// The tracing filter that lets this level and everything above it through.
    pub fn level_filter(self) -> LevelFilter {
        match self {
            Self::Discovery => LevelFilter::TRACE,
            Self::Job => LevelFilter::DEBUG,
            Self::Lifecycle => LevelFilter::INFO,
            Self::Fatal => LevelFilter::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Discovery => "discovery",
            Self::Job => "job",
            Self::Lifecycle => "lifecycle",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Destination for leveled log events.
pub trait EventSink: Send + Sync {
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards events to `tracing`, so filtering and formatting stay with the subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Discovery => trace!(target: "compress_clips", "{}", message),
            LogLevel::Job => debug!(target: "compress_clips", "{}", message),
            LogLevel::Lifecycle => info!(target: "compress_clips", "{}", message),
            LogLevel::Fatal => error!(target: "compress_clips", "{}", message),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<(LogLevel, String)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded events, in arrival order.
    pub fn events(&self) -> Vec<(LogLevel, String)> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message)
            .collect()
    }
}

impl EventSink for MemorySink {
    fn log(&self, level: LogLevel, message: &str) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push((level, message.to_string()));
    }
}
