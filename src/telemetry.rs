//! Diagnostic logging and structured telemetry events.
//!
//! The terminal client owns stdout and stderr while it runs, so tracing output
//! goes to a log file when one is configured and is discarded otherwise.
//! Review requests additionally emit [`TelemetryEvent`]s through a
//! [`TelemetrySink`] so tests can observe traffic without scraping logs, and
//! so `--telemetry-file` can capture it as JSON lines.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

use crate::error::ReviewError;

/// Environment variable holding the tracing filter directives.
pub const LOG_FILTER_ENV: &str = "REVIEWDECK_LOG";
const DEFAULT_FILTER: &str = "reviewdeck=info";

/// Installs the global tracing subscriber.
///
/// Output is appended to `log_file` when given. Without a log file events are
/// filtered but written nowhere, keeping the terminal free for the UI.
///
/// # Errors
///
/// Returns [`ReviewError::Io`] when the log file cannot be opened and
/// [`ReviewError::Configuration`] when a subscriber is already installed.
pub fn init_tracing(log_file: Option<&Path>) -> Result<(), ReviewError> {
    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|error| ReviewError::Io {
                    message: format!("failed to open log file {}: {error}", path.display()),
                })?;
            registry
                .with(
                    fmt::layer()
                        .with_writer(Mutex::new(file))
                        .with_ansi(false)
                        .with_target(true)
                        .with_line_number(true),
                )
                .try_init()
        }
        None => registry
            .with(fmt::layer().with_writer(io::sink))
            .try_init(),
    };

    installed.map_err(|error| ReviewError::Configuration {
        message: format!("failed to install tracing subscriber: {error}"),
    })?;

    tracing::info!("reviewdeck {} starting", env!("CARGO_PKG_VERSION"));
    Ok(())
}

/// Which endpoint a review request targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// `bpr_filter_reviews`.
    Filter,
    /// `bpr_load_more_reviews`.
    LoadMore,
}

/// A structured telemetry event emitted by reviewdeck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    /// A review request was sent.
    ReviewsRequested {
        /// Endpoint targeted.
        kind: RequestKind,
        /// Selected ratings as a comma list.
        ratings: String,
        /// Offset of the first requested review.
        offset: u64,
    },
    /// A review request succeeded.
    ReviewsReceived {
        /// Endpoint targeted.
        kind: RequestKind,
        /// Number of cards decoded from the response.
        cards: u64,
        /// Server's "has more" flag.
        has_more: bool,
    },
    /// A review request failed.
    ReviewsRequestFailed {
        /// Endpoint targeted.
        kind: RequestKind,
        /// Failure description.
        message: String,
    },
}

/// A sink that can record telemetry events.
pub trait TelemetrySink: Send + Sync {
    /// Records a telemetry event.
    fn record(&self, event: TelemetryEvent);
}

/// Telemetry sink that drops all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTelemetrySink;

impl TelemetrySink for NoopTelemetrySink {
    fn record(&self, _event: TelemetryEvent) {}
}

/// Appends telemetry events to a file as JSON lines (JSONL).
///
/// The terminal UI owns stderr, so events go to a file instead.
#[derive(Debug)]
pub struct JsonlTelemetrySink {
    file: Mutex<File>,
}

impl JsonlTelemetrySink {
    /// Opens `path` for appending, creating it when missing.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError::Io`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, ReviewError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|error| ReviewError::Io {
                message: format!("failed to open telemetry file {}: {error}", path.display()),
            })?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl TelemetrySink for JsonlTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        let Ok(serialised) = serde_json::to_string(&event) else {
            return;
        };
        let Ok(mut file) = self.file.lock() else {
            return;
        };
        if let Err(error) = writeln!(file, "{serialised}") {
            tracing::debug!("failed to write telemetry event: {error}");
        }
    }
}

/// Forwards telemetry events to the tracing subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingTelemetrySink;

impl TelemetrySink for TracingTelemetrySink {
    fn record(&self, event: TelemetryEvent) {
        match event {
            TelemetryEvent::ReviewsRequested {
                kind,
                ratings,
                offset,
            } => tracing::debug!(?kind, %ratings, offset, "reviews requested"),
            TelemetryEvent::ReviewsReceived {
                kind,
                cards,
                has_more,
            } => tracing::debug!(?kind, cards, has_more, "reviews received"),
            TelemetryEvent::ReviewsRequestFailed { kind, message } => {
                tracing::warn!(?kind, %message, "review request failed");
            }
        }
    }
}
