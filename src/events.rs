//! Pipeline events
//!
//! Components report what they do through an `EventSink` handed to them at
//! construction. Events are informational only; no decision in the pipeline
//! depends on whether or how they are recorded.

use std::time::Duration;

/// Something observable that happened while serving a query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    /// The mirror registry was read
    DirectoryBuilt { registry: String, mirrors: usize },

    /// The mirror registry could not be read; only static mirrors remain
    DirectoryUnavailable { registry: String, reason: String },

    /// A mirror is about to be queried
    MirrorAttempt { index: usize, mirror: String },

    /// A mirror failed or returned nothing; the next one will be tried
    MirrorSkipped { mirror: String, reason: String },

    /// A mirror returned results; no further mirrors are consulted
    MirrorSucceeded { mirror: String, entries: usize },

    /// Every mirror was tried without results
    DispatchExhausted { tried: usize },

    /// Content extraction fan-out is starting
    CrawlStarted { entries: usize, workers: usize },

    /// An extraction attempt is starting
    ExtractionAttempt { url: String, attempt: u32 },

    /// An extraction attempt failed and will be retried after `delay`
    ExtractionRetry {
        url: String,
        attempt: u32,
        delay: Duration,
        reason: String,
    },

    /// The page kept issuing requests; extraction continues anyway
    QuiescenceTimeout { url: String },

    /// Text was extracted
    ExtractionSucceeded { url: String, attempts: u32, chars: usize },

    /// Every attempt failed; a diagnostic is recorded instead of text
    ExtractionFailed { url: String, attempts: u32, reason: String },

    /// Content extraction fan-out finished
    CrawlFinished { results: usize, failures: usize },
}

/// Receiver of pipeline events
pub trait EventSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

/// Forwards events to `tracing` with structured fields
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: PipelineEvent) {
        match event {
            PipelineEvent::DirectoryBuilt { registry, mirrors } => {
                tracing::info!(%registry, mirrors, "Mirror directory built");
            }
            PipelineEvent::DirectoryUnavailable { registry, reason } => {
                tracing::warn!(%registry, %reason, "Mirror registry unavailable");
            }
            PipelineEvent::MirrorAttempt { index, mirror } => {
                tracing::info!(index, %mirror, "Attempting search on mirror");
            }
            PipelineEvent::MirrorSkipped { mirror, reason } => {
                tracing::warn!(%mirror, %reason, "Skipping mirror");
            }
            PipelineEvent::MirrorSucceeded { mirror, entries } => {
                tracing::info!(%mirror, entries, "Mirror returned results");
            }
            PipelineEvent::DispatchExhausted { tried } => {
                tracing::warn!(tried, "All mirrors failed to return results");
            }
            PipelineEvent::CrawlStarted { entries, workers } => {
                tracing::info!(entries, workers, "Crawling result pages");
            }
            PipelineEvent::ExtractionAttempt { url, attempt } => {
                tracing::debug!(%url, attempt, "Extracting content");
            }
            PipelineEvent::ExtractionRetry {
                url,
                attempt,
                delay,
                reason,
            } => {
                tracing::warn!(
                    %url,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    %reason,
                    "Extraction attempt failed, retrying"
                );
            }
            PipelineEvent::QuiescenceTimeout { url } => {
                tracing::debug!(%url, "Network did not become idle, continuing anyway");
            }
            PipelineEvent::ExtractionSucceeded {
                url,
                attempts,
                chars,
            } => {
                tracing::debug!(%url, attempts, chars, "Content extracted");
            }
            PipelineEvent::ExtractionFailed {
                url,
                attempts,
                reason,
            } => {
                tracing::error!(%url, attempts, %reason, "Content extraction failed");
            }
            PipelineEvent::CrawlFinished { results, failures } => {
                tracing::info!(results, failures, "Crawl finished");
            }
        }
    }
}
