//! Crawl orchestrator
//!
//! Fans content extraction out over a bounded pool. Each selected entry
//! becomes one task that owns its browsing sessions; a permit from the pool
//! semaphore is held for the whole life of the task.
//!
//! Every selected entry yields exactly one enriched result, in input order,
//! whatever happens to its extraction.

use super::extractor::{ContentExtractor, DIAGNOSTIC_PREFIX};
use crate::config::MAX_POOL_WIDTH;
use crate::events::{EventSink, PipelineEvent};
use crate::types::{EnrichedResult, QueryParams, ResultEntry};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Number of concurrent extractions for `entries` selected entries
///
/// Never more than [`MAX_POOL_WIDTH`], the configured worker count, or the
/// number of entries.
pub fn pool_width(max_workers: usize, entries: usize) -> usize {
    max_workers.clamp(1, MAX_POOL_WIDTH).min(entries)
}

/// Runs content extraction for the entries of a query
pub struct CrawlOrchestrator {
    extractor: ContentExtractor,
    max_workers: usize,
    events: Arc<dyn EventSink>,
}

impl CrawlOrchestrator {
    pub fn new(extractor: ContentExtractor, max_workers: usize, events: Arc<dyn EventSink>) -> Self {
        Self {
            extractor,
            max_workers,
            events,
        }
    }

    /// Enriches the first `params.max_results` entries with page text
    ///
    /// Entries beyond the limit are discarded. With nothing selected, no
    /// work is dispatched at all.
    pub async fn crawl(&self, entries: Vec<ResultEntry>, params: &QueryParams) -> Vec<EnrichedResult> {
        let selected: Vec<ResultEntry> = entries.into_iter().take(params.max_results).collect();
        if selected.is_empty() {
            return Vec::new();
        }

        let width = pool_width(self.max_workers, selected.len());
        self.events.emit(PipelineEvent::CrawlStarted {
            entries: selected.len(),
            workers: width,
        });

        let semaphore = Arc::new(Semaphore::new(width));
        let mut tasks = JoinSet::new();
        let mut slots: Vec<Option<(String, bool)>> = vec![None; selected.len()];

        for (index, entry) in selected.iter().enumerate() {
            // Wait for a free slot before starting the next task
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };

            let extractor = self.extractor.clone();
            let link = entry.link.clone();
            let timeout = params.timeout;
            let max_content = params.max_content;

            tasks.spawn(async move {
                let _permit = permit;
                let extraction = AssertUnwindSafe(extractor.extract(&link, timeout, max_content))
                    .catch_unwind()
                    .await;

                let outcome = match extraction {
                    Ok(Ok(text)) => (text, false),
                    Ok(Err(e)) => (e.diagnostic(), true),
                    Err(_) => (format!("{}extraction task panicked", DIAGNOSTIC_PREFIX), true),
                };
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => slots[index] = Some(outcome),
                Err(e) => tracing::error!("Extraction task failed: {}", e),
            }
        }

        let mut failures = 0;
        let results: Vec<EnrichedResult> = selected
            .into_iter()
            .zip(slots)
            .map(|(entry, outcome)| {
                let (context, failed) = outcome.unwrap_or_else(|| {
                    (format!("{}extraction task did not complete", DIAGNOSTIC_PREFIX), true)
                });
                if failed {
                    failures += 1;
                }
                EnrichedResult::from_entry(entry, context)
            })
            .collect();

        self.events.emit(PipelineEvent::CrawlFinished {
            results: results.len(),
            failures,
        });

        results
    }
}
