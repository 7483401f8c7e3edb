//! Content extractor
//!
//! Renders one target page in a fresh isolated session and extracts its
//! text, retrying failed attempts after a randomized pause. Every attempt
//! opens its own session and closes it before the attempt is judged.

use super::text::extract_text;
use crate::browser::{BrowserEngine, BrowserError, BrowserSession, RenderTiming, SessionProfile};
use crate::config::CrawlerConfig;
use crate::events::{EventSink, PipelineEvent};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Prefix of the context recorded for a link that could not be fetched
pub const DIAGNOSTIC_PREFIX: &str = "Error fetching content: ";

/// Terminal failure after every attempt on a link failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to extract {url} after {attempts} attempts: {message}")]
pub struct ExtractionError {
    pub url: String,
    pub attempts: u32,

    /// Description of the last attempt's error
    pub message: String,
}

impl ExtractionError {
    /// The context string recorded in place of extracted text
    pub fn diagnostic(&self) -> String {
        format!("{}{}", DIAGNOSTIC_PREFIX, self.message)
    }
}

/// How a single extraction attempt is judged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    Success(String),
    RetryableFailure(String),
    TerminalFailure(String),
}

/// Judges an attempt; a failure is terminal once the attempt budget is spent
pub fn classify(
    result: Result<String, BrowserError>,
    attempt: u32,
    max_attempts: u32,
) -> ExtractionOutcome {
    match result {
        Ok(text) => ExtractionOutcome::Success(text),
        Err(e) if attempt >= max_attempts => ExtractionOutcome::TerminalFailure(e.to_string()),
        Err(e) => ExtractionOutcome::RetryableFailure(e.to_string()),
    }
}

/// Retry and timing behavior of the extractor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractionSettings {
    pub max_attempts: u32,
    pub timing: RenderTiming,
    pub jitter_min: Duration,
    pub jitter_max: Duration,
}

impl ExtractionSettings {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            timing: RenderTiming::from_config(config),
            jitter_min: Duration::from_millis(config.retry_jitter_min_ms),
            jitter_max: Duration::from_millis(config.retry_jitter_max_ms),
        }
    }

    /// Picks the pause before the next attempt, uniformly within the jitter range
    pub fn retry_delay(&self) -> Duration {
        if self.jitter_max <= self.jitter_min {
            return self.jitter_min;
        }

        let millis = rand::thread_rng()
            .gen_range(self.jitter_min.as_millis() as u64..=self.jitter_max.as_millis() as u64);
        Duration::from_millis(millis)
    }
}

impl Default for ExtractionSettings {
    fn default() -> Self {
        Self::from_config(&CrawlerConfig::default())
    }
}

/// Extracts the text of target pages
#[derive(Clone)]
pub struct ContentExtractor {
    engine: Arc<dyn BrowserEngine>,
    profile: SessionProfile,
    settings: ExtractionSettings,
    events: Arc<dyn EventSink>,
}

impl ContentExtractor {
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        profile: SessionProfile,
        settings: ExtractionSettings,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine,
            profile,
            settings,
            events,
        }
    }

    /// Extracts at most `max_content` characters of text from `url`
    ///
    /// There is no pause before the first attempt. A page without a body
    /// yields the no-content sentinel, which counts as success.
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - Extracted text or the no-content sentinel
    /// * `Err(ExtractionError)` - Every attempt failed; carries the last error
    pub async fn extract(
        &self,
        url: &str,
        timeout: Duration,
        max_content: usize,
    ) -> Result<String, ExtractionError> {
        let mut attempt = 1;

        loop {
            self.events.emit(PipelineEvent::ExtractionAttempt {
                url: url.to_string(),
                attempt,
            });

            let result = self.attempt(url, timeout, max_content).await;

            match classify(result, attempt, self.settings.max_attempts) {
                ExtractionOutcome::Success(text) => {
                    self.events.emit(PipelineEvent::ExtractionSucceeded {
                        url: url.to_string(),
                        attempts: attempt,
                        chars: text.chars().count(),
                    });
                    return Ok(text);
                }
                ExtractionOutcome::RetryableFailure(reason) => {
                    let delay = self.settings.retry_delay();
                    self.events.emit(PipelineEvent::ExtractionRetry {
                        url: url.to_string(),
                        attempt,
                        delay,
                        reason,
                    });
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                ExtractionOutcome::TerminalFailure(message) => {
                    self.events.emit(PipelineEvent::ExtractionFailed {
                        url: url.to_string(),
                        attempts: attempt,
                        reason: message.clone(),
                    });
                    return Err(ExtractionError {
                        url: url.to_string(),
                        attempts: attempt,
                        message,
                    });
                }
            }
        }
    }

    async fn attempt(
        &self,
        url: &str,
        timeout: Duration,
        max_content: usize,
    ) -> Result<String, BrowserError> {
        let mut session = self.engine.open_session(&self.profile).await?;
        let rendered = self.render(session.as_mut(), url, timeout).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close session for {}: {}", url, e);
        }

        Ok(extract_text(&rendered?, max_content))
    }

    async fn render(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
        timeout: Duration,
    ) -> Result<String, BrowserError> {
        let navigation = session.navigate(url, timeout).await?;
        navigation.ensure_success()?;

        tokio::time::sleep(self.settings.timing.settle_delay).await;

        if session
            .wait_for_quiescence(self.settings.timing.quiescence_timeout)
            .await
            .is_err()
        {
            self.events.emit(PipelineEvent::QuiescenceTimeout {
                url: url.to_string(),
            });
        }

        session.content().await
    }
}
