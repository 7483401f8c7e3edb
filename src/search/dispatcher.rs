//! Search dispatcher
//!
//! Tries the mirrors of a freshly built directory strictly in order and
//! keeps the results of the first one that yields any. A mirror that fails,
//! answers with an error status, or lists nothing is skipped; running out
//! of mirrors is a normal outcome with no results.

use super::parser::{mirror_search_url, parse_results};
use super::state::{DispatchState, MirrorOutcome};
use crate::browser::{BrowserEngine, BrowserError, BrowserSession, SessionProfile};
use crate::directory::{MirrorDirectory, MirrorDiscovery};
use crate::events::{EventSink, PipelineEvent};
use crate::types::{QueryParams, ResultEntry};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Final result of a dispatch
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// `mirror` returned `entries` (never empty)
    Success {
        mirror: String,
        entries: Vec<ResultEntry>,
    },

    /// None of the `tried` mirrors returned results
    Exhausted { tried: usize },
}

impl DispatchOutcome {
    pub fn into_entries(self) -> Vec<ResultEntry> {
        match self {
            Self::Success { entries, .. } => entries,
            Self::Exhausted { .. } => Vec::new(),
        }
    }
}

/// Queries mirrors until one returns results
pub struct Dispatcher {
    discovery: MirrorDiscovery,
    engine: Arc<dyn BrowserEngine>,
    profile: SessionProfile,
    events: Arc<dyn EventSink>,
}

impl Dispatcher {
    pub fn new(
        discovery: MirrorDiscovery,
        engine: Arc<dyn BrowserEngine>,
        profile: SessionProfile,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            discovery,
            engine,
            profile,
            events,
        }
    }

    /// The discovery used to build each dispatch's directory
    pub fn discovery(&self) -> &MirrorDiscovery {
        &self.discovery
    }

    /// Returns every entry found on the first mirror with results
    ///
    /// The entries are not capped here; the crawl phase selects from them.
    pub async fn dispatch(&self, params: &QueryParams) -> Vec<ResultEntry> {
        self.run(params).await.into_entries()
    }

    /// Builds the directory, then dispatches over it
    pub async fn run(&self, params: &QueryParams) -> DispatchOutcome {
        let directory = self.discovery.discover(params.timeout).await;
        self.dispatch_over(&directory, params).await
    }

    /// Dispatches over an already built directory
    pub async fn dispatch_over(
        &self,
        directory: &MirrorDirectory,
        params: &QueryParams,
    ) -> DispatchOutcome {
        let mut state = DispatchState::start(directory.len());

        while let DispatchState::TryingMirror(index) = state {
            let Some(mirror) = directory.get(index) else {
                break;
            };

            self.events.emit(PipelineEvent::MirrorAttempt {
                index,
                mirror: mirror.to_string(),
            });

            let outcome = self.try_mirror(mirror, params).await;
            state = state.resolve(&outcome);

            match outcome {
                MirrorOutcome::Success(entries) => {
                    self.events.emit(PipelineEvent::MirrorSucceeded {
                        mirror: mirror.to_string(),
                        entries: entries.len(),
                    });
                    return DispatchOutcome::Success {
                        mirror: mirror.to_string(),
                        entries,
                    };
                }
                MirrorOutcome::Skip(reason) => {
                    self.events.emit(PipelineEvent::MirrorSkipped {
                        mirror: mirror.to_string(),
                        reason,
                    });
                    state = state.advance(directory.len());
                }
            }
        }

        self.events.emit(PipelineEvent::DispatchExhausted {
            tried: directory.len(),
        });
        DispatchOutcome::Exhausted {
            tried: directory.len(),
        }
    }

    async fn try_mirror(&self, mirror: &str, params: &QueryParams) -> MirrorOutcome {
        let url = match mirror_search_url(mirror, &params.query) {
            Ok(url) => url,
            Err(e) => return MirrorOutcome::Skip(format!("invalid mirror URL: {}", e)),
        };

        match self.fetch_results(&url, params.timeout).await {
            Ok(entries) if entries.is_empty() => {
                MirrorOutcome::Skip("no results on page".to_string())
            }
            Ok(entries) => MirrorOutcome::Success(entries),
            Err(e) => MirrorOutcome::Skip(e.to_string()),
        }
    }

    /// Renders a mirror's result page in a fresh session and parses it
    async fn fetch_results(
        &self,
        url: &Url,
        timeout: Duration,
    ) -> Result<Vec<ResultEntry>, BrowserError> {
        let mut session = self.engine.open_session(&self.profile).await?;
        let rendered = render_result_page(session.as_mut(), url.as_str(), timeout).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close mirror session for {}: {}", url, e);
        }

        let (final_url, html) = rendered?;
        let base = Url::parse(&final_url).unwrap_or_else(|_| url.clone());
        Ok(parse_results(&html, &base))
    }
}

async fn render_result_page(
    session: &mut dyn BrowserSession,
    url: &str,
    timeout: Duration,
) -> Result<(String, String), BrowserError> {
    let navigation = session.navigate(url, timeout).await?;
    navigation.ensure_success()?;
    let html = session.content().await?;
    Ok((navigation.final_url, html))
}
