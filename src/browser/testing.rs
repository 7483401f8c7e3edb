//! Scripted engine for unit tests
//!
//! Routes are matched by URL prefix in insertion order. Every navigation and
//! every session is counted so tests can assert on attempts and isolation.

use super::{BrowserEngine, BrowserError, BrowserSession, NavigationResult, SessionProfile};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What a scripted route answers with
#[derive(Debug, Clone)]
pub enum Scripted {
    Page { status: Option<u16>, html: String },
    Fail(BrowserError),
}

impl Scripted {
    pub fn ok(html: impl Into<String>) -> Self {
        Self::Page {
            status: Some(200),
            html: html.into(),
        }
    }

    pub fn status(status: u16, html: impl Into<String>) -> Self {
        Self::Page {
            status: Some(status),
            html: html.into(),
        }
    }
}

#[derive(Debug, Default)]
struct Shared {
    routes: Vec<(String, Scripted)>,
    delay: Duration,
    noisy_network: bool,
    navigations: Mutex<HashMap<String, u32>>,
    active: AtomicUsize,
    peak: AtomicUsize,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Engine answering navigations from a fixed script
#[derive(Debug, Clone, Default)]
pub struct ScriptedEngine {
    shared: Arc<Shared>,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a route; must be called before the engine is shared
    pub fn route(mut self, prefix: impl Into<String>, answer: Scripted) -> Self {
        Arc::get_mut(&mut self.shared)
            .expect("routes are configured before use")
            .routes
            .push((prefix.into(), answer));
        self
    }

    /// Makes every navigation take `delay`
    pub fn with_delay(mut self, delay: Duration) -> Self {
        Arc::get_mut(&mut self.shared)
            .expect("delay is configured before use")
            .delay = delay;
        self
    }

    /// Makes every quiescence wait run out its timeout
    pub fn with_noisy_network(mut self) -> Self {
        Arc::get_mut(&mut self.shared)
            .expect("network behavior is configured before use")
            .noisy_network = true;
        self
    }

    /// Number of navigations whose URL starts with `prefix`
    pub fn navigations(&self, prefix: &str) -> u32 {
        self.shared
            .navigations
            .lock()
            .unwrap()
            .iter()
            .filter(|(url, _)| url.starts_with(prefix))
            .map(|(_, count)| *count)
            .sum()
    }

    pub fn peak_sessions(&self) -> usize {
        self.shared.peak.load(Ordering::SeqCst)
    }

    pub fn opened_sessions(&self) -> usize {
        self.shared.opened.load(Ordering::SeqCst)
    }

    pub fn closed_sessions(&self) -> usize {
        self.shared.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserEngine for ScriptedEngine {
    async fn open_session(
        &self,
        _profile: &SessionProfile,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let active = self.shared.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.shared.peak.fetch_max(active, Ordering::SeqCst);
        self.shared.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(ScriptedSession {
            shared: Arc::clone(&self.shared),
            document: None,
        }))
    }

    async fn shutdown(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn active_sessions(&self) -> usize {
        self.shared.active.load(Ordering::SeqCst)
    }
}

struct ScriptedSession {
    shared: Arc<Shared>,
    document: Option<String>,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BrowserError> {
        *self
            .shared
            .navigations
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_insert(0) += 1;

        if self.shared.delay > timeout {
            tokio::time::sleep(timeout).await;
            return Err(BrowserError::Timeout {
                operation: "navigation",
                after: timeout,
            });
        }
        tokio::time::sleep(self.shared.delay).await;

        let answer = self
            .shared
            .routes
            .iter()
            .find(|(prefix, _)| url.starts_with(prefix.as_str()))
            .map(|(_, answer)| answer.clone())
            .unwrap_or_else(|| {
                Scripted::Fail(BrowserError::Navigation(format!("net::ERR_NAME_NOT_RESOLVED at {url}")))
            });

        match answer {
            Scripted::Page { status, html } => {
                self.document = Some(html);
                Ok(NavigationResult {
                    final_url: url.to_string(),
                    status,
                })
            }
            Scripted::Fail(error) => Err(error),
        }
    }

    async fn wait_for_quiescence(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        if !self.shared.noisy_network {
            return Ok(());
        }
        tokio::time::sleep(timeout).await;
        Err(BrowserError::Timeout {
            operation: "network quiescence",
            after: timeout,
        })
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.document
            .clone()
            .ok_or_else(|| BrowserError::Navigation("no document loaded".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.shared.active.fetch_sub(1, Ordering::SeqCst);
        self.shared.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
