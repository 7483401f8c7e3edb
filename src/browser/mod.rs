//! Browser engine abstraction
//!
//! Defines the `BrowserEngine` and `BrowserSession` traits that every page
//! render goes through. A session is an isolated browsing scope (its own
//! cookies and storage) owned by exactly one task; it must be closed by that
//! task on every exit path.
//!
//! Two engines are provided:
//! - `ChromiumEngine`: headless Chromium via chromiumoxide, executes scripts
//! - `HttpEngine`: plain HTTP fetches via reqwest, no script execution

mod chromium;
mod http;

#[cfg(test)]
pub(crate) mod testing;

pub use chromium::ChromiumEngine;
pub use http::{build_http_client, HttpEngine};

use crate::config::{BrowserConfig, CrawlerConfig, EngineKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by browser engines and sessions
#[derive(Debug, Clone, Error)]
pub enum BrowserError {
    #[error("failed to launch browser: {0}")]
    Launch(String),

    #[error("failed to open browsing session: {0}")]
    Session(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("{operation} timed out after {}ms", .after.as_millis())]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("received error status: {0}")]
    Status(u16),

    #[error("received error status: no response")]
    NoResponse,

    #[error("script evaluation failed: {0}")]
    Script(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

/// Result of navigating a session to a URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationResult {
    /// The URL the session ended up on after redirects
    pub final_url: String,

    /// HTTP status of the main document, when the engine could observe one
    pub status: Option<u16>,
}

impl NavigationResult {
    /// Turns a missing response or an HTTP error status into an error
    pub fn ensure_success(&self) -> Result<(), BrowserError> {
        match self.status {
            None => Err(BrowserError::NoResponse),
            Some(status) if status >= 400 => Err(BrowserError::Status(status)),
            Some(_) => Ok(()),
        }
    }
}

/// Viewport dimensions presented to target sites
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

/// Identity a session presents to the sites it visits
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionProfile {
    pub user_agent: String,
    pub viewport: Viewport,
}

impl SessionProfile {
    pub fn from_config(config: &BrowserConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            viewport: Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
            },
        }
    }
}

impl Default for SessionProfile {
    fn default() -> Self {
        Self::from_config(&BrowserConfig::default())
    }
}

/// Waits applied after navigation before a rendered page is read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderTiming {
    /// Fixed pause that lets client-side scripts run
    pub settle_delay: Duration,

    /// Upper bound on the wait for network quiescence
    pub quiescence_timeout: Duration,
}

impl RenderTiming {
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            quiescence_timeout: Duration::from_millis(config.quiescence_timeout_ms),
        }
    }

    /// No waiting at all; used against static documents
    pub fn immediate() -> Self {
        Self {
            settle_delay: Duration::ZERO,
            quiescence_timeout: Duration::ZERO,
        }
    }
}

/// A rendering engine that hands out isolated browsing sessions
#[async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Opens a new isolated session presenting the given profile
    async fn open_session(
        &self,
        profile: &SessionProfile,
    ) -> Result<Box<dyn BrowserSession>, BrowserError>;

    /// Shuts the engine down; open sessions become unusable
    async fn shutdown(&self) -> Result<(), BrowserError>;

    /// Number of sessions currently open
    fn active_sessions(&self) -> usize;
}

/// A single isolated browsing session
#[async_trait]
pub trait BrowserSession: Send {
    /// Navigates to `url`, waiting only for the DOM to be constructed
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BrowserError>;

    /// Waits until the page stops issuing network requests
    async fn wait_for_quiescence(&mut self, timeout: Duration) -> Result<(), BrowserError>;

    /// Returns the fully rendered markup of the current page
    async fn content(&mut self) -> Result<String, BrowserError>;

    /// Closes the session and releases everything it holds
    async fn close(self: Box<Self>) -> Result<(), BrowserError>;
}

/// Launches the engine selected by the configuration
///
/// This is the only place an infrastructure failure can originate: if the
/// engine cannot start at all, no query can be served.
pub async fn launch_engine(config: &BrowserConfig) -> Result<Arc<dyn BrowserEngine>, BrowserError> {
    match config.engine {
        EngineKind::Chromium => {
            let engine = ChromiumEngine::launch(config).await?;
            tracing::debug!("Chromium engine launched");
            Ok(Arc::new(engine))
        }
        EngineKind::Http => Ok(Arc::new(HttpEngine::new())),
    }
}
