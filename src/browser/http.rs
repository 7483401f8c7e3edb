//! Static HTTP engine
//!
//! This engine renders nothing: it fetches the raw document with reqwest and
//! hands it back untouched. It exists for hosts without Chromium and for
//! exercising the pipeline against mock servers.
//!
//! Each session builds its own client, so cookies set during one session are
//! never visible to another.

use super::{BrowserEngine, BrowserError, BrowserSession, NavigationResult, SessionProfile};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Builds an HTTP client presenting the given session profile
///
/// # Arguments
///
/// * `profile` - The identity to present (user agent)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client with its own cookie jar
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(profile: &SessionProfile) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(profile.user_agent.as_str())
        .connect_timeout(Duration::from_secs(10))
        .cookie_store(true)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Engine backed by plain HTTP requests
#[derive(Debug, Default)]
pub struct HttpEngine {
    active_count: Arc<AtomicUsize>,
}

impl HttpEngine {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BrowserEngine for HttpEngine {
    async fn open_session(
        &self,
        profile: &SessionProfile,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let client =
            build_http_client(profile).map_err(|e| BrowserError::Session(e.to_string()))?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(HttpSession {
            client,
            document: None,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<(), BrowserError> {
        Ok(())
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A session holding the last document it navigated to
pub struct HttpSession {
    client: Client,
    document: Option<String>,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BrowserError> {
        self.document = None;

        let fetch = async {
            let response = self.client.get(url).send().await?;
            let status = response.status().as_u16();
            let final_url = response.url().to_string();
            let body = response.text().await?;
            Ok::<_, reqwest::Error>((status, final_url, body))
        };

        let (status, final_url, body) = tokio::time::timeout(timeout, fetch)
            .await
            .map_err(|_| BrowserError::Timeout {
                operation: "navigation",
                after: timeout,
            })?
            .map_err(classify_error)?;

        self.document = Some(body);

        Ok(NavigationResult {
            final_url,
            status: Some(status),
        })
    }

    async fn wait_for_quiescence(&mut self, _timeout: Duration) -> Result<(), BrowserError> {
        // A static document issues no requests of its own
        Ok(())
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.document
            .clone()
            .ok_or_else(|| BrowserError::Navigation("no document loaded".to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Maps a reqwest failure onto the browser error taxonomy
fn classify_error(error: reqwest::Error) -> BrowserError {
    if error.is_timeout() {
        BrowserError::Navigation("request timeout".to_string())
    } else if error.is_connect() {
        BrowserError::Navigation(format!("connection failed: {}", error))
    } else {
        BrowserError::Http(error.to_string())
    }
}
