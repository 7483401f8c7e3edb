//! Chromium-backed engine using chromiumoxide.
//!
//! One Chromium process serves a whole query. Every session gets its own CDP
//! browser context, which gives it a private cookie jar and storage scope.

use super::{BrowserEngine, BrowserError, BrowserSession, NavigationResult, SessionProfile};
use crate::config::BrowserConfig;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as ChromeConfig};
use chromiumoxide::cdp::browser_protocol::browser::{BrowserContextId, CloseParams};
use chromiumoxide::cdp::browser_protocol::emulation::{
    SetDeviceMetricsOverrideParams, SetUserAgentOverrideParams,
};
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use chromiumoxide::cdp::browser_protocol::target::{
    CreateBrowserContextParams, CreateTargetParams, DisposeBrowserContextParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Interval between DOM readiness and network activity probes
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// How long the resource count must stay unchanged to count as quiet
const QUIET_WINDOW: Duration = Duration::from_millis(500);

const READY_STATE_SCRIPT: &str =
    "document.readyState !== 'loading' && location.href !== 'about:blank'";

const STATUS_SCRIPT: &str = "(() => { \
    const nav = performance.getEntriesByType('navigation')[0]; \
    return nav && nav.responseStatus ? nav.responseStatus : 0; \
})()";

const RESOURCE_COUNT_SCRIPT: &str = "performance.getEntriesByType('resource').length";

/// Headless Chromium engine
pub struct ChromiumEngine {
    browser: Arc<Browser>,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumEngine {
    /// Launches a Chromium instance configured from `config`
    pub async fn launch(config: &BrowserConfig) -> Result<Self, BrowserError> {
        let mut builder = ChromeConfig::builder()
            .no_sandbox()
            .window_size(config.viewport_width, config.viewport_height)
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-blink-features=AutomationControlled");

        if !config.headless {
            builder = builder.with_head();
        }

        if let Some(executable) = &config.executable {
            builder = builder.chrome_executable(executable);
        }

        let chrome_config = builder.build().map_err(BrowserError::Launch)?;

        let (browser, mut handler) = Browser::launch(chrome_config)
            .await
            .map_err(|e| BrowserError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::trace!("Chromium handler error: {}", e);
                }
            }
        });

        Ok(Self {
            browser: Arc::new(browser),
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }

    async fn create_page(
        &self,
        context_id: &BrowserContextId,
        profile: &SessionProfile,
    ) -> Result<Page, BrowserError> {
        let target = CreateTargetParams::builder()
            .url("about:blank")
            .browser_context_id(context_id.clone())
            .build()
            .map_err(BrowserError::Session)?;

        let page = self
            .browser
            .new_page(target)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?;

        let setup = async {
            page.execute(SetUserAgentOverrideParams::new(profile.user_agent.clone()))
                .await?;
            page.execute(SetDeviceMetricsOverrideParams::new(
                i64::from(profile.viewport.width),
                i64::from(profile.viewport.height),
                1.0,
                false,
            ))
            .await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };

        if let Err(e) = setup.await {
            let _ = page.close().await;
            return Err(BrowserError::Session(e.to_string()));
        }

        Ok(page)
    }

    async fn dispose_context(browser: &Browser, context_id: BrowserContextId) {
        if let Err(e) = browser
            .execute(DisposeBrowserContextParams::new(context_id))
            .await
        {
            tracing::debug!("Failed to dispose browser context: {}", e);
        }
    }
}

#[async_trait]
impl BrowserEngine for ChromiumEngine {
    async fn open_session(
        &self,
        profile: &SessionProfile,
    ) -> Result<Box<dyn BrowserSession>, BrowserError> {
        let context_id = self
            .browser
            .execute(CreateBrowserContextParams::default())
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))?
            .result
            .browser_context_id;

        let page = match self.create_page(&context_id, profile).await {
            Ok(page) => page,
            Err(e) => {
                Self::dispose_context(&self.browser, context_id).await;
                return Err(e);
            }
        };

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumSession {
            browser: Arc::clone(&self.browser),
            context_id,
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<(), BrowserError> {
        let result = self
            .browser
            .execute(CloseParams::default())
            .await
            .map(|_| ())
            .map_err(|e| BrowserError::Session(e.to_string()));
        self.handler.abort();
        result
    }

    fn active_sessions(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// A Chromium page living in its own browser context
pub struct ChromiumSession {
    browser: Arc<Browser>,
    context_id: BrowserContextId,
    page: Page,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumSession {
    async fn evaluate<T: serde::de::DeserializeOwned>(&self, script: &str) -> Result<T, BrowserError> {
        self.page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn wait_for_dom(&self) -> Result<(), BrowserError> {
        loop {
            // Evaluation can fail while the old document is being torn down
            if let Ok(true) = self.evaluate::<bool>(READY_STATE_SCRIPT).await {
                return Ok(());
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    /// Issues `Page.navigate`; chromiumoxide resolves it only at the `load` event
    async fn start_navigation(&self, url: &str) -> Result<(), BrowserError> {
        let response = self
            .page
            .execute(NavigateParams::new(url))
            .await
            .map_err(|e| BrowserError::Navigation(e.to_string()))?;

        match response.result.error_text.clone() {
            Some(error_text) => Err(BrowserError::Navigation(error_text)),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(
        &mut self,
        url: &str,
        timeout: Duration,
    ) -> Result<NavigationResult, BrowserError> {
        // Whichever finishes first: a committed DOM or the full load
        let navigation = async {
            tokio::select! {
                loaded = self.start_navigation(url) => loaded,
                ready = self.wait_for_dom() => ready,
            }
        };

        tokio::time::timeout(timeout, navigation)
            .await
            .map_err(|_| BrowserError::Timeout {
                operation: "navigation",
                after: timeout,
            })??;

        // Zero means the engine saw no HTTP response for the document
        let status = self.evaluate::<u16>(STATUS_SCRIPT).await?;
        let status = (status != 0).then_some(status);
        let final_url = self
            .page
            .url()
            .await
            .ok()
            .flatten()
            .map(|u| u.to_string())
            .unwrap_or_else(|| url.to_string());

        Ok(NavigationResult { final_url, status })
    }

    async fn wait_for_quiescence(&mut self, timeout: Duration) -> Result<(), BrowserError> {
        let deadline = Instant::now() + timeout;
        let mut last_count = self.evaluate::<u64>(RESOURCE_COUNT_SCRIPT).await?;
        let mut quiet_since = Instant::now();

        loop {
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    operation: "network quiescence",
                    after: timeout,
                });
            }

            tokio::time::sleep(POLL_INTERVAL).await;

            let count = self.evaluate::<u64>(RESOURCE_COUNT_SCRIPT).await?;
            if count != last_count {
                last_count = count;
                quiet_since = Instant::now();
            } else if quiet_since.elapsed() >= QUIET_WINDOW {
                return Ok(());
            }
        }
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Script(e.to_string()))
    }

    async fn close(self: Box<Self>) -> Result<(), BrowserError> {
        let ChromiumSession {
            browser,
            context_id,
            page,
            active_count,
        } = *self;

        active_count.fetch_sub(1, Ordering::Relaxed);
        let page_result = page.close().await;
        ChromiumEngine::dispose_context(&browser, context_id).await;
        page_result.map_err(|e| BrowserError::Session(e.to_string()))
    }
}
