//! Mirror directory
//!
//! Builds the ordered list of search portal mirrors a dispatch will try.
//! Statically configured mirrors come first, followed by those listed on the
//! public registry page. The registry is best-effort: if it cannot be read,
//! the directory holds only the static mirrors (none by default) and the
//! dispatch simply finds nothing to try.

mod registry;

pub use registry::parse_registry;

use crate::browser::{BrowserEngine, BrowserError, BrowserSession, RenderTiming, SessionProfile};
use crate::config::SearchConfig;
use crate::events::{EventSink, PipelineEvent};
use registry::dedup_preserving_order;
use std::sync::Arc;
use std::time::Duration;

/// Ordered, duplicate-free list of mirror base URLs
///
/// Built once per dispatch and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MirrorDirectory {
    mirrors: Vec<String>,
}

impl MirrorDirectory {
    /// Creates a directory, dropping repeated mirrors
    pub fn new(mirrors: impl IntoIterator<Item = String>) -> Self {
        Self {
            mirrors: dedup_preserving_order(mirrors),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.mirrors.iter().map(String::as_str)
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.mirrors.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.mirrors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mirrors.is_empty()
    }
}

/// Discovers mirrors by rendering the registry page
pub struct MirrorDiscovery {
    engine: Arc<dyn BrowserEngine>,
    profile: SessionProfile,
    config: SearchConfig,
    timing: RenderTiming,
    events: Arc<dyn EventSink>,
}

impl MirrorDiscovery {
    pub fn new(
        engine: Arc<dyn BrowserEngine>,
        profile: SessionProfile,
        config: SearchConfig,
        timing: RenderTiming,
        events: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            engine,
            profile,
            config,
            timing,
            events,
        }
    }

    /// Builds the mirror directory
    ///
    /// Never fails. Any problem with the registry (session, navigation,
    /// error status, rendering) is reported as a `DirectoryUnavailable`
    /// event and leaves only the static mirrors in the directory.
    pub async fn discover(&self, timeout: Duration) -> MirrorDirectory {
        let mut mirrors = self.config.mirrors.clone();

        if self.config.discover_mirrors {
            let registry = self.config.registry_url.clone();
            match self.fetch_registry(timeout).await {
                Ok(found) => {
                    self.events.emit(PipelineEvent::DirectoryBuilt {
                        registry,
                        mirrors: found.len(),
                    });
                    mirrors.extend(found);
                }
                Err(e) => {
                    self.events.emit(PipelineEvent::DirectoryUnavailable {
                        registry,
                        reason: e.to_string(),
                    });
                }
            }
        }

        MirrorDirectory::new(mirrors)
    }

    async fn fetch_registry(&self, timeout: Duration) -> Result<Vec<String>, BrowserError> {
        let mut session = self.engine.open_session(&self.profile).await?;
        let rendered = self.render_registry(session.as_mut(), timeout).await;

        if let Err(e) = session.close().await {
            tracing::debug!("Failed to close registry session: {}", e);
        }

        Ok(parse_registry(&rendered?))
    }

    async fn render_registry(
        &self,
        session: &mut dyn BrowserSession,
        timeout: Duration,
    ) -> Result<String, BrowserError> {
        let navigation = session.navigate(&self.config.registry_url, timeout).await?;
        navigation.ensure_success()?;

        // The registry fills its table from script
        tokio::time::sleep(self.timing.settle_delay).await;
        if let Err(e) = session
            .wait_for_quiescence(self.timing.quiescence_timeout)
            .await
        {
            tracing::debug!("Registry page did not go idle: {}", e);
        }

        session.content().await
    }
}
