//! Query pipeline
//!
//! Wires mirror dispatch and content extraction over a single engine:
//! the dispatch phase runs sequentially, then the selected entries are
//! crawled concurrently.

use crate::browser::{launch_engine, BrowserEngine, RenderTiming, SessionProfile};
use crate::config::Config;
use crate::crawler::{ContentExtractor, CrawlOrchestrator, ExtractionSettings};
use crate::directory::{MirrorDirectory, MirrorDiscovery};
use crate::events::{EventSink, TracingSink};
use crate::search::Dispatcher;
use crate::types::{EnrichedResult, QueryParams};
use std::sync::Arc;
use std::time::Duration;

/// Serves queries against one running engine
pub struct Harvester {
    dispatcher: Dispatcher,
    orchestrator: CrawlOrchestrator,
}

impl Harvester {
    /// Creates a harvester reporting through `tracing`
    pub fn new(engine: Arc<dyn BrowserEngine>, config: &Config) -> Self {
        Self::with_events(engine, config, Arc::new(TracingSink))
    }

    /// Creates a harvester reporting to the given event sink
    pub fn with_events(
        engine: Arc<dyn BrowserEngine>,
        config: &Config,
        events: Arc<dyn EventSink>,
    ) -> Self {
        let profile = SessionProfile::from_config(&config.browser);

        let discovery = MirrorDiscovery::new(
            engine.clone(),
            profile.clone(),
            config.search.clone(),
            RenderTiming::from_config(&config.crawler),
            events.clone(),
        );
        let dispatcher = Dispatcher::new(discovery, engine.clone(), profile.clone(), events.clone());

        let extractor = ContentExtractor::new(
            engine,
            profile,
            ExtractionSettings::from_config(&config.crawler),
            events.clone(),
        );
        let orchestrator = CrawlOrchestrator::new(extractor, config.crawler.max_workers, events);

        Self {
            dispatcher,
            orchestrator,
        }
    }

    /// Runs one query end to end
    ///
    /// Never fails: mirror and link failures are absorbed, and an empty
    /// result means no mirror returned anything.
    pub async fn run(&self, params: &QueryParams) -> Vec<EnrichedResult> {
        let entries = self.dispatcher.dispatch(params).await;
        self.orchestrator.crawl(entries, params).await
    }

    /// Builds the mirror directory without searching
    pub async fn mirrors(&self, timeout: Duration) -> MirrorDirectory {
        self.dispatcher.discovery().discover(timeout).await
    }
}

/// Runs a query on a freshly launched engine
///
/// The engine is shut down once the query completes. Failing to launch it
/// is the only error this returns.
///
/// # Example
///
/// ```no_run
/// use searx_harvest::{run_search, Config, QueryParams};
///
/// # async fn example() -> searx_harvest::Result<()> {
/// let results = run_search(&QueryParams::new("weather", 3, 2000), &Config::default()).await?;
/// for result in results {
///     println!("{} ({}): {}", result.link, result.source, result.context);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn run_search(
    params: &QueryParams,
    config: &Config,
) -> crate::Result<Vec<EnrichedResult>> {
    let engine = launch_engine(&config.browser).await?;

    let results = Harvester::new(engine.clone(), config).run(params).await;
    shutdown(engine.as_ref()).await;

    Ok(results)
}

/// Builds the mirror directory on a freshly launched engine
pub async fn list_mirrors(config: &Config) -> crate::Result<MirrorDirectory> {
    let engine = launch_engine(&config.browser).await?;

    let timeout = Duration::from_millis(config.search.timeout_ms);
    let directory = Harvester::new(engine.clone(), config).mirrors(timeout).await;
    shutdown(engine.as_ref()).await;

    Ok(directory)
}

async fn shutdown(engine: &dyn BrowserEngine) {
    if let Err(e) = engine.shutdown().await {
        tracing::warn!("Failed to shut down browser engine: {}", e);
    }
}
