//! Crawler module for result page enrichment
//!
//! This module contains the content extraction phase, including:
//! - Text extraction from rendered markup
//! - Per-link rendering with retry and jitter
//! - Bounded concurrent fan-out over the selected entries

mod extractor;
mod orchestrator;
mod text;

pub use extractor::{
    classify, ContentExtractor, ExtractionError, ExtractionOutcome, ExtractionSettings,
    DIAGNOSTIC_PREFIX,
};
pub use orchestrator::{pool_width, CrawlOrchestrator};
pub use text::{extract_text, NO_CONTENT_SENTINEL, TRUNCATION_MARKER};
