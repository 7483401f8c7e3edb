//! Searx-Harvest: federated search with full-page enrichment
//!
//! This crate queries a federation of privacy-respecting search portal mirrors,
//! takes the results of the first mirror that answers, and renders every linked
//! page in an isolated browser session to attach its extracted text.

pub mod browser;
pub mod config;
pub mod crawler;
pub mod directory;
pub mod events;
pub mod pipeline;
pub mod search;
pub mod server;
pub mod types;

use thiserror::Error;

/// Main error type for Searx-Harvest operations
///
/// Per-mirror and per-link failures never surface here; they are absorbed by
/// the dispatcher and the content extractor. What remains are failures of the
/// infrastructure itself and rejected queries. Configuration loading has its
/// own error type.
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Browser engine unavailable: {0}")]
    Infrastructure(#[from] browser::BrowserError),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Searx-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use pipeline::{list_mirrors, run_search, Harvester};
pub use types::{EnrichedResult, QueryParams, ResultEntry};
