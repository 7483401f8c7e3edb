//! Configuration module for Searx-Harvest
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! All keys are optional; missing sections fall back to their defaults.
//!
//! # Example
//!
//! ```no_run
//! use searx_harvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("harvest.toml")).unwrap();
//! println!("Registry: {}", config.search.registry_url);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BrowserConfig, Config, CrawlerConfig, EngineKind, SearchConfig, ServerConfig,
    DEFAULT_REGISTRY_URL, DEFAULT_USER_AGENT, MAX_POOL_WIDTH,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
