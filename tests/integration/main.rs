//! Integration tests for the search pipeline
//!
//! These tests use wiremock to stand in for the mirror registry, the
//! mirrors and the result pages, and drive the full pipeline through the
//! static HTTP engine.

mod common;
mod pipeline_tests;
mod server_tests;
