//! Logging utilities for registry requests
//!
//! This module provides utilities for logging request progress.

pub mod log;

// Re-export commonly used functions for convenience
pub use log::{log_operation_complete, log_operation_start, log_warning, redact_url};
