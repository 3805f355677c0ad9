//! Logging utilities
//!
//! This module provides standardized logging functions for registry requests.

use std::time::Duration;

/// Query parameter names whose values are never logged
const REDACTED_PARAMS: [&str; 1] = ["apikey"];

/// Remove secrets from a URL before it is logged or put into an error
#[must_use]
pub fn redact_url(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if REDACTED_PARAMS.iter().any(|p| p.eq_ignore_ascii_case(name)) => {
                format!("{name}=***")
            }
            _ => pair.to_string(),
        })
        .collect::<Vec<_>>()
        .join("&");

    format!("{base}?{query}")
}

/// Log an operation start with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `url` - URL being requested
pub fn log_operation_start(operation: &str, url: &str) {
    log::info!("{} {}", operation, redact_url(url));
}

/// Log an operation completion with consistent format
///
/// # Arguments
/// * `operation` - Description of the operation
/// * `target` - What was operated on (entity name, URL)
/// * `items` - Number of items processed
/// * `elapsed` - Optional elapsed time
pub fn log_operation_complete(operation: &str, target: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!(
            "Successfully {} {} items from {} in {:?}",
            operation,
            items,
            target,
            duration
        );
    } else {
        log::info!("Successfully {} {} items from {}", operation, items, target);
    }
}

/// Log an operation warning with consistent format
///
/// # Arguments
/// * `message` - Warning message
/// * `target` - Optional entity or URL related to the warning
pub fn log_warning(message: &str, target: Option<&str>) {
    if let Some(target) = target {
        log::warn!("{message}: {target}");
    } else {
        log::warn!("{message}");
    }
}
