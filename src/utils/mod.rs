//! Shared helpers for logging and timestamp handling

pub mod datetime;
pub mod logging;

pub use datetime::{format_query_date, parse_timestamp};
pub use logging::{log_operation_complete, log_operation_start, log_warning, redact_url};
