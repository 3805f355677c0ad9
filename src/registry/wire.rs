//! Wire-level building blocks shared by both registries

use std::fmt;

use serde::Deserialize;
use uuid::Uuid;

use crate::error::{DawaError, Result};

/// A status code as sent upstream
///
/// DAR sends stringified integers (`"3"`), the replication API sends plain
/// integers or, for some entities, status names.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum RawStatus {
    /// Numeric code
    Code(i64),
    /// Text, either a stringified code or a status name
    Text(String),
}

impl RawStatus {
    /// The numeric code, if the value is (or spells) one
    #[must_use]
    pub fn code(&self) -> Option<i64> {
        match self {
            Self::Code(code) => Some(*code),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }

    /// The value as lowercase text, for name based lookups
    #[must_use]
    pub fn name(&self) -> Option<String> {
        match self {
            Self::Code(_) => None,
            Self::Text(text) => Some(text.trim().to_lowercase()),
        }
    }
}

impl fmt::Display for RawStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{code}"),
            Self::Text(text) => write!(f, "{text}"),
        }
    }
}

/// Text of a possibly absent status, for error messages
#[must_use]
pub fn describe_status(status: Option<&RawStatus>) -> String {
    status.map_or_else(|| "<unset>".to_string(), ToString::to_string)
}

/// A reference to another DAR object
///
/// Nested (`{"id_lokalId": "..."}`) when the query asks for nested data,
/// a bare id string in bulk files and flat pages.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Reference {
    /// Nested object carrying the local id
    Nested {
        /// Local id of the referenced object
        #[serde(rename = "id_lokalId")]
        id: String,
    },
    /// Bare local id
    Bare(String),
}

impl Reference {
    /// The referenced local id
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Nested { id } | Self::Bare(id) => id,
        }
    }

    /// Parse the referenced id
    pub fn uuid(&self) -> Result<Uuid> {
        parse_id(self.id())
    }
}

/// Parse an upstream local id
///
/// A malformed id is fatal; it is never replaced by a default.
pub fn parse_id(value: &str) -> Result<Uuid> {
    Uuid::parse_str(value.trim()).map_err(|source| DawaError::InvalidId {
        value: value.to_string(),
        source,
    })
}
