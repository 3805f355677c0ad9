//! Normalized postal code (postnummer)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::PostCodeStatus;
use crate::error::{DawaError, Result};

/// A postal district
///
/// `number` is the legacy identity of a postal code; `id` is the registry-issued UUID.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostCode {
    pub id: Uuid,
    pub number: String,
    pub name: String,
    pub status: PostCodeStatus,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl PostCode {
    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.number.trim().is_empty() {
            return Err(DawaError::validation(format!(
                "post code {} has a blank number",
                self.id
            )));
        }
        if self.name.trim().is_empty() {
            return Err(DawaError::validation(format!(
                "post code {} has a blank name",
                self.number
            )));
        }
        Ok(())
    }

    /// Validate and return the record
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
