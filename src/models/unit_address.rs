//! Normalized unit address (adresse)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::AddressStatus;
use crate::error::{DawaError, Result};

/// A sub-address (floor / door) within an access address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitAddress {
    pub id: Uuid,
    pub access_address_id: Uuid,
    pub status: AddressStatus,
    pub floor_name: Option<String>,
    /// Door designation
    pub suit_name: Option<String>,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl UnitAddress {
    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(DawaError::validation("unit address id cannot be nil"));
        }
        if self.access_address_id.is_nil() {
            return Err(DawaError::validation(format!(
                "unit address {} has a nil access address id",
                self.id
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
