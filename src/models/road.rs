//! Normalized named road (navngivenvej)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::RoadStatus;
use crate::error::{DawaError, Result};

/// A named road
///
/// The same name spans several municipalities; the per-municipality road
/// codes live on [`super::NamedRoadMunicipalDistrict`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Road {
    pub id: Uuid,
    /// Road name, never blank
    pub name: String,
    pub status: RoadStatus,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
}

impl Road {
    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(DawaError::validation("road id cannot be nil"));
        }
        if self.name.trim().is_empty() {
            return Err(DawaError::validation(format!("road {} has a blank name", self.id)));
        }
        Ok(())
    }

    /// Validate and return the record
    pub fn validated(self) -> Result<Self> {
        self.validate()?;
        Ok(self)
    }
}
