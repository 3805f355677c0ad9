//! Normalized named road / municipality relation (navngivenvejkommunedel)

use serde::Serialize;
use uuid::Uuid;

use super::types::NamedRoadMunicipalDistrictStatus;
use crate::error::{DawaError, Result};

/// The part of a named road lying within one municipality, with its road code there
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedRoadMunicipalDistrict {
    pub id: Uuid,
    pub municipality_code: Option<String>,
    pub road_code: Option<String>,
    pub named_road_id: Uuid,
    pub status: NamedRoadMunicipalDistrictStatus,
}

impl NamedRoadMunicipalDistrict {
    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(DawaError::validation(
                "named road municipal district id cannot be nil",
            ));
        }
        if self.named_road_id.is_nil() {
            return Err(DawaError::validation(format!(
                "named road municipal district {} has a nil named road id",
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
