//! Normalized access address (adgangsadresse / husnummer)

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::types::AddressStatus;
use crate::error::{DawaError, Result};

/// Placeholder used for house numbers that are blank upstream
pub const HOUSE_NUMBER_PLACEHOLDER: &str = "?";

/// A street-address-level location with a geodetic reference point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessAddress {
    pub id: Uuid,
    pub created: DateTime<Utc>,
    pub updated: Option<DateTime<Utc>>,
    pub municipal_code: String,
    pub road_code: String,
    pub house_number: String,
    pub post_district_code: String,
    /// ETRS89 / UTM32 easting
    pub east_coordinate: Option<f64>,
    /// ETRS89 / UTM32 northing
    pub north_coordinate: Option<f64>,
    pub location_updated: Option<DateTime<Utc>>,
    pub supplementary_town_name: Option<String>,
    pub plot_id: Option<String>,
    pub road_id: Uuid,
    pub status: AddressStatus,
}

impl AccessAddress {
    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.id.is_nil() {
            return Err(DawaError::validation("access address id cannot be nil"));
        }
        if self.road_id.is_nil() {
            return Err(DawaError::validation(format!(
                "access address {} has a nil road id",
                self.id
            )));
        }
        if self.house_number.trim().is_empty() {
            return Err(DawaError::validation(format!(
                "access address {} has a blank house number",
                self.id
            )));
        }
        if self.municipal_code.trim().is_empty() {
            return Err(DawaError::validation(format!(
                "access address {} has a blank municipal code",
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

/// Replace a blank house number with [`HOUSE_NUMBER_PLACEHOLDER`]
#[must_use]
pub fn house_number_or_placeholder(house_number: Option<String>) -> String {
    match house_number {
        Some(value) if !value.trim().is_empty() => value,
        _ => HOUSE_NUMBER_PLACEHOLDER.to_string(),
    }
}
