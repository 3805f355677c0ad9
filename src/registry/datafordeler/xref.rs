//! Cross-reference tables for the access address bulk import
//!
//! The husnummer bulk file stores address points, post codes and
//! supplementary town names as bare ids. The index resolves them; it is
//! built once per import and never changes afterwards.

use chrono::{DateTime, Utc};
use rustc_hash::FxHashMap;
use uuid::Uuid;

use super::wire::{DafAddressPoint, DafSupplementaryTownName};
use crate::error::Result;
use crate::models::PostCode;
use crate::registry::geometry::parse_point;
use crate::registry::wire::parse_id;

/// Location of an address point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AddressPointLocation {
    /// ETRS89 / UTM32 easting
    pub east: f64,
    /// ETRS89 / UTM32 northing
    pub north: f64,
    pub updated: Option<DateTime<Utc>>,
}

/// Read-only lookup tables keyed by DAR local id
#[derive(Debug, Default)]
pub struct CrossReferenceIndex {
    address_points: FxHashMap<Uuid, AddressPointLocation>,
    supplementary_town_names: FxHashMap<Uuid, String>,
    post_codes: FxHashMap<Uuid, PostCode>,
}

impl CrossReferenceIndex {
    /// Start building an index
    #[must_use]
    pub fn builder() -> CrossReferenceIndexBuilder {
        CrossReferenceIndexBuilder::default()
    }

    /// Position of an address point
    #[must_use]
    pub fn address_point(&self, id: &Uuid) -> Option<&AddressPointLocation> {
        self.address_points.get(id)
    }

    /// Name of a supplementary town, `None` for unknown or unnamed towns
    #[must_use]
    pub fn supplementary_town_name(&self, id: &Uuid) -> Option<&str> {
        self.supplementary_town_names.get(id).map(String::as_str)
    }

    /// Post code by its local id
    #[must_use]
    pub fn post_code(&self, id: &Uuid) -> Option<&PostCode> {
        self.post_codes.get(id)
    }

    /// Sizes of the address point, town name and post code tables
    #[must_use]
    pub fn sizes(&self) -> (usize, usize, usize) {
        (
            self.address_points.len(),
            self.supplementary_town_names.len(),
            self.post_codes.len(),
        )
    }
}

/// Mutable side of [`CrossReferenceIndex`], only used while loading
#[derive(Debug, Default)]
pub struct CrossReferenceIndexBuilder {
    index: CrossReferenceIndex,
}

impl CrossReferenceIndexBuilder {
    /// Add an address point from the `Adressepunkt` file
    ///
    /// Ids and positions must parse; a broken address point row is fatal.
    pub fn insert_address_point(&mut self, point: DafAddressPoint) -> Result<()> {
        let id = parse_id(&point.id)?;
        let position = parse_point(&point.position)?;
        self.index.address_points.insert(
            id,
            AddressPointLocation {
                east: position.x,
                north: position.y,
                updated: point.updated,
            },
        );
        Ok(())
    }

    /// Add a town name from the `SupplerendeBynavn` file
    ///
    /// Rows without a name are not indexed.
    pub fn insert_supplementary_town_name(&mut self, town: DafSupplementaryTownName) -> Result<()> {
        let id = parse_id(&town.id)?;
        if let Some(name) = town.name.filter(|name| !name.trim().is_empty()) {
            self.index.supplementary_town_names.insert(id, name);
        }
        Ok(())
    }

    /// Add a mapped post code
    pub fn insert_post_code(&mut self, post_code: PostCode) {
        self.index.post_codes.insert(post_code.id, post_code);
    }

    /// Freeze the index
    #[must_use]
    pub fn build(self) -> CrossReferenceIndex {
        let (points, towns, post_codes) = self.index.sizes();
        log::info!(
            "Built cross-reference index: {points} address points, {towns} town names, {post_codes} post codes"
        );
        self.index
    }
}
