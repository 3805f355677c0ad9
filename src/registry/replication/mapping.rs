//! Mapping of replication records into the normalized model

use serde::de::DeserializeOwned;

use super::wire::{
    ReplicationAccessAddress, ReplicationNamedRoadMunicipalDistrict, ReplicationPostCode,
    ReplicationRoad, ReplicationUnitAddress,
};
use crate::error::{DawaError, Result};
use crate::models::{
    AccessAddress, AddressStatus, NamedRoadMunicipalDistrict, NamedRoadMunicipalDistrictStatus,
    PostCode, PostCodeStatus, Road, RoadStatus, UnitAddress,
};
use crate::models::access_address::house_number_or_placeholder;
use crate::registry::wire::{RawStatus, describe_status, parse_id};
use crate::utils::log_warning;

/// An entity served by the replication API
pub trait ReplicationEntity: Sized + Send + 'static {
    /// Record shape of the `udtraek` / `haendelser` lines
    type Wire: DeserializeOwned + Send + 'static;

    /// Value of the `entitet` query parameter
    const ENTITY_NAME: &'static str;

    /// Map one replication record; `Ok(None)` drops the record
    fn from_replication(wire: Self::Wire) -> Result<Option<Self>>;
}

/// Replication status of access and unit addresses
///
/// `1` active, `2` canceled, `3` pending, `4` discontinued.
pub fn address_status(status: Option<&RawStatus>, entity: &'static str) -> Result<AddressStatus> {
    match status.and_then(RawStatus::code) {
        Some(1) => Ok(AddressStatus::Active),
        Some(2) => Ok(AddressStatus::Canceled),
        Some(3) => Ok(AddressStatus::Pending),
        Some(4) => Ok(AddressStatus::Discontinued),
        _ => Err(DawaError::unknown_status(entity, describe_status(status))),
    }
}

/// `darstatus` of a named road, by name or DAR code
pub fn road_status(status: Option<&RawStatus>) -> Result<RoadStatus> {
    let parsed = match status {
        Some(raw) => match raw.code() {
            Some(2) => Some(RoadStatus::Temporary),
            Some(3) => Some(RoadStatus::Effective),
            Some(4) => Some(RoadStatus::Discontinued),
            Some(5) => Some(RoadStatus::Canceled),
            Some(_) => None,
            None => match raw.name().as_deref() {
                Some("temporary" | "foreløbig") => Some(RoadStatus::Temporary),
                Some("effective" | "active" | "gældende") => Some(RoadStatus::Effective),
                Some("discontinued" | "nedlagt") => Some(RoadStatus::Discontinued),
                Some("canceled" | "cancelled" | "henlagt") => Some(RoadStatus::Canceled),
                _ => None,
            },
        },
        None => None,
    };
    parsed.ok_or_else(|| DawaError::unknown_status("road", describe_status(status)))
}

/// `darstatus` of a post code, by name or DAR code
pub fn post_code_status(status: Option<&RawStatus>) -> Result<PostCodeStatus> {
    let parsed = match status {
        Some(raw) => match raw.code() {
            Some(3) => Some(PostCodeStatus::Active),
            Some(4) => Some(PostCodeStatus::Discontinued),
            Some(_) => None,
            None => match raw.name().as_deref() {
                Some("active" | "gældende") => Some(PostCodeStatus::Active),
                Some("discontinued" | "nedlagt") => Some(PostCodeStatus::Discontinued),
                _ => None,
            },
        },
        None => None,
    };
    parsed.ok_or_else(|| DawaError::unknown_status("post code", describe_status(status)))
}

/// Status of a named road / municipality relation
pub fn named_road_municipal_district_status(
    status: Option<&RawStatus>,
) -> Result<NamedRoadMunicipalDistrictStatus> {
    match status.and_then(RawStatus::code) {
        Some(2) => Ok(NamedRoadMunicipalDistrictStatus::Temporary),
        Some(3) => Ok(NamedRoadMunicipalDistrictStatus::Active),
        Some(4) => Ok(NamedRoadMunicipalDistrictStatus::Discontinued),
        Some(5) => Ok(NamedRoadMunicipalDistrictStatus::Canceled),
        _ => Err(DawaError::unknown_status(
            "named road municipal district",
            describe_status(status),
        )),
    }
}

impl ReplicationEntity for AccessAddress {
    type Wire = ReplicationAccessAddress;
    const ENTITY_NAME: &'static str = "adgangsadresse";

    fn from_replication(wire: Self::Wire) -> Result<Option<Self>> {
        let id = parse_id(&wire.id)?;
        let Some(road_id) = wire.road_id.as_deref() else {
            log_warning("Skipping access address without navngivenvej_id", Some(&id.to_string()));
            return Ok(None);
        };

        Self {
            id,
            created: wire.created,
            updated: wire.updated,
            municipal_code: wire.municipal_code,
            road_code: wire.road_code,
            house_number: house_number_or_placeholder(wire.house_number),
            post_district_code: wire.post_district_code,
            east_coordinate: wire.east_coordinate,
            north_coordinate: wire.north_coordinate,
            location_updated: wire.location_updated,
            supplementary_town_name: wire.supplementary_town_name,
            plot_id: wire.plot_id,
            road_id: parse_id(road_id)?,
            status: address_status(wire.status.as_ref(), "access address")?,
        }
        .validated()
        .map(Some)
    }
}

impl ReplicationEntity for UnitAddress {
    type Wire = ReplicationUnitAddress;
    const ENTITY_NAME: &'static str = "adresse";

    fn from_replication(wire: Self::Wire) -> Result<Option<Self>> {
        Self {
            id: parse_id(&wire.id)?,
            access_address_id: parse_id(&wire.access_address_id)?,
            status: address_status(wire.status.as_ref(), "unit address")?,
            floor_name: wire.floor_name,
            suit_name: wire.suit_name,
            created: wire.created,
            updated: wire.updated,
        }
        .validated()
        .map(Some)
    }
}

impl ReplicationEntity for Road {
    type Wire = ReplicationRoad;
    const ENTITY_NAME: &'static str = "navngivenvej";

    fn from_replication(wire: Self::Wire) -> Result<Option<Self>> {
        Self {
            id: parse_id(&wire.id)?,
            name: wire.name,
            status: road_status(wire.status.as_ref())?,
            created: wire.created,
            updated: wire.updated,
        }
        .validated()
        .map(Some)
    }
}

impl ReplicationEntity for PostCode {
    type Wire = ReplicationPostCode;
    const ENTITY_NAME: &'static str = "postnummer";

    fn from_replication(wire: Self::Wire) -> Result<Option<Self>> {
        Self {
            id: parse_id(&wire.id)?,
            number: wire.number,
            name: wire.name,
            status: post_code_status(wire.status.as_ref())?,
            created: wire.created,
            updated: wire.updated,
        }
        .validated()
        .map(Some)
    }
}

impl ReplicationEntity for NamedRoadMunicipalDistrict {
    type Wire = ReplicationNamedRoadMunicipalDistrict;
    const ENTITY_NAME: &'static str = "dar_navngivenvejkommunedel_aktuel";

    fn from_replication(wire: Self::Wire) -> Result<Option<Self>> {
        Self {
            id: parse_id(&wire.id)?,
            municipality_code: wire.municipality_code,
            road_code: wire.road_code,
            named_road_id: parse_id(&wire.named_road_id)?,
            status: named_road_municipal_district_status(wire.status.as_ref())?,
        }
        .validated()
        .map(Some)
    }
}
