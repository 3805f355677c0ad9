//! Mapping of DAR records into the normalized model
//!
//! Every entity kind has its own status table. The tables overlap but are
//! not identical (post codes only know 3 and 4), so they are kept apart.

use std::fmt;
use std::hash::Hash;

use serde::de::DeserializeOwned;

use super::wire::{
    DafAccessAddress, DafFileAccessAddress, DafNamedRoadMunicipalDistrict, DafPostCode, DafRoad,
    DafUnitAddress,
};
use super::xref::CrossReferenceIndex;
use crate::config::DatafordelerConfig;
use crate::error::{DawaError, Result};
use crate::models::access_address::house_number_or_placeholder;
use crate::models::{
    AccessAddress, AddressStatus, NamedRoadMunicipalDistrict, NamedRoadMunicipalDistrictStatus,
    PostCode, PostCodeStatus, Road, RoadStatus, UnitAddress,
};
use crate::registry::geometry::{parse_point, road_code_from_centerline};
use crate::registry::wire::{RawStatus, describe_status, parse_id};
use crate::utils::log_warning;

/// An entity served by the DAR REST service
pub trait DatafordelerEntity: Sized + Send + 'static {
    /// Record shape of a REST page
    type Wire: DeserializeOwned + Send + 'static;

    /// Status enum used for filtering
    type Status: Copy + Eq + Hash + fmt::Debug + Send + Sync + 'static;

    /// REST resource path
    const RESOURCE: &'static str;

    /// Entity name in the file catalog
    const FILE_ENTITY: &'static str;

    /// Whether pages are requested with nested related objects
    const INCLUDE_NESTED: bool;

    /// Page size for REST queries
    fn page_size(config: &DatafordelerConfig) -> usize {
        config.page_size
    }

    /// DAR code of a status, for the `status=` query parameter
    fn status_code(status: Self::Status) -> u8;

    /// Status of a mapped record
    fn status(&self) -> Self::Status;

    /// Map one REST record; `Ok(None)` drops the record
    fn from_rest(wire: Self::Wire) -> Result<Option<Self>>;
}

/// An entity whose bulk file has the same shape as its REST records
///
/// Access addresses are not: their file needs a [`CrossReferenceIndex`].
pub trait FlatFileEntity: DatafordelerEntity {}

fn dar_code(status: Option<&RawStatus>) -> Option<i64> {
    status.and_then(RawStatus::code)
}

/// DAR status of a husnummer
pub fn access_address_status(status: Option<&RawStatus>) -> Result<AddressStatus> {
    match dar_code(status) {
        Some(2) => Ok(AddressStatus::Pending),
        Some(3) => Ok(AddressStatus::Active),
        Some(4) => Ok(AddressStatus::Discontinued),
        Some(5) => Ok(AddressStatus::Canceled),
        _ => Err(DawaError::unknown_status("access address", describe_status(status))),
    }
}

/// DAR code of an access address status
#[must_use]
pub const fn access_address_status_code(status: AddressStatus) -> u8 {
    match status {
        AddressStatus::Pending => 2,
        AddressStatus::Active => 3,
        AddressStatus::Discontinued => 4,
        AddressStatus::Canceled => 5,
    }
}

/// DAR status of an adresse
pub fn unit_address_status(status: Option<&RawStatus>) -> Result<AddressStatus> {
    match dar_code(status) {
        Some(2) => Ok(AddressStatus::Pending),
        Some(3) => Ok(AddressStatus::Active),
        Some(4) => Ok(AddressStatus::Discontinued),
        Some(5) => Ok(AddressStatus::Canceled),
        _ => Err(DawaError::unknown_status("unit address", describe_status(status))),
    }
}

/// DAR code of a unit address status
#[must_use]
pub const fn unit_address_status_code(status: AddressStatus) -> u8 {
    match status {
        AddressStatus::Pending => 2,
        AddressStatus::Active => 3,
        AddressStatus::Discontinued => 4,
        AddressStatus::Canceled => 5,
    }
}

/// DAR status of a navngiven vej
pub fn road_status(status: Option<&RawStatus>) -> Result<RoadStatus> {
    match dar_code(status) {
        Some(2) => Ok(RoadStatus::Temporary),
        Some(3) => Ok(RoadStatus::Effective),
        Some(4) => Ok(RoadStatus::Discontinued),
        Some(5) => Ok(RoadStatus::Canceled),
        _ => Err(DawaError::unknown_status("road", describe_status(status))),
    }
}

/// DAR code of a road status
#[must_use]
pub const fn road_status_code(status: RoadStatus) -> u8 {
    match status {
        RoadStatus::Temporary => 2,
        RoadStatus::Effective => 3,
        RoadStatus::Discontinued => 4,
        RoadStatus::Canceled => 5,
    }
}

/// DAR status of a postnummer
pub fn post_code_status(status: Option<&RawStatus>) -> Result<PostCodeStatus> {
    match dar_code(status) {
        Some(3) => Ok(PostCodeStatus::Active),
        Some(4) => Ok(PostCodeStatus::Discontinued),
        _ => Err(DawaError::unknown_status("post code", describe_status(status))),
    }
}

/// DAR code of a post code status
#[must_use]
pub const fn post_code_status_code(status: PostCodeStatus) -> u8 {
    match status {
        PostCodeStatus::Active => 3,
        PostCodeStatus::Discontinued => 4,
    }
}

/// DAR status of a navngivenvejkommunedel
pub fn named_road_municipal_district_status(
    status: Option<&RawStatus>,
) -> Result<NamedRoadMunicipalDistrictStatus> {
    match dar_code(status) {
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

/// DAR code of a named road / municipality relation status
#[must_use]
pub const fn named_road_municipal_district_status_code(status: NamedRoadMunicipalDistrictStatus) -> u8 {
    match status {
        NamedRoadMunicipalDistrictStatus::Temporary => 2,
        NamedRoadMunicipalDistrictStatus::Active => 3,
        NamedRoadMunicipalDistrictStatus::Discontinued => 4,
        NamedRoadMunicipalDistrictStatus::Canceled => 5,
    }
}

/// Map a husnummer from a nested REST page
///
/// Husnumre without a named road are invalid upstream and are dropped.
pub fn map_access_address(wire: DafAccessAddress) -> Result<Option<AccessAddress>> {
    let id = parse_id(&wire.id)?;
    let Some(named_road) = wire.named_road else {
        log_warning("Skipping access address without named road", Some(&id.to_string()));
        return Ok(None);
    };

    let Some(municipal_code) = wire.municipality.municipal_code().map(str::to_string) else {
        log_warning("Skipping access address without municipality code", Some(&id.to_string()));
        return Ok(None);
    };

    let point = parse_point(&wire.address_point.position)?;

    let address = AccessAddress {
        id,
        created: wire.effective_from,
        updated: wire.updated,
        municipal_code,
        road_code: road_code_from_centerline(&wire.road_center),
        house_number: house_number_or_placeholder(wire.house_number_text),
        post_district_code: wire.postal_district.number,
        east_coordinate: Some(point.x),
        north_coordinate: Some(point.y),
        location_updated: wire.address_point.updated,
        supplementary_town_name: wire.supplementary_town_name.and_then(|town| town.name),
        plot_id: wire.plot.map(|plot| plot.id().to_string()),
        road_id: named_road.uuid()?,
        status: access_address_status(wire.status.as_ref())?,
    };

    address.validated().map(Some)
}

/// Map a husnummer from the bulk file, resolving its bare references
///
/// Dangling address point or post code references drop the record. An
/// unresolved supplementary town name only leaves that field empty.
pub fn map_file_access_address(
    wire: DafFileAccessAddress,
    index: &CrossReferenceIndex,
) -> Result<Option<AccessAddress>> {
    let id = parse_id(&wire.id)?;
    let target = id.to_string();

    let Some(named_road) = wire.named_road.as_ref() else {
        log_warning("Skipping access address without named road", Some(&target));
        return Ok(None);
    };

    let Some(municipal_code) = wire.municipal_code().map(str::to_string) else {
        log_warning("Skipping access address without municipality code", Some(&target));
        return Ok(None);
    };

    let Some(address_point_id) = wire.address_point.as_ref().map(|point| point.uuid()).transpose()? else {
        log_warning("Skipping access address without address point", Some(&target));
        return Ok(None);
    };
    let Some(location) = index.address_point(&address_point_id) else {
        log_warning(
            &format!("Skipping access address with unknown address point {address_point_id}"),
            Some(&target),
        );
        return Ok(None);
    };

    let Some(post_code_id) = wire.postal_district.as_ref().map(|post| post.uuid()).transpose()? else {
        log_warning("Skipping access address without post code", Some(&target));
        return Ok(None);
    };
    let Some(post_code) = index.post_code(&post_code_id) else {
        log_warning(
            &format!("Skipping access address with unknown post code {post_code_id}"),
            Some(&target),
        );
        return Ok(None);
    };

    let supplementary_town_name = match &wire.supplementary_town_name {
        Some(reference) => index
            .supplementary_town_name(&reference.uuid()?)
            .map(ToString::to_string),
        None => None,
    };

    let address = AccessAddress {
        id,
        created: wire.effective_from,
        updated: wire.updated,
        municipal_code,
        road_code: road_code_from_centerline(&wire.road_center),
        house_number: house_number_or_placeholder(wire.house_number_text),
        post_district_code: post_code.number.clone(),
        east_coordinate: Some(location.east),
        north_coordinate: Some(location.north),
        location_updated: location.updated,
        supplementary_town_name,
        plot_id: wire.plot.map(|plot| plot.id().to_string()),
        road_id: named_road.uuid()?,
        status: access_address_status(wire.status.as_ref())?,
    };

    address.validated().map(Some)
}

/// Map an adresse
pub fn map_unit_address(wire: DafUnitAddress) -> Result<UnitAddress> {
    let id = parse_id(&wire.id)?;
    let access_address = wire
        .access_address
        .ok_or_else(|| DawaError::validation(format!("unit address {id} has no husnummer")))?;

    UnitAddress {
        id,
        access_address_id: access_address.uuid()?,
        status: unit_address_status(wire.status.as_ref())?,
        floor_name: wire.floor_name,
        suit_name: wire.suit_name,
        created: wire.effective_from,
        updated: wire.updated,
    }
    .validated()
}

/// Map a navngiven vej
pub fn map_road(wire: DafRoad) -> Result<Road> {
    Road {
        id: parse_id(&wire.id)?,
        name: wire.name,
        status: road_status(wire.status.as_ref())?,
        created: wire.effective_from,
        updated: wire.updated,
    }
    .validated()
}

/// Map a postnummer
pub fn map_post_code(wire: DafPostCode) -> Result<PostCode> {
    PostCode {
        id: parse_id(&wire.id)?,
        number: wire.number,
        name: wire.name,
        status: post_code_status(wire.status.as_ref())?,
        created: wire.effective_from,
        updated: wire.updated,
    }
    .validated()
}

/// Map a navngivenvejkommunedel
pub fn map_named_road_municipal_district(
    wire: DafNamedRoadMunicipalDistrict,
) -> Result<NamedRoadMunicipalDistrict> {
    let id = parse_id(&wire.id)?;
    let named_road = wire.named_road.ok_or_else(|| {
        DawaError::validation(format!("named road municipal district {id} has no named road"))
    })?;

    NamedRoadMunicipalDistrict {
        id,
        municipality_code: wire.municipality_code,
        road_code: wire.road_code,
        named_road_id: named_road.uuid()?,
        status: named_road_municipal_district_status(wire.status.as_ref())?,
    }
    .validated()
}

impl DatafordelerEntity for AccessAddress {
    type Wire = DafAccessAddress;
    type Status = AddressStatus;
    const RESOURCE: &'static str = "Husnummer";
    const FILE_ENTITY: &'static str = "Husnummer";
    const INCLUDE_NESTED: bool = true;

    fn page_size(config: &DatafordelerConfig) -> usize {
        config.access_address_page_size
    }

    fn status_code(status: Self::Status) -> u8 {
        access_address_status_code(status)
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn from_rest(wire: Self::Wire) -> Result<Option<Self>> {
        map_access_address(wire)
    }
}

impl DatafordelerEntity for UnitAddress {
    type Wire = DafUnitAddress;
    type Status = AddressStatus;
    const RESOURCE: &'static str = "Adresse";
    const FILE_ENTITY: &'static str = "Adresse";
    const INCLUDE_NESTED: bool = false;

    fn status_code(status: Self::Status) -> u8 {
        unit_address_status_code(status)
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn from_rest(wire: Self::Wire) -> Result<Option<Self>> {
        map_unit_address(wire).map(Some)
    }
}

impl FlatFileEntity for UnitAddress {}

impl DatafordelerEntity for Road {
    type Wire = DafRoad;
    type Status = RoadStatus;
    const RESOURCE: &'static str = "Navngivenvej";
    const FILE_ENTITY: &'static str = "NavngivenVej";
    const INCLUDE_NESTED: bool = false;

    fn status_code(status: Self::Status) -> u8 {
        road_status_code(status)
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn from_rest(wire: Self::Wire) -> Result<Option<Self>> {
        map_road(wire).map(Some)
    }
}

impl FlatFileEntity for Road {}

impl DatafordelerEntity for PostCode {
    type Wire = DafPostCode;
    type Status = PostCodeStatus;
    const RESOURCE: &'static str = "postnummer";
    const FILE_ENTITY: &'static str = "Postnummer";
    const INCLUDE_NESTED: bool = true;

    fn status_code(status: Self::Status) -> u8 {
        post_code_status_code(status)
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn from_rest(wire: Self::Wire) -> Result<Option<Self>> {
        map_post_code(wire).map(Some)
    }
}

impl FlatFileEntity for PostCode {}

impl DatafordelerEntity for NamedRoadMunicipalDistrict {
    type Wire = DafNamedRoadMunicipalDistrict;
    type Status = NamedRoadMunicipalDistrictStatus;
    const RESOURCE: &'static str = "NavngivenvejKommunedel";
    const FILE_ENTITY: &'static str = "NavngivenVejKommunedel";
    const INCLUDE_NESTED: bool = false;

    fn status_code(status: Self::Status) -> u8 {
        named_road_municipal_district_status_code(status)
    }

    fn status(&self) -> Self::Status {
        self.status
    }

    fn from_rest(wire: Self::Wire) -> Result<Option<Self>> {
        map_named_road_municipal_district(wire).map(Some)
    }
}

impl FlatFileEntity for NamedRoadMunicipalDistrict {}
