//! Normalized address registry records
//!
//! Every retrieval mode of both registries produces these types, whatever
//! wire shape the data arrived in.

pub mod access_address;
pub mod named_road_municipal_district;
pub mod post_code;
pub mod road;
pub mod types;
pub mod unit_address;

pub use access_address::{AccessAddress, HOUSE_NUMBER_PLACEHOLDER};
pub use named_road_municipal_district::NamedRoadMunicipalDistrict;
pub use post_code::PostCode;
pub use road::Road;
pub use types::{
    AddressStatus, ChangeOperation, EntityChange, NamedRoadMunicipalDistrictStatus,
    PostCodeStatus, RoadStatus, TransactionCursor,
};
pub use unit_address::UnitAddress;
