//! Record shapes of the replication API (`udtraek` / `haendelser` lines)

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::registry::wire::RawStatus;
use crate::utils::datetime::{deserialize_optional_timestamp, deserialize_timestamp};

/// `adgangsadresse` record
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationAccessAddress {
    pub id: String,
    #[serde(rename = "oprettet", deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(rename = "ændret", default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "kommunekode")]
    pub municipal_code: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "vejkode")]
    pub road_code: String,
    #[serde(rename = "husnr", default)]
    pub house_number: Option<String>,
    #[serde(rename = "postnr")]
    pub post_district_code: String,
    #[serde(rename = "etrs89koordinat_øst", default)]
    pub east_coordinate: Option<f64>,
    #[serde(rename = "etrs89koordinat_nord", default)]
    pub north_coordinate: Option<f64>,
    #[serde(
        rename = "adressepunktændringsdato",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub location_updated: Option<DateTime<Utc>>,
    #[serde(rename = "supplerendebynavn", default)]
    pub supplementary_town_name: Option<String>,
    #[serde(rename = "matrikelnr", default)]
    pub plot_id: Option<String>,
    #[serde(rename = "navngivenvej_id", default)]
    pub road_id: Option<String>,
}

/// `adresse` record
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationUnitAddress {
    pub id: String,
    #[serde(rename = "adgangsadresseid")]
    pub access_address_id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "etage", default)]
    pub floor_name: Option<String>,
    #[serde(rename = "dør", default)]
    pub suit_name: Option<String>,
    #[serde(rename = "oprettet", deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(rename = "ændret", default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// `navngivenvej` record
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationRoad {
    pub id: String,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "darstatus", default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "oprettet", deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(rename = "ændret", default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// `postnummer` record
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationPostCode {
    pub id: String,
    #[serde(rename = "nr")]
    pub number: String,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "darstatus", default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "oprettet", deserialize_with = "deserialize_timestamp")]
    pub created: DateTime<Utc>,
    #[serde(rename = "ændret", default, deserialize_with = "deserialize_optional_timestamp")]
    pub updated: Option<DateTime<Utc>>,
}

/// `dar_navngivenvejkommunedel_aktuel` record
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationNamedRoadMunicipalDistrict {
    pub id: String,
    #[serde(rename = "kommune", default)]
    pub municipality_code: Option<String>,
    #[serde(rename = "vejkode", default)]
    pub road_code: Option<String>,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "navngivenvej_id")]
    pub named_road_id: String,
}
