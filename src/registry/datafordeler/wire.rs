//! Record shapes of the DAR REST service and the DAR bulk files
//!
//! REST pages queried with nested data carry small nested objects for
//! related entities; bulk files and flat pages carry bare ids. Both are
//! read through [`Reference`].

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::registry::wire::{RawStatus, Reference};
use crate::utils::datetime::{deserialize_optional_timestamp, deserialize_timestamp};

/// Nested `adgangspunkt` of a husnummer, also the record shape of the `Adressepunkt` file
#[derive(Debug, Clone, Deserialize)]
pub struct DafAddressPoint {
    #[serde(rename = "id_lokalId", default)]
    pub id: String,
    /// WKT point
    pub position: String,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
}

/// Nested `kommuneinddeling`
///
/// Carries `id`, `kommunekode` or both.
#[derive(Debug, Clone, Deserialize)]
pub struct DafMunicipality {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "kommunekode", default)]
    pub code: Option<String>,
}

impl DafMunicipality {
    /// `kommunekode` when present, otherwise `id`
    #[must_use]
    pub fn municipal_code(&self) -> Option<&str> {
        first_non_blank(self.code.as_deref(), self.id.as_deref())
    }
}

fn first_non_blank<'a>(preferred: Option<&'a str>, fallback: Option<&'a str>) -> Option<&'a str> {
    preferred
        .filter(|value| !value.trim().is_empty())
        .or_else(|| fallback.filter(|value| !value.trim().is_empty()))
}

/// Nested `postnummer`
#[derive(Debug, Clone, Deserialize)]
pub struct DafPostalDistrict {
    #[serde(rename = "id_lokalId", default)]
    pub id: Option<String>,
    #[serde(rename = "postnr")]
    pub number: String,
}

/// Nested `supplerendeBynavn`, also the record shape of the `SupplerendeBynavn` file
#[derive(Debug, Clone, Deserialize)]
pub struct DafSupplementaryTownName {
    #[serde(rename = "id_lokalId", default)]
    pub id: String,
    #[serde(rename = "navn", default)]
    pub name: Option<String>,
}

/// `Husnummer` as returned by the REST service with nested data
#[derive(Debug, Clone, Deserialize)]
pub struct DafAccessAddress {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "virkningFra", deserialize_with = "deserialize_timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "husnummertekst", default)]
    pub house_number_text: Option<String>,
    #[serde(rename = "vejmidte")]
    pub road_center: String,
    #[serde(rename = "jordstykke", default)]
    pub plot: Option<Reference>,
    #[serde(rename = "adgangspunkt")]
    pub address_point: DafAddressPoint,
    #[serde(rename = "kommuneinddeling")]
    pub municipality: DafMunicipality,
    #[serde(rename = "postnummer")]
    pub postal_district: DafPostalDistrict,
    #[serde(rename = "supplerendeBynavn", default)]
    pub supplementary_town_name: Option<DafSupplementaryTownName>,
    #[serde(rename = "navngivenVej", default)]
    pub named_road: Option<Reference>,
}

/// `Husnummer` as stored in the bulk file, with bare foreign keys
#[derive(Debug, Clone, Deserialize)]
pub struct DafFileAccessAddress {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "virkningFra", deserialize_with = "deserialize_timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "husnummertekst", default)]
    pub house_number_text: Option<String>,
    #[serde(rename = "vejmidte")]
    pub road_center: String,
    #[serde(rename = "jordstykke", default)]
    pub plot: Option<Reference>,
    #[serde(rename = "adgangspunkt", default)]
    pub address_point: Option<Reference>,
    #[serde(rename = "kommuneinddeling", default)]
    pub municipality: Option<String>,
    #[serde(rename = "kommunekode", default)]
    pub code: Option<String>,
    #[serde(rename = "postnummer", default)]
    pub postal_district: Option<Reference>,
    #[serde(rename = "supplerendeBynavn", default)]
    pub supplementary_town_name: Option<Reference>,
    #[serde(rename = "navngivenVej", default)]
    pub named_road: Option<Reference>,
}

impl DafFileAccessAddress {
    /// `kommunekode` when present, otherwise `kommuneinddeling`
    #[must_use]
    pub fn municipal_code(&self) -> Option<&str> {
        first_non_blank(self.code.as_deref(), self.municipality.as_deref())
    }
}

/// `Adresse` (REST and bulk file)
#[derive(Debug, Clone, Deserialize)]
pub struct DafUnitAddress {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "virkningFra", deserialize_with = "deserialize_timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
    #[serde(rename = "etagebetegnelse", default)]
    pub floor_name: Option<String>,
    #[serde(rename = "dørbetegnelse", default)]
    pub suit_name: Option<String>,
    #[serde(rename = "husnummer", default)]
    pub access_address: Option<Reference>,
}

/// `NavngivenVej` (REST and bulk file)
#[derive(Debug, Clone, Deserialize)]
pub struct DafRoad {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "vejnavn")]
    pub name: String,
    #[serde(rename = "virkningFra", deserialize_with = "deserialize_timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
}

/// `Postnummer` (REST and bulk file)
#[derive(Debug, Clone, Deserialize)]
pub struct DafPostCode {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "postnr")]
    pub number: String,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "virkningFra", deserialize_with = "deserialize_timestamp")]
    pub effective_from: DateTime<Utc>,
    #[serde(
        rename = "datafordelerOpdateringstid",
        default,
        deserialize_with = "deserialize_optional_timestamp"
    )]
    pub updated: Option<DateTime<Utc>>,
}

/// `NavngivenVejKommunedel` (REST and bulk file)
#[derive(Debug, Clone, Deserialize)]
pub struct DafNamedRoadMunicipalDistrict {
    #[serde(rename = "id_lokalId")]
    pub id: String,
    #[serde(default)]
    pub status: Option<RawStatus>,
    #[serde(rename = "kommune", default)]
    pub municipality_code: Option<String>,
    #[serde(rename = "vejkode", default)]
    pub road_code: Option<String>,
    #[serde(rename = "navngivenVej", default)]
    pub named_road: Option<Reference>,
}

/// Response of `GetAvailableFileDownloads`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileCatalog {
    pub available_file_downloads: Vec<FileDownload>,
}

/// One downloadable file in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDownload {
    pub file_name: String,
    pub register: String,
    pub entity_name: String,
    pub type_of_download: String,
    pub type_of_data: String,
    pub generation_number: i64,
    pub version: String,
    pub contained_file_format: String,
}

impl FileDownload {
    /// Whether this is a current, complete, version 3 JSON dump of `entity_name`
    #[must_use]
    pub fn is_full_json_dump_of(&self, entity_name: &str) -> bool {
        self.entity_name.eq_ignore_ascii_case(entity_name)
            && self.contained_file_format.eq_ignore_ascii_case("JSON")
            && self.version.trim().starts_with('3')
            && self.type_of_download.eq_ignore_ascii_case("TotalDownload")
            && self.type_of_data.eq_ignore_ascii_case("Current")
    }
}

/// Pick the newest full JSON dump of `entity_name`
#[must_use]
pub fn select_latest_file<'a>(files: &'a [FileDownload], entity_name: &str) -> Option<&'a FileDownload> {
    files
        .iter()
        .filter(|file| file.is_full_json_dump_of(entity_name))
        .max_by_key(|file| file.generation_number)
}
