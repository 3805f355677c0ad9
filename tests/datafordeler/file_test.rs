use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};

use crate::utils::{MockResponse, MockTransport, fixture_id, init_logging, query_param, zip_archive};
use dawa_address::{
    AccessAddress, AddressStatus, CancellationToken, DatafordelerClient, DatafordelerConfig, DawaError,
    Road, RoadStatus, UnitAddress,
};

const FILE_API_URL: &str = "http://files.test";
const GENERATION: i64 = 5;

fn catalog_entry(entity: &str, generation: i64) -> Value {
    json!({
        "fileName": format!("DAR_{entity}_{generation}.zip"),
        "register": "DAR",
        "entityName": entity,
        "typeOfDownload": "TotalDownload",
        "typeOfData": "Current",
        "generationNumber": generation,
        "version": "3.0.0",
        "containedFileFormat": "JSON"
    })
}

fn catalog() -> Value {
    let mut entries = Vec::new();
    for entity in ["Adressepunkt", "SupplerendeBynavn", "Postnummer", "Husnummer", "NavngivenVej"] {
        entries.push(catalog_entry(entity, GENERATION - 1));
        entries.push(catalog_entry(entity, GENERATION));
    }
    json!({ "availableFileDownloads": entries })
}

fn address_points() -> String {
    let points: Vec<Value> = (1..=3)
        .map(|n| {
            json!({
                "id_lokalId": fixture_id(3, n),
                "position": format!("POINT ({n}00.5 {n}000.25)"),
                "datafordelerOpdateringstid": "2019-01-01T00:00:00.000000+01:00"
            })
        })
        .collect();
    Value::Array(points).to_string()
}

fn supplementary_town_names() -> String {
    json!([{ "id_lokalId": fixture_id(4, 1), "navn": "Strøby" }]).to_string()
}

fn post_codes() -> String {
    json!([{
        "id_lokalId": fixture_id(5, 1),
        "status": "3",
        "postnr": "4671",
        "navn": "Strøby",
        "virkningFra": "2000-01-01T00:00:00.000000+01:00",
        "datafordelerOpdateringstid": null
    }])
    .to_string()
}

fn husnumre() -> String {
    let records: Vec<Value> = [(1, 1, "3"), (2, 2, "3"), (3, 3, "4"), (4, 99, "3")]
        .into_iter()
        .map(|(n, point, status)| {
            json!({
                "id_lokalId": fixture_id(1, n),
                "status": status,
                "virkningFra": "2019-05-01T10:00:00.000000+02:00",
                "datafordelerOpdateringstid": "2020-01-02T03:04:05.000000+01:00",
                "husnummertekst": if n == 2 { String::new() } else { n.to_string() },
                "vejmidte": "0336-0100",
                "jordstykke": null,
                "adgangspunkt": fixture_id(3, point),
                "kommuneinddeling": "0336",
                "postnummer": fixture_id(5, 1),
                "supplerendeBynavn": if n == 1 { Value::String(fixture_id(4, 1)) } else { Value::Null },
                "navngivenVej": fixture_id(2, 1)
            })
        })
        .collect();
    Value::Array(records).to_string()
}

/// Road file as newline-delimited JSON
fn navngivne_veje() -> String {
    [("3", 1), ("2", 2), ("3", 3)]
        .into_iter()
        .map(|(status, n)| {
            json!({
                "id_lokalId": fixture_id(2, n),
                "status": status,
                "vejnavn": format!("Vej {n}"),
                "virkningFra": "2010-01-01T00:00:00.000000+01:00"
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn file_api(url: &str) -> MockResponse {
    if url.contains("/FileDownloads/GetAvailableFileDownloads?") {
        return MockResponse::json(&catalog());
    }
    assert!(url.contains("/FileDownloads/GetFile?"), "unexpected url {url}");
    assert_eq!(query_param(url, "GenerationNumber"), Some("5"));

    let content = match query_param(url, "EntityName") {
        Some("Adressepunkt") => address_points(),
        Some("SupplerendeBynavn") => supplementary_town_names(),
        Some("Postnummer") => post_codes(),
        Some("Husnummer") => husnumre(),
        Some("NavngivenVej") => navngivne_veje(),
        other => panic!("unexpected entity {other:?}"),
    };
    MockResponse::ok(zip_archive("data/export.json", &content))
}

fn client(transport: &Arc<MockTransport>, temp_dir: &Path) -> DatafordelerClient<Arc<MockTransport>> {
    init_logging();
    DatafordelerClient::with_transport(
        Arc::clone(transport),
        DatafordelerConfig {
            file_api_base_url: FILE_API_URL.to_string(),
            temp_dir: Some(temp_dir.to_path_buf()),
            ..DatafordelerConfig::default()
        }
        .with_api_key("secret"),
    )
}

fn is_empty_dir(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

#[tokio::test]
async fn test_access_addresses_from_file() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());

    let addresses: Vec<AccessAddress> = client
        .access_addresses_from_file(None, &CancellationToken::new())
        .try_collect()
        .await?;

    // The husnummer with a dangling address point is dropped
    assert_eq!(addresses.len(), 3);

    let first = &addresses[0];
    assert_eq!(first.id.to_string(), fixture_id(1, 1));
    assert_eq!(first.post_district_code, "4671");
    assert_eq!(first.supplementary_town_name.as_deref(), Some("Strøby"));
    assert_eq!(first.east_coordinate, Some(100.5));
    assert_eq!(first.north_coordinate, Some(1000.25));
    assert_eq!(first.road_code, "0100");
    assert_eq!(first.municipal_code, "0336");
    assert!(first.location_updated.is_some());

    assert_eq!(addresses[1].house_number, "?");
    assert!(addresses[1].supplementary_town_name.is_none());
    assert_eq!(addresses[2].status, AddressStatus::Discontinued);

    let downloads: Vec<String> = transport
        .requests()
        .iter()
        .filter(|url| url.contains("/GetFile?"))
        .filter_map(|url| query_param(url, "EntityName").map(str::to_string))
        .collect();
    assert_eq!(downloads, vec!["Adressepunkt", "SupplerendeBynavn", "Postnummer", "Husnummer"]);

    assert!(is_empty_dir(temp.path()));
    Ok(())
}

#[tokio::test]
async fn test_access_address_status_filter() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());
    let statuses = HashSet::from([AddressStatus::Active]);

    let addresses: Vec<AccessAddress> = client
        .access_addresses_from_file(Some(&statuses), &CancellationToken::new())
        .try_collect()
        .await?;

    assert_eq!(addresses.len(), 2);
    assert!(addresses.iter().all(|address| statuses.contains(&address.status)));
    Ok(())
}

#[tokio::test]
async fn test_flat_file_with_status_filter() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());
    let statuses = HashSet::from([RoadStatus::Effective]);

    let roads: Vec<Road> = client
        .get_all_from_file::<Road>(Some(&statuses), &CancellationToken::new())
        .try_collect()
        .await?;

    let names: Vec<&str> = roads.iter().map(|road| road.name.as_str()).collect();
    assert_eq!(names, vec!["Vej 1", "Vej 3"]);

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with(&format!(
        "{FILE_API_URL}/FileDownloads/GetAvailableFileDownloads?Register=DAR&format=JSON&apikey=secret"
    )));
    assert_eq!(
        requests[1],
        format!(
            "{FILE_API_URL}/FileDownloads/GetFile?Register=DAR&EntityName=NavngivenVej&TypeOfDownload=TotalDownload&TypeOfData=Current&Format=JSON&GenerationNumber=5&apikey=secret"
        )
    );
    Ok(())
}

#[tokio::test]
async fn test_temp_dir_removed_when_stream_dropped_early() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());
    let cancel = CancellationToken::new();

    let mut roads = client.get_all_from_file::<Road>(None, &cancel);
    let first = roads.next().await.unwrap()?;
    assert_eq!(first.name, "Vej 1");
    assert!(!is_empty_dir(temp.path()));

    drop(roads);
    assert!(is_empty_dir(temp.path()));
    Ok(())
}

#[tokio::test]
async fn test_missing_file_in_catalog() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());

    let result: dawa_address::Result<Vec<UnitAddress>> = client
        .get_all_from_file::<UnitAddress>(None, &CancellationToken::new())
        .try_collect()
        .await;

    assert!(matches!(result, Err(DawaError::FileNotFound(entity)) if entity == "Adresse"));
    assert_eq!(transport.requests().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_corrupt_archive_fails_and_cleans_up() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(|url| {
        if url.contains("GetAvailableFileDownloads") {
            MockResponse::json(&catalog())
        } else {
            MockResponse::ok("this is not a zip archive")
        }
    });
    let client = client(&transport, temp.path());

    let result: dawa_address::Result<Vec<Road>> = client
        .get_all_from_file::<Road>(None, &CancellationToken::new())
        .try_collect()
        .await;

    assert!(matches!(result, Err(DawaError::Archive(_))));
    assert!(is_empty_dir(temp.path()));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_file_download() -> dawa_address::Result<()> {
    let temp = tempfile::tempdir()?;
    let transport = MockTransport::new(file_api);
    let client = client(&transport, temp.path());
    let cancel = CancellationToken::new();
    cancel.cancel();

    let mut roads = client.get_all_from_file::<Road>(None, &cancel);
    assert!(roads.next().await.unwrap().unwrap_err().is_cancelled());
    assert!(roads.next().await.is_none());
    assert!(transport.requests().is_empty());
    assert!(is_empty_dir(temp.path()));
    Ok(())
}
