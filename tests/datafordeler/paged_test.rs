use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{StreamExt, TryStreamExt};
use serde_json::{Value, json};

use crate::utils::{MockResponse, MockTransport, fixture_id, init_logging, query_param};
use dawa_address::{
    AccessAddress, AddressStatus, CancellationToken, DatafordelerClient, DatafordelerConfig, DawaError,
    PostCode, Road, RoadStatus,
};

const BASE_URL: &str = "http://dar.test/rest";

fn client(transport: &Arc<MockTransport>, config: DatafordelerConfig) -> DatafordelerClient<Arc<MockTransport>> {
    init_logging();
    DatafordelerClient::with_transport(
        Arc::clone(transport),
        DatafordelerConfig {
            base_url: BASE_URL.to_string(),
            ..config
        },
    )
}

fn husnummer(n: usize, with_named_road: bool) -> Value {
    let mut record = json!({
        "id_lokalId": fixture_id(1, n),
        "status": "3",
        "virkningFra": "2019-05-01T10:00:00.000000+02:00",
        "datafordelerOpdateringstid": "2020-01-02T03:04:05.000000+01:00",
        "husnummertekst": format!("{n}"),
        "vejmidte": "0101-0512",
        "jordstykke": null,
        "adgangspunkt": {
            "id_lokalId": fixture_id(3, n),
            "position": "POINT (723665.84 6175627.16)",
            "datafordelerOpdateringstid": "2019-01-01T00:00:00.000000+01:00"
        },
        "kommuneinddeling": {"id": "389103", "kommunekode": "0101", "navn": "København"},
        "postnummer": {"postnr": "1620"},
        "supplerendeBynavn": null
    });
    if with_named_road {
        record["navngivenVej"] = json!({"id_lokalId": fixture_id(2, 1)});
    }
    record
}

fn navngiven_vej(n: usize, status: &str) -> Value {
    json!({
        "id_lokalId": fixture_id(2, n),
        "status": status,
        "vejnavn": format!("Vej {n}"),
        "virkningFra": "2010-01-01T00:00:00.000000+01:00",
        "datafordelerOpdateringstid": null
    })
}

/// Serve `total` husnumre in pages sized by the request
fn paged_husnumre(total: usize) -> impl Fn(&str) -> MockResponse + Send + Sync {
    move |url| {
        let page: usize = query_param(url, "page").unwrap().parse().unwrap();
        let page_size: usize = query_param(url, "pagesize").unwrap().parse().unwrap();
        let start = (page - 1) * page_size;
        let end = (start + page_size).min(total);
        let records: Vec<Value> = (start..end).map(|n| husnummer(n, true)).collect();
        MockResponse::json(&Value::Array(records))
    }
}

#[tokio::test]
async fn test_pages_until_short_page() -> dawa_address::Result<()> {
    let transport = MockTransport::new(paged_husnumre(250));
    let client = client(&transport, DatafordelerConfig::default());

    let addresses: Vec<AccessAddress> = client
        .get_by_date_range::<AccessAddress>(
            DateTime::<Utc>::MIN_UTC,
            Some(Utc::now()),
            Some(AddressStatus::Active),
            &CancellationToken::new(),
        )
        .try_collect()
        .await?;

    assert_eq!(addresses.len(), 250);
    assert!(addresses.iter().all(|address| address.status == AddressStatus::Active));
    assert!(addresses.iter().all(|address| address.municipal_code == "0101"));

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with(&format!("{BASE_URL}/Husnummer?DAFTimestampFra=0001-01-01&")));
    assert_eq!(query_param(&requests[0], "page"), Some("1"));
    assert_eq!(query_param(&requests[1], "page"), Some("2"));
    assert_eq!(query_param(&requests[1], "pagesize"), Some("200"));
    assert_eq!(query_param(&requests[1], "status"), Some("3"));
    assert_eq!(query_param(&requests[1], "Format"), Some("JSON"));
    assert_eq!(query_param(&requests[1], "meddybde"), None);
    Ok(())
}

#[tokio::test]
async fn test_request_count_matches_page_math() -> dawa_address::Result<()> {
    // 400 records with page size 200: two full pages and an empty third page
    let transport = MockTransport::new(paged_husnumre(400));
    let client = client(&transport, DatafordelerConfig::default());

    let count = client
        .get_by_date_range::<AccessAddress>(DateTime::<Utc>::MIN_UTC, None, None, &CancellationToken::new())
        .try_fold(0usize, |count, _| async move { Ok(count + 1) })
        .await?;

    assert_eq!(count, 400);
    assert_eq!(transport.requests().len(), 3);
    assert_eq!(query_param(&transport.requests()[0], "DAFTimestampTil"), None);
    assert_eq!(query_param(&transport.requests()[0], "status"), None);
    Ok(())
}

#[tokio::test]
async fn test_legacy_access_address_page_size() -> dawa_address::Result<()> {
    let transport = MockTransport::new(paged_husnumre(10));
    let client = client(&transport, DatafordelerConfig::legacy());

    let addresses: Vec<AccessAddress> = client
        .get_by_date_range::<AccessAddress>(DateTime::<Utc>::MIN_UTC, None, None, &CancellationToken::new())
        .try_collect()
        .await?;

    assert_eq!(addresses.len(), 10);
    assert_eq!(query_param(&transport.requests()[0], "pagesize"), Some("5000"));
    Ok(())
}

#[tokio::test]
async fn test_access_address_without_named_road_is_skipped() -> dawa_address::Result<()> {
    let page = json!([husnummer(1, true), husnummer(2, false), husnummer(3, true)]);
    let transport = MockTransport::new(move |_| MockResponse::json(&page));
    let client = client(&transport, DatafordelerConfig::default());

    let addresses: Vec<AccessAddress> = client
        .get_by_date_range::<AccessAddress>(DateTime::<Utc>::MIN_UTC, None, None, &CancellationToken::new())
        .try_collect()
        .await?;

    let house_numbers: Vec<&str> = addresses.iter().map(|a| a.house_number.as_str()).collect();
    assert_eq!(house_numbers, vec!["1", "3"]);
    Ok(())
}

#[tokio::test]
async fn test_flat_entities_disable_nested_data() -> dawa_address::Result<()> {
    let page = json!([navngiven_vej(1, "3"), navngiven_vej(2, "2")]);
    let transport = MockTransport::new(move |_| MockResponse::json(&page));
    let client = client(&transport, DatafordelerConfig::default());

    let roads: Vec<Road> = client
        .get_by_date_range::<Road>(DateTime::<Utc>::MIN_UTC, None, Some(RoadStatus::Temporary), &CancellationToken::new())
        .try_collect()
        .await?;

    assert_eq!(roads.len(), 2);
    assert_eq!(roads[0].status, RoadStatus::Effective);
    let url = &transport.requests()[0];
    assert!(url.starts_with(&format!("{BASE_URL}/Navngivenvej?")));
    assert_eq!(query_param(url, "meddybde"), Some("false"));
    assert_eq!(query_param(url, "status"), Some("2"));
    Ok(())
}

#[tokio::test]
async fn test_null_page_is_invalid_operation() {
    let transport = MockTransport::new(|_| MockResponse::ok("null"));
    let client = client(&transport, DatafordelerConfig::default());

    let result: dawa_address::Result<Vec<PostCode>> = client
        .get_by_date_range::<PostCode>(DateTime::<Utc>::MIN_UTC, None, None, &CancellationToken::new())
        .try_collect()
        .await;
    assert!(matches!(result, Err(DawaError::InvalidOperation(_))));
}

#[tokio::test]
async fn test_mapping_failure_ends_stream_after_valid_records() {
    let page = json!([navngiven_vej(1, "3"), navngiven_vej(2, "7"), navngiven_vej(3, "3")]);
    let transport = MockTransport::new(move |_| MockResponse::json(&page));
    let client = client(&transport, DatafordelerConfig::default());
    let cancel = CancellationToken::new();
    let mut roads = client.get_by_date_range::<Road>(DateTime::<Utc>::MIN_UTC, None, None, &cancel);

    assert!(roads.next().await.unwrap().is_ok());
    assert!(matches!(roads.next().await, Some(Err(DawaError::UnknownStatus { .. }))));
    assert!(roads.next().await.is_none());
}

#[tokio::test]
async fn test_http_error_is_fatal() {
    let transport = MockTransport::new(|_| MockResponse::status(401));
    let client = client(&transport, DatafordelerConfig::default());

    let result: dawa_address::Result<Vec<Road>> = client
        .get_by_date_range::<Road>(DateTime::<Utc>::MIN_UTC, None, None, &CancellationToken::new())
        .try_collect()
        .await;
    assert!(matches!(result, Err(DawaError::HttpStatus { status: 401, .. })));
}

#[tokio::test]
async fn test_cancellation_between_pages() {
    let transport = MockTransport::new(paged_husnumre(1000));
    let client = client(&transport, DatafordelerConfig::default());
    let cancel = CancellationToken::new();
    let mut stream = client.get_by_date_range::<AccessAddress>(DateTime::<Utc>::MIN_UTC, None, None, &cancel);

    assert!(stream.next().await.unwrap().is_ok());
    cancel.cancel();

    let mut delivered = 1;
    let error = loop {
        match stream.next().await {
            Some(Ok(_)) => delivered += 1,
            Some(Err(error)) => break error,
            None => panic!("stream ended without reporting cancellation"),
        }
    };

    assert!(error.is_cancelled());
    assert_eq!(delivered, 200);
    assert_eq!(transport.requests().len(), 1);
    assert!(stream.next().await.is_none());
}
