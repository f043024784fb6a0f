//! SWPC client against a local mock server.
//!
//! Covers the failure-to-absent contract: every HTTP or decoding failure
//! surfaces as a typed `FeedError` from `fetch_payload` and as `None` from
//! `fetch`.

use swmon_service::config::FeedConfig;
use swmon_service::feeds::Feed;
use swmon_service::ingest::swpc::SwpcClient;
use swmon_service::ingest::{FeedPayload, FeedSource};
use swmon_service::model::FeedError;

fn client_for(server: &mockito::Server) -> SwpcClient {
    let config = FeedConfig {
        base_url: server.url(),
        timeout_secs: 5,
        ..FeedConfig::default()
    };
    SwpcClient::new(&config).expect("client should build")
}

#[test]
fn test_table_feed_is_fetched_and_normalized() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/products/solar-wind/plasma-7-day.json")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"[["time_tag","density","speed","temperature"],
                ["2024-05-10 19:45:00.000","12.1","780.0","410000"],
                ["2024-05-10 19:46:00.000",null,"820.5","452000"]]"#,
        )
        .create();

    let client = client_for(&server);
    let series = client
        .fetch_series(Feed::SolarWindPlasma)
        .expect("feed should be available");

    mock.assert();
    assert_eq!(series.len(), 2);
    let latest = series.latest().unwrap();
    assert_eq!(latest.value("speed"), Some(820.5));
    assert_eq!(latest.value("density"), None);
}

#[test]
fn test_records_feed_keeps_labels_as_tags() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/json/goes/primary/xrays-7-day.json")
        .with_status(200)
        .with_body(r#"[{"time_tag":"2024-05-10T19:45:00Z","satellite":16,"flux":2.1e-6,"energy":"0.1-0.8nm"}]"#)
        .create();

    let payload = client_for(&server)
        .fetch_payload(Feed::XrayFlux)
        .expect("feed should decode");
    assert!(matches!(payload, FeedPayload::Records(ref r) if r.len() == 1));
}

#[test]
fn test_server_error_is_http_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/products/solar-wind/mag-7-day.json")
        .with_status(500)
        .create();

    let client = client_for(&server);
    assert_eq!(client.fetch_payload(Feed::SolarWindMag), Err(FeedError::Http(500)));
    assert!(client.fetch(Feed::SolarWindMag).is_none());
}

#[test]
fn test_invalid_json_is_parse_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/json/regions/solar-regions.json")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create();

    let client = client_for(&server);
    assert!(matches!(
        client.fetch_payload(Feed::SolarRegions),
        Err(FeedError::Parse(_))
    ));
    assert!(client.fetch_series(Feed::SolarRegions).is_none());
}

#[test]
fn test_wrong_shape_is_shape_error() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/products/solar-wind/plasma-1-day.json")
        .with_status(200)
        .with_body(r#"{"time_tag":"2024-05-10","speed":400}"#)
        .create();

    let client = client_for(&server);
    assert!(matches!(
        client.fetch_payload(Feed::AcePlasma),
        Err(FeedError::Shape { .. })
    ));
}

#[test]
fn test_fetch_bytes() {
    let mut server = mockito::Server::new();
    server
        .mock("GET", "/images/sun.png")
        .with_status(200)
        .with_body(vec![0x89, b'P', b'N', b'G'])
        .create();
    server.mock("GET", "/images/gone.png").with_status(404).create();

    let client = client_for(&server);
    let url = format!("{}/images/sun.png", server.url());
    assert_eq!(client.fetch_bytes(&url), Ok(vec![0x89, b'P', b'N', b'G']));

    let missing = format!("{}/images/gone.png", server.url());
    assert_eq!(client.fetch_bytes(&missing), Err(FeedError::Http(404)));
}
