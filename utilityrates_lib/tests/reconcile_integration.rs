use std::collections::HashMap;

use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use utilityrates_lib::reconcile::reconcile_state;
use utilityrates_lib::record::RateStructure;
use utilityrates_lib::reference::{
    GeoQueryPoint, KnownUtility, NetMeteringPolicy, NetMeteringType, ReferenceData,
};
use utilityrates_lib::{PacedClient, PacingConfig};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()
}

fn paced(uri: &str) -> PacedClient {
    PacedClient::with_base_url(uri, "TESTKEY", PacingConfig::immediate())
}

/// A two-point fixture state with two known majors, exercising dedup and the
/// direct-lookup backfill without touching the national tables.
fn fixture_reference() -> ReferenceData {
    let mut query_points = HashMap::new();
    query_points.insert(
        "ZZ".to_string(),
        vec![
            GeoQueryPoint {
                label: "North City".to_string(),
                lat: 10.0,
                lon: -70.0,
            },
            GeoQueryPoint {
                label: "South City".to_string(),
                lat: 20.0,
                lon: -71.0,
            },
        ],
    );

    let mut known_utilities = HashMap::new();
    known_utilities.insert(
        "ZZ".to_string(),
        vec![
            KnownUtility {
                name: "Alpha Power".to_string(),
                customer_count: 500000,
            },
            KnownUtility {
                name: "Gamma Energy".to_string(),
                customer_count: 250000,
            },
        ],
    );

    let mut state_avg_rates = HashMap::new();
    state_avg_rates.insert("ZZ".to_string(), 0.15);

    let mut net_metering = HashMap::new();
    net_metering.insert(
        "ZZ".to_string(),
        NetMeteringPolicy {
            has_net_metering: true,
            net_metering_type: NetMeteringType::Nem,
            export_rate: None,
        },
    );

    ReferenceData::new(query_points, known_utilities, state_avg_rates, net_metering)
}

fn rate_item(eiaid: i64, utility: &str, startdate: i64, rate: f64) -> serde_json::Value {
    json!({
        "eiaid": eiaid,
        "utility": utility,
        "startdate": startdate,
        "energyratestructure": [[{"rate": rate, "unit": "kWh"}]]
    })
}

#[tokio::test]
async fn delaware_with_no_api_data_synthesizes_delmarva() {
    let mock_server = MockServer::start().await;

    // Both geographic points and the direct lookup come back empty.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .mount(&mock_server)
        .await;

    let reference = ReferenceData::builtin();
    let client = paced(&mock_server.uri());
    let records = reconcile_state(&client, &reference, "DE", today()).await;

    assert_eq!(records.len(), 1);
    let delmarva = &records[0];
    assert_eq!(delmarva.utility_name, "Delmarva Power");
    assert_eq!(delmarva.state, "DE");
    assert_eq!(delmarva.customer_count, 310000);
    assert_eq!(delmarva.rate_structure, RateStructure::Tiered);
    assert_eq!(delmarva.residential_avg_rate, 0.1432);
    assert!(!delmarva.tou_available);
    assert!(!delmarva.demand_charges);
}

#[tokio::test]
async fn failed_queries_degrade_to_synthesized_records() {
    let mock_server = MockServer::start().await;

    // Every request fails; retries exhaust and the state still completes.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let reference = ReferenceData::builtin();
    let client = paced(&mock_server.uri());
    let records = reconcile_state(&client, &reference, "DE", today()).await;

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].utility_name, "Delmarva Power");
    assert_eq!(records[0].rate_structure, RateStructure::Tiered);
    assert_eq!(records[0].residential_avg_rate, 0.1432);
}

#[tokio::test]
async fn duplicate_utilities_across_points_keep_newest_rate() {
    let mock_server = MockServer::start().await;

    // North City sees Alpha (old schedule) and Beta.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("lat", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                rate_item(1, "Alpha Power", 100, 0.10),
                rate_item(2, "Beta Electric", 150, 0.20),
            ]
        })))
        .mount(&mock_server)
        .await;

    // South City sees Alpha again with a newer effective date.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("lat", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [rate_item(1, "Alpha Power", 200, 0.12)]
        })))
        .mount(&mock_server)
        .await;

    // Gamma never shows up geographically; the direct lookup finds it.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("ratesforutility", "Gamma Energy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [rate_item(9, "Gamma Energy Inc", 300, 0.09)]
        })))
        .mount(&mock_server)
        .await;

    let reference = fixture_reference();
    let client = paced(&mock_server.uri());
    let records = reconcile_state(&client, &reference, "ZZ", today()).await;

    assert_eq!(records.len(), 3);

    // Sorted by customer count descending.
    assert_eq!(records[0].utility_name, "Alpha Power");
    assert_eq!(records[0].customer_count, 500000);
    assert_eq!(records[0].residential_avg_rate, 0.12);
    assert_eq!(records[0].utility_id, "1");

    assert_eq!(records[1].utility_name, "Gamma Energy");
    assert_eq!(records[1].customer_count, 250000);
    assert_eq!(records[1].residential_avg_rate, 0.09);
    assert_eq!(records[1].utility_id, "9");

    assert_eq!(records[2].utility_name, "Beta Electric");
    assert_eq!(records[2].customer_count, 0);
    assert_eq!(records[2].residential_avg_rate, 0.20);

    // Identity is unique within the state.
    let mut ids: Vec<&str> = records.iter().map(|r| r.utility_id.as_str()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 3);

    // State policy is attached to every record.
    assert!(records.iter().all(|r| r.has_net_metering));
}

#[tokio::test]
async fn known_utility_found_geographically_is_not_looked_up_again() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("lat", "10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                rate_item(1, "Alpha Power", 100, 0.10),
                rate_item(9, "Gamma Energy Inc", 100, 0.11),
            ]
        })))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("lat", "20"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .mount(&mock_server)
        .await;

    // No direct lookups expected: both knowns matched by substring.
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("ratesforutility", "Alpha Power"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .expect(0)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("ratesforutility", "Gamma Energy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .expect(0)
        .mount(&mock_server)
        .await;

    let reference = fixture_reference();
    let client = paced(&mock_server.uri());
    let records = reconcile_state(&client, &reference, "ZZ", today()).await;

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].utility_name, "Alpha Power");
    assert_eq!(records[1].utility_name, "Gamma Energy Inc");
    assert_eq!(records[1].customer_count, 250000);
}

#[tokio::test]
async fn empty_direct_lookup_synthesizes_instead() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .mount(&mock_server)
        .await;

    let reference = fixture_reference();
    let client = paced(&mock_server.uri());
    let records = reconcile_state(&client, &reference, "ZZ", today()).await;

    // Both knowns synthesized from reference data, sorted by size.
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].utility_name, "Alpha Power");
    assert_eq!(records[1].utility_name, "Gamma Energy");
    assert!(records
        .iter()
        .all(|r| r.rate_structure == RateStructure::Tiered));
    assert!(records.iter().all(|r| r.residential_avg_rate == 0.15));
    assert!(records.iter().all(|r| r.utility_id.starts_with("name:")));
}
