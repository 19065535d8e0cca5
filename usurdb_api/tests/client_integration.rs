use usurdb_api::{Client, Error, GeoRateQuery, UtilityRateQuery};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[tokio::test]
async fn get_rates_success() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("rates.json");

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "TESTKEY");
    let result = client.get_rates(&GeoRateQuery::new(39.74, -75.55)).await;
    assert!(result.is_ok());

    let resp = result.unwrap();
    assert_eq!(resp.items.len(), 2);
    assert_eq!(resp.items[0].eiaid, Some(9026));
}

#[tokio::test]
async fn credentials_and_format_are_always_appended() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("api_key", "TESTKEY"))
        .and(query_param("version", "8"))
        .and(query_param("format", "json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"items":[]}"#))
        .expect(2)
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "TESTKEY");
    assert!(client.get_rates(&GeoRateQuery::new(1.0, 2.0)).await.is_ok());
    assert!(client
        .get_rates_for_utility(&UtilityRateQuery::new("Delmarva Power"))
        .await
        .is_ok());
}

#[tokio::test]
async fn get_rates_for_utility_sends_name_filter() {
    let mock_server = MockServer::start().await;
    let body = load_fixture("rates.json");

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .and(query_param("ratesforutility", "Delmarva Power"))
        .and(query_param("orderby", "startdate"))
        .and(query_param("direction", "desc"))
        .respond_with(ResponseTemplate::new(200).set_body_string(&body))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "TESTKEY");
    let result = client
        .get_rates_for_utility(&UtilityRateQuery::new("Delmarva Power"))
        .await;
    assert!(result.is_ok());
    assert_eq!(result.unwrap().items.len(), 2);
}

#[tokio::test]
async fn get_rates_server_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "TESTKEY");
    let result = client.get_rates(&GeoRateQuery::new(39.74, -75.55)).await;
    match result {
        Err(Error::HttpStatus { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected HttpStatus error, got {:?}", other.map(|r| r.items.len())),
    }
}

#[tokio::test]
async fn get_rates_malformed_json() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/utility_rates"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not valid json}"))
        .mount(&mock_server)
        .await;

    let client = Client::with_base_url(&mock_server.uri(), "TESTKEY");
    let result = client.get_rates(&GeoRateQuery::new(39.74, -75.55)).await;
    assert!(matches!(result, Err(Error::RequestFailed)));
}
