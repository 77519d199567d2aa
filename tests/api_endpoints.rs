//! End-to-end tests for `/api/aqi` and `/api/search`.
//!
//! The router runs in-process; both upstreams are wiremock servers.

use aqi_map::api::{create_router, AppState};
use aqi_map::config::CountrySuffix;
use aqi_map::registry::{CityRecord, CityRegistry};
use aqi_map::upstream::OpenMeteoClient;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GEOCODING_PATH: &str = "/v1/search";
const AIR_QUALITY_PATH: &str = "/v1/air-quality";

fn client_for(server: &MockServer) -> OpenMeteoClient {
    OpenMeteoClient::with_http(
        reqwest::Client::new(),
        format!("{}{}", server.uri(), GEOCODING_PATH),
        format!("{}{}", server.uri(), AIR_QUALITY_PATH),
    )
}

fn unreachable_client() -> OpenMeteoClient {
    OpenMeteoClient::with_http(
        reqwest::Client::new(),
        "http://127.0.0.1:1/v1/search",
        "http://127.0.0.1:1/v1/air-quality",
    )
}

fn app(state: AppState) -> Router {
    create_router(state, "/nonexistent-static-dir")
}

async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap();
    (status, json)
}

fn three_cities() -> CityRegistry {
    CityRegistry::new(vec![
        CityRecord::new("New York", 40.7128, -74.0060),
        CityRecord::new("London", 51.5074, -0.1278),
        CityRecord::new("Tokyo", 35.6895, 139.6917),
    ])
}

async fn mount_geocode(server: &MockServer, query: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(GEOCODING_PATH))
        .and(query_param("name", query))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(1)
        .mount(server)
        .await;
}

// === /api/aqi ===

#[tokio::test]
async fn aqi_returns_one_entry_per_city_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .and(query_param("latitude", "40.7128,51.5074,35.6895"))
        .and(query_param("longitude", "-74.006,-0.1278,139.6917"))
        .and(query_param("current", "us_aqi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"latitude": 40.7, "longitude": -74.0, "current": {"us_aqi": 48}},
            {"latitude": 51.5, "longitude": -0.125, "current": {"us_aqi": 22}},
            {"latitude": 35.7, "longitude": 139.7, "current": {}}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!([
            {"name": "New York", "lat": 40.7128, "lon": -74.006, "aqi": 48},
            {"name": "London", "lat": 51.5074, "lon": -0.1278, "aqi": 22},
            {"name": "Tokyo", "lat": 35.6895, "lon": 139.6917, "aqi": null}
        ])
    );
}

#[tokio::test]
async fn aqi_default_registry_length_matches() {
    let registry = CityRegistry::default();
    let items: Vec<Value> = (0..registry.len())
        .map(|i| json!({"current": {"us_aqi": i}}))
        .collect();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(items)))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), registry.clone());
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::OK);
    let results = body.as_array().unwrap();
    assert_eq!(results.len(), registry.len());
    for (i, (result, city)) in results.iter().zip(registry.iter()).enumerate() {
        assert_eq!(result["name"], city.name.as_str());
        assert_eq!(result["lat"], city.latitude);
        assert_eq!(result["lon"], city.longitude);
        assert_eq!(result["aqi"], i);
    }
}

#[tokio::test]
async fn aqi_single_object_response_yields_empty_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "latitude": 48.86, "longitude": 2.36, "current": {"us_aqi": 30}
        })))
        .mount(&server)
        .await;

    let registry = CityRegistry::new(vec![CityRecord::new("Paris", 48.8566, 2.3522)]);
    let state = AppState::new(client_for(&server), registry);
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn aqi_upstream_error_status_returns_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("502"));
}

#[tokio::test]
async fn aqi_malformed_json_returns_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn aqi_connection_refused_returns_500() {
    let state = AppState::new(unreachable_client(), three_cities());
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn aqi_empty_registry_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), CityRegistry::new(vec![]));
    let (status, body) = get(app(state), "/api/aqi").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

// === /api/search ===

#[tokio::test]
async fn search_resolves_and_enriches() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "Paris",
        json!({"results": [{"name": "Paris", "country": "France", "latitude": 48.8566, "longitude": 2.3522}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .and(query_param("latitude", "48.8566"))
        .and(query_param("longitude", "2.3522"))
        .and(query_param("current", "us_aqi"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {"us_aqi": 42}})))
        .expect(1)
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Paris").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"name": "Paris, France", "lat": 48.8566, "lon": 2.3522, "aqi": 42})
    );
}

#[tokio::test]
async fn search_repeated_query_key_uses_first_value() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "Paris",
        json!({"results": [{"name": "Paris", "country": "France", "latitude": 48.8566, "longitude": 2.3522}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {"us_aqi": 42}})))
        .expect(1)
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Paris&q=London").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Paris, France");
}

#[tokio::test]
async fn search_missing_or_empty_query_makes_no_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for uri in ["/api/search", "/api/search?q=", "/api/search?other=1"] {
        let state = AppState::new(client_for(&server), three_cities());
        let (status, body) = get(app(state), uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        assert_eq!(body, json!({"error": "No query provided"}));
    }
}

#[tokio::test]
async fn search_without_match_returns_404() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Xyzzy", json!({"generationtime_ms": 0.3})).await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Xyzzy").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Location not found"}));
}

#[tokio::test]
async fn search_empty_results_list_returns_404() {
    let server = MockServer::start().await;
    mount_geocode(&server, "Nowhere", json!({"results": []})).await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, _) = get(app(state), "/api/search?q=Nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn search_missing_country_keeps_trailing_separator() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "Point Nemo",
        json!({"results": [{"name": "Point Nemo", "latitude": -48.8767, "longitude": -123.3933}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {}})))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Point%20Nemo").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Point Nemo, ");
    assert!(body["aqi"].is_null());
}

#[tokio::test]
async fn search_missing_country_can_be_trimmed() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "Point Nemo",
        json!({"results": [{"name": "Point Nemo", "latitude": -48.8767, "longitude": -123.3933}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current": {"us_aqi": 5}})))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities())
        .with_country_suffix(CountrySuffix::WhenPresent);
    let (_, body) = get(app(state), "/api/search?q=Point%20Nemo").await;

    assert_eq!(body["name"], "Point Nemo");
}

#[tokio::test]
async fn search_geocoder_failure_returns_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GEOCODING_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Paris").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn search_air_quality_failure_returns_500() {
    let server = MockServer::start().await;
    mount_geocode(
        &server,
        "Paris",
        json!({"results": [{"name": "Paris", "country": "France", "latitude": 48.8566, "longitude": 2.3522}]}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path(AIR_QUALITY_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("{truncated"))
        .mount(&server)
        .await;

    let state = AppState::new(client_for(&server), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Paris").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("air-quality"));
}

#[tokio::test]
async fn search_connection_refused_returns_500() {
    let state = AppState::new(unreachable_client(), three_cities());
    let (status, body) = get(app(state), "/api/search?q=Paris").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(!body["error"].as_str().unwrap().is_empty());
}
