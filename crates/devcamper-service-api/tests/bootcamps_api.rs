use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use devcamper_lib::{MemoryStore, RecordId};
use devcamper_service_api::router;
use devcamper_service_shared::test_utils::{
    devworks_body, modern_tech_body, test_state, test_state_with, RecordingStore, StaticGeocoder,
    BOSTON_ZIPCODE,
};
use serde_json::{json, Value};

fn server() -> TestServer {
    TestServer::new(router(test_state())).expect("test server")
}

async fn create(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/v1/bootcamps").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["data"].clone()
}

#[tokio::test]
async fn empty_directory_lists_nothing() {
    let response = server().get("/api/v1/bootcamps").await;
    response.assert_status_ok();
    response.assert_json(&json!({"success": true, "count": 0, "data": []}));
}

#[tokio::test]
async fn created_bootcamp_can_be_fetched() {
    let server = server();
    let created = create(&server, devworks_body()).await;
    let id = created["_id"].as_str().expect("id assigned");
    assert!(created["createdAt"].is_string());

    let response = server.get(&format!("/api/v1/bootcamps/{id}")).await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["success"], true);
    assert!(body.get("count").is_none());

    let mut data = body["data"].as_object().unwrap().clone();
    data.remove("_id");
    data.remove("createdAt");
    assert_eq!(Value::Object(data), devworks_body());
}

#[tokio::test]
async fn list_reports_count_and_honours_filters() {
    let server = server();
    create(&server, devworks_body()).await;
    create(&server, modern_tech_body()).await;

    let all = server.get("/api/v1/bootcamps").await.json::<Value>();
    assert_eq!(all["count"], 2);

    let gi = server
        .get("/api/v1/bootcamps")
        .add_query_param("acceptGi", "true")
        .await
        .json::<Value>();
    assert_eq!(gi["count"], 1);
    assert_eq!(gi["data"][0]["name"], "Devworks Bootcamp");
}

#[tokio::test]
async fn unknown_id_is_404_for_every_method() {
    let server = server();
    let id = RecordId::generate();
    let path = format!("/api/v1/bootcamps/{id}");
    let expected = json!({"success": false, "error": format!("Bootcamp not found with id of {id}")});

    let get = server.get(&path).await;
    let put = server.put(&path).json(&json!({"housing": false})).await;
    let delete = server.delete(&path).await;

    for response in [get, put, delete] {
        response.assert_status(StatusCode::NOT_FOUND);
        response.assert_json(&expected);
    }
}

#[tokio::test]
async fn malformed_id_is_400() {
    let response = server().get("/api/v1/bootcamps/5d713995b721c3bb38c1f5d0").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({
        "success": false,
        "error": "Malformed id '5d713995b721c3bb38c1f5d0'"
    }));
}

#[tokio::test]
async fn update_returns_merged_record() {
    let server = server();
    let created = create(&server, devworks_body()).await;
    let id = created["_id"].as_str().unwrap();

    let response = server
        .put(&format!("/api/v1/bootcamps/{id}"))
        .json(&json!({"housing": false, "averageCost": 9000}))
        .await;
    response.assert_status_ok();
    let data = response.json::<Value>()["data"].clone();
    assert_eq!(data["housing"], false);
    assert_eq!(data["averageCost"], 9000);
    assert_eq!(data["name"], "Devworks Bootcamp");
    assert_eq!(data["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn delete_succeeds_once() {
    let server = server();
    let created = create(&server, devworks_body()).await;
    let path = format!("/api/v1/bootcamps/{}", created["_id"].as_str().unwrap());

    let first = server.delete(&path).await;
    first.assert_status_ok();
    first.assert_json(&json!({"success": true, "data": {}}));

    server.delete(&path).await.assert_status(StatusCode::NOT_FOUND);
    server.get(&path).await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn missing_required_field_is_400_and_writes_nothing() {
    let server = server();
    let mut body = devworks_body();
    body.as_object_mut().unwrap().remove("name");

    let response = server.post("/api/v1/bootcamps").json(&body).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"success": false, "error": "Please add a name"}));

    let listed = server.get("/api/v1/bootcamps").await.json::<Value>();
    assert_eq!(listed["count"], 0);
}

#[tokio::test]
async fn duplicate_name_is_400() {
    let server = server();
    create(&server, devworks_body()).await;
    let response = server.post("/api/v1/bootcamps").json(&devworks_body()).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    response.assert_json(&json!({"success": false, "error": "Duplicate field value entered"}));
}

#[tokio::test]
async fn malformed_json_body_uses_failure_envelope() {
    let response = server()
        .post("/api/v1/bootcamps")
        .content_type("application/json")
        .bytes("{\"name\": ".into())
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body = response.json::<Value>();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn radius_search_filters_by_distance() {
    let store = Arc::new(RecordingStore::new());
    let state = test_state_with(store.clone(), Arc::new(StaticGeocoder::boston()));
    let server = TestServer::new(router(state)).unwrap();
    create(&server, devworks_body()).await;
    create(&server, modern_tech_body()).await;

    let response = server
        .get(&format!("/api/v1/bootcamps/radius/{BOSTON_ZIPCODE}/10"))
        .await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Devworks Bootcamp");

    let query = serde_json::to_value(store.last_filter().expect("store queried")).unwrap();
    let sphere = &query["location"]["$geoWithin"]["$centerSphere"];
    assert_eq!(sphere[0], json!([-71.13203, 42.35236]));
    assert!((sphere[1].as_f64().unwrap() - 10.0 / 3963.0).abs() < 1e-12);
}

#[tokio::test]
async fn unresolvable_zipcode_is_404() {
    let response = server().get("/api/v1/bootcamps/radius/99999/10").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({
        "success": false,
        "error": "Could not resolve zipcode '99999' to a location"
    }));
}

#[tokio::test]
async fn negative_distance_is_400_without_geocoding() {
    let geocoder = Arc::new(StaticGeocoder::boston());
    let state = test_state_with(Arc::new(MemoryStore::new()), geocoder.clone());
    let server = TestServer::new(router(state)).unwrap();

    let response = server.get("/api/v1/bootcamps/radius/02134/-5").await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["success"], false);
    assert!(geocoder.lookups().is_empty());
}

#[tokio::test]
async fn unknown_route_uses_failure_envelope() {
    let response = server().get("/api/v1/courses").await;
    response.assert_status(StatusCode::NOT_FOUND);
    response.assert_json(&json!({"success": false, "error": "Route not found"}));
}

#[tokio::test]
async fn unsupported_method_uses_failure_envelope() {
    let server = server();
    let response = server.patch("/api/v1/bootcamps").json(&json!({})).await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    response.assert_json(&json!({"success": false, "error": "Method not allowed"}));

    let response = server.post("/health/live").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(response.json::<Value>()["success"], false);
}

#[tokio::test]
async fn responses_echo_request_id() {
    let response = server()
        .get("/api/v1/bootcamps")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static("trace-me"),
        )
        .await;
    assert_eq!(response.header("x-request-id"), "trace-me");
}

#[tokio::test]
async fn health_probes_answer() {
    let server = server();
    server.get("/health/live").await.assert_status_ok();
    let ready = server.get("/health/ready").await;
    ready.assert_status_ok();
    assert_eq!(ready.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn health_probes_name_this_service() {
    let server = server();
    for probe in ["/health/live", "/health/ready"] {
        let body = server.get(probe).await.json::<Value>();
        assert_eq!(body["service"], "devcamper-service-api");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
