use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use farmstead_api::adapter::FormInput;
use farmstead_api::config::RecordStoreConfig;
use farmstead_api::errors::ServiceError;
use farmstead_api::services::AppServices;
use farmstead_api::store::remote::{RemoteRecordStore, RemoteStoreSettings};
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_services(server: &MockServer, timeout: Duration) -> AppServices {
    let store = RemoteRecordStore::new(RemoteStoreSettings {
        base_url: server.uri(),
        project_id: Some("proj-1".into()),
        public_key: Some("pk-test".into()),
        timeout,
    })
    .expect("client builds");
    AppServices::with_store(&RecordStoreConfig::default(), Arc::new(store))
}

#[tokio::test]
async fn fetch_decodes_the_success_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/farm_c/fetch"))
        .and(header("x-project-id", "proj-1"))
        .and(header("authorization", "Bearer pk-test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "total": 2,
            "data": [
                { "Id": 7, "name_c": "Ridge Farm", "size_acres_c": "40.5" },
                { "Id": 3, "Name": "Legacy", "size_c": 12 }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_secs(5));
    let farms = services.farms.list().await.unwrap();

    assert_eq!(farms.len(), 2);
    assert_eq!(farms[0].id, 7);
    assert_eq!(farms[0].size_acres, 40.5);
    // Legacy alias column still resolves
    assert_eq!(farms[1].size_acres, 12.0);
}

#[tokio::test]
async fn unsuccessful_envelope_passes_the_backend_message_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/task_c/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "message": "Table task_c does not exist"
        })))
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_secs(5));
    let err = services.tasks.list().await.unwrap_err();

    assert_matches!(&err, ServiceError::FetchError(message) if message == "Table task_c does not exist");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn failed_batch_result_surfaces_the_first_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/farm_c/create"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": [
                { "success": false, "message": "name_c is too long" }
            ]
        })))
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_secs(5));
    let mut input = FormInput::new();
    input.insert("name".into(), json!("Very long name"));

    assert_matches!(
        services.farms.create(&input).await,
        Err(ServiceError::PartialBatch { message, failed: 1, .. }) if message == "name_c is too long"
    );
}

#[tokio::test]
async fn missing_record_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/crop_c/get"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": null
        })))
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_secs(5));
    assert_matches!(
        services.crops.get_by_id(41).await,
        Err(ServiceError::NotFound(message)) if message == "Crop with id 41"
    );
}

#[tokio::test]
async fn slow_store_times_out_as_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/farm_c/fetch"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_millis(200));
    let err = services.farms.list().await.unwrap_err();

    assert_matches!(&err, ServiceError::Timeout(_));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn error_status_without_envelope_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/farm_c/fetch"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let services = remote_services(&server, Duration::from_secs(5));
    assert_matches!(services.farms.list().await, Err(ServiceError::FetchError(_)));
}
