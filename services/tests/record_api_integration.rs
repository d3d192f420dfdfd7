//! Requests travel through `HttpRecordClient` to a wiremock record backend.

use axum::http::StatusCode;
use axum_test::TestServer;
use dropvault_services::{
    config::Config,
    files::{FileRecord, FileStatus},
    records::HttpRecordClient,
    routes,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn server_for(backend: &MockServer) -> TestServer {
    let config = Config::new_for_test_with_record_api(backend.uri());
    let client = HttpRecordClient::from_config(&config).unwrap();
    assert!(client.is_some());
    TestServer::new(routes(client, config)).unwrap()
}

#[tokio::test]
async fn progress_completion_is_sent_as_one_update() {
    let backend = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/tables/file_c/records"))
        .and(header("X-Project-Id", "test-project"))
        .and(body_partial_json(json!({
            "records": [{
                "Id": 12,
                "progress_c": 100,
                "status_c": "completed",
                "url_c": "https://dropvault.com/files/12"
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "results": [{
                "success": true,
                "data": {"Id": 12, "name_c": "a.png", "status_c": "completed", "progress_c": 100,
                         "url_c": "https://dropvault.com/files/12"}
            }]
        })))
        .expect(1)
        .mount(&backend)
        .await;

    let server = server_for(&backend).await;
    let response = server
        .post("/api/files/12/progress")
        .json(&json!({"progress": 130}))
        .await;

    response.assert_status_ok();
    let file: FileRecord = response.json();
    assert_eq!(file.status, FileStatus::Completed);
    assert_eq!(file.progress, 100);
}

#[tokio::test]
async fn unsuccessful_fetch_becomes_empty_list() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/upload_c/fetch"))
        .and(body_partial_json(json!({
            "orderBy": [{"fieldName": "created_at_c", "sorttype": "DESC"}],
            "pagingInfo": {"limit": 10, "offset": 0}
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "quota exceeded"})),
        )
        .expect(1)
        .mount(&backend)
        .await;

    let server = server_for(&backend).await;
    let response = server.get("/api/uploads/recent").await;

    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn backend_outage_fails_create() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/file_c/records"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&backend)
        .await;

    let server = server_for(&backend).await;
    server
        .post("/api/files")
        .json(&json!({"name_c": "a.png", "size_c": 1}))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn successful_batch_without_results_is_a_failure() {
    let backend = MockServer::start().await;
    let empty_batch =
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "results": []}));
    for verb in ["POST", "PUT", "DELETE"] {
        Mock::given(method(verb))
            .and(path("/tables/file_c/records"))
            .respond_with(empty_batch.clone())
            .expect(1)
            .mount(&backend)
            .await;
    }

    let server = server_for(&backend).await;
    server
        .post("/api/files")
        .json(&json!({"name_c": "a.png", "size_c": 1}))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);
    server
        .patch("/api/files/5")
        .json(&json!({"name_c": "b.png"}))
        .await
        .assert_status_not_found();
    server.delete("/api/files/5").await.assert_status_not_found();
}

#[tokio::test]
async fn undecodable_rows_are_skipped_not_fatal() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/tables/file_c/fetch"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [
                {"Id": 1, "name_c": "a.png", "status_c": null, "progress_c": null},
                {"Id": 2, "name_c": "b.png", "progress_c": 50.0, "size_c": 2048.0},
                {"Id": 3, "name_c": "c.png", "status_c": ["broken"]}
            ]
        })))
        .mount(&backend)
        .await;

    let server = server_for(&backend).await;
    let files: Vec<FileRecord> = server.get("/api/files").await.json();

    assert_eq!(files.len(), 2);
    assert_eq!(files[0].status, FileStatus::Uploading);
    assert_eq!(files[1].progress, 50);
    assert_eq!(files[1].size, Some(2048));
}
