use axum::http::StatusCode;
use axum_test::TestServer;
use dropvault_services::{
    config::Config,
    files::{FileRecord, FileStatus},
    records::{MockFailure, MockRecordClient},
    routes,
    uploads::{self, UploadRecord},
};
use serde_json::json;

fn server() -> (MockRecordClient, TestServer) {
    let client = MockRecordClient::new();
    let app = routes(Some(client.clone()), Config::new_for_test());
    (client, TestServer::new(app).unwrap())
}

#[tokio::test]
async fn file_lifecycle() {
    let (_, server) = server();

    let response = server
        .post("/api/files")
        .json(&json!({"name_c": "photo.png", "size_c": 2048, "type_c": "image/png"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: FileRecord = response.json();
    assert_eq!(created.status, FileStatus::Uploading);

    let response = server
        .post(&format!("/api/files/{}/progress", created.id))
        .json(&json!({"progress": 100}))
        .await;
    response.assert_status_ok();
    let completed: FileRecord = response.json();
    assert_eq!(completed.status, FileStatus::Completed);
    assert_eq!(
        completed.url,
        Some(format!("https://dropvault.com/files/{}", created.id))
    );

    let completed_list: Vec<FileRecord> = server
        .get("/api/files")
        .add_query_param("status", "completed")
        .await
        .json();
    assert_eq!(completed_list.len(), 1);

    let response = server
        .patch(&format!("/api/files/{}", created.id))
        .json(&json!({"thumbnail_url_c": null, "name_c": "renamed.png"}))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<FileRecord>().name.as_deref(),
        Some("renamed.png")
    );

    server
        .delete(&format!("/api/files/{}", created.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/api/files/{}", created.id))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn invalid_and_missing_ids_are_not_found() {
    let (client, server) = server();

    server.get("/api/files/abc").await.assert_status_not_found();
    server.delete("/api/uploads/42").await.assert_status_not_found();
    server
        .post("/api/files/abc/progress")
        .json(&json!({"progress": 10}))
        .await
        .assert_status_not_found();

    // "abc" never reaches the backend
    assert_eq!(client.requests().len(), 1);
}

#[tokio::test]
async fn upload_share_flow() {
    let (client, server) = server();

    let response = server
        .post("/api/uploads")
        .json(&json!({"files_c": [3, {"Id": 7}], "total_size_c": 10, "share_link_c": "s3cr3t"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: UploadRecord = response.json();
    assert_eq!(created.files.len(), 2);

    let stored = client.records(uploads::COLLECTION);
    assert_eq!(stored[0]["files_c"], json!("3,7"));

    let shared: UploadRecord = server.get("/api/uploads/share/s3cr3t").await.json();
    assert_eq!(shared.id, created.id);
    server
        .get("/api/uploads/share/unknown")
        .await
        .assert_status_not_found();

    let recent: Vec<UploadRecord> = server
        .get("/api/uploads/recent")
        .add_query_param("limit", 5)
        .await
        .json();
    assert_eq!(recent.len(), 1);
}

#[tokio::test]
async fn backend_failure_maps_to_status_codes() {
    let (client, server) = server();
    client.fail_with(MockFailure::Transport);

    server
        .post("/api/files")
        .json(&json!({"name_c": "a"}))
        .await
        .assert_status(StatusCode::BAD_GATEWAY);

    let response = server.get("/api/uploads").await;
    response.assert_status_ok();
    response.assert_json(&json!([]));
}

#[tokio::test]
async fn unknown_paths_fall_through() {
    let (_, server) = server();
    let response = server.get("/api/nothing/here").await;
    response.assert_status_not_found();
    response.assert_text("nothing to see here");
}
