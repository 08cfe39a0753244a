use base64::prelude::*;
use bytes::Bytes;
use uuid::Uuid;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ats_backend::error::Error;
use ats_backend::services::storage_service::{GraphStorage, LocalStorage, ResumeStorage};

const FOLDER_LINK: &str = "https://contoso-my.sharepoint.com/f/resumes";

fn graph_storage(server: &MockServer) -> GraphStorage {
    GraphStorage::with_endpoints(
        "app-id".to_string(),
        "app-secret".to_string(),
        FOLDER_LINK.to_string(),
        format!("{}/token", server.uri()),
        format!("{}/v1.0", server.uri()),
    )
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("client_id=app-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "access_token": "tok-1",
            "token_type": "Bearer",
            "expires_in": 3599,
        })))
        .mount(server)
        .await;
}

async fn mount_share_resolution(server: &MockServer) {
    let encoded = BASE64_URL_SAFE_NO_PAD.encode(FOLDER_LINK);
    Mock::given(method("GET"))
        .and(path(format!("/v1.0/shares/u!{}", encoded)))
        .and(query_param("$expand", "driveItem"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "driveItem": {
                "id": "folder-1",
                "parentReference": { "driveId": "drive-1" },
            }
        })))
        .mount(server)
        .await;
}

async fn mount_upload(server: &MockServer, status: u16) {
    Mock::given(method("PUT"))
        .and(path("/v1.0/drives/drive-1/items/folder-1:/cv.pdf:/content"))
        .and(header("authorization", "Bearer tok-1"))
        .and(header("content-type", "application/pdf"))
        .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
            "id": "item-9",
            "webUrl": "https://onedrive.test/item-9",
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn local_storage_writes_the_file_and_builds_a_public_url() {
    let dir = std::env::temp_dir().join(format!("ats-store-{}", Uuid::new_v4()));
    let storage = LocalStorage::new(
        dir.to_str().unwrap().to_string(),
        "http://localhost:3001/".to_string(),
    );

    let url = storage
        .upload(Bytes::from_static(b"%PDF-1.4 data"), "cv:final.pdf", "application/pdf")
        .await
        .unwrap();
    assert_eq!(url, "http://localhost:3001/uploads/cv_final.pdf");

    let written = tokio::fs::read(dir.join("cv_final.pdf")).await.unwrap();
    assert_eq!(written, b"%PDF-1.4 data");

    let _ = tokio::fs::remove_dir_all(&dir).await;
}

#[tokio::test]
async fn graph_upload_returns_the_anonymous_view_link() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_share_resolution(&server).await;
    mount_upload(&server, 201).await;
    Mock::given(method("POST"))
        .and(path("/v1.0/drives/drive-1/items/item-9/createLink"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "link": { "webUrl": "https://share.test/view-9" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = graph_storage(&server)
        .upload(Bytes::from_static(b"%PDF-1.4"), "cv.pdf", "application/pdf")
        .await
        .unwrap();
    assert_eq!(url, "https://share.test/view-9");
}

#[tokio::test]
async fn graph_upload_falls_back_to_the_item_url_without_a_share_link() {
    // Tenant policy forbids anonymous links.
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_share_resolution(&server).await;
    mount_upload(&server, 201).await;
    Mock::given(method("POST"))
        .and(path("/v1.0/drives/drive-1/items/item-9/createLink"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let url = graph_storage(&server)
        .upload(Bytes::from_static(b"%PDF-1.4"), "cv.pdf", "application/pdf")
        .await
        .unwrap();
    assert_eq!(url, "https://onedrive.test/item-9");

    // Same fallback when the response has no link payload.
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_share_resolution(&server).await;
    mount_upload(&server, 201).await;
    Mock::given(method("POST"))
        .and(path("/v1.0/drives/drive-1/items/item-9/createLink"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let url = graph_storage(&server)
        .upload(Bytes::from_static(b"%PDF-1.4"), "cv.pdf", "application/pdf")
        .await
        .unwrap();
    assert_eq!(url, "https://onedrive.test/item-9");
}

#[tokio::test]
async fn graph_upload_surfaces_drive_failures() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_share_resolution(&server).await;
    mount_upload(&server, 507).await;

    let err = graph_storage(&server)
        .upload(Bytes::from_static(b"%PDF-1.4"), "cv.pdf", "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream(_)), "got {:?}", err);
}

#[tokio::test]
async fn graph_token_failure_stops_the_upload_early() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;
    // Nothing beyond the token endpoint may be called.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let err = graph_storage(&server)
        .upload(Bytes::from_static(b"%PDF-1.4"), "cv.pdf", "application/pdf")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream(_)), "got {:?}", err);
}
