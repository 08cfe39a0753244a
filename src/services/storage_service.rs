use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use bytes::Bytes;
#[cfg(test)]
use mockall::automock;
use reqwest::Client;
use serde::Deserialize;
use tracing::{error, info};

use crate::error::{Error, Result};

/// Replaces characters OneDrive rejects in item names with underscores.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if (c as u32) < 0x20 => '_',
            c => c,
        })
        .collect()
}

/// Where resume files end up. The returned string is the public URL the
/// candidate row stores.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResumeStorage: Send + Sync {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String>;
}

/// Writes resumes under a local directory served as static files.
pub struct LocalStorage {
    uploads_dir: String,
    public_base_url: String,
}

impl LocalStorage {
    pub fn new(uploads_dir: String, public_base_url: String) -> Self {
        Self {
            uploads_dir,
            public_base_url,
        }
    }
}

#[async_trait]
impl ResumeStorage for LocalStorage {
    async fn upload(&self, data: Bytes, filename: &str, _content_type: &str) -> Result<String> {
        let safe_name = sanitize_filename(filename);
        tokio::fs::create_dir_all(&self.uploads_dir).await?;
        let path = Path::new(&self.uploads_dir).join(&safe_name);
        tokio::fs::write(&path, &data).await?;
        info!("Stored resume locally at {}", path.display());
        Ok(format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            safe_name
        ))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ShareResponse {
    #[serde(rename = "driveItem")]
    drive_item: DriveItem,
}

#[derive(Deserialize)]
struct DriveItem {
    id: String,
    #[serde(rename = "parentReference")]
    parent_reference: ParentReference,
}

#[derive(Deserialize)]
struct ParentReference {
    #[serde(rename = "driveId")]
    drive_id: String,
}

#[derive(Deserialize)]
struct UploadedItem {
    id: String,
    #[serde(rename = "webUrl")]
    web_url: String,
}

#[derive(Deserialize)]
struct CreateLinkResponse {
    link: Option<SharingLink>,
}

#[derive(Deserialize)]
struct SharingLink {
    #[serde(rename = "webUrl")]
    web_url: String,
}

/// Uploads resumes into a shared OneDrive folder through the Microsoft
/// Graph API and returns an anonymous view link.
pub struct GraphStorage {
    client: Client,
    client_id: String,
    client_secret: String,
    upload_folder_link: String,
    token_endpoint: String,
    graph_root: String,
}

impl GraphStorage {
    pub fn new(
        client_id: String,
        client_secret: String,
        tenant_id: String,
        upload_folder_link: String,
    ) -> Self {
        let token_endpoint = format!(
            "https://login.microsoftonline.com/{}/oauth2/v2.0/token",
            tenant_id
        );
        Self::with_endpoints(
            client_id,
            client_secret,
            upload_folder_link,
            token_endpoint,
            "https://graph.microsoft.com/v1.0".to_string(),
        )
    }

    /// Constructor with explicit endpoints so tests can point at a mock server.
    pub fn with_endpoints(
        client_id: String,
        client_secret: String,
        upload_folder_link: String,
        token_endpoint: String,
        graph_root: String,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for Graph storage");

        Self {
            client,
            client_id,
            client_secret,
            upload_folder_link,
            token_endpoint,
            graph_root,
        }
    }

    async fn acquire_token(&self) -> Result<String> {
        let response = self
            .client
            .post(&self.token_endpoint)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("scope", "https://graph.microsoft.com/.default"),
                ("grant_type", "client_credentials"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph token request failed with status {}: {}", status, body);
            return Err(Error::Upstream(format!(
                "Graph token request failed with status {}",
                status
            )));
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Resolves the shared folder link into (drive id, folder item id) via
    /// the shares endpoint. The link is base64url-encoded without padding.
    async fn resolve_folder(&self, token: &str) -> Result<(String, String)> {
        use base64::prelude::*;
        let encoded = BASE64_URL_SAFE_NO_PAD.encode(&self.upload_folder_link);

        let response = self
            .client
            .get(format!(
                "{}/shares/u!{}?$expand=driveItem",
                self.graph_root, encoded
            ))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph share resolution failed with status {}: {}", status, body);
            return Err(Error::Upstream(format!(
                "Graph share resolution failed with status {}",
                status
            )));
        }

        let share: ShareResponse = response.json().await?;
        Ok((
            share.drive_item.parent_reference.drive_id,
            share.drive_item.id,
        ))
    }

    async fn create_view_link(
        &self,
        token: &str,
        drive_id: &str,
        item_id: &str,
    ) -> Result<Option<String>> {
        let response = self
            .client
            .post(format!(
                "{}/drives/{}/items/{}/createLink",
                self.graph_root, drive_id, item_id
            ))
            .bearer_auth(token)
            .json(&serde_json::json!({ "type": "view", "scope": "anonymous" }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(None);
        }

        let created: CreateLinkResponse = response.json().await?;
        Ok(created.link.map(|l| l.web_url))
    }
}

#[async_trait]
impl ResumeStorage for GraphStorage {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String> {
        let token = self.acquire_token().await?;
        let (drive_id, folder_id) = self.resolve_folder(&token).await?;

        let safe_name = sanitize_filename(filename);
        let response = self
            .client
            .put(format!(
                "{}/drives/{}/items/{}:/{}:/content",
                self.graph_root, drive_id, folder_id, safe_name
            ))
            .bearer_auth(&token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(data)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Graph upload failed with status {}: {}", status, body);
            return Err(Error::Upstream(format!(
                "Graph upload failed with status {}",
                status
            )));
        }

        let uploaded: UploadedItem = response.json().await?;

        // Anonymous view link when tenant policy allows it, otherwise the
        // item's own web URL.
        let url = match self
            .create_view_link(&token, &drive_id, &uploaded.id)
            .await
        {
            Ok(Some(link)) => link,
            Ok(None) => uploaded.web_url,
            Err(_) => uploaded.web_url,
        };

        info!("Uploaded resume {} to OneDrive", safe_name);
        Ok(url)
    }
}

/// What an upload recorded by [`InMemoryStorage`] looked like.
#[derive(Debug, Clone)]
pub struct StoredUpload {
    pub filename: String,
    pub content_type: String,
    pub size: usize,
}

/// Recording fake for tests. Flip `set_fail` to simulate an unreachable
/// backend.
#[derive(Default)]
pub struct InMemoryStorage {
    uploads: Mutex<Vec<StoredUpload>>,
    fail: AtomicBool,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn uploads(&self) -> Vec<StoredUpload> {
        self.uploads
            .lock()
            .expect("upload log mutex poisoned")
            .clone()
    }
}

#[async_trait]
impl ResumeStorage for InMemoryStorage {
    async fn upload(&self, data: Bytes, filename: &str, content_type: &str) -> Result<String> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::Upstream("storage backend unavailable".to_string()));
        }
        self.uploads
            .lock()
            .expect("upload log mutex poisoned")
            .push(StoredUpload {
                filename: filename.to_string(),
                content_type: content_type.to_string(),
                size: data.len(),
            });
        Ok(format!("https://files.local/{}", filename))
    }
}
