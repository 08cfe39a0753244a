use reqwest::Client;
use serde_json::Value;
use tracing::info;

use crate::dto::scoring_dto::JdRequest;
use crate::error::{Error, Result};

/// Pulls the JD text out of the generator's response. The workflow has
/// answered in three shapes over time: a bare string, `{"jd": ...}`, and
/// `[{"payload": {"jd": ...}}]`.
fn extract_jd(value: &Value) -> Option<String> {
    if let Value::String(s) = value {
        return Some(s.clone());
    }
    value
        .get("jd")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .map(String::from)
        .or_else(|| {
            value
                .get(0)
                .and_then(|first| first.get("payload"))
                .and_then(|payload| payload.get("jd"))
                .and_then(|jd| jd.as_str())
                .map(String::from)
        })
}

/// Client for the JD generator workflow.
#[derive(Clone)]
pub struct JdService {
    client: Client,
    generator_url: Option<String>,
}

impl JdService {
    pub fn new(generator_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client for JD generator");

        let generator_url = generator_url.filter(|url| !url.trim().is_empty());

        if let Some(ref url) = generator_url {
            info!("JD generation enabled, webhook URL: {}", url);
        } else {
            info!("JD generation disabled (JD_GENERATOR_WEBHOOK_URL not set or empty)");
        }

        Self {
            client,
            generator_url,
        }
    }

    pub async fn generate(&self, request: &JdRequest) -> Result<String> {
        let url = self
            .generator_url
            .as_ref()
            .ok_or_else(|| Error::Upstream("JD generator webhook not configured".to_string()))?;

        let response = self.client.post(url).json(request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream(format!(
                "JD generator failed with status {}: {}",
                status, body
            )));
        }

        let body: Value = response.json().await?;
        extract_jd(&body)
            .filter(|jd| !jd.is_empty())
            .ok_or_else(|| Error::Upstream("JD not found in webhook response".to_string()))
    }
}
