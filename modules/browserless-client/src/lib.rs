pub mod error;

pub use error::{BrowserlessError, Result};

use std::time::Duration;

pub struct BrowserlessClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BrowserlessClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.map(String::from),
        }
    }

    /// Fetch fully-rendered HTML content for a URL via Browserless /content endpoint.
    pub async fn content(&self, url: &str) -> Result<String> {
        self.content_with_options(url, &ContentOptions::default()).await
    }

    /// Same as [`BrowserlessClient::content`] but with a selector to wait for
    /// before scraping and a set of resource types to block, matching the
    /// options Browserless accepts on its `/content` endpoint.
    pub async fn content_with_options(&self, url: &str, options: &ContentOptions) -> Result<String> {
        let mut endpoint = format!("{}/content", self.base_url);
        if let Some(ref token) = self.token {
            endpoint.push_str(&format!("?token={token}"));
        }

        let mut body = serde_json::json!({ "url": url });
        if let Some(selector) = &options.wait_for_selector {
            body["waitForSelector"] = serde_json::json!({ "selector": selector, "timeout": options.wait_timeout_ms });
        }
        if !options.reject_resource_types.is_empty() {
            body["rejectResourceTypes"] = serde_json::json!(options.reject_resource_types);
        }
        if let Some((width, height)) = options.viewport {
            body["viewport"] = serde_json::json!({ "width": width, "height": height });
        }

        let resp = self
            .client
            .post(&endpoint)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(BrowserlessError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.text().await?)
    }
}

/// Per-request rendering options for `/content`.
#[derive(Debug, Clone, Default)]
pub struct ContentOptions {
    pub wait_for_selector: Option<String>,
    pub wait_timeout_ms: u64,
    pub reject_resource_types: Vec<String>,
    pub viewport: Option<(u32, u32)>,
}
