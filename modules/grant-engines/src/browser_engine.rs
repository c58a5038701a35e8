use async_trait::async_trait;
use browserless_client::{BrowserlessClient, ContentOptions};

use grant_common::types::{RawGrant, ScrapeEngineKind, Source};
use grant_common::{GrantError, Result};

use crate::rate_limit::RateLimiter;
use crate::static_engine::scrape_html;
use crate::traits::ScrapeEngine;

const HEAVY_RESOURCE_TYPES: &[&str] = &["image", "font", "media", "stylesheet"];

/// Headless-browser fetch for JS-rendered pages, via a Browserless instance.
/// Extraction reuses the static engine's selector logic once the page has
/// finished rendering.
pub struct BrowserEngine {
    client: BrowserlessClient,
    viewport: (u32, u32),
    wait_timeout_ms: u64,
    block_heavy_resources: bool,
}

impl BrowserEngine {
    pub fn new(base_url: &str, token: Option<&str>) -> Self {
        Self {
            client: BrowserlessClient::new(base_url, token),
            viewport: (1280, 800),
            wait_timeout_ms: 30_000,
            block_heavy_resources: true,
        }
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    pub fn with_wait_timeout_ms(mut self, ms: u64) -> Self {
        self.wait_timeout_ms = ms;
        self
    }

    pub fn block_heavy_resources(mut self, block: bool) -> Self {
        self.block_heavy_resources = block;
        self
    }
}

#[async_trait]
impl ScrapeEngine for BrowserEngine {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawGrant>> {
        let limiter = RateLimiter::new(&source.rate_limit);
        limiter.acquire().await;

        let wait_selector = source
            .selectors
            .container
            .clone()
            .ok_or_else(|| GrantError::Config("browser engine requires a container selector".into()))?;

        let options = ContentOptions {
            wait_for_selector: Some(wait_selector),
            wait_timeout_ms: self.wait_timeout_ms,
            reject_resource_types: if self.block_heavy_resources {
                HEAVY_RESOURCE_TYPES.iter().map(|s| s.to_string()).collect()
            } else {
                Vec::new()
            },
            viewport: Some(self.viewport),
        };

        let html = self
            .client
            .content_with_options(&source.url, &options)
            .await
            .map_err(|e| GrantError::Network(e.to_string()))?;

        scrape_html(&html, source)
    }

    fn kind(&self) -> ScrapeEngineKind {
        ScrapeEngineKind::Browser
    }
}
