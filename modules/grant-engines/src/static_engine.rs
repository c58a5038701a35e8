use std::time::Duration;

use async_trait::async_trait;
use reqwest::redirect::Policy;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};

use grant_common::types::{RawGrant, ScrapeEngineKind, Source};
use grant_common::{GrantError, Result};

use crate::rate_limit::RateLimiter;
use crate::traits::ScrapeEngine;
use crate::user_agent::UserAgentPool;

/// Plain HTTP GET + CSS-selector extraction, for pages that render their
/// grant listings server-side.
pub struct StaticEngine {
    client: Client,
    agents: UserAgentPool,
    timeout: Duration,
}

impl StaticEngine {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .redirect(Policy::limited(10))
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is infallible at build time"),
            agents: UserAgentPool::new(),
            timeout,
        }
    }
}

#[async_trait]
impl ScrapeEngine for StaticEngine {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawGrant>> {
        let limiter = RateLimiter::new(&source.rate_limit);
        limiter.acquire().await;

        let mut request = self
            .client
            .get(&source.url)
            .header("User-Agent", self.agents.next())
            .timeout(self.timeout);
        for (key, value) in &source.headers {
            request = request.header(key.as_str(), value.as_str());
        }

        let response = request
            .send()
            .await
            .map_err(|e| GrantError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(GrantError::Network(format!(
                "static fetch of {} failed with status {}",
                source.url,
                response.status()
            )));
        }
        let body = response
            .text()
            .await
            .map_err(|e| GrantError::Network(e.to_string()))?;

        scrape_html(&body, source)
    }

    fn kind(&self) -> ScrapeEngineKind {
        ScrapeEngineKind::Static
    }
}

/// Parse `body` and run container/field selector extraction over it. Shared
/// between the static and browser engines — the browser engine just gets
/// `body` from a rendered page instead of a raw GET.
pub fn scrape_html(body: &str, source: &Source) -> Result<Vec<RawGrant>> {
    let container_selector = source
        .selectors
        .container
        .as_deref()
        .ok_or_else(|| GrantError::Config("engine requires a container selector".into()))?;

    let document = Html::parse_document(body);
    let container_sel = Selector::parse(container_selector)
        .map_err(|e| GrantError::Config(format!("invalid container selector: {e:?}")))?;

    let now = chrono::Utc::now();
    let mut grants = Vec::new();
    for container in document.select(&container_sel) {
        match extract_one(&container, source) {
            Ok(mut grant) => {
                grant.source_url = source.url.clone();
                grant.scraped_at = now;
                grants.push(grant);
            }
            Err(err) => {
                tracing::warn!(source_url = %source.url, error = %err, "skipping unparseable container");
            }
        }
    }
    Ok(grants)
}

/// Apply each field selector relative to `container`, never touching the
/// network — shared with the browser engine, which scrapes the same way
/// once the page has finished rendering.
pub fn extract_one(container: &ElementRef, source: &Source) -> Result<RawGrant> {
    let selectors = &source.selectors;
    let field = |sel: &Option<String>| -> Option<String> { select_text(container, sel.as_deref()) };
    let href = |sel: &Option<String>| -> Option<String> { select_href(container, sel.as_deref()) };

    Ok(RawGrant {
        title: field(&selectors.title),
        description: field(&selectors.description),
        deadline: field(&selectors.deadline),
        funding_amount: field(&selectors.amount),
        eligibility: field(&selectors.eligibility),
        application_url: href(&selectors.application_url).or_else(|| field(&selectors.application_url)),
        funder_name: field(&selectors.funder_info),
        source_url: source.url.clone(),
        scraped_at: chrono::Utc::now(),
        raw_content: serde_json::json!({ "container_html": container.html() }),
    })
}

fn select_text(container: &ElementRef, selector: Option<&str>) -> Option<String> {
    let selector = selector?;
    let parsed = Selector::parse(selector).ok()?;
    let text = container
        .select(&parsed)
        .next()?
        .text()
        .collect::<String>()
        .trim()
        .to_string();
    (!text.is_empty()).then_some(text)
}

fn select_href(container: &ElementRef, selector: Option<&str>) -> Option<String> {
    let selector = selector?;
    let parsed = Selector::parse(selector).ok()?;
    container
        .select(&parsed)
        .next()?
        .value()
        .attr("href")
        .map(str::to_string)
}
