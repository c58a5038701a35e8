use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use grant_common::types::{PaginationScheme, RawGrant, ScrapeEngineKind, Source};
use grant_common::{GrantError, Result};

use crate::formats::{csv_to_records, xml_to_records};
use crate::rate_limit::RateLimiter;
use crate::traits::ScrapeEngine;

const MAX_CONSECUTIVE_PAGE_ERRORS: u32 = 3;
const RECORD_ARRAY_KEYS: &[&str] = &["results", "data", "items", "grants", "records"];

/// Paginated JSON/XML/CSV fetch against a base URL.
pub struct ApiEngine {
    client: Client,
    timeout: Duration,
}

impl ApiEngine {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is infallible at build time"),
            timeout,
        }
    }
}

#[async_trait]
impl ScrapeEngine for ApiEngine {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawGrant>> {
        let limiter = RateLimiter::new(&source.rate_limit);
        let pagination = source.pagination.clone();

        let mut grants = Vec::new();
        let mut consecutive_errors = 0u32;
        let mut page = 1u32;
        let mut offset = 0u32;
        let mut cursor: Option<String> = None;
        let max_pages = pagination.as_ref().map(|p| p.max_pages).unwrap_or(1);
        let page_size = pagination.as_ref().map(|p| p.page_size).unwrap_or(u32::MAX);

        loop {
            if page > max_pages {
                break;
            }
            limiter.acquire().await;

            let url = build_page_url(&source.url, pagination.as_ref(), page, offset, cursor.as_deref());
            let mut request = self.client.get(&url).timeout(self.timeout);
            for (key, value) in &source.headers {
                request = request.header(key.as_str(), value.as_str());
            }

            let page_result = fetch_page(request).await;
            let (body, content_type) = match page_result {
                Ok(pair) => pair,
                Err(err) => {
                    consecutive_errors += 1;
                    tracing::warn!(source_url = %source.url, page, error = %err, "page fetch failed");
                    if consecutive_errors >= MAX_CONSECUTIVE_PAGE_ERRORS {
                        return Err(GrantError::Network(format!(
                            "aborting after {MAX_CONSECUTIVE_PAGE_ERRORS} consecutive page errors: {err}"
                        )));
                    }
                    page += 1;
                    continue;
                }
            };
            consecutive_errors = 0;

            let records = match parse_records(&body, &content_type) {
                Ok(records) => records,
                Err(err) => {
                    consecutive_errors += 1;
                    tracing::warn!(source_url = %source.url, page, error = %err, "page parse failed");
                    if consecutive_errors >= MAX_CONSECUTIVE_PAGE_ERRORS {
                        return Err(err);
                    }
                    page += 1;
                    continue;
                }
            };

            let hits = records.len() as u32;
            let scraped_at = chrono::Utc::now();
            for record in &records {
                grants.push(record_to_raw_grant(record, source, scraped_at));
            }

            if let Some(scheme) = pagination.as_ref().map(|p| p.scheme) {
                if scheme == PaginationScheme::Cursor {
                    cursor = next_cursor(&body);
                    if cursor.is_none() {
                        break;
                    }
                }
            }

            if hits < page_size {
                break;
            }

            page += 1;
            offset += hits;
        }

        Ok(grants)
    }

    fn kind(&self) -> ScrapeEngineKind {
        ScrapeEngineKind::Api
    }
}

async fn fetch_page(request: reqwest::RequestBuilder) -> std::result::Result<(String, String), String> {
    let response = request.send().await.map_err(|e| e.to_string())?;
    if !response.status().is_success() {
        return Err(format!("status {}", response.status()));
    }
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("application/json")
        .to_string();
    let body = response.text().await.map_err(|e| e.to_string())?;
    Ok((body, content_type))
}

fn build_page_url(
    base_url: &str,
    pagination: Option<&grant_common::types::Pagination>,
    page: u32,
    offset: u32,
    cursor: Option<&str>,
) -> String {
    let Some(pagination) = pagination else {
        return base_url.to_string();
    };
    let separator = if base_url.contains('?') { '&' } else { '?' };
    match pagination.scheme {
        PaginationScheme::Page => format!("{base_url}{separator}page={page}&page_size={}", pagination.page_size),
        PaginationScheme::Offset => format!("{base_url}{separator}offset={offset}&limit={}", pagination.page_size),
        PaginationScheme::Cursor => match cursor {
            Some(c) => format!("{base_url}{separator}cursor={c}&limit={}", pagination.page_size),
            None => format!("{base_url}{separator}limit={}", pagination.page_size),
        },
    }
}

fn parse_records(body: &str, content_type: &str) -> Result<Vec<Value>> {
    if content_type.contains("xml") {
        xml_to_records(body)
    } else if content_type.contains("csv") {
        csv_to_records(body)
    } else {
        let parsed: Value =
            serde_json::from_str(body).map_err(|e| GrantError::Parsing(e.to_string()))?;
        Ok(extract_json_array(parsed))
    }
}

fn extract_json_array(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Object(mut map) => {
            for key in RECORD_ARRAY_KEYS {
                if let Some(Value::Array(items)) = map.remove(*key) {
                    return items;
                }
            }
            vec![Value::Object(map)]
        }
        other => vec![other],
    }
}

fn next_cursor(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    parsed
        .get("next_cursor")
        .or_else(|| parsed.get("nextCursor"))
        .and_then(|v| v.as_str())
        .map(str::to_string)
}

fn record_to_raw_grant(record: &Value, source: &Source, scraped_at: chrono::DateTime<chrono::Utc>) -> RawGrant {
    let selectors = &source.selectors;
    let field = |key: &Option<String>| -> Option<String> {
        key.as_deref()
            .and_then(|k| record.get(k))
            .and_then(field_as_string)
    };
    RawGrant {
        title: field(&selectors.title),
        description: field(&selectors.description),
        deadline: field(&selectors.deadline),
        funding_amount: field(&selectors.amount),
        eligibility: field(&selectors.eligibility),
        application_url: field(&selectors.application_url),
        funder_name: field(&selectors.funder_info),
        source_url: source.url.clone(),
        scraped_at,
        raw_content: record.clone(),
    }
}

fn field_as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
