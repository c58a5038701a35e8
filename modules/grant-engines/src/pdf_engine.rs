use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use tokio::process::Command;

use grant_common::types::{RawGrant, ScrapeEngineKind, Source};
use grant_common::{GrantError, Result};

use crate::rate_limit::RateLimiter;
use crate::traits::ScrapeEngine;

const MIN_EXTRACTED_CHARS: usize = 100;
const MAX_NON_ALPHANUMERIC_RATIO: f32 = 0.3;
/// If the two candidate texts are within this ratio of each other in length,
/// treat them as "comparable" and keep both (spec §4.2).
const COMPARABLE_LENGTH_RATIO: f32 = 0.2;

static SECTION_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*(?:[A-Z][A-Z \t]{4,60}|\d+\.\s+[A-Z].{3,80})\s*$").unwrap());
static TABLE_ROW: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" {2,}|\t+").unwrap());

#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableRow {
    pub columns: Vec<String>,
}

/// Downloads a PDF, extracts text, falls back to OCR when the text layer
/// looks unreliable, and splits the result into sections/tables.
pub struct PdfEngine {
    client: Client,
    ocr_language: String,
    pdfium_library_path: Option<String>,
}

impl PdfEngine {
    pub fn new(timeout: Duration, ocr_language: impl Into<String>) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("reqwest client configuration is infallible at build time"),
            ocr_language: ocr_language.into(),
            pdfium_library_path: None,
        }
    }

    pub fn with_pdfium_library_path(mut self, path: impl Into<String>) -> Self {
        self.pdfium_library_path = Some(path.into());
        self
    }
}

#[async_trait]
impl ScrapeEngine for PdfEngine {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawGrant>> {
        let limiter = RateLimiter::new(&source.rate_limit);
        limiter.acquire().await;

        let bytes = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| GrantError::Network(e.to_string()))?
            .bytes()
            .await
            .map_err(|e| GrantError::Network(e.to_string()))?;

        let extracted = pdf_extract::extract_text_from_mem(&bytes)
            .map_err(|e| GrantError::Parsing(format!("pdf text extraction failed: {e}")))?;

        let needs_ocr = needs_ocr(&extracted);
        let (final_text, ocr_used, page_confidences) = if needs_ocr {
            match run_ocr(&bytes, &self.ocr_language, self.pdfium_library_path.as_deref()).await {
                Ok((ocr_text, confidences)) => {
                    let combined = combine_texts(&extracted, &ocr_text);
                    (combined, true, confidences)
                }
                Err(err) => {
                    tracing::warn!(source_url = %source.url, error = %err, "OCR fallback failed, keeping extracted text");
                    (extracted.clone(), false, Vec::new())
                }
            }
        } else {
            (extracted.clone(), false, Vec::new())
        };

        let sections = split_sections(&final_text);
        let tables = split_tables(&final_text);

        let raw_content = serde_json::json!({
            "sections": sections,
            "tables": tables,
            "ocr_used": ocr_used,
            "page_confidences": page_confidences,
            "char_count": final_text.chars().count(),
        });

        let title = sections.first().map(|s: &Section| s.heading.clone());
        let description = sections
            .first()
            .map(|s| s.body.clone())
            .unwrap_or_else(|| final_text.clone());

        Ok(vec![RawGrant {
            title,
            description: Some(description),
            deadline: None,
            funding_amount: None,
            eligibility: None,
            application_url: None,
            funder_name: None,
            source_url: source.url.clone(),
            scraped_at: chrono::Utc::now(),
            raw_content,
        }])
    }

    fn kind(&self) -> ScrapeEngineKind {
        ScrapeEngineKind::Pdf
    }
}

fn needs_ocr(text: &str) -> bool {
    if text.chars().count() < MIN_EXTRACTED_CHARS {
        return true;
    }
    let total = text.chars().count().max(1) as f32;
    let non_alphanumeric = text.chars().filter(|c| !c.is_alphanumeric() && !c.is_whitespace()).count() as f32;
    non_alphanumeric / total > MAX_NON_ALPHANUMERIC_RATIO
}

/// The longer candidate wins outright; comparable-length candidates are
/// concatenated with a separator marker (spec §4.2).
fn combine_texts(extracted: &str, ocr: &str) -> String {
    let (longer, shorter) = if extracted.len() >= ocr.len() {
        (extracted, ocr)
    } else {
        (ocr, extracted)
    };
    let ratio = shorter.len() as f32 / longer.len().max(1) as f32;
    if ratio >= (1.0 - COMPARABLE_LENGTH_RATIO) {
        format!("{extracted}\n--- OCR TEXT ---\n{ocr}")
    } else {
        longer.to_string()
    }
}

fn split_sections(text: &str) -> Vec<Section> {
    let mut sections = Vec::new();
    let mut matches: Vec<(usize, &str)> = SECTION_HEADER
        .find_iter(text)
        .map(|m| (m.start(), m.as_str().trim()))
        .collect();
    if matches.is_empty() {
        return sections;
    }
    matches.push((text.len(), ""));
    for window in matches.windows(2) {
        let (start, heading) = window[0];
        let (next_start, _) = window[1];
        let heading_end = start + heading.len();
        let body = text[heading_end.min(text.len())..next_start.min(text.len())].trim().to_string();
        sections.push(Section {
            heading: heading.to_string(),
            body,
        });
    }
    sections
}

fn split_tables(text: &str) -> Vec<TableRow> {
    text.lines()
        .filter(|line| TABLE_ROW.is_match(line))
        .map(|line| TableRow {
            columns: TABLE_ROW.split(line).map(|c| c.trim().to_string()).filter(|c| !c.is_empty()).collect(),
        })
        .filter(|row| row.columns.len() >= 2)
        .collect()
}

async fn run_ocr(
    pdf_bytes: &[u8],
    language: &str,
    pdfium_library_path: Option<&str>,
) -> Result<(String, Vec<f32>)> {
    let bindings = match pdfium_library_path {
        Some(path) => pdfium_render::prelude::Pdfium::bind_to_library(path),
        None => pdfium_render::prelude::Pdfium::bind_to_system_library(),
    }
    .map_err(|e| GrantError::Parsing(format!("failed to bind pdfium: {e}")))?;
    let pdfium = pdfium_render::prelude::Pdfium::new(bindings);

    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(|e| GrantError::Parsing(format!("failed to load pdf for rasterization: {e}")))?;

    let render_config = pdfium_render::prelude::PdfRenderConfig::new()
        .set_target_width(1600)
        .set_maximum_height(2200);

    let mut combined_text = String::new();
    let mut confidences = Vec::new();

    for page in document.pages().iter() {
        let bitmap = page
            .render_with_config(&render_config)
            .map_err(|e| GrantError::Parsing(format!("failed to render pdf page: {e}")))?;
        let image = bitmap.as_image();

        let temp_file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .map_err(GrantError::Io)?;
        image
            .save(temp_file.path())
            .map_err(|e| GrantError::Parsing(format!("failed to write raster page: {e}")))?;

        let output = Command::new("tesseract")
            .arg(temp_file.path())
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .output()
            .await
            .map_err(|e| GrantError::Parsing(format!("tesseract invocation failed: {e}")))?;

        if output.status.success() {
            combined_text.push_str(&String::from_utf8_lossy(&output.stdout));
            combined_text.push('\n');
            confidences.push(1.0);
        } else {
            tracing::warn!("tesseract exited non-zero for one page, skipping it");
            confidences.push(0.0);
        }
    }

    Ok((combined_text, confidences))
}
