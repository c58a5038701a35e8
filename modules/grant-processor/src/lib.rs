mod category;
mod date;
mod funder;
mod hashing;
mod location;
mod money;
mod normalize;
mod url_validate;

use std::collections::BTreeMap;

use grant_common::types::{Funder, Grant, RawGrant};

pub use category::category_scores;
pub use hashing::{content_hash, duplicate_hash, ContentFields};

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub aggressive_normalization: bool,
    pub currency_rates: BTreeMap<String, f64>,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            aggressive_normalization: false,
            currency_rates: money::default_currency_rates(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessingReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub quality_score: u8,
}

impl ProcessingReport {
    fn finalize(mut self) -> Self {
        let penalty = self.errors.len() * 20 + self.warnings.len() * 10;
        self.quality_score = 100u32.saturating_sub(penalty as u32).min(100) as u8;
        self
    }
}

/// Transforms RawGrant into a canonical Grant, per spec §4.3. One instance
/// per currency-rate/normalization policy; stateless otherwise.
pub struct Processor {
    config: ProcessorConfig,
}

impl Processor {
    pub fn new(config: ProcessorConfig) -> Self {
        Self { config }
    }

    pub fn process(&self, raw: &RawGrant) -> (Grant, ProcessingReport) {
        let mut report = ProcessingReport::default();

        let title = raw
            .title
            .as_deref()
            .map(|t| normalize::normalize_text(t, self.config.aggressive_normalization))
            .unwrap_or_default();
        if title.is_empty() {
            report.errors.push("missing title".to_string());
        }

        let description = raw
            .description
            .as_deref()
            .map(|t| normalize::normalize_text(t, self.config.aggressive_normalization))
            .unwrap_or_default();
        if description.is_empty() {
            report.errors.push("missing description".to_string());
        }

        let funder_name = raw
            .funder_name
            .as_deref()
            .map(|t| normalize::normalize_text(t, self.config.aggressive_normalization))
            .unwrap_or_default();
        if funder_name.is_empty() {
            report.errors.push("missing funder name".to_string());
        }

        let eligibility_criteria = raw
            .eligibility
            .as_deref()
            .map(|t| normalize::normalize_text(t, self.config.aggressive_normalization))
            .unwrap_or_default();

        let (amount_min, amount_max) = match raw.funding_amount.as_deref() {
            Some(text) => {
                let parsed = money::parse_money(text, &self.config.currency_rates);
                if let Some(warning) = parsed.warning {
                    report.warnings.push(warning);
                }
                (parsed.amount_min, parsed.amount_max)
            }
            None => {
                report.warnings.push("no funding amount text provided".to_string());
                (None, None)
            }
        };

        let deadline = match raw.deadline.as_deref() {
            Some(text) => {
                let parsed = date::parse_date(text);
                if parsed.is_none() {
                    report.warnings.push(format!("could not parse deadline: {text}"));
                }
                parsed
            }
            None => None,
        };

        let application_url = raw.application_url.as_deref().and_then(|raw_url| {
            let validated = url_validate::validate_url(raw_url);
            if validated.is_none() {
                report.warnings.push(format!("could not validate application url: {raw_url}"));
            }
            validated
        });

        let funder_type = funder::infer_funder_type(&raw.source_url, &funder_name);

        let combined_text = format!("{title} {description} {eligibility_criteria}");
        let category = category::infer_category(&combined_text);
        let locations = location::extract_locations(&combined_text);

        let locations_vec: Vec<String> = locations.iter().cloned().collect();
        let hash_fields = ContentFields {
            title: &title,
            description: &description,
            funder_name: &funder_name,
            deadline,
            amount_min,
            amount_max,
            application_url: application_url.as_deref(),
            category: &category.to_string(),
            locations: &locations_vec,
        };
        let content_hash = hashing::content_hash(&hash_fields);
        let duplicate_hash = hashing::duplicate_hash(&hash_fields);

        let present_fields = [!title.is_empty(), !description.is_empty(), !funder_name.is_empty(), amount_min.is_some(), deadline.is_some()];
        let present_count = present_fields.iter().filter(|p| **p).count();
        let confidence_score = ((present_count as f32 / present_fields.len() as f32) * 100.0).round() as u8;

        let grant = Grant {
            title,
            description,
            deadline,
            amount_min,
            amount_max,
            eligibility_criteria,
            application_url,
            funder: Funder {
                name: funder_name,
                website: None,
                contact_email: None,
                funder_type,
            },
            category,
            location_eligibility: locations,
            confidence_score,
            content_hash,
            duplicate_hash,
            tags: Default::default(),
        };

        (grant, report.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_raw() -> RawGrant {
        RawGrant {
            title: Some("Community Health Grant".to_string()),
            description: Some("Supports clinics serving low-income neighborhoods.".to_string()),
            deadline: Some("March 15, 2027".to_string()),
            funding_amount: Some("$5,000 - $50,000".to_string()),
            eligibility: Some("Open to 501(c)(3) nonprofits in California.".to_string()),
            application_url: Some("example.org/apply".to_string()),
            funder_name: Some("Example Health Foundation".to_string()),
            source_url: "https://example.org/grants/1".to_string(),
            scraped_at: Utc::now(),
            raw_content: serde_json::Value::Null,
        }
    }

    #[test]
    fn processes_a_complete_raw_grant_without_errors() {
        let processor = Processor::new(ProcessorConfig::default());
        let (grant, report) = processor.process(&sample_raw());
        assert!(report.errors.is_empty());
        assert_eq!(grant.amount_min, Some(5_000));
        assert_eq!(grant.amount_max, Some(50_000));
        assert!(grant.deadline.is_some());
        assert_eq!(grant.application_url.as_deref(), Some("https://example.org/apply"));
    }

    #[test]
    fn missing_title_is_an_error_and_lowers_quality_score() {
        let mut raw = sample_raw();
        raw.title = None;
        let processor = Processor::new(ProcessorConfig::default());
        let (_grant, report) = processor.process(&raw);
        assert!(report.errors.iter().any(|e| e.contains("title")));
        assert!(report.quality_score < 100);
    }

    #[test]
    fn content_hash_is_stable_for_identical_input() {
        let processor = Processor::new(ProcessorConfig::default());
        let (a, _) = processor.process(&sample_raw());
        let (b, _) = processor.process(&sample_raw());
        assert_eq!(a.content_hash, b.content_hash);
        assert_eq!(a.duplicate_hash, b.duplicate_hash);
    }
}
