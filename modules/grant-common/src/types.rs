use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, NaiveDate, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Closed enums (spec §6)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum GrantCategory {
    HealthcarePublicHealth,
    EducationTraining,
    EnvironmentSustainability,
    SocialServices,
    ArtsCulture,
    TechnologyInnovation,
    ResearchDevelopment,
    CommunityDevelopment,
}

impl std::fmt::Display for GrantCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::HealthcarePublicHealth => "healthcare_public_health",
            Self::EducationTraining => "education_training",
            Self::EnvironmentSustainability => "environment_sustainability",
            Self::SocialServices => "social_services",
            Self::ArtsCulture => "arts_culture",
            Self::TechnologyInnovation => "technology_innovation",
            Self::ResearchDevelopment => "research_development",
            Self::CommunityDevelopment => "community_development",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GrantCategory {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthcare_public_health" => Ok(Self::HealthcarePublicHealth),
            "education_training" => Ok(Self::EducationTraining),
            "environment_sustainability" => Ok(Self::EnvironmentSustainability),
            "social_services" => Ok(Self::SocialServices),
            "arts_culture" => Ok(Self::ArtsCulture),
            "technology_innovation" => Ok(Self::TechnologyInnovation),
            "research_development" => Ok(Self::ResearchDevelopment),
            "community_development" => Ok(Self::CommunityDevelopment),
            other => Err(format!("unknown GrantCategory: {other}")),
        }
    }
}

impl Default for GrantCategory {
    fn default() -> Self {
        Self::CommunityDevelopment
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Gov,
    Foundation,
    Business,
    Ngo,
    Other,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Gov => "gov",
            Self::Foundation => "foundation",
            Self::Business => "business",
            Self::Ngo => "ngo",
            Self::Other => "other",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for SourceType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gov" => Ok(Self::Gov),
            "foundation" => Ok(Self::Foundation),
            "business" => Ok(Self::Business),
            "ngo" => Ok(Self::Ngo),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown SourceType: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SourceStatus {
    Active,
    Inactive,
    Error,
}

impl std::fmt::Display for SourceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Error => "error",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ScrapeEngineKind {
    Static,
    Browser,
    Api,
    Pdf,
}

impl std::fmt::Display for ScrapeEngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Static => "static",
            Self::Browser => "browser",
            Self::Api => "api",
            Self::Pdf => "pdf",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Hourly,
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Map to an interval, per spec §4.8 (hourly=1h, daily=24h, weekly=7d, monthly=30d).
    pub fn interval(&self) -> chrono::Duration {
        match self {
            Self::Hourly => chrono::Duration::hours(1),
            Self::Daily => chrono::Duration::hours(24),
            Self::Weekly => chrono::Duration::days(7),
            Self::Monthly => chrono::Duration::days(30),
        }
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Frequency {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "hourly" => Ok(Self::Hourly),
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown Frequency: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ChangeType {
    Minor,
    Major,
    Critical,
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Critical => "critical",
        };
        write!(f, "{s}")
    }
}

// ---------------------------------------------------------------------------
// Source (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Selectors {
    pub container: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub amount: Option<String>,
    pub eligibility: Option<String>,
    pub application_url: Option<String>,
    pub funder_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RateLimit {
    pub requests_per_minute: u32,
    pub min_delay_ms: u64,
    pub respect_robots: bool,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            requests_per_minute: 30,
            min_delay_ms: 500,
            respect_robots: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Authentication {
    Bearer { token: String },
    Basic { username: String, password: String },
    ApiKey { header: String, key: String },
    OAuth2 {
        client_id: String,
        client_secret: String,
        token_url: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaginationScheme {
    Offset,
    Cursor,
    Page,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Pagination {
    pub scheme: PaginationScheme,
    pub page_size: u32,
    pub max_pages: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct SourceMetrics {
    pub success_count: u64,
    pub fail_count: u64,
    pub avg_parse_ms: f64,
    pub last_scraped_at: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
    pub success_rate: f64,
}

impl SourceMetrics {
    /// Recompute `success_rate` from the current counters.
    pub fn recompute_success_rate(&mut self) {
        let total = self.success_count + self.fail_count;
        self.success_rate = if total == 0 {
            0.0
        } else {
            self.success_count as f64 / total as f64
        };
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Source {
    pub id: Uuid,
    pub url: String,
    pub source_type: SourceType,
    pub engine: ScrapeEngineKind,
    pub selectors: Selectors,
    pub rate_limit: RateLimit,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    pub authentication: Option<Authentication>,
    pub pagination: Option<Pagination>,
    pub status: SourceStatus,
    pub frequency: Frequency,
    #[serde(default)]
    pub metrics: SourceMetrics,
}

impl Source {
    /// Selectors are required when the engine renders via selectors (spec §4.7).
    pub fn requires_selectors(&self) -> bool {
        matches!(self.engine, ScrapeEngineKind::Static | ScrapeEngineKind::Browser)
    }
}

// ---------------------------------------------------------------------------
// RawGrant — engine output (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawGrant {
    pub title: Option<String>,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub funding_amount: Option<String>,
    pub eligibility: Option<String>,
    pub application_url: Option<String>,
    pub funder_name: Option<String>,
    pub source_url: String,
    pub scraped_at: DateTime<Utc>,
    /// Opaque engine-specific extras: original HTML, PDF metadata, table rows,
    /// section confidences. Never interpreted outside the engine that wrote it.
    #[serde(default)]
    pub raw_content: serde_json::Value,
}

// ---------------------------------------------------------------------------
// Grant — canonical record (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Funder {
    pub name: String,
    pub website: Option<String>,
    pub contact_email: Option<String>,
    #[serde(rename = "type")]
    pub funder_type: SourceType,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Grant {
    pub title: String,
    pub description: String,
    pub deadline: Option<NaiveDate>,
    pub amount_min: Option<u64>,
    pub amount_max: Option<u64>,
    pub eligibility_criteria: String,
    pub application_url: Option<String>,
    pub funder: Funder,
    pub category: GrantCategory,
    pub location_eligibility: BTreeSet<String>,
    pub confidence_score: u8,
    pub content_hash: String,
    pub duplicate_hash: String,
    pub tags: BTreeSet<String>,
}

impl Grant {
    /// `amount-min ≤ amount-max` when both present (spec §3 invariant).
    pub fn amounts_are_ordered(&self) -> bool {
        match (self.amount_min, self.amount_max) {
            (Some(min), Some(max)) => min <= max,
            _ => true,
        }
    }
}

// ---------------------------------------------------------------------------
// Job (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JobMetadata {
    pub attempts: u32,
    pub last_error: Option<String>,
    pub retry_delay_ms: Option<u64>,
    pub cancel_requested: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub source_id: Uuid,
    pub scheduled_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub status: JobStatus,
    pub priority: u8,
    pub metadata: JobMetadata,
}

/// Clamp a requested priority into the valid `1..=10` range (spec §3).
pub fn clamp_priority(priority: u8) -> u8 {
    priority.clamp(1, 10)
}

impl Job {
    pub fn new(source_id: Uuid, priority: u8, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            source_id,
            scheduled_at,
            started_at: None,
            finished_at: None,
            status: JobStatus::Pending,
            priority: clamp_priority(priority),
            metadata: JobMetadata::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// ChangeRecord (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub grant_id: Uuid,
    pub previous_hash: String,
    pub current_hash: String,
    pub changed_fields: BTreeSet<String>,
    pub change_type: ChangeType,
    pub detected_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// ValidationReport (spec §3)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub quality_score: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grant_category_roundtrips_through_display_and_fromstr() {
        for cat in [
            GrantCategory::HealthcarePublicHealth,
            GrantCategory::EducationTraining,
            GrantCategory::EnvironmentSustainability,
            GrantCategory::SocialServices,
            GrantCategory::ArtsCulture,
            GrantCategory::TechnologyInnovation,
            GrantCategory::ResearchDevelopment,
            GrantCategory::CommunityDevelopment,
        ] {
            let s = cat.to_string();
            let parsed: GrantCategory = s.parse().unwrap();
            assert_eq!(parsed, cat);
        }
    }

    #[test]
    fn frequency_roundtrips_through_display_and_fromstr() {
        for freq in [Frequency::Hourly, Frequency::Daily, Frequency::Weekly, Frequency::Monthly] {
            let parsed: Frequency = freq.to_string().parse().unwrap();
            assert_eq!(parsed, freq);
        }
        assert!("fortnightly".parse::<Frequency>().is_err());
    }

    #[test]
    fn priority_clamps_into_range() {
        assert_eq!(clamp_priority(0), 1);
        assert_eq!(clamp_priority(15), 10);
        assert_eq!(clamp_priority(5), 5);
    }

    #[test]
    fn amounts_ordered_invariant() {
        let mut grant = sample_grant();
        grant.amount_min = Some(100);
        grant.amount_max = Some(50);
        assert!(!grant.amounts_are_ordered());
        grant.amount_max = Some(200);
        assert!(grant.amounts_are_ordered());
    }

    fn sample_grant() -> Grant {
        Grant {
            title: "Test Grant".into(),
            description: "A grant for testing purposes with enough length.".into(),
            deadline: None,
            amount_min: None,
            amount_max: None,
            eligibility_criteria: "Nonprofits".into(),
            application_url: None,
            funder: Funder {
                name: "Test Foundation".into(),
                website: None,
                contact_email: None,
                funder_type: SourceType::Foundation,
            },
            category: GrantCategory::default(),
            location_eligibility: BTreeSet::new(),
            confidence_score: 80,
            content_hash: "0".repeat(64),
            duplicate_hash: "0".repeat(32),
            tags: BTreeSet::new(),
        }
    }
}
