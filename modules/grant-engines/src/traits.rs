use async_trait::async_trait;
use grant_common::types::{RawGrant, ScrapeEngineKind, Source};
use grant_common::Result;

/// Common capability every fetcher implements, selected at construction time
/// by the source's configured engine — not an inheritance hierarchy.
#[async_trait]
pub trait ScrapeEngine: Send + Sync {
    async fn fetch(&self, source: &Source) -> Result<Vec<RawGrant>>;

    fn kind(&self) -> ScrapeEngineKind;
}
