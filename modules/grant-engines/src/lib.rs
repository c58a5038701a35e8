mod api_engine;
mod browser_engine;
mod formats;
mod pdf_engine;
mod rate_limit;
mod static_engine;
mod traits;
mod user_agent;

pub use api_engine::ApiEngine;
pub use browser_engine::BrowserEngine;
pub use pdf_engine::{PdfEngine, Section, TableRow};
pub use static_engine::StaticEngine;
pub use traits::ScrapeEngine;

/// Build the engine a source is configured to use.
pub fn engine_for(
    kind: grant_common::types::ScrapeEngineKind,
    config: &grant_common::Config,
) -> Box<dyn ScrapeEngine> {
    use grant_common::types::ScrapeEngineKind as Kind;
    match kind {
        Kind::Static => Box::new(StaticEngine::new(std::time::Duration::from_secs(config.static_timeout_sec))),
        Kind::Browser => Box::new(
            BrowserEngine::new(
                config.browserless_url.as_deref().unwrap_or("http://localhost:3000"),
                config.browserless_token.as_deref(),
            )
            .with_wait_timeout_ms(config.browser_timeout_sec * 1000),
        ),
        Kind::Api => Box::new(ApiEngine::new(std::time::Duration::from_secs(config.api_timeout_sec))),
        Kind::Pdf => Box::new(PdfEngine::new(std::time::Duration::from_secs(config.pdf_timeout_sec), "eng")),
    }
}
