use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use grant_common::ports::fakes::{InMemoryGrantStore, RecordingAlerter};
use grant_common::ports::GrantStore;
use grant_common::types::Frequency;
use grant_common::{Config, GrantError};
use grant_observability::{InMemoryErrorTracker, InMemoryMetricsCollector};
use grant_orchestrator::{Orchestrator, OrchestratorConfig};
use grant_scheduler::{Scheduler, SchedulerConfig};
use grant_sources::SourceManager;

const EXIT_SUCCESS: u8 = 0;
const EXIT_CONFIG: u8 = 1;
const EXIT_RUNTIME: u8 = 2;
const EXIT_NOT_FOUND: u8 = 3;

#[derive(Parser)]
#[command(name = "grant-cli")]
#[command(about = "Admin CLI for the grant ingestion core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List all active sources
    ListSources,
    /// Run a one-shot scrape of a source immediately
    Scrape { source_id: String },
    /// Schedule a recurring scrape at the given frequency (hourly|daily|weekly|monthly)
    Schedule { source_id: String, frequency: String },
    /// Run a health check against a source's URL
    Health { source_id: String },
    /// Print aggregate scheduler stats
    Stats,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("grant_cli=info".parse().expect("static directive parses")))
        .init();

    let cli = Cli::parse();
    // No production datastore adapter ships with this core (see SPEC_FULL §2);
    // the CLI operates against an in-process registry seeded for this run.
    let store = Arc::new(InMemoryGrantStore::new());
    let sources = Arc::new(SourceManager::new(store.clone()));

    let code = match cli.command {
        Commands::ListSources => run_list_sources(&sources).await,
        Commands::Scrape { source_id } => run_scrape(&sources, store.clone(), &source_id).await,
        Commands::Schedule { source_id, frequency } => run_schedule(&sources, &source_id, &frequency).await,
        Commands::Health { source_id } => run_health(&sources, &source_id).await,
        Commands::Stats => run_stats(&sources).await,
    };

    ExitCode::from(code)
}

fn parse_source_id(raw: &str) -> Result<Uuid, u8> {
    Uuid::parse_str(raw).map_err(|e| {
        eprintln!("invalid source id '{raw}': {e}");
        EXIT_CONFIG
    })
}

async fn run_list_sources<S: GrantStore>(sources: &SourceManager<S>) -> u8 {
    match sources.list_active().await {
        Ok(list) => {
            if list.is_empty() {
                println!("no active sources");
            }
            for source in list {
                println!(
                    "{}  {:8}  {:7}  {}",
                    source.id, source.source_type, source.engine, source.url
                );
            }
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("failed to list sources: {e}");
            EXIT_RUNTIME
        }
    }
}

async fn run_scrape<S: GrantStore>(sources: &Arc<SourceManager<S>>, store: Arc<S>, source_id: &str) -> u8 {
    let id = match parse_source_id(source_id) {
        Ok(id) => id,
        Err(code) => return code,
    };

    if let Err(e) = sources.get_active(id).await {
        return not_found_or_runtime(e);
    }

    let alerter = Arc::new(RecordingAlerter::default());
    let error_tracker = Arc::new(InMemoryErrorTracker::default());
    let metrics_collector = Arc::new(InMemoryMetricsCollector::default());
    let orchestrator = Orchestrator::new(
        sources.clone(),
        store,
        alerter,
        error_tracker,
        metrics_collector,
        Config::default(),
        OrchestratorConfig::default(),
    );

    let scheduler = Scheduler::new(grant_common::ports::SystemClock, SchedulerConfig::default());
    let job = scheduler.schedule(id, 5, None);

    let result = orchestrator.execute(&job).await;
    println!(
        "source {}: found={} inserted={} updated={} skipped={} errors={} duration_ms={}",
        result.source_id,
        result.total_found,
        result.total_inserted,
        result.total_updated,
        result.total_skipped,
        result.errors.len(),
        result.duration.as_millis()
    );
    for error in &result.errors {
        eprintln!("  [{}] {}", error.category, error.message);
    }

    if result.errors.is_empty() {
        EXIT_SUCCESS
    } else {
        EXIT_RUNTIME
    }
}

async fn run_schedule<S: GrantStore>(sources: &SourceManager<S>, source_id: &str, frequency: &str) -> u8 {
    let id = match parse_source_id(source_id) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let frequency: Frequency = match frequency.parse() {
        Ok(f) => f,
        Err(_) => {
            eprintln!("invalid frequency '{frequency}': expected hourly|daily|weekly|monthly");
            return EXIT_CONFIG;
        }
    };

    if let Err(e) = sources.get_active(id).await {
        return not_found_or_runtime(e);
    }

    let scheduler = Scheduler::new(grant_common::ports::SystemClock, SchedulerConfig::default());
    let job = scheduler.schedule_recurring(id, frequency, 5);
    println!("scheduled job {} for source {} ({frequency})", job.id, id);
    EXIT_SUCCESS
}

async fn run_health<S: GrantStore>(sources: &SourceManager<S>, source_id: &str) -> u8 {
    let id = match parse_source_id(source_id) {
        Ok(id) => id,
        Err(code) => return code,
    };
    let source = match sources.get_active(id).await {
        Ok(source) => source,
        Err(e) => return not_found_or_runtime(e),
    };

    let client = reqwest::Client::new();
    let result = grant_sources::check_health(&client, &source.url).await;
    println!(
        "healthy={} status={:?} response_time_ms={} error={:?}",
        result.healthy, result.status_code, result.response_time_ms, result.error
    );
    EXIT_SUCCESS
}

async fn run_stats<S: GrantStore>(sources: &SourceManager<S>) -> u8 {
    match sources.list_active().await {
        Ok(list) => {
            println!("active sources: {}", list.len());
            let due = sources.due_for_health_check().await.unwrap_or_default();
            println!("due for recheck: {}", due.len());
            EXIT_SUCCESS
        }
        Err(e) => {
            eprintln!("failed to gather stats: {e}");
            EXIT_RUNTIME
        }
    }
}

fn not_found_or_runtime(error: GrantError) -> u8 {
    match error {
        GrantError::NotFound(msg) => {
            eprintln!("source not found: {msg}");
            EXIT_NOT_FOUND
        }
        other => {
            eprintln!("runtime failure: {other}");
            EXIT_RUNTIME
        }
    }
}
