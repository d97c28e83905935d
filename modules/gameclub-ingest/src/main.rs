use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;
use tracing_subscriber::EnvFilter;

use gameclub_common::{Config, Source};
use gameclub_ingest::fetcher::HttpFetcher;
use gameclub_ingest::loadout::pick_loadout;
use gameclub_ingest::scheduler::{CrawlScheduler, IntervalTicker, SourceOutcome};
use gameclub_ingest::session::CrawlSession;
use gameclub_ingest::store::{EntityStore, MemoryEntityStore, PgEntityStore};

#[derive(Parser)]
#[command(name = "gameclub-ingest", about = "Game catalog crawler")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Crawl on startup, then every CRAWL_INTERVAL_DAYS until Ctrl-C
    Serve,
    /// Crawl once and print a report per source
    Crawl {
        /// Only crawl this source (delta, yjwujian)
        #[arg(long)]
        source: Option<Source>,
    },
    /// Print a random loadout for a game as JSON
    Loadout { game: Source },
}

fn init_tracing() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("gameclub=info"))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if std::env::var("LOG_FORMAT").is_ok_and(|v| v == "json") {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

async fn open_store(config: &Config) -> Result<Arc<dyn EntityStore>> {
    match &config.database_url {
        Some(url) => {
            let store = PgEntityStore::connect(url)
                .await
                .context("Failed to connect to Postgres")?;
            store
                .ensure_schema()
                .await
                .context("Failed to prepare game_data schema")?;
            Ok(Arc::new(store))
        }
        None => {
            info!("DATABASE_URL not set, entities are kept in memory");
            Ok(Arc::new(MemoryEntityStore::new()))
        }
    }
}

fn build_scheduler(config: &Config, store: Arc<dyn EntityStore>) -> Result<Arc<CrawlScheduler>> {
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout)
        .context("Failed to build HTTP client")?;
    let session = CrawlSession::new(Arc::new(fetcher), store);
    Ok(Arc::new(CrawlScheduler::new(session)))
}

fn print_outcome(outcome: &SourceOutcome) -> Result<()> {
    match outcome {
        SourceOutcome::Completed(report) => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        SourceOutcome::Failed { source, error } => {
            eprintln!("{source}: crawl failed: {error}");
        }
        SourceOutcome::Skipped(source) => {
            eprintln!("{source}: crawl already in progress");
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing()?;
    let cli = Cli::parse();

    let config = Config::from_env().context("Invalid configuration")?;
    config.log_summary();

    let store = open_store(&config).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let scheduler = build_scheduler(&config, store)?;
            if config.crawl_on_startup {
                scheduler.trigger_all();
            }
            let handle = scheduler.spawn_periodic(IntervalTicker::new(config.crawl_interval));

            tokio::signal::ctrl_c()
                .await
                .context("Failed to listen for Ctrl-C")?;
            info!("Shutting down");
            handle.abort();
        }
        Command::Crawl { source } => {
            let scheduler = build_scheduler(&config, store)?;
            let outcomes = match source {
                Some(source) => vec![scheduler.run_source(source).await],
                None => scheduler.run_all().await,
            };
            for outcome in &outcomes {
                print_outcome(outcome)?;
            }
            if outcomes
                .iter()
                .any(|o| matches!(o, SourceOutcome::Failed { .. }))
            {
                anyhow::bail!("One or more sources failed to crawl");
            }
        }
        Command::Loadout { game } => {
            // A fresh in-memory store has nothing to draw from yet.
            if store.count(game).await? == 0 {
                info!(%game, "Store is empty, crawling before drawing");
                let scheduler = build_scheduler(&config, Arc::clone(&store))?;
                scheduler.run_source(game).await;
            }
            let mut rng = StdRng::from_os_rng();
            let loadout = pick_loadout(store.as_ref(), game, &mut rng)
                .await
                .context("Failed to draw loadout")?;
            println!("{}", serde_json::to_string_pretty(&loadout)?);
        }
    }

    Ok(())
}
