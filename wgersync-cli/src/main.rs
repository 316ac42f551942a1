mod page;

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use log::info;

use wgersync::catalog::WgerClient;
use wgersync::config::{API_URL_VAR, DATABASE_URL_VAR};
use wgersync::report::{Dashboard, NO_CHART_DATA_NOTICE, NO_EXERCISES_NOTICE, exercise_listing};
use wgersync::sync::sync_exercises;
use wgersync::{Config, ExerciseStore, logging};

use page::run_exercise_page;

#[derive(Parser, Debug)]
#[command(version, about = "wgersync - WGER exercise catalog sync", long_about = None)]
struct Args {
    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,
    /// Connection string for the exercise store (overrides DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,
    /// Base URL of the wger API (overrides WGER_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// off, error, warn, info, debug or trace
    #[arg(long, global = true)]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Interactive page with sync, listing and chart views
    Interactive,
    /// Fetch the exercise catalog and upsert it into the store
    Sync,
    /// List stored exercises ordered by name
    List,
    /// Print exercise counts per category, equipment and primary muscle
    Visualize,
}

/// One-line failure message with advice picked by the error kind.
fn describe_failure(action: &str, e: &wgersync::Error) -> String {
    format!("{}: {} {}", action, e, e.kind().hint())
}

fn load_env_file(path: Option<&PathBuf>) -> Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("could not load env file {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }
    Ok(())
}

fn load_config(args: &Args) -> Result<Config> {
    let config = Config::from_lookup(|key| {
        let flag = match key {
            DATABASE_URL_VAR => args.database_url.clone(),
            API_URL_VAR => args.api_url.clone(),
            _ => None,
        };
        flag.or_else(|| env::var(key).ok())
    })?;
    info!("Using {}", config.redacted());
    Ok(config)
}

async fn run_sync(store: &ExerciseStore, client: &WgerClient) -> Result<()> {
    let report = match sync_exercises(client, store).await {
        Ok(report) => report,
        Err(e) => bail!(describe_failure("Sync failed", &e)),
    };
    println!("Sync succeeded. Total records saved: {}", report.saved);
    Ok(())
}

fn print_listing(store: &ExerciseStore) -> Result<()> {
    let listing = exercise_listing(store)?;
    if listing.is_empty() {
        println!("{}", NO_EXERCISES_NOTICE);
        return Ok(());
    }
    for entry in listing {
        println!("{}", entry);
        println!("---");
    }
    Ok(())
}

fn print_dashboard(store: &ExerciseStore) -> Result<()> {
    let Some(dashboard) = Dashboard::load(store)? else {
        println!("{}", NO_CHART_DATA_NOTICE);
        return Ok(());
    };
    for aggregate in dashboard.aggregates() {
        println!("{}", aggregate);
    }
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();
    load_env_file(args.env_file.as_ref())?;

    // Log lines would tear the full-screen page, so it stays quiet unless asked.
    let default_level = match args.command {
        Commands::Interactive => "off",
        _ => "info",
    };
    let level = args.log_level.as_deref().unwrap_or(default_level);
    if !logging::set_log_level(level) {
        bail!("unknown log level: {}", level);
    }

    let config = load_config(&args)?;
    let store = ExerciseStore::open(&config.database_url)?;
    let client = WgerClient::new(&config)?;

    match args.command {
        Commands::Interactive => {
            let terminal = ratatui::init();
            let result = run_exercise_page(terminal, &store, &client).await;
            ratatui::restore();
            result
        }
        Commands::Sync => run_sync(&store, &client).await,
        Commands::List => print_listing(&store),
        Commands::Visualize => print_dashboard(&store),
    }
}
