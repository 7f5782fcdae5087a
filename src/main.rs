use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use merch_watcher::config::LoggingConfig;
use merch_watcher::plugins::reporters::{
    ConsoleReporter, DiscordReporter, DiscordWebhook, StatusBoard,
};
use merch_watcher::plugins::traits::Classifier;
use merch_watcher::plugins::ReporterManager;
use merch_watcher::{AppConfig, Fetcher, HttpFetcher, Product, StorefrontClassifier, Watcher};

#[derive(Parser)]
#[command(name = "merch-watcher", version, about = "Watch merch store pages for pre-orders and restocks")]
struct Cli {
    /// Load configuration from this file instead of config/
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Poll the catalog until Ctrl-C
    Run,
    /// Fetch one product page once and print its status
    Check {
        /// Catalog product name or a page URL
        target: String,
    },
    /// Classify a saved HTML page
    Classify { file: PathBuf },
    /// Print the product catalog
    List {
        /// Emit the catalog as TOML
        #[arg(long)]
        toml: bool,
    },
}

#[derive(Serialize)]
struct CatalogFile<'a> {
    products: &'a [Product],
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => AppConfig::from_env().context("Failed to load configuration")?,
    };

    let _guard = init_tracing(&config.logging)?;

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run(config).await,
        Command::Check { target } => check(&config, &target).await,
        Command::Classify { file } => classify_file(&file),
        Command::List { toml } => list(&config, toml),
    }
}

fn init_tracing(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(format!("merch_watcher={}", logging.level)))
        .context("Invalid log level")?;

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, "merch-watcher.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn run(config: AppConfig) -> Result<()> {
    let catalog = config.catalog()?;
    let board = StatusBoard::from_config(&config.display)?;

    let mut reporters = ReporterManager::new()
        .with(Arc::new(ConsoleReporter::new()))
        .with(Arc::new(board.clone()));
    if let Some(webhook) = DiscordWebhook::from_config(&config.notifications.discord) {
        reporters.register(Arc::new(DiscordReporter::new(webhook)));
    }
    info!("Reporters: {}", reporters.list_reporters().join(", "));

    let watcher = Watcher::new(config.watcher.clone(), catalog, Arc::new(reporters));

    info!("Starting Merch Watcher...");
    board.mark_started();
    watcher.start()?;

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    watcher.stop().await;

    for (channel, view) in board.views() {
        info!("[{}] {} ({})", channel, view.line, view.time);
    }

    Ok(())
}

async fn check(config: &AppConfig, target: &str) -> Result<()> {
    let catalog = config.catalog()?;
    let url = match catalog.get(target) {
        Some(product) => product.url.clone(),
        None if url::Url::parse(target).is_ok() => target.to_string(),
        None => bail!("'{}' is neither a catalog product nor a URL", target),
    };

    let fetcher = HttpFetcher::new(&config.watcher)?;
    let html = fetcher.fetch(&url).await?;
    let classification = StorefrontClassifier.classify_detailed(&html);

    println!("{}", url);
    println!("status:     {}", classification.status);
    println!("decided by: {}", serde_json::to_string(&classification.decided_by)?);
    Ok(())
}

fn classify_file(file: &Path) -> Result<()> {
    let html = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let classification = StorefrontClassifier.classify_detailed(&html);

    println!("status:     {}", classification.status);
    println!("decided by: {}", serde_json::to_string(&classification.decided_by)?);
    Ok(())
}

fn list(config: &AppConfig, as_toml: bool) -> Result<()> {
    let catalog = config.catalog()?;

    if as_toml {
        let file = CatalogFile {
            products: catalog.products(),
        };
        print!("{}", toml::to_string_pretty(&file)?);
        return Ok(());
    }

    for product in catalog.iter() {
        println!("{:<10} {:<28} {}", product.artist_tag, product.name, product.url);
    }
    Ok(())
}
