use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quartermaster::api;
use quartermaster::config::AppConfig;
use quartermaster::fetch::{RowSource, SheetClient, SheetClientConfig};
use quartermaster::format;
use quartermaster::normalize::{rows_from_source, validate_records};
use quartermaster::query::{dispatch, dispatch_matrix_sheet, Query, QueryResponse};
use quartermaster::reminder::{Reminder, ReminderError, ReminderSchedule, ReminderSink};

#[derive(Parser)]
#[command(name = "quartermaster")]
#[command(about = "League match tracker: deck meta statistics over a shared results sheet")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: String,

    /// Results sheet endpoint (overrides the config file)
    #[arg(long)]
    sheet_url: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,
    },

    /// Run a single query and print the chat-formatted reply
    Query {
        #[command(subcommand)]
        query: QueryCommand,
    },

    /// Run the countdown reminder loop (messages print to stdout)
    Remind,
}

#[derive(Subcommand)]
enum QueryCommand {
    /// Current meta overview
    Meta,

    /// Performance stats for one deck
    DeckStats { deck: String },

    /// Matchup table for one deck
    Matchups { deck: String },

    /// Top pilots of one deck
    TopPilots {
        deck: String,

        /// Ranking depth (1-20)
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Head-to-head record between two decks
    Vs { deck1: String, deck2: String },

    /// Recent result trend for one deck
    Trend { deck: String },

    /// Most recent matches
    Recent {
        /// How many matches to list (1-20)
        #[arg(long)]
        count: Option<i64>,
    },

    /// Matchup matrix grid
    Matrix,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting quartermaster v{}", env!("CARGO_PKG_VERSION"));

    let mut config = load_config(&cli.config)?;
    if let Some(url) = cli.sheet_url {
        config.sheet.url = url;
    }
    config.validate()?;

    match cli.command {
        Commands::Serve { host, port } => {
            let state = api::state::AppState {
                source: sheet_client(&config)?,
                matrix_sheet: config.sheet.matrix_sheet.clone(),
            };
            let app = api::build_router(state);

            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }

        Commands::Query { query } => {
            let source = sheet_client(&config)?;
            let response = run_query(source.as_ref(), &config, query).await?;
            println!("{}", format::render(&response));
        }

        Commands::Remind => {
            let Some(settings) = config.reminder.as_ref() else {
                anyhow::bail!("no [reminder] section in the config file");
            };
            let schedule = ReminderSchedule {
                title: settings.title.clone(),
                deadline: settings
                    .deadline_utc()
                    .context("invalid reminder deadline")?,
                interval: settings
                    .interval_duration()
                    .context("invalid reminder interval")?,
            };
            Reminder::new(schedule, Arc::new(StdoutSink)).run().await;
        }
    }

    Ok(())
}

fn load_config(path: &str) -> Result<AppConfig> {
    let path = PathBuf::from(path);
    if path.exists() {
        AppConfig::from_file(&path)
            .with_context(|| format!("loading config from {}", path.display()))
    } else {
        tracing::info!("Config file {} not found, using defaults", path.display());
        Ok(AppConfig::default())
    }
}

fn sheet_client(config: &AppConfig) -> Result<Arc<dyn RowSource>> {
    if config.sheet.url.is_empty() {
        anyhow::bail!(
            "no results sheet configured; set sheet.url in the config file or pass --sheet-url"
        );
    }
    let client = SheetClient::new(
        &config.sheet.url,
        SheetClientConfig {
            timeout: Duration::from_secs(config.sheet.timeout_seconds),
            ..Default::default()
        },
    )?;
    Ok(Arc::new(client))
}

async fn run_query(
    source: &dyn RowSource,
    config: &AppConfig,
    cmd: QueryCommand,
) -> Result<QueryResponse> {
    // The matrix prefers the hand-maintained sheet when one is configured.
    if matches!(cmd, QueryCommand::Matrix) {
        if let Some(sheet) = &config.sheet.matrix_sheet {
            let raw = source.fetch_sheet(sheet).await?;
            let rows = rows_from_source(&raw)?;
            return Ok(dispatch_matrix_sheet(&rows));
        }
    }

    let query = match cmd {
        QueryCommand::Meta => Query::meta(),
        QueryCommand::DeckStats { deck } => Query::deck_stats(&deck)?,
        QueryCommand::Matchups { deck } => Query::matchups(&deck)?,
        QueryCommand::TopPilots { deck, limit } => Query::top_pilots(&deck, limit)?,
        QueryCommand::Vs { deck1, deck2 } => Query::head_to_head(&deck1, &deck2)?,
        QueryCommand::Trend { deck } => Query::trend(&deck)?,
        QueryCommand::Recent { count } => Query::recent(count)?,
        QueryCommand::Matrix => Query::matrix(),
    };

    let raw = source.fetch_rows().await?;
    let rows = rows_from_source(&raw)?;
    let records = validate_records(&rows);
    Ok(dispatch(&records, &query))
}

/// Prints reminder messages; the chat relay attaches here in production.
struct StdoutSink;

#[async_trait::async_trait]
impl ReminderSink for StdoutSink {
    async fn deliver(&self, message: &str) -> Result<(), ReminderError> {
        println!("{message}");
        Ok(())
    }
}
