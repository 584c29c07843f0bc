//! CLI entry point for taskdeck.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use taskdeck_app::{AppConfig, CONFIG_FILE, MemoryBackend, SeedData, TaskSession};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod commands;

/// Task lists with due dates, priorities, categories and tags.
#[derive(Parser, Debug)]
#[command(name = "taskdeck", version, about = "taskdeck: manage a task list from the terminal")]
struct Cli {
    /// Configuration file (defaults to ./taskdeck.toml).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed file for the in-memory backend (overrides the configured one).
    #[arg(long)]
    seed: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List tasks passing the given filters.
    #[command(alias = "ls")]
    List {
        /// Status filter: all, pending or completed.
        #[arg(long)]
        status: Option<String>,
        /// Case-insensitive text matched against title and description.
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Show total, completed, pending and overdue counts.
    Stats {
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// List categories.
    Categories,

    /// Start an interactive session.
    Shell,
}

/// Output format for listing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

fn main() -> Result<()> {
    let Cli { config, seed, cmd } = Cli::parse();

    install_tracing(default_log_level(&cmd));

    let config_path = config.unwrap_or_else(|| PathBuf::from(CONFIG_FILE));
    let mut app_config = AppConfig::load(&config_path)?;
    if let Some(seed) = seed {
        let cwd = std::env::current_dir().context("failed to resolve working directory")?;
        app_config = app_config.with_seed(seed, &cwd);
    }

    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("failed to start runtime")?
        .block_on(execute_command(&app_config, cmd))
}

async fn execute_command(config: &AppConfig, command: Command) -> Result<()> {
    let backend = match config.seed_path() {
        Some(path) => MemoryBackend::from_seed(SeedData::load(path, config.utc_offset())?),
        None => MemoryBackend::new(),
    }
    .with_latency(config.latency());

    let mut session = TaskSession::new(backend.task_service(), backend.category_service())
        .with_utc_offset(config.utc_offset())
        .with_status_filter(config.status_filter());
    let snapshot = session.load().await;
    debug!(tasks = snapshot.len(), "Session ready");

    commands::run(command, &mut session).await
}

const fn default_log_level(cmd: &Command) -> tracing::Level {
    // Shell output would interleave with info logs.
    if matches!(cmd, Command::Shell) {
        tracing::Level::WARN
    } else {
        tracing::Level::INFO
    }
}

fn install_tracing(default_level: tracing::Level) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.as_str().to_ascii_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}
