mod admin;
mod ai;
mod api;
mod app;
mod cache;
mod commands;
mod config;
mod event;
mod foods;
mod map;
mod query;
mod storage;
mod ui;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

use crate::commands::Page;

#[derive(Parser, Debug)]
#[command(name = "citarasa")]
#[command(about = "Explore Indonesian regional foods from the terminal")]
#[command(version)]
struct Args {
  /// Path to config file (default: $XDG_CONFIG_HOME/citarasa/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Override the API base URL
  #[arg(long)]
  api_url: Option<String>,

  /// Page to open on start
  #[arg(short, long, value_enum, default_value_t = Page::Home)]
  page: Page,

  /// Clear favorites, recent searches, preferences and the admin session, then exit
  #[arg(long)]
  reset: bool,
}

/// Log to a file in the data dir; the terminal belongs to the UI.
fn init_logging() -> Result<tracing_appender::non_blocking::WorkerGuard> {
  let log_dir = config::Config::data_dir()?;
  std::fs::create_dir_all(&log_dir)?;
  let (writer, guard) =
    tracing_appender::non_blocking(tracing_appender::rolling::never(log_dir, "citarasa.log"));

  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("citarasa=info"));
  fmt()
    .with_env_filter(filter)
    .with_writer(writer)
    .with_ansi(false)
    .init();

  Ok(guard)
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();
  let _guard = init_logging()?;

  // Load configuration
  let mut config = config::Config::load(args.config.as_deref())?;

  // Override API URL if specified on command line
  if let Some(url) = args.api_url {
    config.api.base_url = url;
  }

  if args.reset {
    storage::StorageService::open(&config.storage)?.clear_all()?;
    tracing::info!("Local storage cleared");
    println!("Penyimpanan lokal telah dibersihkan.");
    return Ok(());
  }

  app::run(config, args.page).await
}
