mod bot;
mod config;
mod db;
mod models;
mod run;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(String::as_str) {
        Some("--help" | "-h" | "help") => {
            run::print_usage();
            return Ok(());
        }
        Some("--version" | "-V" | "version") => {
            println!("debtbot {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        _ => {}
    }

    init_logging();

    let config = config::Config::from_env()?;
    let db_path = get_db_path(&config)?;
    let db = db::Database::open(&db_path)?;
    tracing::info!(path = %db_path.display(), "opened database");

    let mut controller = bot::Controller::new(db, config.repo_url.clone());
    run::as_cli(&args, &config, &mut controller)
}

/// Logs go to stderr so the console transport keeps stdout for replies.
fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn get_db_path(config: &config::Config) -> Result<std::path::PathBuf> {
    let path = config.database_path()?;
    if let Some(data_dir) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;
    }
    Ok(path)
}
