use anyhow::Result;
use clap::{Parser, Subcommand};
use murmur_backend::api;
use murmur_backend::auth::SessionService;
use murmur_backend::bootstrap;
use murmur_backend::config::MurmurConfig;
use murmur_backend::telemetry;
use murmur_backend::utils;

#[derive(Parser)]
#[command(author, version, about = "Murmur feed daemon")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (Axum) for the feed API
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    utils::print_banner();
    telemetry::init_tracing();

    let args = Args::parse();

    let config = MurmurConfig::from_env()?;
    let resources = bootstrap::initialize(&config)?;
    tracing::info!(
        directories_created = ?resources.directories_created,
        database_initialized = resources.database_initialized,
        "bootstrap complete"
    );

    let sessions = SessionService::new(resources.database.clone(), &resources.session_secret);

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => api::serve_http(config, resources.database, sessions).await,
    }
}
