use anyhow::Context;
use clap::Parser;
use trivia_api::config::Settings;
use trivia_api::db::{establish_connection, run_migrations};
use trivia_api::server::app::run_server;
use trivia_api::telemetry::init_tracing;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    /// Skip applying database migrations on startup
    #[clap(long)]
    no_migrate: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let settings = Settings::load().context("Failed to load settings")?;

    let pool = establish_connection(&settings.db_path, settings.max_connections)
        .await
        .with_context(|| format!("Cannot open database at {}", settings.db_path))?;

    if !cli.no_migrate {
        tracing::info!("Running db migrations...");
        run_migrations(&pool).await.context("Migrations failed")?;
    }

    run_server(pool, &settings.address()).await
}
