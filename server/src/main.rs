use anyhow::Result;
use clap::Parser;
use server_monitor::metrics::{Collector, MetricStore};
use server_monitor::probe::{HostProbe, SysinfoProbe};
use server_monitor::{api, config, db};
use std::sync::Arc;
use tracing::info;

/// Server monitor: host metrics history and dashboard API.
#[derive(Parser, Debug)]
#[command(name = "server-monitor", version, about)]
struct Cli {
    /// Address and port to listen on.
    #[arg(short, long, default_value = "0.0.0.0:3001")]
    listen: String,

    /// Path to the SQLite database file.
    #[arg(short, long, default_value = "server-monitor.db")]
    db: String,

    /// Path to a TOML configuration file (optional).
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "server_monitor=debug,tower_http=debug".into()),
        )
        .init();

    let cli = Cli::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting server monitor"
    );

    // Load optional config file.
    let app_config = if let Some(ref path) = cli.config {
        config::AppConfig::from_file(path)?
    } else {
        config::AppConfig::default()
    };

    // Initialize database and run migrations.
    let pool = db::init(&cli.db).await?;
    info!(path = %cli.db, "Database initialized");

    let store = MetricStore::new(pool);
    // History from a previous run would show up as a gap-ridden tail.
    store.clear().await;

    let probe: Arc<dyn HostProbe> = Arc::new(SysinfoProbe::new());
    Collector::new(probe.clone(), store.clone()).spawn();

    let state = api::AppState::new(store, probe, app_config);
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
    info!(addr = %cli.listen, "Listening");

    axum::serve(listener, app).await?;

    Ok(())
}
