//! Weather Records Service
//!
//! Role-gated HTTP API over weather telemetry readings and user accounts.

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use weather_records::{
    AppState,
    config::{LogFormat, LoggingConfig, load_config},
    router,
    server::{HttpConfig, run_http_blocking},
    store::MemoryDatabase,
};

/// Weather Records Service - role-gated telemetry and account API
#[derive(Parser, Debug)]
#[command(name = "weather-records")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "WEATHER_RECORDS_CONFIG")]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "WEATHER_RECORDS_LOG_LEVEL")]
    log_level: Option<String>,

    /// HTTP server host
    #[arg(long, env = "WEATHER_RECORDS_HOST")]
    host: Option<String>,

    /// HTTP server port
    #[arg(long, env = "WEATHER_RECORDS_PORT")]
    port: Option<u16>,
}

fn init_logging(logging: &LoggingConfig, level_override: Option<&str>) {
    let level = level_override.unwrap_or(&logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let registry = tracing_subscriber::registry().with(filter);
    match logging.format {
        LogFormat::Pretty => registry
            .with(fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Parse CLI arguments
    let args = Args::parse();

    // Load configuration; logging falls back to defaults if that fails
    let loaded = load_config(args.config.as_deref());
    let logging = loaded
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_default();
    init_logging(&logging, args.log_level.as_deref());

    let config = loaded.inspect_err(|e| error!(error = %e, "Failed to load configuration"))?;

    info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting weather records service"
    );

    let db = MemoryDatabase::new(&config.store.database);
    let state = AppState::from_config(&config, &db)
        .await
        .inspect_err(|e| error!(error = %e, "Failed to initialise service state"))?;

    let host = args.host.as_deref().unwrap_or(&config.server.host);
    let port = args.port.unwrap_or(config.server.port);
    let http_config = HttpConfig::from_host_port(host, port)?;

    run_http_blocking(router(state), http_config).await?;

    Ok(())
}
