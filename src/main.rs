use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tokio::sync::watch;

use stock_signal_stream::assembler::SignalAssembler;
use stock_signal_stream::config::{Config, LoggingConfig};
use stock_signal_stream::market_data::YahooChartClient;
use stock_signal_stream::server::{router, AppState};

fn init_tracing(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        logging
            .level
            .parse()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set SIGNAL_STREAM_CONFIG or create config/default.toml");
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging);
    tracing::info!(
        bind = %config.server.bind_addr,
        path = %config.server.stream_path,
        provider = %config.market_data.base_url,
        "Starting stock-signal-stream"
    );

    let client = YahooChartClient::new(&config.market_data)?;
    let assembler = SignalAssembler::from_config(client, &config.strategy);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let state = AppState::new(assembler, &config.server, shutdown_rx);
    let app = router(state, &config.server.stream_path);

    let listener = TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %listener.local_addr()?, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            let _ = shutdown_tx.send(true);
        })
        .await
        .context("server error")?;

    tracing::info!("Server stopped");
    Ok(())
}
