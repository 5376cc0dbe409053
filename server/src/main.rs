//! Wicket Server binary.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wicket_server::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wicket_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;

    tracing::info!(
        recent_deliveries = config.recent_deliveries,
        replay_check_interval = config.replay_check_interval,
        "Starting Wicket Server on {}:{}",
        config.host,
        config.port
    );

    let addr = format!("{}:{}", config.host, config.port);
    let app = app(AppState::new(&config));

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
