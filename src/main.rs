use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use taskvault::{api::routes::create_router, db::Store, utils::config::Config, AppState};
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// TaskVault - multi-user task tracking API
///
/// Serves the task API with cookie-session authentication and optional
/// envelope-encrypted payloads. Configuration comes from the environment
/// (or a .env file); the flags below override it.
#[derive(Parser, Debug)]
#[command(name = "taskvault-server", version, about)]
struct Cli {
    /// Host address to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PORT")]
    port: Option<u16>,

    /// Database URL (libsql:// remote or local file path)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = Config::from_env().context("failed to load configuration")?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    // Warn, never abort: the server still comes up on placeholder secrets.
    config.warn_on_weak_secrets();

    let store = Store::new(&config.database.url, config.database.auth_token.as_deref())
        .await
        .context("failed to open database")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let environment = config.server.environment.clone();
    let state = AppState::new(config, store);

    // 100 requests per 15 minutes per client, enforced by replenishing one
    // permit every 9 seconds against a burst bucket of 100.
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(9)
            .burst_size(100)
            .finish()
            .context("invalid rate limit configuration")?,
    );

    let app = create_router(state)
        .layer(GovernorLayer::new(governor_config))
        .into_make_service_with_connect_info::<std::net::SocketAddr>();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("Server running on {addr} in {environment} mode");

    axum::serve(listener, app)
        .await
        .context("server terminated")?;

    Ok(())
}
