use photogram::{AppState, Config, app, db};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,photogram=debug,tower_http=debug")),
        )
        .init();

    let config = Config::from_env();
    info!(?config, "starting photogram v{}", env!("CARGO_PKG_VERSION"));

    let db_pool = db::connect(&config.database_url, config.max_connections).await?;
    let http_addr = config.http_addr;

    let app = app(AppState::new(db_pool, config));
    let listener = tokio::net::TcpListener::bind(http_addr).await?;
    info!(%http_addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("received Ctrl+C, shutting down");
        })
        .await?;

    Ok(())
}
