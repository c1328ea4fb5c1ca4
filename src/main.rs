use mimalloc::MiMalloc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &sibyl::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        bind = %cfg.bind,
        proxy = %cfg.proxy.as_ref().map(|u| u.as_str()).unwrap_or("<none>"),
        loglevel = %cfg.loglevel,
    );

    let connect_opts =
        SqliteConnectOptions::from_str(cfg.database_url.as_str())?.create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
    sibyl::db::init_schema(&pool).await?;

    let mut client_builder =
        reqwest::Client::builder().timeout(Duration::from_secs(cfg.request_timeout_secs));
    if let Some(proxy) = cfg.proxy.as_ref() {
        client_builder = client_builder.proxy(reqwest::Proxy::all(proxy.as_str())?);
    }
    let client = client_builder.build()?;

    let state = sibyl::router::SibylState::new(pool, client);
    let app = sibyl::router::sibyl_router(state);

    let listener = TcpListener::bind(cfg.bind.as_str()).await?;
    info!("HTTP server listening on {}", cfg.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
