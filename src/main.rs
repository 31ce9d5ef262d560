use anyhow::Context;
use itdash::config::AppConfig;
use itdash::{db, routes, AppState};
use mimalloc::MiMalloc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "itdash=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = AppConfig::from_env().context("Failed to load configuration")?;

    let pool = db::create_pool(&config.database_url, config.database_max_connections)
        .await
        .context("Failed to connect to database")?;
    db::run_migrations(&pool)
        .await
        .context("Failed to run migrations")?;

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        host = %addr,
        compliance_averaging = ?config.compliance_averaging,
        "Starting IT dashboard API server"
    );

    let app = routes::router(AppState { db: pool, config });

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
