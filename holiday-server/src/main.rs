//! holiday-server: synchronizes public holidays from Nager.Date and serves
//! the aggregate queries. Configuration: see `holiday_server::config`.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::Request, ServiceExt};
use holiday_core::{HolidayService, HolidayServiceImpl, HolidayStore, MemoryHolidayStore};
use holiday_server::config::{ServerConfig, StoreBackend};
use holiday_server::nager::NagerClient;
use holiday_server::router::build_router;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,holiday_server=debug,holiday_core=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env()?;

    let store = open_store(&config).await?;
    let fetcher = Arc::new(NagerClient::new(
        config.source_url.clone(),
        config.source_timeout,
    )?);
    tracing::info!(source = %config.source_url, "holiday source configured");

    let service: Arc<dyn HolidayService> = Arc::new(HolidayServiceImpl::new(store, fetcher));
    let app = build_router(service);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!("holiday-server listening on {}", config.bind_addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
        .await
        .context("server error")?;
    Ok(())
}

async fn open_store(config: &ServerConfig) -> Result<Arc<dyn HolidayStore>> {
    match config.store {
        StoreBackend::Memory => {
            tracing::warn!("using in-memory holiday store; data is lost on exit");
            Ok(Arc::new(MemoryHolidayStore::new()))
        }
        StoreBackend::Postgres => open_postgres(config).await,
    }
}

#[cfg(feature = "postgres")]
async fn open_postgres(config: &ServerConfig) -> Result<Arc<dyn HolidayStore>> {
    use holiday_core::PgHolidayStore;
    use holiday_server::config::mask_database_url;
    use sqlx::postgres::PgPoolOptions;

    let db = config
        .database
        .as_ref()
        .context("database configuration missing")?;
    tracing::info!("Connecting to database: {}", mask_database_url(&db.database_url));

    let pool = PgPoolOptions::new()
        .max_connections(db.max_connections)
        .acquire_timeout(db.acquire_timeout)
        .connect(&db.database_url)
        .await
        .context("failed to connect to database")?;
    tracing::info!("Connected to database");

    let store = PgHolidayStore::new(pool);
    store.ensure_schema().await?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "postgres"))]
async fn open_postgres(_config: &ServerConfig) -> Result<Arc<dyn HolidayStore>> {
    anyhow::bail!("built without the `postgres` feature; set HOLIDAY_STORE=memory")
}
