use anyhow::{Context, Result};
use backend::{config::Config, di::Repositories, handler::AppRouter, state::AppState};
use shared::{
    cache::CacheStore,
    config::{ConnectionManager, ConnectionPool, RedisClient, RedisConfig},
    utils::{Telemetry, init_logger},
};
use std::sync::Arc;
use tracing::{error, info, warn};

const SERVICE_NAME: &str = "mundopuertas";

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::new(SERVICE_NAME, &config.otel_endpoint)
        .context("Failed to initialize telemetry")?;

    init_logger(
        telemetry.logger_provider(),
        SERVICE_NAME,
        config.dev_mode,
        config.enable_file_log,
    );

    info!("🚀 Starting {SERVICE_NAME} backend...");

    let pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        info!("Running database migrations...");
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;
    }

    let redis_config = RedisConfig::new(
        config.redis.host.clone(),
        config.redis.port,
        config.redis.db,
        config.redis.password.clone(),
    );
    let redis = RedisClient::new(&redis_config).context("Failed to create Redis client")?;

    if let Err(e) = redis.ping().await {
        warn!("⚠️ Redis unavailable, product cache will miss until it recovers: {e:#}");
    }

    let cache_store = Arc::new(CacheStore::new(redis.pool.clone()));

    let state = AppState::new(&config, Repositories::postgres(pool), cache_store)
        .await
        .context("Failed to create AppState")?;

    let served = AppRouter::serve(config.port, state).await;

    info!("🛑 Shutting down...");

    if let Err(e) = telemetry.shutdown().await {
        error!("Failed to shutdown telemetry: {e}");
    }

    served.context("Failed to run server")
}

async fn run_migrations(pool: &ConnectionPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}
