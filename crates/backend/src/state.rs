use crate::{
    abstract_trait::DynJwtService,
    config::{Config, JwtConfig},
    di::{DependenciesInject, DependenciesInjectDeps, Repositories},
};
use anyhow::{Context, Result};
use prometheus_client::registry::Registry;
use shared::{
    cache::CacheStore,
    utils::{Metrics, SystemMetrics, run_metrics_collector},
};
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;
use tracing::info;

/// Room for multipart framing on top of the largest accepted file.
const BODY_LIMIT_SLACK: usize = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub jwt_config: DynJwtService,
    pub di_container: DependenciesInject,
    pub registry: Arc<Mutex<Registry>>,
    pub metrics: Arc<Mutex<Metrics>>,
    pub system_metrics: Arc<SystemMetrics>,
    pub upload_dir: PathBuf,
    pub body_limit: usize,
}

impl AppState {
    pub async fn new(
        config: &Config,
        repositories: Repositories,
        cache_store: Arc<CacheStore>,
    ) -> Result<Self> {
        let jwt_config = Arc::new(JwtConfig::new(&config.jwt_secret)) as DynJwtService;
        let registry = Arc::new(Mutex::new(Registry::default()));
        let metrics = Arc::new(Mutex::new(Metrics::new()));
        let system_metrics = Arc::new(SystemMetrics::new());

        let di_container = DependenciesInject::new(DependenciesInjectDeps {
            repositories,
            cache_store,
            jwt: jwt_config.clone(),
            config: config.clone(),
            metrics: metrics.clone(),
            registry: registry.clone(),
        })
        .await
        .context("Failed to initialize dependency injection container")?;

        system_metrics.register(&mut *registry.lock().await);
        tokio::spawn(run_metrics_collector(system_metrics.clone()));

        info!("✅ Application state ready");

        Ok(Self {
            jwt_config,
            di_container,
            registry,
            metrics,
            system_metrics,
            upload_dir: config.upload_dir.clone(),
            body_limit: config.max_upload_bytes + BODY_LIMIT_SLACK,
        })
    }
}
