use crate::{
    abstract_trait::{
        DynAuthService, DynCatalogRepository, DynCatalogService, DynDashboardRepository,
        DynDashboardService, DynHashing, DynJwtService, DynNotificationRepository,
        DynNotificationService, DynOrderRepository, DynOrderService, DynProductCache,
        DynProductCommandRepository,
        DynProductCommandService, DynProductQueryRepository, DynProductQueryService,
        DynQuoteRepository, DynQuoteService, DynRefreshTokenRepository, DynSaleRepository,
        DynSaleService, DynUploadService, DynUserCommandRepository, DynUserCommandService,
        DynUserQueryRepository, DynUserQueryService, DynWarehouseRepository, DynWarehouseService,
    },
    config::{Config, Hashing},
    repository::{
        CatalogRepository, DashboardRepository, NotificationRepository, OrderRepository,
        ProductCommandRepository, ProductQueryRepository, QuoteRepository,
        RefreshTokenRepository, SaleRepository, UserCommandRepository, UserQueryRepository,
        WarehouseRepository,
    },
    service::{
        AuthService, AuthServiceDeps, CatalogService, DashboardService, NotificationService,
        OrderService, ProductCache, ProductCommandService, ProductQueryService, QuoteService,
        SaleService,
        UploadService, UserCommandService, UserCommandServiceDeps, UserQueryService,
        WarehouseService,
    },
};
use anyhow::Result;
use prometheus_client::registry::Registry;
use shared::{cache::CacheStore, config::ConnectionPool, utils::Metrics};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Buffered live notifications per SSE subscriber before it starts lagging.
const NOTIFICATION_CHANNEL_CAPACITY: usize = 256;

#[derive(Clone)]
pub struct DependenciesInject {
    pub auth_service: DynAuthService,
    pub user_query: DynUserQueryService,
    pub user_command: DynUserCommandService,
    pub catalog_service: DynCatalogService,
    pub product_query: DynProductQueryService,
    pub product_command: DynProductCommandService,
    pub warehouse_service: DynWarehouseService,
    pub order_service: DynOrderService,
    pub quote_service: DynQuoteService,
    pub sale_service: DynSaleService,
    pub notification_service: DynNotificationService,
    pub upload_service: DynUploadService,
    pub dashboard_service: DynDashboardService,
}

impl std::fmt::Debug for DependenciesInject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DependenciesInject")
            .field("auth_service", &"DynAuthService")
            .field("user_query", &"DynUserQueryService")
            .field("user_command", &"DynUserCommandService")
            .field("catalog_service", &"DynCatalogService")
            .field("product_query", &"DynProductQueryService")
            .field("product_command", &"DynProductCommandService")
            .field("warehouse_service", &"DynWarehouseService")
            .field("order_service", &"DynOrderService")
            .field("quote_service", &"DynQuoteService")
            .field("sale_service", &"DynSaleService")
            .field("notification_service", &"DynNotificationService")
            .field("upload_service", &"DynUploadService")
            .field("dashboard_service", &"DynDashboardService")
            .finish()
    }
}

/// Storage seams the services are built on; Postgres in production, fakes in tests.
pub struct Repositories {
    pub user_query: DynUserQueryRepository,
    pub user_command: DynUserCommandRepository,
    pub refresh_tokens: DynRefreshTokenRepository,
    pub catalog: DynCatalogRepository,
    pub product_query: DynProductQueryRepository,
    pub product_command: DynProductCommandRepository,
    pub warehouse: DynWarehouseRepository,
    pub order: DynOrderRepository,
    pub quote: DynQuoteRepository,
    pub sale: DynSaleRepository,
    pub notification: DynNotificationRepository,
    pub dashboard: DynDashboardRepository,
}

impl Repositories {
    pub fn postgres(pool: ConnectionPool) -> Self {
        Self {
            user_query: Arc::new(UserQueryRepository::new(pool.clone())),
            user_command: Arc::new(UserCommandRepository::new(pool.clone())),
            refresh_tokens: Arc::new(RefreshTokenRepository::new(pool.clone())),
            catalog: Arc::new(CatalogRepository::new(pool.clone())),
            product_query: Arc::new(ProductQueryRepository::new(pool.clone())),
            product_command: Arc::new(ProductCommandRepository::new(pool.clone())),
            warehouse: Arc::new(WarehouseRepository::new(pool.clone())),
            order: Arc::new(OrderRepository::new(pool.clone())),
            quote: Arc::new(QuoteRepository::new(pool.clone())),
            sale: Arc::new(SaleRepository::new(pool.clone())),
            notification: Arc::new(NotificationRepository::new(pool.clone())),
            dashboard: Arc::new(DashboardRepository::new(pool)),
        }
    }
}

pub struct DependenciesInjectDeps {
    pub repositories: Repositories,
    pub cache_store: Arc<CacheStore>,
    pub jwt: DynJwtService,
    pub config: Config,
    pub metrics: Arc<Mutex<Metrics>>,
    pub registry: Arc<Mutex<Registry>>,
}

impl DependenciesInject {
    pub async fn new(deps: DependenciesInjectDeps) -> Result<Self> {
        let DependenciesInjectDeps {
            repositories,
            cache_store,
            jwt,
            config,
            metrics,
            registry,
        } = deps;

        let Repositories {
            user_query: user_query_repo,
            user_command: user_command_repo,
            refresh_tokens: refresh_token_repo,
            catalog: catalog_repo,
            product_query: product_query_repo,
            product_command: product_command_repo,
            warehouse: warehouse_repo,
            order: order_repo,
            quote: quote_repo,
            sale: sale_repo,
            notification: notification_repo,
            dashboard: dashboard_repo,
        } = repositories;

        let hashing: DynHashing = Arc::new(Hashing::new());

        let notification_service: DynNotificationService = Arc::new(
            NotificationService::new(
                notification_repo,
                NOTIFICATION_CHANNEL_CAPACITY,
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let auth_service: DynAuthService = Arc::new(
            AuthService::new(AuthServiceDeps {
                user_query: user_query_repo.clone(),
                user_command: user_command_repo.clone(),
                refresh_tokens: refresh_token_repo,
                hashing: hashing.clone(),
                jwt,
                metrics: metrics.clone(),
                registry: registry.clone(),
            })
            .await,
        );

        let user_query: DynUserQueryService = Arc::new(
            UserQueryService::new(user_query_repo.clone(), metrics.clone(), registry.clone())
                .await,
        );

        let user_command: DynUserCommandService = Arc::new(
            UserCommandService::new(UserCommandServiceDeps {
                query: user_query_repo,
                command: user_command_repo,
                hashing,
                metrics: metrics.clone(),
                registry: registry.clone(),
            })
            .await,
        );

        let catalog_service: DynCatalogService = Arc::new(
            CatalogService::new(catalog_repo, metrics.clone(), registry.clone()).await,
        );

        let product_cache: DynProductCache = Arc::new(ProductCache::new(cache_store.clone()));

        let product_query: DynProductQueryService = Arc::new(
            ProductQueryService::new(
                product_query_repo,
                cache_store,
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let product_command: DynProductCommandService = Arc::new(
            ProductCommandService::new(
                product_command_repo,
                product_cache.clone(),
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let warehouse_service: DynWarehouseService = Arc::new(
            WarehouseService::new(
                warehouse_repo,
                notification_service.clone(),
                config.low_stock_threshold,
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let order_service: DynOrderService = Arc::new(
            OrderService::new(
                order_repo,
                notification_service.clone(),
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let quote_service: DynQuoteService = Arc::new(
            QuoteService::new(
                quote_repo,
                notification_service.clone(),
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let sale_service: DynSaleService = Arc::new(
            SaleService::new(
                sale_repo,
                notification_service.clone(),
                product_cache,
                config.webhook_secret.clone(),
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let upload_service: DynUploadService = Arc::new(
            UploadService::new(
                config.upload_dir.clone(),
                config.max_upload_bytes,
                metrics.clone(),
                registry.clone(),
            )
            .await,
        );

        let dashboard_service: DynDashboardService = Arc::new(
            DashboardService::new(
                dashboard_repo,
                config.low_stock_threshold,
                metrics,
                registry,
            )
            .await,
        );

        Ok(Self {
            auth_service,
            user_query,
            user_command,
            catalog_service,
            product_query,
            product_command,
            warehouse_service,
            order_service,
            quote_service,
            sale_service,
            notification_service,
            upload_service,
            dashboard_service,
        })
    }
}
