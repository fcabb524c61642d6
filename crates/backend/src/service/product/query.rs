use crate::{
    abstract_trait::{DynProductQueryRepository, ProductQueryServiceTrait},
    domain::{
        requests::{FindAllProducts, RecordScope},
        responses::{ApiResponse, ApiResponsePagination, Pagination, ProductResponse},
    },
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::{
    cache::{
        CacheStore,
        keys::{PRODUCT_FEATURED_KEY, product_detail_key, product_ttl},
    },
    utils::{Method, Metrics, TracingMetrics},
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct ProductQueryService {
    query: DynProductQueryRepository,
    cache_store: Arc<CacheStore>,
    tracing_metrics: TracingMetrics,
}

impl ProductQueryService {
    pub async fn new(
        query: DynProductQueryRepository,
        cache_store: Arc<CacheStore>,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics = TracingMetrics::new(
            "product-query-service",
            "product_query_service",
            metrics,
            registry,
        )
        .await;

        Self {
            query,
            cache_store,
            tracing_metrics,
        }
    }
}

#[async_trait]
impl ProductQueryServiceTrait for ProductQueryService {
    async fn find_all(
        &self,
        req: &FindAllProducts,
        scope: RecordScope,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError> {
        info!(
            "🔍 Listing {scope:?} products | page {} size {} search '{}'",
            req.page, req.page_size, req.search
        );

        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "FindAllProducts",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("scope", format!("{scope:?}")),
                KeyValue::new("search", req.search.clone()),
            ],
        );

        match self.query.find_all(req, scope).await {
            Ok((products, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Products retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Products retrieved successfully",
                    products.into_iter().map(ProductResponse::from).collect(),
                    Pagination::new(req.page, req.page_size, total),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "FindProductById",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        );

        let cache_key = product_detail_key(id);
        if let Some(cached) = self
            .cache_store
            .get_from_cache::<ApiResponse<ProductResponse>>(&cache_key)
            .await
        {
            info!("✅ Found product {id} in cache");
            self.tracing_metrics
                .complete_tracing_success(&tracing_ctx, method, "Product retrieved from cache")
                .await;
            return Ok(cached);
        }

        match self.query.find_by_id(id).await {
            Ok(Some(product)) => {
                let response = ApiResponse::success(
                    "Product retrieved successfully",
                    ProductResponse::from(product),
                );
                self.cache_store
                    .set_to_cache(&cache_key, &response, product_ttl())
                    .await;

                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Product retrieved")
                    .await;
                Ok(response)
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "Product not found")
                    .await;
                Err(RepositoryError::NotFound.into())
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }

    async fn find_featured(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self
            .tracing_metrics
            .start_tracing("FindFeaturedProducts", vec![KeyValue::new("component", "product")]);

        if let Some(cached) = self
            .cache_store
            .get_from_cache::<ApiResponse<Vec<ProductResponse>>>(PRODUCT_FEATURED_KEY)
            .await
        {
            info!("✅ Found {} featured products in cache", cached.data.len());
            self.tracing_metrics
                .complete_tracing_success(&tracing_ctx, method, "Featured products from cache")
                .await;
            return Ok(cached);
        }

        match self.query.find_featured().await {
            Ok(products) => {
                let response = ApiResponse::success(
                    "Featured products retrieved successfully",
                    products
                        .into_iter()
                        .map(ProductResponse::from)
                        .collect::<Vec<_>>(),
                );
                self.cache_store
                    .set_to_cache(PRODUCT_FEATURED_KEY, &response, product_ttl())
                    .await;

                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Featured products retrieved")
                    .await;
                Ok(response)
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }
}
