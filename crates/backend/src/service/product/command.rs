use crate::{
    abstract_trait::{DynProductCache, DynProductCommandRepository, ProductCommandServiceTrait},
    domain::{
        requests::{CreateProductRequest, UpdateProductRequest},
        responses::{ApiResponse, ProductResponse, ProductResponseDeleteAt},
    },
    errors::{RepositoryError, ServiceError},
    model::Product,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingContext, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct ProductCommandService {
    command: DynProductCommandRepository,
    cache: DynProductCache,
    tracing_metrics: TracingMetrics,
}

impl ProductCommandService {
    pub async fn new(
        command: DynProductCommandRepository,
        cache: DynProductCache,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics = TracingMetrics::new(
            "product-command-service",
            "product_command_service",
            metrics,
            registry,
        )
        .await;

        Self {
            command,
            cache,
            tracing_metrics,
        }
    }

    fn start(&self, operation: &str, id: i32) -> TracingContext {
        self.tracing_metrics.start_tracing(
            operation,
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.id", id.to_string()),
            ],
        )
    }

    async fn finish<T>(
        &self,
        tracing_ctx: &TracingContext,
        method: Method,
        result: Result<Product, RepositoryError>,
        message: &str,
    ) -> Result<ApiResponse<T>, ServiceError>
    where
        T: From<Product>,
    {
        match result {
            Ok(product) => {
                self.cache.invalidate(&[product.product_id]).await;
                self.tracing_metrics
                    .complete_tracing_success(tracing_ctx, method, message)
                    .await;
                Ok(ApiResponse::success(message, T::from(product)))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(tracing_ctx, method, &e.to_string())
                    .await;
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl ProductCommandServiceTrait for ProductCommandService {
    async fn create(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        info!("🆕 Creating product '{}'", req.name);

        let tracing_ctx = self.tracing_metrics.start_tracing(
            "CreateProduct",
            vec![
                KeyValue::new("component", "product"),
                KeyValue::new("product.name", req.name.clone()),
            ],
        );

        let result = self.command.create(req).await;
        self.finish(&tracing_ctx, Method::Post, result, "Product created successfully")
            .await
    }

    async fn update(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let tracing_ctx = self.start("UpdateProduct", req.id);
        let result = self.command.update(req).await;

        self.finish(&tracing_ctx, Method::Put, result, "Product updated successfully")
            .await
    }

    async fn set_featured(
        &self,
        id: i32,
        featured: bool,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError> {
        let tracing_ctx = self.start("SetProductFeatured", id);
        let result = self.command.set_featured(id, featured).await;

        self.finish(&tracing_ctx, Method::Put, result, "Product featured flag updated")
            .await
    }

    async fn trash(&self, id: i32) -> Result<ApiResponse<ProductResponseDeleteAt>, ServiceError> {
        let tracing_ctx = self.start("TrashProduct", id);
        let result = self.command.trash(id).await;

        self.finish(&tracing_ctx, Method::Delete, result, "Product moved to trash successfully")
            .await
    }

    async fn restore(
        &self,
        id: i32,
    ) -> Result<ApiResponse<ProductResponseDeleteAt>, ServiceError> {
        let tracing_ctx = self.start("RestoreProduct", id);
        let result = self.command.restore(id).await;

        self.finish(&tracing_ctx, Method::Put, result, "Product restored successfully")
            .await
    }

    async fn delete_permanent(&self, id: i32) -> Result<ApiResponse<()>, ServiceError> {
        let method = Method::Delete;
        let tracing_ctx = self.start("DeleteProduct", id);

        match self.command.delete_permanent(id).await {
            Ok(()) => {
                self.cache.invalidate(&[id]).await;
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Product deleted permanently")
                    .await;
                Ok(ApiResponse::success("Product deleted permanently", ()))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        service::ProductCache,
        testing::{FakeProductRepository, RecordingProductCache, offline_cache, test_metrics},
    };

    async fn setup() -> (ProductCommandService, Arc<FakeProductRepository>) {
        let repo = Arc::new(FakeProductRepository::default());
        let (metrics, registry) = test_metrics();
        let cache = Arc::new(ProductCache::new(offline_cache()));
        let service = ProductCommandService::new(repo.clone(), cache, metrics, registry).await;
        (service, repo)
    }

    fn request(name: &str) -> CreateProductRequest {
        CreateProductRequest {
            name: name.into(),
            description: None,
            price: 189_900,
            stock: 4,
            width_cm: 90,
            height_cm: 210,
            material_id: Some(1),
            filling_id: Some(1),
            images: vec!["/uploads/a.jpg".into()],
            featured: false,
        }
    }

    #[tokio::test]
    async fn commands_still_succeed_when_the_cache_is_down() {
        let (service, repo) = setup().await;

        let created = service.create(&request("Puerta Roble")).await.unwrap().data;
        let featured = service.set_featured(created.id, true).await.unwrap().data;
        assert!(featured.featured);

        let trashed = service.trash(created.id).await.unwrap().data;
        assert!(trashed.deleted_at.is_some());
        service.restore(created.id).await.unwrap();
        service.trash(created.id).await.unwrap();
        service.delete_permanent(created.id).await.unwrap();

        assert!(repo.is_empty().await);
    }

    #[tokio::test]
    async fn every_write_evicts_the_touched_product() {
        let repo = Arc::new(FakeProductRepository::default());
        let cache = Arc::new(RecordingProductCache::default());
        let (metrics, registry) = test_metrics();
        let service =
            ProductCommandService::new(repo, cache.clone(), metrics, registry).await;

        let id = service.create(&request("Puerta Pino")).await.unwrap().data.id;
        service.set_featured(id, true).await.unwrap();
        service.trash(id).await.unwrap();
        service.delete_permanent(id).await.unwrap();

        assert_eq!(cache.evicted().await, vec![vec![id]; 4]);
    }

    #[tokio::test]
    async fn failed_writes_leave_the_cache_alone() {
        let repo = Arc::new(FakeProductRepository::default());
        let cache = Arc::new(RecordingProductCache::default());
        let (metrics, registry) = test_metrics();
        let service =
            ProductCommandService::new(repo, cache.clone(), metrics, registry).await;

        assert!(service.trash(42).await.is_err());
        assert!(cache.evicted().await.is_empty());
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let (service, _) = setup().await;

        let err = service.set_featured(99, true).await.unwrap_err();
        assert!(matches!(err, ServiceError::Repo(RepositoryError::NotFound)));
    }
}
