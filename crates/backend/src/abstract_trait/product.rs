use crate::{
    domain::{
        requests::{CreateProductRequest, FindAllProducts, RecordScope, UpdateProductRequest},
        responses::{ApiResponse, ApiResponsePagination, ProductResponse, ProductResponseDeleteAt},
    },
    errors::{RepositoryError, ServiceError},
    model::Product,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynProductQueryRepository = Arc<dyn ProductQueryRepositoryTrait + Send + Sync>;
pub type DynProductCommandRepository = Arc<dyn ProductCommandRepositoryTrait + Send + Sync>;
pub type DynProductQueryService = Arc<dyn ProductQueryServiceTrait + Send + Sync>;
pub type DynProductCommandService = Arc<dyn ProductCommandServiceTrait + Send + Sync>;
pub type DynProductCache = Arc<dyn ProductCacheTrait + Send + Sync>;

/// Eviction of cached storefront copies after a product or its stock changes.
#[async_trait]
pub trait ProductCacheTrait {
    async fn invalidate(&self, product_ids: &[i32]);
}

#[async_trait]
pub trait ProductQueryRepositoryTrait {
    async fn find_all(
        &self,
        req: &FindAllProducts,
        scope: RecordScope,
    ) -> Result<(Vec<Product>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError>;
    async fn find_featured(&self) -> Result<Vec<Product>, RepositoryError>;
}

#[async_trait]
pub trait ProductCommandRepositoryTrait {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError>;
    async fn update(&self, req: &UpdateProductRequest) -> Result<Product, RepositoryError>;
    async fn set_featured(&self, id: i32, featured: bool) -> Result<Product, RepositoryError>;
    async fn trash(&self, id: i32) -> Result<Product, RepositoryError>;
    async fn restore(&self, id: i32) -> Result<Product, RepositoryError>;
    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait ProductQueryServiceTrait {
    async fn find_all(
        &self,
        req: &FindAllProducts,
        scope: RecordScope,
    ) -> Result<ApiResponsePagination<Vec<ProductResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn find_featured(&self) -> Result<ApiResponse<Vec<ProductResponse>>, ServiceError>;
}

#[async_trait]
pub trait ProductCommandServiceTrait {
    async fn create(
        &self,
        req: &CreateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn update(
        &self,
        req: &UpdateProductRequest,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn set_featured(
        &self,
        id: i32,
        featured: bool,
    ) -> Result<ApiResponse<ProductResponse>, ServiceError>;
    async fn trash(&self, id: i32) -> Result<ApiResponse<ProductResponseDeleteAt>, ServiceError>;
    async fn restore(&self, id: i32)
    -> Result<ApiResponse<ProductResponseDeleteAt>, ServiceError>;
    async fn delete_permanent(&self, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
