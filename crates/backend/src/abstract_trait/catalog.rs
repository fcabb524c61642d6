use crate::{
    domain::{
        CatalogKind,
        requests::{CatalogItemRequest, FindAllCatalog},
        responses::{ApiResponse, ApiResponsePagination, CatalogItemResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::CatalogEntry,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynCatalogRepository = Arc<dyn CatalogRepositoryTrait + Send + Sync>;
pub type DynCatalogService = Arc<dyn CatalogServiceTrait + Send + Sync>;

#[async_trait]
pub trait CatalogRepositoryTrait {
    async fn find_all(
        &self,
        kind: CatalogKind,
        req: &FindAllCatalog,
    ) -> Result<(Vec<CatalogEntry>, i64), RepositoryError>;
    async fn find_by_id(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, RepositoryError>;
    async fn create(
        &self,
        kind: CatalogKind,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError>;
    async fn update(
        &self,
        kind: CatalogKind,
        id: i32,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError>;
    async fn delete(&self, kind: CatalogKind, id: i32) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait CatalogServiceTrait {
    async fn find_all(
        &self,
        kind: CatalogKind,
        req: &FindAllCatalog,
    ) -> Result<ApiResponsePagination<Vec<CatalogItemResponse>>, ServiceError>;
    async fn find_by_id(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError>;
    async fn create(
        &self,
        kind: CatalogKind,
        req: &CatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError>;
    async fn update(
        &self,
        kind: CatalogKind,
        id: i32,
        req: &CatalogItemRequest,
    ) -> Result<ApiResponse<CatalogItemResponse>, ServiceError>;
    async fn delete(&self, kind: CatalogKind, id: i32) -> Result<ApiResponse<()>, ServiceError>;
}
