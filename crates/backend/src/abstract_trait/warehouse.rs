use crate::{
    domain::{
        requests::{AssembleRequest, FindAllPurchases, FindAllWarehouse, PurchaseRequest},
        responses::{
            ApiResponse, ApiResponsePagination, AssemblyResponse, PurchaseResponse,
            PurchaseResultResponse, WarehouseItemResponse,
        },
        stock::{AssemblyOutcome, PurchaseOutcome},
    },
    errors::{RepositoryError, ServiceError},
    model::{Purchase, WarehouseItem},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynWarehouseRepository = Arc<dyn WarehouseRepositoryTrait + Send + Sync>;
pub type DynWarehouseService = Arc<dyn WarehouseServiceTrait + Send + Sync>;

#[async_trait]
pub trait WarehouseRepositoryTrait {
    async fn find_all(
        &self,
        req: &FindAllWarehouse,
    ) -> Result<(Vec<WarehouseItem>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<WarehouseItem>, RepositoryError>;
    async fn find_purchases(
        &self,
        req: &FindAllPurchases,
    ) -> Result<(Vec<Purchase>, i64), RepositoryError>;

    /// Moves `quantity` units from the product's material and filling rows into its
    /// finished-goods row. All or nothing.
    async fn assemble(
        &self,
        product_name: &str,
        quantity: i32,
    ) -> Result<AssemblyOutcome, RepositoryError>;

    /// Records a purchase and adds it to the matching ledger row, creating the row on first
    /// purchase.
    async fn register_purchase(
        &self,
        req: &PurchaseRequest,
        user_id: Option<i32>,
    ) -> Result<PurchaseOutcome, RepositoryError>;
}

#[async_trait]
pub trait WarehouseServiceTrait {
    async fn find_all(
        &self,
        req: &FindAllWarehouse,
    ) -> Result<ApiResponsePagination<Vec<WarehouseItemResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32)
    -> Result<ApiResponse<WarehouseItemResponse>, ServiceError>;
    async fn find_purchases(
        &self,
        req: &FindAllPurchases,
    ) -> Result<ApiResponsePagination<Vec<PurchaseResponse>>, ServiceError>;
    async fn assemble(
        &self,
        req: &AssembleRequest,
    ) -> Result<ApiResponse<AssemblyResponse>, ServiceError>;
    async fn register_purchase(
        &self,
        req: &PurchaseRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<PurchaseResultResponse>, ServiceError>;
}
