use crate::{
    domain::{
        CurrentUser, OrderStatus,
        requests::{CreateOrderRequest, FindAllOrders},
        responses::{ApiResponse, ApiResponsePagination, OrderResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::Order,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynOrderRepository = Arc<dyn OrderRepositoryTrait + Send + Sync>;
pub type DynOrderService = Arc<dyn OrderServiceTrait + Send + Sync>;

#[async_trait]
pub trait OrderRepositoryTrait {
    async fn create(
        &self,
        req: &CreateOrderRequest,
        created_by: Option<i32>,
    ) -> Result<Order, RepositoryError>;
    async fn find_all(&self, req: &FindAllOrders) -> Result<(Vec<Order>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError>;
    /// Compare-and-set on `status`; `None` when the row no longer holds `from`.
    async fn update_status(
        &self,
        id: i32,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError>;
}

#[async_trait]
pub trait OrderServiceTrait {
    async fn create(
        &self,
        req: &CreateOrderRequest,
        actor: &CurrentUser,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn find_all(
        &self,
        req: &FindAllOrders,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<OrderResponse>, ServiceError>;
    async fn update_status(
        &self,
        id: i32,
        next: OrderStatus,
        actor: &CurrentUser,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError>;
}
