use crate::{
    domain::{
        PaymentStatus,
        requests::{CheckoutRequest, FindAllSales, PaymentWebhookRequest},
        responses::{ApiResponse, ApiResponsePagination, SaleResponse, SaleWithItemsResponse},
        stock::SaleLine,
    },
    errors::{RepositoryError, ServiceError},
    model::{Sale, SaleItem},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynSaleRepository = Arc<dyn SaleRepositoryTrait + Send + Sync>;
pub type DynSaleService = Arc<dyn SaleServiceTrait + Send + Sync>;

/// Sale after a payment notification; `changed` is false for replays on a final sale.
#[derive(Debug, Clone)]
pub struct PaymentOutcome {
    pub sale: Sale,
    pub changed: bool,
    /// Products whose storefront stock was handed back by a rejection.
    pub restocked: Vec<i32>,
}

#[async_trait]
pub trait SaleRepositoryTrait {
    /// Creates the sale and its items and takes the units out of `products.stock`.
    async fn checkout(
        &self,
        user_id: Option<i32>,
        customer_name: &str,
        customer_email: &str,
        lines: &[SaleLine],
    ) -> Result<(Sale, Vec<SaleItem>), RepositoryError>;
    async fn find_all(&self, req: &FindAllSales) -> Result<(Vec<Sale>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32)
    -> Result<Option<(Sale, Vec<SaleItem>)>, RepositoryError>;
    /// Moves a pending sale to a final payment state; a rejection puts the units back.
    async fn apply_payment(
        &self,
        sale_id: i32,
        status: PaymentStatus,
        payment_reference: &str,
    ) -> Result<PaymentOutcome, RepositoryError>;
}

#[async_trait]
pub trait SaleServiceTrait {
    async fn checkout(
        &self,
        req: &CheckoutRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<SaleWithItemsResponse>, ServiceError>;
    async fn handle_webhook(
        &self,
        secret: Option<&str>,
        req: &PaymentWebhookRequest,
    ) -> Result<ApiResponse<SaleResponse>, ServiceError>;
    async fn find_all(
        &self,
        req: &FindAllSales,
    ) -> Result<ApiResponsePagination<Vec<SaleResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32)
    -> Result<ApiResponse<SaleWithItemsResponse>, ServiceError>;
}
