use crate::{
    domain::{
        QuoteStatus,
        requests::{CreateQuoteRequest, FindAllQuotes},
        responses::{ApiResponse, ApiResponsePagination, QuoteResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::CustomQuote,
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynQuoteRepository = Arc<dyn QuoteRepositoryTrait + Send + Sync>;
pub type DynQuoteService = Arc<dyn QuoteServiceTrait + Send + Sync>;

#[async_trait]
pub trait QuoteRepositoryTrait {
    async fn create(
        &self,
        req: &CreateQuoteRequest,
        user_id: Option<i32>,
    ) -> Result<CustomQuote, RepositoryError>;
    async fn find_all(
        &self,
        req: &FindAllQuotes,
    ) -> Result<(Vec<CustomQuote>, i64), RepositoryError>;
    async fn find_by_id(&self, id: i32) -> Result<Option<CustomQuote>, RepositoryError>;
    /// Compare-and-set on `status`; `None` when the row no longer holds `from`.
    async fn update_status(
        &self,
        id: i32,
        from: QuoteStatus,
        to: QuoteStatus,
        quoted_price: Option<i64>,
    ) -> Result<Option<CustomQuote>, RepositoryError>;
}

#[async_trait]
pub trait QuoteServiceTrait {
    async fn create(
        &self,
        req: &CreateQuoteRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError>;
    async fn find_all(
        &self,
        req: &FindAllQuotes,
    ) -> Result<ApiResponsePagination<Vec<QuoteResponse>>, ServiceError>;
    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<QuoteResponse>, ServiceError>;
    async fn set_price(
        &self,
        id: i32,
        quoted_price: i64,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError>;
    async fn decide(
        &self,
        id: i32,
        status: QuoteStatus,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError>;
}
