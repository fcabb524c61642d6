use crate::{
    domain::responses::{ApiResponse, DashboardResponse},
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use std::sync::Arc;

pub type DynDashboardRepository = Arc<dyn DashboardRepositoryTrait + Send + Sync>;
pub type DynDashboardService = Arc<dyn DashboardServiceTrait + Send + Sync>;

#[async_trait]
pub trait DashboardRepositoryTrait {
    async fn summary(&self, low_stock_threshold: i32)
    -> Result<DashboardResponse, RepositoryError>;
}

#[async_trait]
pub trait DashboardServiceTrait {
    async fn summary(&self) -> Result<ApiResponse<DashboardResponse>, ServiceError>;
}
