use crate::{
    abstract_trait::{DashboardServiceTrait, DynDashboardRepository},
    domain::responses::{ApiResponse, DashboardResponse},
    errors::ServiceError,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct DashboardService {
    repo: DynDashboardRepository,
    low_stock_threshold: i32,
    tracing_metrics: TracingMetrics,
}

impl DashboardService {
    pub async fn new(
        repo: DynDashboardRepository,
        low_stock_threshold: i32,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("dashboard-service", "dashboard_service", metrics, registry)
                .await;

        Self {
            repo,
            low_stock_threshold,
            tracing_metrics,
        }
    }
}

#[async_trait]
impl DashboardServiceTrait for DashboardService {
    async fn summary(&self) -> Result<ApiResponse<DashboardResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "dashboard_summary",
            vec![
                KeyValue::new("component", "dashboard"),
                KeyValue::new("low_stock_threshold", self.low_stock_threshold.to_string()),
            ],
        );

        match self.repo.summary(self.low_stock_threshold).await {
            Ok(summary) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Dashboard summary built")
                    .await;
                Ok(ApiResponse::success(
                    "Dashboard summary retrieved successfully",
                    summary,
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeDashboardRepository, test_metrics};

    #[tokio::test]
    async fn summary_uses_configured_threshold() {
        let (metrics, registry) = test_metrics();
        let repo = Arc::new(FakeDashboardRepository::default());
        let service = DashboardService::new(repo.clone(), 7, metrics, registry).await;

        let response = service.summary().await.unwrap();

        assert_eq!(*repo.requested_threshold.lock().await, Some(7));
        assert_eq!(response.data.low_stock_items, 2);
        assert_eq!(response.data.approved_sales_total, 120_000);
    }
}
