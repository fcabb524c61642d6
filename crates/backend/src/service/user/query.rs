use crate::{
    abstract_trait::{DynUserQueryRepository, UserQueryServiceTrait},
    domain::{
        requests::{FindAllUsers, RecordScope},
        responses::{ApiResponse, ApiResponsePagination, Pagination, UserResponse},
    },
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct UserQueryService {
    query: DynUserQueryRepository,
    tracing_metrics: TracingMetrics,
}

impl UserQueryService {
    pub async fn new(
        query: DynUserQueryRepository,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("user-query-service", "user_query_service", metrics, registry)
                .await;

        Self {
            query,
            tracing_metrics,
        }
    }
}

#[async_trait]
impl UserQueryServiceTrait for UserQueryService {
    async fn find_all(
        &self,
        req: &FindAllUsers,
        scope: RecordScope,
    ) -> Result<ApiResponsePagination<Vec<UserResponse>>, ServiceError> {
        info!(
            "🔍 Listing {scope:?} users | page {} size {} search '{}'",
            req.page, req.page_size, req.search
        );

        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "FindAllUsers",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("scope", format!("{scope:?}")),
                KeyValue::new("search", req.search.clone()),
            ],
        );

        match self.query.find_all(req, scope).await {
            Ok((users, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Users retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Users retrieved successfully",
                    users.into_iter().map(UserResponse::from).collect(),
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

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<UserResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "FindUserById",
            vec![
                KeyValue::new("component", "user"),
                KeyValue::new("user.id", id.to_string()),
            ],
        );

        match self.query.find_by_id(id).await {
            Ok(Some(user)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "User retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "User retrieved successfully",
                    UserResponse::from(user),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "User not found")
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
}
