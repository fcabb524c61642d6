use crate::{
    abstract_trait::{DynNotificationService, DynQuoteRepository, QuoteServiceTrait},
    domain::{
        QuoteStatus,
        event::DomainEvent,
        requests::{CreateQuoteRequest, FindAllQuotes},
        responses::{ApiResponse, ApiResponsePagination, Pagination, QuoteResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::CustomQuote,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct QuoteService {
    repo: DynQuoteRepository,
    notifications: DynNotificationService,
    tracing_metrics: TracingMetrics,
}

impl QuoteService {
    pub async fn new(
        repo: DynQuoteRepository,
        notifications: DynNotificationService,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("quote-service", "quote_service", metrics, registry).await;

        Self {
            repo,
            notifications,
            tracing_metrics,
        }
    }

    async fn load(&self, id: i32) -> Result<CustomQuote, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::Repo(RepositoryError::NotFound))
    }

    async fn transition(
        &self,
        id: i32,
        next: QuoteStatus,
        quoted_price: Option<i64>,
    ) -> Result<CustomQuote, ServiceError> {
        let quote = self.load(id).await?;
        let from = quote
            .status
            .parse::<QuoteStatus>()
            .map_err(ServiceError::Internal)?;

        if !from.can_transition_to(next) {
            return Err(invalid(from, next));
        }

        match self.repo.update_status(id, from, next, quoted_price).await? {
            Some(updated) => Ok(updated),
            None => {
                let latest = self.load(id).await?;
                Err(ServiceError::InvalidTransition {
                    from: latest.status,
                    to: next.to_string(),
                })
            }
        }
    }
}

fn invalid(from: QuoteStatus, to: QuoteStatus) -> ServiceError {
    ServiceError::InvalidTransition {
        from: from.to_string(),
        to: to.to_string(),
    }
}

#[async_trait]
impl QuoteServiceTrait for QuoteService {
    async fn create(
        &self,
        req: &CreateQuoteRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "quote_create",
            vec![
                KeyValue::new("component", "quote"),
                KeyValue::new("customer.email", req.customer_email.clone()),
            ],
        );

        let quote = match self.repo.create(req, user_id).await {
            Ok(quote) => quote,
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                return Err(e.into());
            }
        };

        info!("📝 Quote {} requested by {}", quote.quote_id, quote.customer_name);
        self.tracing_metrics
            .complete_tracing_success(&tracing_ctx, method, "Quote requested")
            .await;

        self.notifications
            .publish(DomainEvent::QuoteRequested {
                quote_id: quote.quote_id,
                customer_name: quote.customer_name.clone(),
            })
            .await;

        Ok(ApiResponse::success(
            "Quote request received",
            QuoteResponse::from(quote),
        ))
    }

    async fn find_all(
        &self,
        req: &FindAllQuotes,
    ) -> Result<ApiResponsePagination<Vec<QuoteResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "quote_find_all",
            vec![
                KeyValue::new("component", "quote"),
                KeyValue::new("page", req.page.to_string()),
            ],
        );

        match self.repo.find_all(req).await {
            Ok((quotes, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Quotes retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Quotes retrieved successfully",
                    quotes.into_iter().map(QuoteResponse::from).collect(),
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

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<QuoteResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "quote_find_by_id",
            vec![
                KeyValue::new("component", "quote"),
                KeyValue::new("quote.id", id.to_string()),
            ],
        );

        match self.load(id).await {
            Ok(quote) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Quote retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "Quote retrieved successfully",
                    QuoteResponse::from(quote),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn set_price(
        &self,
        id: i32,
        quoted_price: i64,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "quote_set_price",
            vec![
                KeyValue::new("component", "quote"),
                KeyValue::new("quote.id", id.to_string()),
                KeyValue::new("quoted_price", quoted_price.to_string()),
            ],
        );

        if quoted_price < 0 {
            let err = ServiceError::Validation(vec!["quoted_price: cannot be negative".into()]);
            self.tracing_metrics
                .complete_tracing_error(&tracing_ctx, method, &err.to_string())
                .await;
            return Err(err);
        }

        match self
            .transition(id, QuoteStatus::Cotizado, Some(quoted_price))
            .await
        {
            Ok(quote) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Quote priced")
                    .await;

                self.notifications
                    .publish(DomainEvent::QuotePriced {
                        quote_id: quote.quote_id,
                        user_id: quote.user_id,
                        quoted_price,
                    })
                    .await;

                Ok(ApiResponse::success(
                    "Quote priced successfully",
                    QuoteResponse::from(quote),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn decide(
        &self,
        id: i32,
        status: QuoteStatus,
    ) -> Result<ApiResponse<QuoteResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "quote_decide",
            vec![
                KeyValue::new("component", "quote"),
                KeyValue::new("quote.id", id.to_string()),
                KeyValue::new("status", status.as_str()),
            ],
        );

        let result = match status {
            QuoteStatus::Aceptado | QuoteStatus::Rechazado => {
                self.transition(id, status, None).await
            }
            other => Err(ServiceError::Validation(vec![format!(
                "status: '{other}' is not a decision, expected aceptado or rechazado"
            )])),
        };

        match result {
            Ok(quote) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Quote decided")
                    .await;
                Ok(ApiResponse::success(
                    "Quote status updated successfully",
                    QuoteResponse::from(quote),
                ))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }
}
