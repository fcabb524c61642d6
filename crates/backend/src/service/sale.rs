use crate::{
    abstract_trait::{
        DynNotificationService, DynProductCache, DynSaleRepository, SaleServiceTrait,
    },
    domain::{
        PaymentStatus,
        event::DomainEvent,
        requests::{CheckoutRequest, FindAllSales, PaymentWebhookRequest},
        responses::{
            ApiResponse, ApiResponsePagination, Pagination, SaleResponse, SaleWithItemsResponse,
        },
        stock::SaleLine,
    },
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

#[derive(Clone)]
pub struct SaleService {
    repo: DynSaleRepository,
    notifications: DynNotificationService,
    product_cache: DynProductCache,
    webhook_secret: String,
    tracing_metrics: TracingMetrics,
}

impl SaleService {
    pub async fn new(
        repo: DynSaleRepository,
        notifications: DynNotificationService,
        product_cache: DynProductCache,
        webhook_secret: String,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("sale-service", "sale_service", metrics, registry).await;

        Self {
            repo,
            notifications,
            product_cache,
            webhook_secret,
            tracing_metrics,
        }
    }

    fn verify_secret(&self, secret: Option<&str>) -> Result<(), ServiceError> {
        match secret {
            Some(given) if given == self.webhook_secret => Ok(()),
            _ => {
                warn!("⚠️ Payment webhook rejected: bad or missing secret");
                Err(ServiceError::InvalidCredentials)
            }
        }
    }

    async fn process_webhook(
        &self,
        secret: Option<&str>,
        req: &PaymentWebhookRequest,
    ) -> Result<SaleResponse, ServiceError> {
        self.verify_secret(secret)?;

        let sale_id = req.external_reference.trim().parse::<i32>().map_err(|_| {
            ServiceError::Validation(vec![format!(
                "external_reference: '{}' is not a sale id",
                req.external_reference
            )])
        })?;
        let status = PaymentStatus::from_gateway(&req.status);

        let outcome = self
            .repo
            .apply_payment(sale_id, status, &req.payment_id)
            .await?;

        if outcome.changed {
            info!("💳 Sale {sale_id} payment is now {status}");
            if !outcome.restocked.is_empty() {
                self.product_cache.invalidate(&outcome.restocked).await;
            }
            self.notifications
                .publish(DomainEvent::PaymentUpdated {
                    sale_id,
                    user_id: outcome.sale.user_id,
                    status,
                })
                .await;
        } else {
            info!("💳 Sale {sale_id} webhook ignored, payment stays {}", outcome.sale.payment_status);
        }

        Ok(SaleResponse::from(outcome.sale))
    }
}

#[async_trait]
impl SaleServiceTrait for SaleService {
    async fn checkout(
        &self,
        req: &CheckoutRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<SaleWithItemsResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "sale_checkout",
            vec![
                KeyValue::new("component", "sale"),
                KeyValue::new("items", req.items.len().to_string()),
            ],
        );

        let lines: Vec<SaleLine> = req
            .items
            .iter()
            .map(|item| SaleLine {
                product_id: item.product_id,
                quantity: item.quantity,
            })
            .collect();

        match self
            .repo
            .checkout(user_id, &req.customer_name, &req.customer_email, &lines)
            .await
        {
            Ok(sale) => {
                info!("🛒 Sale {} created, total {}", sale.0.sale_id, sale.0.total);
                let sold: Vec<i32> = sale.1.iter().map(|item| item.product_id).collect();
                self.product_cache.invalidate(&sold).await;
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Checkout completed")
                    .await;

                Ok(ApiResponse::success(
                    "Checkout completed, awaiting payment",
                    SaleWithItemsResponse::from(sale),
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

    async fn handle_webhook(
        &self,
        secret: Option<&str>,
        req: &PaymentWebhookRequest,
    ) -> Result<ApiResponse<SaleResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "sale_payment_webhook",
            vec![
                KeyValue::new("component", "sale"),
                KeyValue::new("payment.id", req.payment_id.clone()),
                KeyValue::new("payment.status", req.status.clone()),
            ],
        );

        match self.process_webhook(secret, req).await {
            Ok(sale) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Payment notification applied")
                    .await;
                Ok(ApiResponse::success("Payment notification processed", sale))
            }
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                Err(e)
            }
        }
    }

    async fn find_all(
        &self,
        req: &FindAllSales,
    ) -> Result<ApiResponsePagination<Vec<SaleResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "sale_find_all",
            vec![
                KeyValue::new("component", "sale"),
                KeyValue::new("page", req.page.to_string()),
            ],
        );

        match self.repo.find_all(req).await {
            Ok((sales, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Sales retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Sales retrieved successfully",
                    sales.into_iter().map(SaleResponse::from).collect(),
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

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<ApiResponse<SaleWithItemsResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "sale_find_by_id",
            vec![
                KeyValue::new("component", "sale"),
                KeyValue::new("sale.id", id.to_string()),
            ],
        );

        match self.repo.find_by_id(id).await {
            Ok(Some(sale)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Sale retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "Sale retrieved successfully",
                    SaleWithItemsResponse::from(sale),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "Sale not found")
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{StockError, requests::CheckoutItemRequest},
        testing::{
            FakeSaleRepository, RecordingNotifications, RecordingProductCache, test_metrics,
        },
    };

    const SECRET: &str = "whsec";

    struct Fixture {
        service: SaleService,
        repo: Arc<FakeSaleRepository>,
        notifications: Arc<RecordingNotifications>,
        cache: Arc<RecordingProductCache>,
    }

    async fn fixture() -> Fixture {
        let repo = Arc::new(FakeSaleRepository::default());
        repo.add_product(1, 120_000, 5).await;
        repo.add_product(2, 80_000, 1).await;
        let notifications = Arc::new(RecordingNotifications::default());
        let cache = Arc::new(RecordingProductCache::default());
        let (metrics, registry) = test_metrics();
        let service = SaleService::new(
            repo.clone(),
            notifications.clone(),
            cache.clone(),
            SECRET.into(),
            metrics,
            registry,
        )
        .await;

        Fixture {
            service,
            repo,
            notifications,
            cache,
        }
    }

    async fn setup() -> (SaleService, Arc<FakeSaleRepository>, Arc<RecordingNotifications>) {
        let Fixture {
            service,
            repo,
            notifications,
            ..
        } = fixture().await;
        (service, repo, notifications)
    }

    fn cart(items: &[(i32, i32)]) -> CheckoutRequest {
        CheckoutRequest {
            customer_name: "Luis Soto".into(),
            customer_email: "luis@example.com".into(),
            items: items
                .iter()
                .map(|&(product_id, quantity)| CheckoutItemRequest {
                    product_id,
                    quantity,
                })
                .collect(),
        }
    }

    fn webhook(sale_id: i32, status: &str) -> PaymentWebhookRequest {
        PaymentWebhookRequest {
            payment_id: "mp-123".into(),
            external_reference: sale_id.to_string(),
            status: status.into(),
        }
    }

    #[tokio::test]
    async fn checkout_takes_stock_and_prices_lines() {
        let (service, repo, _) = setup().await;

        let sale = service
            .checkout(&cart(&[(1, 2), (2, 1), (1, 1)]), Some(8))
            .await
            .unwrap();

        assert_eq!(sale.data.sale.payment_status, "pendiente");
        assert_eq!(sale.data.sale.total, 3 * 120_000 + 80_000);
        assert_eq!(sale.data.items.len(), 2);
        assert_eq!(repo.stock_of(1).await, Some(2));
        assert_eq!(repo.stock_of(2).await, Some(0));
    }

    #[tokio::test]
    async fn checkout_beyond_stock_changes_nothing() {
        let (service, repo, _) = setup().await;

        let err = service
            .checkout(&cart(&[(1, 1), (2, 2)]), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::Stock(StockError::Insufficient { .. }))
        ));
        assert_eq!(repo.stock_of(1).await, Some(5));
        assert_eq!(repo.stock_of(2).await, Some(1));
    }

    #[tokio::test]
    async fn webhook_requires_the_shared_secret() {
        let (service, _, _) = setup().await;
        let sale_id = service.checkout(&cart(&[(1, 1)]), None).await.unwrap().data.sale.id;

        for secret in [None, Some("nope")] {
            let err = service
                .handle_webhook(secret, &webhook(sale_id, "approved"))
                .await
                .unwrap_err();
            assert!(matches!(err, ServiceError::InvalidCredentials));
        }
    }

    #[tokio::test]
    async fn approval_is_final_and_replays_are_ignored() {
        let (service, repo, notifications) = setup().await;
        let sale_id = service.checkout(&cart(&[(1, 2)]), Some(8)).await.unwrap().data.sale.id;

        let approved = service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "approved"))
            .await
            .unwrap();
        assert_eq!(approved.data.payment_status, "aprobado");

        let replay = service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "rejected"))
            .await
            .unwrap();
        assert_eq!(replay.data.payment_status, "aprobado");
        assert_eq!(repo.stock_of(1).await, Some(3));
        assert_eq!(notifications.events().await.len(), 1);
    }

    #[tokio::test]
    async fn rejection_restocks_products() {
        let (service, repo, notifications) = setup().await;
        let sale_id = service
            .checkout(&cart(&[(1, 2), (2, 1)]), None)
            .await
            .unwrap()
            .data
            .sale
            .id;

        let rejected = service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "cancelled"))
            .await
            .unwrap();

        assert_eq!(rejected.data.payment_status, "rechazado");
        assert_eq!(repo.stock_of(1).await, Some(5));
        assert_eq!(repo.stock_of(2).await, Some(1));
        assert!(matches!(
            notifications.events().await.as_slice(),
            [DomainEvent::PaymentUpdated {
                status: PaymentStatus::Rechazado,
                ..
            }]
        ));
    }

    #[tokio::test]
    async fn stock_changes_evict_cached_products() {
        let Fixture { service, cache, .. } = fixture().await;

        let sale_id = service
            .checkout(&cart(&[(2, 1), (1, 2)]), None)
            .await
            .unwrap()
            .data
            .sale
            .id;
        assert_eq!(cache.evicted().await, vec![vec![1, 2]]);

        service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "rejected"))
            .await
            .unwrap();
        assert_eq!(cache.evicted().await, vec![vec![1, 2], vec![1, 2]]);
    }

    #[tokio::test]
    async fn approvals_and_failed_checkouts_keep_the_cache() {
        let Fixture { service, cache, .. } = fixture().await;

        assert!(service.checkout(&cart(&[(2, 5)]), None).await.is_err());
        assert!(cache.evicted().await.is_empty());

        let sale_id = service.checkout(&cart(&[(1, 1)]), None).await.unwrap().data.sale.id;
        service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "approved"))
            .await
            .unwrap();
        assert_eq!(cache.evicted().await, vec![vec![1]]);
    }

    #[tokio::test]
    async fn pending_notifications_leave_the_sale_open() {
        let (service, _, notifications) = setup().await;
        let sale_id = service.checkout(&cart(&[(1, 1)]), None).await.unwrap().data.sale.id;

        let pending = service
            .handle_webhook(Some(SECRET), &webhook(sale_id, "in_process"))
            .await
            .unwrap();

        assert_eq!(pending.data.payment_status, "pendiente");
        assert!(notifications.events().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_reference_is_a_validation_error() {
        let (service, _, _) = setup().await;
        let mut req = webhook(1, "approved");
        req.external_reference = "order-abc".into();

        let err = service.handle_webhook(Some(SECRET), &req).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
