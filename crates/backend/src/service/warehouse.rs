use crate::{
    abstract_trait::{DynNotificationService, DynWarehouseRepository, WarehouseServiceTrait},
    domain::{
        StockKind,
        event::DomainEvent,
        requests::{AssembleRequest, FindAllPurchases, FindAllWarehouse, PurchaseRequest},
        responses::{
            ApiResponse, ApiResponsePagination, AssemblyResponse, Pagination, PurchaseResponse,
            PurchaseResultResponse, WarehouseItemResponse,
        },
    },
    errors::{RepositoryError, ServiceError},
    model::WarehouseItem,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;

#[derive(Clone)]
pub struct WarehouseService {
    repo: DynWarehouseRepository,
    notifications: DynNotificationService,
    low_stock_threshold: i32,
    tracing_metrics: TracingMetrics,
}

impl WarehouseService {
    pub async fn new(
        repo: DynWarehouseRepository,
        notifications: DynNotificationService,
        low_stock_threshold: i32,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("warehouse-service", "warehouse_service", metrics, registry)
                .await;

        Self {
            repo,
            notifications,
            low_stock_threshold,
            tracing_metrics,
        }
    }

    /// Notifies only when `consumed` units took the row from above the threshold to at or below it.
    async fn warn_if_low(&self, row: &WarehouseItem, consumed: i32) {
        let before = row.stock.saturating_add(consumed);
        if row.stock > self.low_stock_threshold || before <= self.low_stock_threshold {
            return;
        }

        let Ok(kind) = row.kind.parse::<StockKind>() else {
            return;
        };

        self.notifications
            .publish(DomainEvent::LowStock {
                kind,
                name: row.name.clone(),
                stock: row.stock,
                threshold: self.low_stock_threshold,
            })
            .await;
    }
}

#[async_trait]
impl WarehouseServiceTrait for WarehouseService {
    async fn find_all(
        &self,
        req: &FindAllWarehouse,
    ) -> Result<ApiResponsePagination<Vec<WarehouseItemResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "warehouse_find_all",
            vec![
                KeyValue::new("component", "warehouse"),
                KeyValue::new("page", req.page.to_string()),
                KeyValue::new("search", req.search.clone()),
            ],
        );

        match self.repo.find_all(req).await {
            Ok((rows, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Warehouse rows retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Warehouse rows retrieved successfully",
                    rows.into_iter().map(WarehouseItemResponse::from).collect(),
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
    ) -> Result<ApiResponse<WarehouseItemResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "warehouse_find_by_id",
            vec![
                KeyValue::new("component", "warehouse"),
                KeyValue::new("warehouse_item.id", id.to_string()),
            ],
        );

        match self.repo.find_by_id(id).await {
            Ok(Some(row)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Warehouse row retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "Warehouse row retrieved successfully",
                    WarehouseItemResponse::from(row),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "Warehouse row not found")
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

    async fn find_purchases(
        &self,
        req: &FindAllPurchases,
    ) -> Result<ApiResponsePagination<Vec<PurchaseResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "warehouse_find_purchases",
            vec![KeyValue::new("component", "warehouse")],
        );

        match self.repo.find_purchases(req).await {
            Ok((rows, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Purchases retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Purchases retrieved successfully",
                    rows.into_iter().map(PurchaseResponse::from).collect(),
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

    async fn assemble(
        &self,
        req: &AssembleRequest,
    ) -> Result<ApiResponse<AssemblyResponse>, ServiceError> {
        info!("🔨 Assemble request: {} x '{}'", req.quantity, req.product_name);

        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "warehouse_assemble",
            vec![
                KeyValue::new("component", "warehouse"),
                KeyValue::new("product.name", req.product_name.clone()),
                KeyValue::new("quantity", req.quantity.to_string()),
            ],
        );

        let outcome = match self.repo.assemble(&req.product_name, req.quantity).await {
            Ok(outcome) => outcome,
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                return Err(e.into());
            }
        };

        self.tracing_metrics
            .complete_tracing_success(&tracing_ctx, method, "Finished doors assembled")
            .await;

        self.warn_if_low(&outcome.material, req.quantity).await;
        self.warn_if_low(&outcome.filling, req.quantity).await;

        Ok(ApiResponse::success(
            "Finished doors assembled successfully",
            AssemblyResponse::from(outcome),
        ))
    }

    async fn register_purchase(
        &self,
        req: &PurchaseRequest,
        user_id: Option<i32>,
    ) -> Result<ApiResponse<PurchaseResultResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "warehouse_register_purchase",
            vec![
                KeyValue::new("component", "warehouse"),
                KeyValue::new("kind", req.kind.as_str()),
                KeyValue::new("item.name", req.name.clone()),
                KeyValue::new("quantity", req.quantity.to_string()),
            ],
        );

        match self.repo.register_purchase(req, user_id).await {
            Ok(outcome) => {
                let message = if outcome.created {
                    "Purchase registered, warehouse row created"
                } else {
                    "Purchase registered, warehouse row updated"
                };

                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, message)
                    .await;

                Ok(ApiResponse::success(
                    message,
                    PurchaseResultResponse::from(outcome),
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
    use crate::{
        domain::StockError,
        testing::{FakeWarehouseRepository, RecordingNotifications, test_metrics},
    };

    async fn service(
        repo: Arc<FakeWarehouseRepository>,
        notifications: Arc<RecordingNotifications>,
    ) -> WarehouseService {
        let (metrics, registry) = test_metrics();
        WarehouseService::new(repo, notifications, 5, metrics, registry).await
    }

    fn assemble(name: &str, quantity: i32) -> AssembleRequest {
        AssembleRequest {
            product_name: name.into(),
            quantity,
        }
    }

    fn purchase(kind: StockKind, name: &str, quantity: i32, cost: i64) -> PurchaseRequest {
        PurchaseRequest {
            kind,
            name: name.into(),
            quantity,
            cost,
            supplier: Some("Maderas del Sur".into()),
        }
    }

    #[tokio::test]
    async fn assembly_moves_exact_quantities() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 20, 15));
        let notifications = Arc::new(RecordingNotifications::default());
        let service = service(repo.clone(), notifications.clone()).await;

        let result = service.assemble(&assemble("Puerta Roble", 4)).await.unwrap();

        assert_eq!(result.data.material.stock, 16);
        assert_eq!(result.data.filling.stock, 11);
        assert_eq!(result.data.finished.stock, 4);
        assert!(result.data.finished_created);

        let again = service.assemble(&assemble("Puerta Roble", 2)).await.unwrap();
        assert_eq!(again.data.finished.stock, 6);
        assert!(!again.data.finished_created);
        assert_eq!(repo.rows().await.len(), 3);
        assert!(notifications.events().await.is_empty());
    }

    #[tokio::test]
    async fn insufficient_filling_changes_nothing() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 20, 3));
        let notifications = Arc::new(RecordingNotifications::default());
        let service = service(repo.clone(), notifications).await;
        let before = repo.stock_snapshot().await;

        let err = service.assemble(&assemble("Puerta Roble", 4)).await.unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::Stock(StockError::Insufficient {
                kind: StockKind::Filling,
                available: 3,
                requested: 4,
                ..
            }))
        ));
        assert_eq!(repo.stock_snapshot().await, before);
    }

    #[tokio::test]
    async fn insufficient_material_changes_nothing() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 1, 30));
        let service = service(repo.clone(), Arc::new(RecordingNotifications::default())).await;
        let before = repo.stock_snapshot().await;

        assert!(service.assemble(&assemble("Puerta Roble", 2)).await.is_err());
        assert_eq!(repo.stock_snapshot().await, before);
    }

    #[tokio::test]
    async fn unknown_product_is_not_found() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 5, 5));
        let service = service(repo, Arc::new(RecordingNotifications::default())).await;

        let err = service.assemble(&assemble("Puerta Pino", 1)).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::Stock(StockError::ProductNotFound(_)))
        ));
    }

    #[tokio::test]
    async fn low_raw_stock_notifies_factory() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 8, 40));
        let notifications = Arc::new(RecordingNotifications::default());
        let service = service(repo, notifications.clone()).await;

        service.assemble(&assemble("Puerta Roble", 4)).await.unwrap();

        let events = notifications.events().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DomainEvent::LowStock {
                kind: StockKind::Material,
                stock: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn low_stock_is_reported_once_when_crossing_the_threshold() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 8, 40));
        let notifications = Arc::new(RecordingNotifications::default());
        let service = service(repo, notifications.clone()).await;

        service.assemble(&assemble("Puerta Roble", 1)).await.unwrap();
        assert!(notifications.events().await.is_empty());

        service.assemble(&assemble("Puerta Roble", 3)).await.unwrap();
        service.assemble(&assemble("Puerta Roble", 1)).await.unwrap();

        let events = notifications.events().await;
        assert_eq!(events.len(), 1);
        assert!(matches!(
            &events[0],
            DomainEvent::LowStock {
                kind: StockKind::Material,
                stock: 4,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn first_purchase_creates_one_row_and_one_record() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 0, 0));
        repo.add_material("Pino").await;
        let service = service(repo.clone(), Arc::new(RecordingNotifications::default())).await;
        let rows_before = repo.rows().await.len();

        let result = service
            .register_purchase(&purchase(StockKind::Material, "Pino", 12, 36_000), Some(1))
            .await
            .unwrap();

        assert!(result.data.created);
        assert_eq!(result.data.item.stock, 12);
        assert_eq!(result.data.item.cost, 36_000);
        assert_eq!(result.data.purchase.warehouse_item_id, result.data.item.id);
        assert_eq!(repo.rows().await.len(), rows_before + 1);
        assert_eq!(repo.purchases().await.len(), 1);
    }

    #[tokio::test]
    async fn repeat_purchase_accumulates_without_duplicate_row() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 10, 0));
        let service = service(repo.clone(), Arc::new(RecordingNotifications::default())).await;
        let rows_before = repo.rows().await.len();

        let result = service
            .register_purchase(&purchase(StockKind::Material, "Roble", 5, 2_500), None)
            .await
            .unwrap();

        assert!(!result.data.created);
        assert_eq!(result.data.item.stock, 15);
        assert_eq!(result.data.item.cost, 2_500);
        assert_eq!(repo.rows().await.len(), rows_before);

        let again = service
            .register_purchase(&purchase(StockKind::Material, "Roble", 1, 500), None)
            .await
            .unwrap();
        assert_eq!(again.data.item.stock, 16);
        assert_eq!(again.data.item.cost, 3_000);
        assert_eq!(repo.purchases().await.len(), 2);
    }

    #[tokio::test]
    async fn purchase_of_unknown_item_is_not_found() {
        let repo = Arc::new(FakeWarehouseRepository::with_door("Puerta Roble", 0, 0));
        let service = service(repo.clone(), Arc::new(RecordingNotifications::default())).await;

        let err = service
            .register_purchase(&purchase(StockKind::Filling, "Espuma", 3, 100), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repo(RepositoryError::Stock(StockError::ItemNotFound { .. }))
        ));
        assert!(repo.purchases().await.is_empty());
    }
}
