use crate::{
    abstract_trait::{DynNotificationService, DynOrderRepository, OrderServiceTrait},
    domain::{
        CurrentUser, OrderStatus, Role,
        event::DomainEvent,
        requests::{CreateOrderRequest, FindAllOrders},
        responses::{ApiResponse, ApiResponsePagination, OrderResponse, Pagination},
    },
    errors::{RepositoryError, ServiceError},
    model::Order,
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};

#[derive(Clone)]
pub struct OrderService {
    repo: DynOrderRepository,
    notifications: DynNotificationService,
    tracing_metrics: TracingMetrics,
}

impl OrderService {
    pub async fn new(
        repo: DynOrderRepository,
        notifications: DynNotificationService,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let tracing_metrics =
            TracingMetrics::new("order-service", "order_service", metrics, registry).await;

        Self {
            repo,
            notifications,
            tracing_metrics,
        }
    }

    async fn load(&self, id: i32) -> Result<Order, ServiceError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ServiceError::Repo(RepositoryError::NotFound))
    }
}

fn current_status(order: &Order) -> Result<OrderStatus, ServiceError> {
    order.status.parse::<OrderStatus>().map_err(|e| {
        error!("❌ Order {} holds an unknown status: {e}", order.order_id);
        ServiceError::Internal(e)
    })
}

/// Store staff may only call an order off; production moves belong to the factory.
fn ensure_allowed(actor: &CurrentUser, next: OrderStatus) -> Result<(), ServiceError> {
    match actor.role {
        Role::Fabrica | Role::Administrador => Ok(()),
        Role::Tienda if next == OrderStatus::Cancelada => Ok(()),
        role => Err(ServiceError::Forbidden(format!(
            "role '{role}' cannot move an order to '{next}'"
        ))),
    }
}

#[async_trait]
impl OrderServiceTrait for OrderService {
    async fn create(
        &self,
        req: &CreateOrderRequest,
        actor: &CurrentUser,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Post;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "order_create",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("product.id", req.product_id.to_string()),
                KeyValue::new("quantity", req.quantity.to_string()),
            ],
        );

        let order = match self.repo.create(req, Some(actor.user_id)).await {
            Ok(order) => order,
            Err(e) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, &e.to_string())
                    .await;
                return Err(e.into());
            }
        };

        info!("📦 Order {} created by user {}", order.order_id, actor.user_id);
        self.tracing_metrics
            .complete_tracing_success(&tracing_ctx, method, "Order created")
            .await;

        self.notifications
            .publish(DomainEvent::OrderCreated {
                order_id: order.order_id,
                product_id: order.product_id,
                quantity: order.quantity,
                destination: order.destination.clone(),
            })
            .await;

        Ok(ApiResponse::success(
            "Order created successfully",
            OrderResponse::from(order),
        ))
    }

    async fn find_all(
        &self,
        req: &FindAllOrders,
    ) -> Result<ApiResponsePagination<Vec<OrderResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "order_find_all",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("page", req.page.to_string()),
            ],
        );

        match self.repo.find_all(req).await {
            Ok((orders, total)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Orders retrieved")
                    .await;

                Ok(ApiResponsePagination::success(
                    "Orders retrieved successfully",
                    orders.into_iter().map(OrderResponse::from).collect(),
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

    async fn find_by_id(&self, id: i32) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "order_find_by_id",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
            ],
        );

        match self.load(id).await {
            Ok(order) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Order retrieved")
                    .await;
                Ok(ApiResponse::success(
                    "Order retrieved successfully",
                    OrderResponse::from(order),
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

    async fn update_status(
        &self,
        id: i32,
        next: OrderStatus,
        actor: &CurrentUser,
    ) -> Result<ApiResponse<OrderResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "order_update_status",
            vec![
                KeyValue::new("component", "order"),
                KeyValue::new("order.id", id.to_string()),
                KeyValue::new("status", next.as_str()),
            ],
        );

        let result = async {
            ensure_allowed(actor, next)?;

            let order = self.load(id).await?;
            let from = current_status(&order)?;

            if !from.can_transition_to(next) {
                return Err(ServiceError::order_transition(from, next));
            }

            match self.repo.update_status(id, from, next).await? {
                Some(updated) => Ok((from, updated)),
                None => {
                    // lost the race: report against whatever status won
                    let latest = self.load(id).await?;
                    Err(ServiceError::order_transition(current_status(&latest)?, next))
                }
            }
        }
        .await;

        match result {
            Ok((from, updated)) => {
                info!("🔄 Order {id} moved from {from} to {next}");
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Order status updated")
                    .await;

                self.notifications
                    .publish(DomainEvent::OrderStatusChanged {
                        order_id: id,
                        from,
                        to: next,
                    })
                    .await;

                Ok(ApiResponse::success(
                    "Order status updated successfully",
                    OrderResponse::from(updated),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeOrderRepository, RecordingNotifications, test_metrics};

    async fn setup() -> (OrderService, Arc<FakeOrderRepository>, Arc<RecordingNotifications>) {
        let repo = Arc::new(FakeOrderRepository::default());
        let notifications = Arc::new(RecordingNotifications::default());
        let (metrics, registry) = test_metrics();
        let service = OrderService::new(repo.clone(), notifications.clone(), metrics, registry).await;
        (service, repo, notifications)
    }

    fn request() -> CreateOrderRequest {
        CreateOrderRequest {
            product_id: 7,
            quantity: 3,
            origin: "Fábrica Terplac".into(),
            destination: "Tienda Centro".into(),
            notes: None,
        }
    }

    const FACTORY: CurrentUser = CurrentUser {
        user_id: 2,
        role: Role::Fabrica,
    };
    const STORE: CurrentUser = CurrentUser {
        user_id: 3,
        role: Role::Tienda,
    };

    #[tokio::test]
    async fn new_orders_start_pending_and_notify_factory() {
        let (service, _, notifications) = setup().await;

        let created = service.create(&request(), &STORE).await.unwrap();

        assert_eq!(created.data.status, "pendiente");
        assert_eq!(created.data.created_by, Some(3));
        assert!(matches!(
            notifications.events().await.as_slice(),
            [DomainEvent::OrderCreated { quantity: 3, .. }]
        ));
    }

    #[tokio::test]
    async fn factory_walks_the_production_flow() {
        let (service, _, notifications) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;

        for next in [
            OrderStatus::EnProduccion,
            OrderStatus::Fabricada,
            OrderStatus::Despachada,
        ] {
            let updated = service.update_status(id, next, &FACTORY).await.unwrap();
            assert_eq!(updated.data.status, next.as_str());
        }

        // one creation event plus three status changes
        assert_eq!(notifications.events().await.len(), 4);
    }

    #[tokio::test]
    async fn illegal_jumps_are_rejected_without_change() {
        let (service, repo, _) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;

        let err = service
            .update_status(id, OrderStatus::Despachada, &FACTORY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));

        let err = service
            .update_status(id, OrderStatus::Pendiente, &FACTORY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));

        assert_eq!(repo.status_of(id).await.as_deref(), Some("pendiente"));
    }

    #[tokio::test]
    async fn dispatched_orders_are_final() {
        let (service, _, _) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;
        for next in [
            OrderStatus::EnProduccion,
            OrderStatus::Fabricada,
            OrderStatus::Despachada,
        ] {
            service.update_status(id, next, &FACTORY).await.unwrap();
        }

        let err = service
            .update_status(id, OrderStatus::Cancelada, &FACTORY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn store_may_only_cancel() {
        let (service, _, _) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;

        let err = service
            .update_status(id, OrderStatus::EnProduccion, &STORE)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));

        let cancelled = service
            .update_status(id, OrderStatus::Cancelada, &STORE)
            .await
            .unwrap();
        assert_eq!(cancelled.data.status, "cancelada");
    }

    #[tokio::test]
    async fn customers_cannot_touch_orders() {
        let (service, _, _) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;
        let customer = CurrentUser::new(9, Role::Cliente);

        let err = service
            .update_status(id, OrderStatus::Cancelada, &customer)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Forbidden(_)));
    }

    #[tokio::test]
    async fn missing_order_is_not_found() {
        let (service, _, _) = setup().await;

        let err = service
            .update_status(404, OrderStatus::EnProduccion, &FACTORY)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Repo(RepositoryError::NotFound)));
    }

    #[tokio::test]
    async fn lost_compare_and_set_reports_a_transition_error() {
        let (service, repo, notifications) = setup().await;
        let id = service.create(&request(), &STORE).await.unwrap().data.id;
        repo.interleave_status(OrderStatus::Cancelada).await;

        let err = service
            .update_status(id, OrderStatus::EnProduccion, &FACTORY)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::InvalidTransition { ref from, .. } if from == "cancelada"
        ));
        assert_eq!(notifications.events().await.len(), 1);
    }
}
