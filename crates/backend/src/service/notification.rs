use crate::{
    abstract_trait::{DynNotificationRepository, NotificationServiceTrait},
    domain::{
        CurrentUser,
        event::DomainEvent,
        responses::{ApiResponse, NotificationResponse},
    },
    errors::{RepositoryError, ServiceError},
};
use async_trait::async_trait;
use opentelemetry::KeyValue;
use prometheus_client::registry::Registry;
use shared::utils::{Method, Metrics, TracingMetrics};
use std::sync::Arc;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, error, info};

const LIST_LIMIT: i64 = 50;

/// Stores notifications and fans them out to live subscribers.
#[derive(Clone)]
pub struct NotificationService {
    repo: DynNotificationRepository,
    sender: broadcast::Sender<NotificationResponse>,
    tracing_metrics: TracingMetrics,
}

impl NotificationService {
    pub async fn new(
        repo: DynNotificationRepository,
        capacity: usize,
        metrics: Arc<Mutex<Metrics>>,
        registry: Arc<Mutex<Registry>>,
    ) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        let tracing_metrics = TracingMetrics::new(
            "notification-service",
            "notification_service",
            metrics,
            registry,
        )
        .await;

        Self {
            repo,
            sender,
            tracing_metrics,
        }
    }
}

#[async_trait]
impl NotificationServiceTrait for NotificationService {
    async fn publish(&self, event: DomainEvent) {
        let kind = event.kind();

        for notification in event.notifications() {
            match self.repo.create(&notification).await {
                Ok(stored) => {
                    let response = NotificationResponse::from(stored);
                    // no live subscribers is not an error
                    if self.sender.send(response).is_err() {
                        debug!("No live subscribers for {kind} notification");
                    }
                }
                Err(e) => error!("❌ Failed to store {kind} notification: {e}"),
            }
        }
    }

    async fn find_for(
        &self,
        user: &CurrentUser,
    ) -> Result<ApiResponse<Vec<NotificationResponse>>, ServiceError> {
        let method = Method::Get;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "notification_find_for",
            vec![
                KeyValue::new("component", "notification"),
                KeyValue::new("user.id", user.user_id.to_string()),
            ],
        );

        match self.repo.find_for(user, LIST_LIMIT).await {
            Ok(rows) => {
                info!("✅ {} notifications for user {}", rows.len(), user.user_id);
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Notifications retrieved")
                    .await;

                Ok(ApiResponse::success(
                    "Notifications retrieved successfully",
                    rows.into_iter().map(NotificationResponse::from).collect(),
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

    async fn mark_read(
        &self,
        id: i32,
        user: &CurrentUser,
    ) -> Result<ApiResponse<NotificationResponse>, ServiceError> {
        let method = Method::Put;
        let tracing_ctx = self.tracing_metrics.start_tracing(
            "notification_mark_read",
            vec![
                KeyValue::new("component", "notification"),
                KeyValue::new("notification.id", id.to_string()),
            ],
        );

        match self.repo.mark_read(id, user).await {
            Ok(Some(row)) => {
                self.tracing_metrics
                    .complete_tracing_success(&tracing_ctx, method, "Notification marked as read")
                    .await;
                Ok(ApiResponse::success(
                    "Notification marked as read",
                    NotificationResponse::from(row),
                ))
            }
            Ok(None) => {
                self.tracing_metrics
                    .complete_tracing_error(&tracing_ctx, method, "Notification not found")
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

    fn subscribe(&self) -> broadcast::Receiver<NotificationResponse> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::{OrderStatus, Role},
        testing::{FakeNotificationRepository, test_metrics},
    };

    #[tokio::test]
    async fn publish_stores_and_broadcasts_each_recipient() {
        let repo = Arc::new(FakeNotificationRepository::default());
        let (metrics, registry) = test_metrics();
        let service = NotificationService::new(repo.clone(), 16, metrics, registry).await;
        let mut rx = service.subscribe();

        service
            .publish(DomainEvent::OrderStatusChanged {
                order_id: 1,
                from: OrderStatus::Pendiente,
                to: OrderStatus::Cancelada,
            })
            .await;

        assert_eq!(repo.stored().await.len(), 2);
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.target_role.as_deref(), Some("tienda"));
        assert_eq!(second.target_role.as_deref(), Some("fabrica"));
    }

    #[tokio::test]
    async fn lists_own_and_role_notifications() {
        let repo = Arc::new(FakeNotificationRepository::default());
        let (metrics, registry) = test_metrics();
        let service = NotificationService::new(repo.clone(), 16, metrics, registry).await;

        service
            .publish(DomainEvent::QuoteRequested {
                quote_id: 3,
                customer_name: "Ana".into(),
            })
            .await;

        let admin = CurrentUser::new(1, Role::Administrador);
        let store = CurrentUser::new(2, Role::Tienda);

        assert_eq!(service.find_for(&admin).await.unwrap().data.len(), 1);
        assert!(service.find_for(&store).await.unwrap().data.is_empty());
    }

    #[tokio::test]
    async fn cannot_mark_someone_elses_notification() {
        let repo = Arc::new(FakeNotificationRepository::default());
        let (metrics, registry) = test_metrics();
        let service = NotificationService::new(repo.clone(), 16, metrics, registry).await;

        service
            .publish(DomainEvent::QuoteRequested {
                quote_id: 3,
                customer_name: "Ana".into(),
            })
            .await;
        let id = repo.stored().await[0].notification_id;

        let store = CurrentUser::new(2, Role::Tienda);
        assert!(matches!(
            service.mark_read(id, &store).await,
            Err(ServiceError::Repo(RepositoryError::NotFound))
        ));

        let admin = CurrentUser::new(1, Role::Administrador);
        assert!(service.mark_read(id, &admin).await.unwrap().data.is_read);
    }
}
