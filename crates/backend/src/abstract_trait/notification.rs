use crate::{
    domain::{
        CurrentUser,
        event::{DomainEvent, NewNotification},
        responses::{ApiResponse, NotificationResponse},
    },
    errors::{RepositoryError, ServiceError},
    model::Notification,
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

pub type DynNotificationRepository = Arc<dyn NotificationRepositoryTrait + Send + Sync>;
pub type DynNotificationService = Arc<dyn NotificationServiceTrait + Send + Sync>;

#[async_trait]
pub trait NotificationRepositoryTrait {
    async fn create(&self, notification: &NewNotification)
    -> Result<Notification, RepositoryError>;
    /// Own notifications plus the ones addressed to the user's role, newest first.
    async fn find_for(
        &self,
        user: &CurrentUser,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError>;
    async fn mark_read(
        &self,
        id: i32,
        user: &CurrentUser,
    ) -> Result<Option<Notification>, RepositoryError>;
}

#[async_trait]
pub trait NotificationServiceTrait {
    /// Persists and broadcasts the event's notifications. Failures are logged, never returned.
    async fn publish(&self, event: DomainEvent);
    async fn find_for(
        &self,
        user: &CurrentUser,
    ) -> Result<ApiResponse<Vec<NotificationResponse>>, ServiceError>;
    async fn mark_read(
        &self,
        id: i32,
        user: &CurrentUser,
    ) -> Result<ApiResponse<NotificationResponse>, ServiceError>;
    fn subscribe(&self) -> broadcast::Receiver<NotificationResponse>;
}
