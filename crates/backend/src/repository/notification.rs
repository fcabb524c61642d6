use crate::{
    abstract_trait::NotificationRepositoryTrait,
    domain::{
        CurrentUser,
        event::{Audience, NewNotification},
    },
    errors::RepositoryError,
    model::Notification,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::error;

const NOTIFICATION_COLUMNS: &str =
    "notification_id, user_id, target_role, kind, title, message, is_read, created_at";

#[derive(Clone)]
pub struct NotificationRepository {
    db: ConnectionPool,
}

impl NotificationRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl NotificationRepositoryTrait for NotificationRepository {
    async fn create(
        &self,
        notification: &NewNotification,
    ) -> Result<Notification, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let (user_id, target_role) = match notification.audience {
            Audience::User(id) => (Some(id), None),
            Audience::Role(role) => (None, Some(role.as_str())),
        };

        let sql = format!(
            "INSERT INTO notifications (user_id, target_role, kind, title, message) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {NOTIFICATION_COLUMNS}"
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(user_id)
            .bind(target_role)
            .bind(notification.kind)
            .bind(&notification.title)
            .bind(&notification.message)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to store notification: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_for(
        &self,
        user: &CurrentUser,
        limit: i64,
    ) -> Result<Vec<Notification>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "SELECT {NOTIFICATION_COLUMNS} FROM notifications \
             WHERE user_id = $1 OR target_role = $2 \
             ORDER BY created_at DESC, notification_id DESC LIMIT $3"
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(user.user_id)
            .bind(user.role.as_str())
            .bind(limit)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch notifications of user {}: {:?}", user.user_id, e);
                RepositoryError::from(e)
            })
    }

    async fn mark_read(
        &self,
        id: i32,
        user: &CurrentUser,
    ) -> Result<Option<Notification>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "UPDATE notifications SET is_read = TRUE \
             WHERE notification_id = $1 AND (user_id = $2 OR target_role = $3) \
             RETURNING {NOTIFICATION_COLUMNS}"
        );

        sqlx::query_as::<_, Notification>(&sql)
            .bind(id)
            .bind(user.user_id)
            .bind(user.role.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to mark notification {id} as read: {:?}", e);
                RepositoryError::from(e)
            })
    }
}
