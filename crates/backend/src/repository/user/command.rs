use super::USER_COLUMNS;
use crate::{
    abstract_trait::{NewUser, UserCommandRepositoryTrait},
    domain::{Role, requests::UpdateUserRequest},
    errors::RepositoryError,
    model::User,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

#[derive(Clone)]
pub struct UserCommandRepository {
    db: ConnectionPool,
}

impl UserCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn set_deleted(&self, id: i32, trashed: bool) -> Result<User, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = if trashed {
            format!(
                "UPDATE users SET deleted_at = CURRENT_TIMESTAMP \
                 WHERE user_id = $1 AND deleted_at IS NULL RETURNING {USER_COLUMNS}"
            )
        } else {
            format!(
                "UPDATE users SET deleted_at = NULL \
                 WHERE user_id = $1 AND deleted_at IS NOT NULL RETURNING {USER_COLUMNS}"
            )
        };

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to change deleted state of user {id}: {:?}", e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl UserCommandRepositoryTrait for UserCommandRepository {
    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        info!("🆕 Creating user {} ({})", user.email, user.role);

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "INSERT INTO users (firstname, lastname, email, password, role, store_name) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {USER_COLUMNS}"
        );

        let created = sqlx::query_as::<_, User>(&sql)
            .bind(&user.firstname)
            .bind(&user.lastname)
            .bind(&user.email)
            .bind(&user.password)
            .bind(user.role.as_str())
            .bind(&user.store_name)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to create user: {:?}", e);
                RepositoryError::from(e)
            })?;

        info!("✅ User created with ID: {}", created.user_id);
        Ok(created)
    }

    async fn update(
        &self,
        req: &UpdateUserRequest,
        password: Option<String>,
    ) -> Result<User, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE users
            SET firstname = $2,
                lastname = $3,
                email = $4,
                password = COALESCE($5, password),
                store_name = $6,
                updated_at = CURRENT_TIMESTAMP
            WHERE user_id = $1 AND deleted_at IS NULL
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(req.user_id)
            .bind(&req.firstname)
            .bind(&req.lastname)
            .bind(&req.email)
            .bind(password)
            .bind(&req.store_name)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update user {}: {:?}", req.user_id, e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn update_role(&self, id: i32, role: Role) -> Result<User, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "UPDATE users SET role = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE user_id = $1 AND deleted_at IS NULL RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to change role of user {id}: {:?}", e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn trash(&self, id: i32) -> Result<User, RepositoryError> {
        self.set_deleted(id, true).await
    }

    async fn restore(&self, id: i32) -> Result<User, RepositoryError> {
        self.set_deleted(id, false).await
    }

    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1 AND deleted_at IS NOT NULL")
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete user {id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("🗑️ User {id} permanently deleted");
        Ok(())
    }
}
