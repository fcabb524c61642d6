use crate::{
    abstract_trait::RefreshTokenRepositoryTrait, errors::RepositoryError, model::RefreshToken,
};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use shared::config::ConnectionPool;
use tracing::error;

const TOKEN_COLUMNS: &str = "refresh_token_id, user_id, token, expired_date, created_at, updated_at";

#[derive(Clone)]
pub struct RefreshTokenRepository {
    db: ConnectionPool,
}

impl RefreshTokenRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl RefreshTokenRepositoryTrait for RefreshTokenRepository {
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {TOKEN_COLUMNS} FROM refresh_tokens WHERE token = $1");

        sqlx::query_as::<_, RefreshToken>(&sql)
            .bind(token)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch refresh token: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn upsert(
        &self,
        user_id: i32,
        token: &str,
        expired_date: NaiveDateTime,
    ) -> Result<RefreshToken, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            INSERT INTO refresh_tokens (user_id, token, expired_date)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id) DO UPDATE
            SET token = EXCLUDED.token,
                expired_date = EXCLUDED.expired_date,
                updated_at = CURRENT_TIMESTAMP
            RETURNING {TOKEN_COLUMNS}
            "#
        );

        sqlx::query_as::<_, RefreshToken>(&sql)
            .bind(user_id)
            .bind(token)
            .bind(expired_date)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to store refresh token for user {user_id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn delete_by_user_id(&self, user_id: i32) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query("DELETE FROM refresh_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete refresh token for user {user_id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        Ok(())
    }
}
