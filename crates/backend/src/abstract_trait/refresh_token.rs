use crate::{errors::RepositoryError, model::RefreshToken};
use async_trait::async_trait;
use chrono::NaiveDateTime;
use std::sync::Arc;

pub type DynRefreshTokenRepository = Arc<dyn RefreshTokenRepositoryTrait + Send + Sync>;

#[async_trait]
pub trait RefreshTokenRepositoryTrait {
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>, RepositoryError>;
    /// Replaces whatever token the user had; one live refresh token per account.
    async fn upsert(
        &self,
        user_id: i32,
        token: &str,
        expired_date: NaiveDateTime,
    ) -> Result<RefreshToken, RepositoryError>;
    async fn delete_by_user_id(&self, user_id: i32) -> Result<(), RepositoryError>;
}
