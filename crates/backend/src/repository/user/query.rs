use super::USER_COLUMNS;
use crate::{
    abstract_trait::UserQueryRepositoryTrait,
    domain::{
        requests::{FindAllUsers, RecordScope},
        responses::page_window,
    },
    errors::RepositoryError,
    model::User,
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

#[derive(Clone)]
pub struct UserQueryRepository {
    db: ConnectionPool,
}

impl UserQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserQueryRepositoryTrait for UserQueryRepository {
    async fn find_all(
        &self,
        req: &FindAllUsers,
        scope: RecordScope,
    ) -> Result<(Vec<User>, i64), RepositoryError> {
        info!("🔍 Fetching users ({scope:?}) with search: {:?}", req.search);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {USER_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM users
            WHERE {}
              AND ($1 = '' OR firstname ILIKE '%' || $1 || '%'
                   OR lastname ILIKE '%' || $1 || '%'
                   OR email ILIKE '%' || $1 || '%')
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
            scope.deleted_at_filter()
        );

        let rows = sqlx::query(&sql)
            .bind(req.search.trim())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch users: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = $1");

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch user {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = LOWER($1) AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch user by email: {:?}", e);
                RepositoryError::from(e)
            })
    }
}
