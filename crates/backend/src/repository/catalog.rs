use crate::{
    abstract_trait::CatalogRepositoryTrait,
    domain::{
        CatalogKind,
        requests::{CatalogItemRequest, FindAllCatalog},
        responses::page_window,
    },
    errors::RepositoryError,
    model::CatalogEntry,
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

/// Materials and fillings share one shape, so one repository serves both tables.
#[derive(Clone)]
pub struct CatalogRepository {
    db: ConnectionPool,
}

impl CatalogRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

fn columns(kind: CatalogKind) -> String {
    format!(
        "{} AS id, name, description, created_at, updated_at",
        kind.id_column()
    )
}

#[async_trait]
impl CatalogRepositoryTrait for CatalogRepository {
    async fn find_all(
        &self,
        kind: CatalogKind,
        req: &FindAllCatalog,
    ) -> Result<(Vec<CatalogEntry>, i64), RepositoryError> {
        info!("🔍 Fetching {} with search: {:?}", kind.table(), req.search);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {}, COUNT(*) OVER() AS total_count
            FROM {}
            WHERE ($1 = '' OR name ILIKE '%' || $1 || '%')
            ORDER BY name
            LIMIT $2 OFFSET $3
            "#,
            columns(kind),
            kind.table()
        );

        let rows = sqlx::query(&sql)
            .bind(req.search.trim())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch {}: {:?}", kind.table(), e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "SELECT {} FROM {} WHERE {} = $1",
            columns(kind),
            kind.table(),
            kind.id_column()
        );

        sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch {kind} {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn create(
        &self,
        kind: CatalogKind,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "INSERT INTO {} (name, description) VALUES ($1, $2) RETURNING {}",
            kind.table(),
            columns(kind)
        );

        let created = sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(req.name.trim())
            .bind(&req.description)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to create {kind} '{}': {:?}", req.name, e);
                RepositoryError::from(e)
            })?;

        info!("✅ Created {kind} '{}' with ID {}", created.name, created.id);
        Ok(created)
    }

    async fn update(
        &self,
        kind: CatalogKind,
        id: i32,
        req: &CatalogItemRequest,
    ) -> Result<CatalogEntry, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "UPDATE {} SET name = $2, description = $3, updated_at = CURRENT_TIMESTAMP \
             WHERE {} = $1 RETURNING {}",
            kind.table(),
            kind.id_column(),
            columns(kind)
        );

        sqlx::query_as::<_, CatalogEntry>(&sql)
            .bind(id)
            .bind(req.name.trim())
            .bind(&req.description)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update {kind} {id}: {:?}", e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn delete(&self, kind: CatalogKind, id: i32) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("DELETE FROM {} WHERE {} = $1", kind.table(), kind.id_column());

        let result = sqlx::query(&sql)
            .bind(id)
            .execute(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to delete {kind} {id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
