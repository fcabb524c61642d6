use super::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::ProductQueryRepositoryTrait,
    domain::{
        requests::{FindAllProducts, RecordScope},
        responses::page_window,
    },
    errors::RepositoryError,
    model::Product,
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

#[derive(Clone)]
pub struct ProductQueryRepository {
    db: ConnectionPool,
}

impl ProductQueryRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductQueryRepositoryTrait for ProductQueryRepository {
    async fn find_all(
        &self,
        req: &FindAllProducts,
        scope: RecordScope,
    ) -> Result<(Vec<Product>, i64), RepositoryError> {
        info!("🔍 Fetching products ({scope:?}) with search: {:?}", req.search);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {PRODUCT_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM products
            WHERE {}
              AND ($1 = '' OR name ILIKE '%' || $1 || '%')
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
                error!("❌ Failed to fetch products: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Product>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE product_id = $1");

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch product {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_featured(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE featured AND deleted_at IS NULL ORDER BY updated_at DESC"
        );

        sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch featured products: {:?}", e);
                RepositoryError::from(e)
            })
    }
}
