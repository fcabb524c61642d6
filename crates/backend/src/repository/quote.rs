use crate::{
    abstract_trait::QuoteRepositoryTrait,
    domain::{
        QuoteStatus,
        requests::{CreateQuoteRequest, FindAllQuotes},
        responses::page_window,
    },
    errors::RepositoryError,
    model::CustomQuote,
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

const QUOTE_COLUMNS: &str = "quote_id, user_id, customer_name, customer_email, customer_phone, \
     width_cm, height_cm, material_id, filling_id, quantity, description, quoted_price, status, \
     created_at, updated_at";

#[derive(Clone)]
pub struct QuoteRepository {
    db: ConnectionPool,
}

impl QuoteRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuoteRepositoryTrait for QuoteRepository {
    async fn create(
        &self,
        req: &CreateQuoteRequest,
        user_id: Option<i32>,
    ) -> Result<CustomQuote, RepositoryError> {
        info!(
            "🆕 New quote request from {} ({}x{} cm)",
            req.customer_email, req.width_cm, req.height_cm
        );

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            INSERT INTO custom_quotes
                (user_id, customer_name, customer_email, customer_phone, width_cm, height_cm,
                 material_id, filling_id, quantity, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CustomQuote>(&sql)
            .bind(user_id)
            .bind(req.customer_name.trim())
            .bind(req.customer_email.trim())
            .bind(&req.customer_phone)
            .bind(req.width_cm)
            .bind(req.height_cm)
            .bind(req.material_id)
            .bind(req.filling_id)
            .bind(req.quantity)
            .bind(&req.description)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to create quote: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_all(
        &self,
        req: &FindAllQuotes,
    ) -> Result<(Vec<CustomQuote>, i64), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {QUOTE_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM custom_quotes
            WHERE ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, quote_id DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(req.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch quotes: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<CustomQuote>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {QUOTE_COLUMNS} FROM custom_quotes WHERE quote_id = $1");

        sqlx::query_as::<_, CustomQuote>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch quote {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn update_status(
        &self,
        id: i32,
        from: QuoteStatus,
        to: QuoteStatus,
        quoted_price: Option<i64>,
    ) -> Result<Option<CustomQuote>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE custom_quotes
            SET status = $3,
                quoted_price = COALESCE($4, quoted_price),
                updated_at = CURRENT_TIMESTAMP
            WHERE quote_id = $1 AND status = $2
            RETURNING {QUOTE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, CustomQuote>(&sql)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(quoted_price)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update quote {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }
}
