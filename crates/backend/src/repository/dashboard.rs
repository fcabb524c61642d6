use crate::{
    abstract_trait::DashboardRepositoryTrait,
    domain::responses::{DashboardResponse, OrderStatusCount},
    errors::RepositoryError,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::error;

#[derive(Clone)]
pub struct DashboardRepository {
    db: ConnectionPool,
}

impl DashboardRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DashboardRepositoryTrait for DashboardRepository {
    async fn summary(
        &self,
        low_stock_threshold: i32,
    ) -> Result<DashboardResponse, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let (total_products, pending_quotes, low_stock_items, approved_sales_total) =
            sqlx::query_as::<_, (i64, i64, i64, i64)>(
                r#"
                SELECT
                    (SELECT COUNT(*) FROM products WHERE deleted_at IS NULL),
                    (SELECT COUNT(*) FROM custom_quotes WHERE status = 'pendiente'),
                    (SELECT COUNT(*) FROM warehouse_items
                        WHERE kind <> 'product' AND stock <= $1),
                    (SELECT COALESCE(SUM(total), 0)::BIGINT FROM sales
                        WHERE payment_status = 'aprobado')
                "#,
            )
            .bind(low_stock_threshold)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to compute dashboard totals: {:?}", e);
                RepositoryError::from(e)
            })?;

        let orders_by_status = sqlx::query_as::<_, (String, i64)>(
            "SELECT status, COUNT(*) FROM orders WHERE deleted_at IS NULL \
             GROUP BY status ORDER BY status",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to count orders by status: {:?}", e);
            RepositoryError::from(e)
        })?
        .into_iter()
        .map(|(status, count)| OrderStatusCount { status, count })
        .collect();

        Ok(DashboardResponse {
            total_products,
            orders_by_status,
            pending_quotes,
            low_stock_items,
            approved_sales_total,
        })
    }
}
