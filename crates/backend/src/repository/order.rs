use crate::{
    abstract_trait::OrderRepositoryTrait,
    domain::{
        OrderStatus,
        requests::{CreateOrderRequest, FindAllOrders},
        responses::page_window,
    },
    errors::RepositoryError,
    model::Order,
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

const ORDER_COLUMNS: &str = "order_id, product_id, quantity, origin, destination, status, notes, \
     created_by, created_at, updated_at, deleted_at";

#[derive(Clone)]
pub struct OrderRepository {
    db: ConnectionPool,
}

impl OrderRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    async fn create(
        &self,
        req: &CreateOrderRequest,
        created_by: Option<i32>,
    ) -> Result<Order, RepositoryError> {
        info!(
            "🆕 Creating order: {} x product {} -> {}",
            req.quantity, req.product_id, req.destination
        );

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            INSERT INTO orders (product_id, quantity, origin, destination, status, notes, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {ORDER_COLUMNS}
            "#
        );

        let order = sqlx::query_as::<_, Order>(&sql)
            .bind(req.product_id)
            .bind(req.quantity)
            .bind(req.origin.trim())
            .bind(req.destination.trim())
            .bind(OrderStatus::Pendiente.as_str())
            .bind(&req.notes)
            .bind(created_by)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to create order: {:?}", e);
                RepositoryError::from(e)
            })?;

        info!("✅ Order created with ID: {}", order.order_id);
        Ok(order)
    }

    async fn find_all(&self, req: &FindAllOrders) -> Result<(Vec<Order>, i64), RepositoryError> {
        info!("🔍 Fetching orders with status filter: {:?}", req.status);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {ORDER_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM orders
            WHERE deleted_at IS NULL
              AND ($1::TEXT IS NULL OR status = $1)
            ORDER BY created_at DESC, order_id DESC
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
                error!("❌ Failed to fetch orders: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<Order>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql =
            format!("SELECT {ORDER_COLUMNS} FROM orders WHERE order_id = $1 AND deleted_at IS NULL");

        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch order {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn update_status(
        &self,
        id: i32,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<Option<Order>, RepositoryError> {
        info!("🔄 Order {id}: {from} -> {to}");

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE orders
            SET status = $3, updated_at = CURRENT_TIMESTAMP
            WHERE order_id = $1 AND status = $2 AND deleted_at IS NULL
            RETURNING {ORDER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Order>(&sql)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update status of order {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }
}
