use crate::{
    abstract_trait::{PaymentOutcome, SaleRepositoryTrait},
    domain::{
        PaymentStatus, StockKind,
        requests::FindAllSales,
        responses::page_window,
        stock::{SaleLine, StockError, ensure_units, line_subtotal, merge_sale_lines},
    },
    errors::RepositoryError,
    model::{Sale, SaleItem},
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use sqlx::PgConnection;
use tracing::{error, info, warn};

const SALE_COLUMNS: &str = "sale_id, user_id, customer_name, customer_email, total, \
     payment_status, payment_reference, created_at, updated_at";

const ITEM_COLUMNS: &str = "sale_item_id, sale_id, product_id, quantity, unit_price, subtotal";

#[derive(Clone)]
pub struct SaleRepository {
    db: ConnectionPool,
}

impl SaleRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

async fn find_items(conn: &mut PgConnection, sale_id: i32) -> Result<Vec<SaleItem>, RepositoryError> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM sale_items WHERE sale_id = $1 ORDER BY sale_item_id");

    sqlx::query_as::<_, SaleItem>(&sql)
        .bind(sale_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to fetch items of sale {sale_id}: {:?}", e);
            RepositoryError::from(e)
        })
}

#[async_trait]
impl SaleRepositoryTrait for SaleRepository {
    async fn checkout(
        &self,
        user_id: Option<i32>,
        customer_name: &str,
        customer_email: &str,
        lines: &[SaleLine],
    ) -> Result<(Sale, Vec<SaleItem>), RepositoryError> {
        let lines = merge_sale_lines(lines)?;
        if lines.is_empty() {
            return Err(StockError::InvalidQuantity(0).into());
        }

        info!("🛒 Checkout of {} product lines for {customer_email}", lines.len());

        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin checkout transaction: {:?}", e);
            RepositoryError::from(e)
        })?;

        // lines are sorted by product id, so concurrent checkouts lock in the same order
        let mut priced = Vec::with_capacity(lines.len());
        let mut total: i64 = 0;

        for line in &lines {
            let product = sqlx::query_as::<_, (String, i64, i32)>(
                "SELECT name, price, stock FROM products \
                 WHERE product_id = $1 AND deleted_at IS NULL FOR UPDATE",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::from)?;

            let Some((name, price, stock)) = product else {
                tx.rollback().await.map_err(RepositoryError::from)?;
                return Err(StockError::ProductNotFound(format!("#{}", line.product_id)).into());
            };

            if let Err(rejection) = ensure_units(StockKind::Product, &name, stock, line.quantity) {
                warn!("⚠️ Checkout rejected: {rejection}");
                tx.rollback().await.map_err(RepositoryError::from)?;
                return Err(rejection.into());
            }

            let subtotal = line_subtotal(price, line.quantity)?;
            total = total
                .checked_add(subtotal)
                .ok_or(StockError::Overflow("total"))?;
            priced.push((*line, price, subtotal));
        }

        for (line, _, _) in &priced {
            sqlx::query(
                "UPDATE products SET stock = stock - $2, updated_at = CURRENT_TIMESTAMP \
                 WHERE product_id = $1",
            )
            .bind(line.product_id)
            .bind(line.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to decrement stock of product {}: {:?}", line.product_id, e);
                RepositoryError::from(e)
            })?;
        }

        let sql = format!(
            "INSERT INTO sales (user_id, customer_name, customer_email, total, payment_status) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {SALE_COLUMNS}"
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(user_id)
            .bind(customer_name.trim())
            .bind(customer_email.trim())
            .bind(total)
            .bind(PaymentStatus::Pendiente.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert sale: {:?}", e);
                RepositoryError::from(e)
            })?;

        let item_sql = format!(
            "INSERT INTO sale_items (sale_id, product_id, quantity, unit_price, subtotal) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {ITEM_COLUMNS}"
        );

        let mut items = Vec::with_capacity(priced.len());
        for (line, price, subtotal) in priced {
            let item = sqlx::query_as::<_, SaleItem>(&item_sql)
                .bind(sale.sale_id)
                .bind(line.product_id)
                .bind(line.quantity)
                .bind(price)
                .bind(subtotal)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| {
                    error!("❌ Failed to insert sale item: {:?}", e);
                    RepositoryError::from(e)
                })?;
            items.push(item);
        }

        tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit checkout: {:?}", e);
            RepositoryError::from(e)
        })?;

        info!("✅ Sale {} created, total {}", sale.sale_id, sale.total);
        Ok((sale, items))
    }

    async fn find_all(&self, req: &FindAllSales) -> Result<(Vec<Sale>, i64), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {SALE_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM sales
            WHERE ($1::TEXT IS NULL OR payment_status = $1)
            ORDER BY created_at DESC, sale_id DESC
            LIMIT $2 OFFSET $3
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(req.payment_status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch sales: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(
        &self,
        id: i32,
    ) -> Result<Option<(Sale, Vec<SaleItem>)>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = $1");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch sale {id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        match sale {
            Some(sale) => {
                let items = find_items(&mut conn, id).await?;
                Ok(Some((sale, items)))
            }
            None => Ok(None),
        }
    }

    async fn apply_payment(
        &self,
        sale_id: i32,
        status: PaymentStatus,
        payment_reference: &str,
    ) -> Result<PaymentOutcome, RepositoryError> {
        info!("💳 Payment update for sale {sale_id}: {status}");

        let mut tx = self.db.begin().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE sale_id = $1 FOR UPDATE");

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(RepositoryError::from)?
            .ok_or(RepositoryError::NotFound)?;

        let current = sale
            .payment_status
            .parse::<PaymentStatus>()
            .map_err(RepositoryError::Custom)?;

        if current.is_final() || !status.is_final() {
            info!("ℹ️ Sale {sale_id} stays {current}, notification ignored");
            tx.rollback().await.map_err(RepositoryError::from)?;
            return Ok(PaymentOutcome {
                sale,
                changed: false,
                restocked: Vec::new(),
            });
        }

        let sql = format!(
            "UPDATE sales SET payment_status = $2, payment_reference = $3, \
             updated_at = CURRENT_TIMESTAMP WHERE sale_id = $1 RETURNING {SALE_COLUMNS}"
        );

        let sale = sqlx::query_as::<_, Sale>(&sql)
            .bind(sale_id)
            .bind(status.as_str())
            .bind(payment_reference)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to update payment of sale {sale_id}: {:?}", e);
                RepositoryError::from(e)
            })?;

        let mut restocked = Vec::new();
        if status == PaymentStatus::Rechazado {
            restocked = sqlx::query_scalar::<_, i32>(
                r#"
                UPDATE products p
                SET stock = p.stock + si.quantity, updated_at = CURRENT_TIMESTAMP
                FROM sale_items si
                WHERE si.sale_id = $1 AND p.product_id = si.product_id
                RETURNING p.product_id
                "#,
            )
            .bind(sale_id)
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to restock products of sale {sale_id}: {:?}", e);
                RepositoryError::from(e)
            })?;

            info!(
                "↩️ Restocked {} products from rejected sale {sale_id}",
                restocked.len()
            );
        }

        tx.commit().await.map_err(RepositoryError::from)?;

        Ok(PaymentOutcome {
            sale,
            changed: true,
            restocked,
        })
    }
}
