use crate::{
    abstract_trait::WarehouseRepositoryTrait,
    domain::{
        StockKind,
        requests::{FindAllPurchases, FindAllWarehouse, PurchaseRequest},
        responses::page_window,
        stock::{
            AssemblyOutcome, PurchaseOutcome, StockError, assembly_parts, check_assembly,
            ensure_positive_quantity,
        },
    },
    errors::RepositoryError,
    model::{ProductComposition, Purchase, WarehouseItem},
    repository::split_total,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use sqlx::{FromRow, PgConnection};
use tracing::{error, info, warn};

const ITEM_COLUMNS: &str = "warehouse_item_id, kind, name, product_id, material_id, filling_id, \
     stock, cost, created_at, updated_at";

const PURCHASE_COLUMNS: &str =
    "purchase_id, warehouse_item_id, quantity, cost, supplier, user_id, created_at";

#[derive(Debug, FromRow)]
struct UpsertedItem {
    #[sqlx(flatten)]
    item: WarehouseItem,
    inserted: bool,
}

#[derive(Clone)]
pub struct WarehouseRepository {
    db: ConnectionPool,
}

impl WarehouseRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }
}

fn reference_ids(kind: StockKind, ref_id: i32) -> (Option<i32>, Option<i32>, Option<i32>) {
    match kind {
        StockKind::Product => (Some(ref_id), None, None),
        StockKind::Material => (None, Some(ref_id), None),
        StockKind::Filling => (None, None, Some(ref_id)),
    }
}

async fn lock_row(
    conn: &mut PgConnection,
    kind: StockKind,
    ref_id: i32,
) -> Result<Option<WarehouseItem>, RepositoryError> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM warehouse_items WHERE kind = $1 AND ref_id = $2 FOR UPDATE"
    );

    sqlx::query_as::<_, WarehouseItem>(&sql)
        .bind(kind.as_str())
        .bind(ref_id)
        .fetch_optional(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to lock {kind} row {ref_id}: {:?}", e);
            RepositoryError::from(e)
        })
}

async fn adjust_stock(
    conn: &mut PgConnection,
    warehouse_item_id: i32,
    delta: i32,
) -> Result<WarehouseItem, RepositoryError> {
    let sql = format!(
        "UPDATE warehouse_items SET stock = stock + $2, updated_at = CURRENT_TIMESTAMP \
         WHERE warehouse_item_id = $1 RETURNING {ITEM_COLUMNS}"
    );

    sqlx::query_as::<_, WarehouseItem>(&sql)
        .bind(warehouse_item_id)
        .bind(delta)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to adjust stock of row {warehouse_item_id}: {:?}", e);
            RepositoryError::from(e)
        })
}

/// Adds `quantity` and `cost` to the (kind, ref) row, inserting it when missing.
async fn upsert_row(
    conn: &mut PgConnection,
    kind: StockKind,
    ref_id: i32,
    name: &str,
    quantity: i32,
    cost: i64,
) -> Result<UpsertedItem, RepositoryError> {
    let (product_id, material_id, filling_id) = reference_ids(kind, ref_id);

    let sql = format!(
        r#"
        INSERT INTO warehouse_items (kind, name, product_id, material_id, filling_id, stock, cost)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT ON CONSTRAINT warehouse_items_kind_ref_key DO UPDATE
        SET stock = warehouse_items.stock + EXCLUDED.stock,
            cost = warehouse_items.cost + EXCLUDED.cost,
            name = EXCLUDED.name,
            updated_at = CURRENT_TIMESTAMP
        RETURNING {ITEM_COLUMNS}, (xmax = 0) AS inserted
        "#
    );

    sqlx::query_as::<_, UpsertedItem>(&sql)
        .bind(kind.as_str())
        .bind(name)
        .bind(product_id)
        .bind(material_id)
        .bind(filling_id)
        .bind(quantity)
        .bind(cost)
        .fetch_one(&mut *conn)
        .await
        .map_err(|e| {
            error!("❌ Failed to upsert {kind} row for '{name}': {:?}", e);
            RepositoryError::from(e)
        })
}

/// Catalog id and stored name of the item a purchase refers to.
async fn resolve_catalog_item(
    conn: &mut PgConnection,
    kind: StockKind,
    name: &str,
) -> Result<Option<(i32, String)>, RepositoryError> {
    let sql = match kind {
        StockKind::Product => {
            "SELECT product_id, name FROM products WHERE name = $1 AND deleted_at IS NULL"
        }
        StockKind::Material => "SELECT material_id, name FROM materials WHERE name = $1",
        StockKind::Filling => "SELECT filling_id, name FROM fillings WHERE name = $1",
    };

    sqlx::query_as::<_, (i32, String)>(sql)
        .bind(name)
        .fetch_optional(&mut *conn)
        .await
        .map_err(RepositoryError::from)
}

#[async_trait]
impl WarehouseRepositoryTrait for WarehouseRepository {
    async fn find_all(
        &self,
        req: &FindAllWarehouse,
    ) -> Result<(Vec<WarehouseItem>, i64), RepositoryError> {
        info!(
            "🔍 Fetching warehouse rows | kind: {:?}, search: {:?}",
            req.kind, req.search
        );

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            r#"
            SELECT {ITEM_COLUMNS}, COUNT(*) OVER() AS total_count
            FROM warehouse_items
            WHERE ($1::TEXT IS NULL OR kind = $1)
              AND ($2 = '' OR name ILIKE '%' || $2 || '%')
            ORDER BY kind, name
            LIMIT $3 OFFSET $4
            "#
        );

        let rows = sqlx::query(&sql)
            .bind(req.kind.map(|k| k.as_str()))
            .bind(req.search.trim())
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch warehouse rows: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<WarehouseItem>, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!("SELECT {ITEM_COLUMNS} FROM warehouse_items WHERE warehouse_item_id = $1");

        sqlx::query_as::<_, WarehouseItem>(&sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch warehouse row {id}: {:?}", e);
                RepositoryError::from(e)
            })
    }

    async fn find_purchases(
        &self,
        req: &FindAllPurchases,
    ) -> Result<(Vec<Purchase>, i64), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let (limit, offset) = page_window(req.page, req.page_size);

        let sql = format!(
            "SELECT {PURCHASE_COLUMNS}, COUNT(*) OVER() AS total_count FROM purchases \
             ORDER BY created_at DESC, purchase_id DESC LIMIT $1 OFFSET $2"
        );

        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to fetch purchases: {:?}", e);
                RepositoryError::from(e)
            })?;

        split_total(rows)
    }

    async fn assemble(
        &self,
        product_name: &str,
        quantity: i32,
    ) -> Result<AssemblyOutcome, RepositoryError> {
        info!("🔨 Assembling {quantity} x '{product_name}'");

        ensure_positive_quantity(quantity)?;

        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin assembly transaction: {:?}", e);
            RepositoryError::from(e)
        })?;

        let composition = sqlx::query_as::<_, ProductComposition>(
            r#"
            SELECT p.product_id, p.name,
                   p.material_id, m.name AS material_name,
                   p.filling_id, f.name AS filling_name
            FROM products p
            LEFT JOIN materials m ON m.material_id = p.material_id
            LEFT JOIN fillings f ON f.filling_id = p.filling_id
            WHERE p.name = $1 AND p.deleted_at IS NULL
            "#,
        )
        .bind(product_name.trim())
        .fetch_optional(&mut *tx)
        .await
        .map_err(RepositoryError::from)?
        .ok_or_else(|| StockError::ProductNotFound(product_name.to_string()))?;

        let parts = assembly_parts(&composition)?;

        // material, filling, finished: every assembly locks in this order
        let material = lock_row(&mut tx, StockKind::Material, parts.material_id).await?;
        let filling = lock_row(&mut tx, StockKind::Filling, parts.filling_id).await?;

        let (material_id, filling_id) =
            match check_assembly(&parts, material.as_ref(), filling.as_ref(), quantity) {
                Ok((material, filling)) => (material.warehouse_item_id, filling.warehouse_item_id),
                Err(rejection) => {
                    warn!("⚠️ Assembly of '{product_name}' rejected: {rejection}");
                    tx.rollback().await.map_err(RepositoryError::from)?;
                    return Err(rejection.into());
                }
            };

        let material = adjust_stock(&mut tx, material_id, -quantity).await?;
        let filling = adjust_stock(&mut tx, filling_id, -quantity).await?;
        let finished = upsert_row(
            &mut tx,
            StockKind::Product,
            composition.product_id,
            &composition.name,
            quantity,
            0,
        )
        .await?;

        tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit assembly: {:?}", e);
            RepositoryError::from(e)
        })?;

        info!(
            "✅ Assembled {quantity} x '{}' | material left: {}, filling left: {}",
            composition.name, material.stock, filling.stock
        );

        Ok(AssemblyOutcome {
            finished: finished.item,
            material,
            filling,
            finished_created: finished.inserted,
        })
    }

    async fn register_purchase(
        &self,
        req: &PurchaseRequest,
        user_id: Option<i32>,
    ) -> Result<PurchaseOutcome, RepositoryError> {
        info!(
            "🧾 Registering purchase of {} x {} '{}'",
            req.quantity, req.kind, req.name
        );

        ensure_positive_quantity(req.quantity)?;

        let mut tx = self.db.begin().await.map_err(|e| {
            error!("❌ Failed to begin purchase transaction: {:?}", e);
            RepositoryError::from(e)
        })?;

        let (ref_id, name) = resolve_catalog_item(&mut tx, req.kind, req.name.trim())
            .await?
            .ok_or_else(|| StockError::ItemNotFound {
                kind: req.kind,
                name: req.name.clone(),
            })?;

        let row = upsert_row(&mut tx, req.kind, ref_id, &name, req.quantity, req.cost).await?;

        let sql = format!(
            "INSERT INTO purchases (warehouse_item_id, quantity, cost, supplier, user_id) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {PURCHASE_COLUMNS}"
        );

        let purchase = sqlx::query_as::<_, Purchase>(&sql)
            .bind(row.item.warehouse_item_id)
            .bind(req.quantity)
            .bind(req.cost)
            .bind(&req.supplier)
            .bind(user_id)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                error!("❌ Failed to insert purchase: {:?}", e);
                RepositoryError::from(e)
            })?;

        tx.commit().await.map_err(|e| {
            error!("❌ Failed to commit purchase: {:?}", e);
            RepositoryError::from(e)
        })?;

        info!(
            "✅ Purchase {} stored on row {} (created: {})",
            purchase.purchase_id, row.item.warehouse_item_id, row.inserted
        );

        Ok(PurchaseOutcome {
            item: row.item,
            purchase,
            created: row.inserted,
        })
    }
}
