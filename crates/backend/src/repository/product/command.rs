use super::PRODUCT_COLUMNS;
use crate::{
    abstract_trait::ProductCommandRepositoryTrait,
    domain::requests::{CreateProductRequest, UpdateProductRequest},
    errors::RepositoryError,
    model::Product,
};
use async_trait::async_trait;
use shared::config::ConnectionPool;
use tracing::{error, info};

#[derive(Clone)]
pub struct ProductCommandRepository {
    db: ConnectionPool,
}

impl ProductCommandRepository {
    pub fn new(db: ConnectionPool) -> Self {
        Self { db }
    }

    async fn update_returning(&self, sql: &str, id: i32) -> Result<Product, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        sqlx::query_as::<_, Product>(sql)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update product {id}: {:?}", e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }
}

#[async_trait]
impl ProductCommandRepositoryTrait for ProductCommandRepository {
    async fn create(&self, req: &CreateProductRequest) -> Result<Product, RepositoryError> {
        info!("🆕 Creating product: {}", req.name);

        let mut conn = self.db.acquire().await.map_err(|e| {
            error!("❌ Failed to acquire DB connection: {:?}", e);
            RepositoryError::from(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO products
                (name, description, price, stock, width_cm, height_cm,
                 material_id, filling_id, images, featured)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(req.name.trim())
            .bind(&req.description)
            .bind(req.price)
            .bind(req.stock)
            .bind(req.width_cm)
            .bind(req.height_cm)
            .bind(req.material_id)
            .bind(req.filling_id)
            .bind(&req.images)
            .bind(req.featured)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to create product: {:?}", e);
                RepositoryError::from(e)
            })?;

        info!("✅ Product created with ID: {}", product.product_id);
        Ok(product)
    }

    async fn update(&self, req: &UpdateProductRequest) -> Result<Product, RepositoryError> {
        info!("🔄 Updating product ID: {}", req.id);

        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            r#"
            UPDATE products
            SET name = $2,
                description = $3,
                price = $4,
                stock = $5,
                width_cm = $6,
                height_cm = $7,
                material_id = $8,
                filling_id = $9,
                images = $10,
                updated_at = CURRENT_TIMESTAMP
            WHERE product_id = $1 AND deleted_at IS NULL
            RETURNING {PRODUCT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(req.id)
            .bind(req.name.trim())
            .bind(&req.description)
            .bind(req.price)
            .bind(req.stock)
            .bind(req.width_cm)
            .bind(req.height_cm)
            .bind(req.material_id)
            .bind(req.filling_id)
            .bind(&req.images)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to update product {}: {:?}", req.id, e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn set_featured(&self, id: i32, featured: bool) -> Result<Product, RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let sql = format!(
            "UPDATE products SET featured = $2, updated_at = CURRENT_TIMESTAMP \
             WHERE product_id = $1 AND deleted_at IS NULL RETURNING {PRODUCT_COLUMNS}"
        );

        sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .bind(featured)
            .fetch_optional(&mut *conn)
            .await
            .map_err(|e| {
                error!("❌ Failed to set featured flag on product {id}: {:?}", e);
                RepositoryError::from(e)
            })?
            .ok_or(RepositoryError::NotFound)
    }

    async fn trash(&self, id: i32) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET deleted_at = CURRENT_TIMESTAMP, featured = FALSE \
             WHERE product_id = $1 AND deleted_at IS NULL RETURNING {PRODUCT_COLUMNS}"
        );
        self.update_returning(&sql, id).await
    }

    async fn restore(&self, id: i32) -> Result<Product, RepositoryError> {
        let sql = format!(
            "UPDATE products SET deleted_at = NULL \
             WHERE product_id = $1 AND deleted_at IS NOT NULL RETURNING {PRODUCT_COLUMNS}"
        );
        self.update_returning(&sql, id).await
    }

    async fn delete_permanent(&self, id: i32) -> Result<(), RepositoryError> {
        let mut conn = self.db.acquire().await.map_err(RepositoryError::from)?;

        let result =
            sqlx::query("DELETE FROM products WHERE product_id = $1 AND deleted_at IS NOT NULL")
                .bind(id)
                .execute(&mut *conn)
                .await
                .map_err(|e| {
                    error!("❌ Failed to delete product {id}: {:?}", e);
                    RepositoryError::from(e)
                })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        info!("🗑️ Product {id} permanently deleted");
        Ok(())
    }
}
