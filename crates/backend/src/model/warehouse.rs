use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One stock ledger row (bodega): quantity and accumulated cost of a product, material or
/// filling.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WarehouseItem {
    pub warehouse_item_id: i32,
    pub kind: String,
    pub name: String,
    pub product_id: Option<i32>,
    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,
    pub stock: i32,
    pub cost: i64,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
