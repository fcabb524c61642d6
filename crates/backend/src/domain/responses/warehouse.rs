use crate::domain::stock::{AssemblyOutcome, PurchaseOutcome};
use crate::model::{Purchase, WarehouseItem};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct WarehouseItemResponse {
    pub id: i32,
    pub kind: String,
    pub name: String,
    pub product_id: Option<i32>,
    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,
    pub stock: i32,
    pub cost: i64,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<WarehouseItem> for WarehouseItemResponse {
    fn from(value: WarehouseItem) -> Self {
        WarehouseItemResponse {
            id: value.warehouse_item_id,
            kind: value.kind,
            name: value.name,
            product_id: value.product_id,
            material_id: value.material_id,
            filling_id: value.filling_id,
            stock: value.stock,
            cost: value.cost,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PurchaseResponse {
    pub id: i32,
    pub warehouse_item_id: i32,
    pub quantity: i32,
    pub cost: i64,
    pub supplier: Option<String>,
    pub user_id: Option<i32>,
    pub created_at: Option<String>,
}

impl From<Purchase> for PurchaseResponse {
    fn from(value: Purchase) -> Self {
        PurchaseResponse {
            id: value.purchase_id,
            warehouse_item_id: value.warehouse_item_id,
            quantity: value.quantity,
            cost: value.cost,
            supplier: value.supplier,
            user_id: value.user_id,
            created_at: value.created_at.map(|dt| dt.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct AssemblyResponse {
    pub finished: WarehouseItemResponse,
    pub material: WarehouseItemResponse,
    pub filling: WarehouseItemResponse,
    pub finished_created: bool,
}

impl From<AssemblyOutcome> for AssemblyResponse {
    fn from(value: AssemblyOutcome) -> Self {
        AssemblyResponse {
            finished: value.finished.into(),
            material: value.material.into(),
            filling: value.filling.into(),
            finished_created: value.finished_created,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct PurchaseResultResponse {
    pub item: WarehouseItemResponse,
    pub purchase: PurchaseResponse,
    pub created: bool,
}

impl From<PurchaseOutcome> for PurchaseResultResponse {
    fn from(value: PurchaseOutcome) -> Self {
        PurchaseResultResponse {
            item: value.item.into(),
            purchase: value.purchase.into(),
            created: value.created,
        }
    }
}
