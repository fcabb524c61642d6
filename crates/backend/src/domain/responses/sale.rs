use crate::model::{Sale, SaleItem};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SaleResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: String,
    pub total: i64,
    pub payment_status: String,
    pub payment_reference: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Sale> for SaleResponse {
    fn from(value: Sale) -> Self {
        SaleResponse {
            id: value.sale_id,
            user_id: value.user_id,
            customer_name: value.customer_name,
            customer_email: value.customer_email,
            total: value.total,
            payment_status: value.payment_status,
            payment_reference: value.payment_reference,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SaleItemResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub unit_price: i64,
    pub subtotal: i64,
}

impl From<SaleItem> for SaleItemResponse {
    fn from(value: SaleItem) -> Self {
        SaleItemResponse {
            id: value.sale_item_id,
            product_id: value.product_id,
            quantity: value.quantity,
            unit_price: value.unit_price,
            subtotal: value.subtotal,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct SaleWithItemsResponse {
    #[serde(flatten)]
    pub sale: SaleResponse,
    pub items: Vec<SaleItemResponse>,
}

impl From<(Sale, Vec<SaleItem>)> for SaleWithItemsResponse {
    fn from((sale, items): (Sale, Vec<SaleItem>)) -> Self {
        SaleWithItemsResponse {
            sale: sale.into(),
            items: items.into_iter().map(SaleItemResponse::from).collect(),
        }
    }
}
