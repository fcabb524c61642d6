use crate::model::Order;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct OrderResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub origin: String,
    pub destination: String,
    pub status: String,
    pub notes: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<Order> for OrderResponse {
    fn from(value: Order) -> Self {
        OrderResponse {
            id: value.order_id,
            product_id: value.product_id,
            quantity: value.quantity,
            origin: value.origin,
            destination: value.destination,
            status: value.status,
            notes: value.notes,
            created_by: value.created_by,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}
