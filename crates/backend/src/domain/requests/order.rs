use crate::domain::OrderStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllOrders {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    pub status: Option<OrderStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateOrderRequest {
    #[validate(range(min = 1, message = "Product ID is required"))]
    #[schema(example = 1)]
    pub product_id: i32,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 3)]
    pub quantity: i32,

    #[validate(length(min = 1, max = 150, message = "Origin is required"))]
    #[schema(example = "Fábrica Terplac")]
    pub origin: String,

    #[validate(length(min = 1, max = 150, message = "Destination is required"))]
    #[schema(example = "Tienda Centro")]
    pub destination: String,

    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateOrderStatusRequest {
    pub status: OrderStatus,
}
