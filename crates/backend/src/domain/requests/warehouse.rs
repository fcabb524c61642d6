use crate::domain::StockKind;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllWarehouse {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    #[serde(default)]
    pub search: String,

    pub kind: Option<StockKind>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllPurchases {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,
}

/// Turn raw material and filling into finished doors.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssembleRequest {
    #[validate(length(min = 1, message = "Product name is required"))]
    #[schema(example = "Puerta Roble Lisa")]
    pub product_name: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 5)]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PurchaseRequest {
    pub kind: StockKind,

    #[validate(length(min = 1, message = "Item name is required"))]
    #[schema(example = "Roble")]
    pub name: String,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[schema(example = 20)]
    pub quantity: i32,

    #[validate(range(min = 0, message = "Cost cannot be negative"))]
    #[schema(example = 80000)]
    pub cost: i64,

    #[validate(length(max = 150))]
    pub supplier: Option<String>,
}
