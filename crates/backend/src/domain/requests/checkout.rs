use crate::domain::PaymentStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllSales {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    pub payment_status: Option<PaymentStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutItemRequest {
    #[validate(range(min = 1, message = "Product ID is required"))]
    pub product_id: i32,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(length(min = 2, max = 150))]
    pub customer_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,

    #[validate(length(min = 1, message = "At least one item is required"))]
    #[validate(nested)]
    pub items: Vec<CheckoutItemRequest>,
}

/// Payment notification forwarded by Mercado Pago. `external_reference` carries the sale id.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PaymentWebhookRequest {
    #[validate(length(min = 1))]
    pub payment_id: String,

    #[validate(length(min = 1))]
    pub external_reference: String,

    #[validate(length(min = 1))]
    #[schema(example = "approved")]
    pub status: String,
}
