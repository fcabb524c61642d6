use crate::domain::QuoteStatus;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllQuotes {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    pub status: Option<QuoteStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateQuoteRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    pub customer_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub customer_email: String,

    #[validate(length(max = 50))]
    pub customer_phone: Option<String>,

    #[validate(range(min = 1, max = 1000, message = "Width must be between 1 and 1000 cm"))]
    #[schema(example = 90)]
    pub width_cm: i32,

    #[validate(range(min = 1, max = 1000, message = "Height must be between 1 and 1000 cm"))]
    #[schema(example = 210)]
    pub height_cm: i32,

    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,

    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    #[serde(default = "default_quantity")]
    pub quantity: i32,

    pub description: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct QuotePriceRequest {
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 245000)]
    pub quoted_price: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct QuoteDecisionRequest {
    pub status: QuoteStatus,
}
