use crate::model::CustomQuote;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct QuoteResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: Option<String>,
    pub width_cm: i32,
    pub height_cm: i32,
    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,
    pub quantity: i32,
    pub description: Option<String>,
    pub quoted_price: Option<i64>,
    pub status: String,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<CustomQuote> for QuoteResponse {
    fn from(value: CustomQuote) -> Self {
        QuoteResponse {
            id: value.quote_id,
            user_id: value.user_id,
            customer_name: value.customer_name,
            customer_email: value.customer_email,
            customer_phone: value.customer_phone,
            width_cm: value.width_cm,
            height_cm: value.height_cm,
            material_id: value.material_id,
            filling_id: value.filling_id,
            quantity: value.quantity,
            description: value.description,
            quoted_price: value.quoted_price,
            status: value.status,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}
