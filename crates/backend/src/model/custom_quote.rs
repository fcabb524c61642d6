use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomQuote {
    pub quote_id: i32,
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
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}
