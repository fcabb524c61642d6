use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Product {
    pub product_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub stock: i32,
    pub width_cm: i32,
    pub height_cm: i32,
    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,
    pub images: Vec<String>,
    pub featured: bool,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
    pub deleted_at: Option<NaiveDateTime>,
}

/// A product joined with the names of the material and filling it is built from.
#[derive(Debug, Clone, FromRow)]
pub struct ProductComposition {
    pub product_id: i32,
    pub name: String,
    pub material_id: Option<i32>,
    pub material_name: Option<String>,
    pub filling_id: Option<i32>,
    pub filling_name: Option<String>,
}
