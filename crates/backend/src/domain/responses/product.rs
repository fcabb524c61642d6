use crate::model::Product as ProductModel;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductResponse {
    pub id: i32,
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
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<ProductModel> for ProductResponse {
    fn from(value: ProductModel) -> Self {
        ProductResponse {
            id: value.product_id,
            name: value.name,
            description: value.description,
            price: value.price,
            stock: value.stock,
            width_cm: value.width_cm,
            height_cm: value.height_cm,
            material_id: value.material_id,
            filling_id: value.filling_id,
            images: value.images,
            featured: value.featured,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct ProductResponseDeleteAt {
    pub id: i32,
    pub name: String,
    pub price: i64,
    pub stock: i32,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub deleted_at: Option<String>,
}

impl From<ProductModel> for ProductResponseDeleteAt {
    fn from(value: ProductModel) -> Self {
        ProductResponseDeleteAt {
            id: value.product_id,
            name: value.name,
            price: value.price,
            stock: value.stock,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
            deleted_at: value.deleted_at.map(|dt| dt.to_string()),
        }
    }
}
