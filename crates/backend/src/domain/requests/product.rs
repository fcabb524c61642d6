use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllProducts {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    #[serde(default)]
    pub search: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateProductRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    #[schema(example = "Puerta Roble Lisa")]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    #[schema(example = 189900)]
    pub price: i64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    #[serde(default)]
    pub stock: i32,

    #[validate(range(min = 1, message = "Width must be at least 1 cm"))]
    #[schema(example = 90)]
    pub width_cm: i32,

    #[validate(range(min = 1, message = "Height must be at least 1 cm"))]
    #[schema(example = 210)]
    pub height_cm: i32,

    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,

    #[serde(default)]
    pub images: Vec<String>,

    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateProductRequest {
    #[serde(skip)]
    pub id: i32,

    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub price: i64,

    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub stock: i32,

    #[validate(range(min = 1, message = "Width must be at least 1 cm"))]
    pub width_cm: i32,

    #[validate(range(min = 1, message = "Height must be at least 1 cm"))]
    pub height_cm: i32,

    pub material_id: Option<i32>,
    pub filling_id: Option<i32>,

    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateFeaturedRequest {
    pub featured: bool,
}
