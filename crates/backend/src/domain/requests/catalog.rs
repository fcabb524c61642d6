use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{default_page, default_page_size};

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, IntoParams)]
pub struct FindAllCatalog {
    #[serde(default = "default_page")]
    pub page: i32,

    #[serde(default = "default_page_size")]
    pub page_size: i32,

    #[serde(default)]
    pub search: String,
}

/// Body shared by materials and fillings.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CatalogItemRequest {
    #[validate(length(min = 2, max = 150, message = "Name must be between 2 and 150 characters"))]
    #[schema(example = "Roble")]
    pub name: String,

    pub description: Option<String>,
}
