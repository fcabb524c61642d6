use crate::model::CatalogEntry;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct CatalogItemResponse {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<CatalogEntry> for CatalogItemResponse {
    fn from(value: CatalogEntry) -> Self {
        CatalogItemResponse {
            id: value.id,
            name: value.name,
            description: value.description,
            created_at: value.created_at.map(|dt| dt.to_string()),
            updated_at: value.updated_at.map(|dt| dt.to_string()),
        }
    }
}
