use crate::domain::StockKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use utoipa::ToSchema;

/// Raw-material catalogs a door is built from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum CatalogKind {
    Material,
    Filling,
}

impl CatalogKind {
    pub fn table(&self) -> &'static str {
        match self {
            CatalogKind::Material => "materials",
            CatalogKind::Filling => "fillings",
        }
    }

    pub fn id_column(&self) -> &'static str {
        match self {
            CatalogKind::Material => "material_id",
            CatalogKind::Filling => "filling_id",
        }
    }

    pub fn stock_kind(&self) -> StockKind {
        match self {
            CatalogKind::Material => StockKind::Material,
            CatalogKind::Filling => StockKind::Filling,
        }
    }
}

impl fmt::Display for CatalogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stock_kind().as_str())
    }
}
