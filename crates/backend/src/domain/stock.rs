//! Stock ledger rules shared by the Postgres repositories and the in-memory fakes.
//!
//! Every function here is a pure check: callers hold the relevant rows locked while
//! they evaluate it and only write when it returns `Ok`.

use crate::model::{ProductComposition, Purchase, WarehouseItem};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt, str::FromStr};
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StockKind {
    Product,
    Material,
    Filling,
}

impl StockKind {
    pub const ALL: [StockKind; 3] = [StockKind::Product, StockKind::Material, StockKind::Filling];

    pub fn as_str(&self) -> &'static str {
        match self {
            StockKind::Product => "product",
            StockKind::Material => "material",
            StockKind::Filling => "filling",
        }
    }
}

impl fmt::Display for StockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StockKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        StockKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or_else(|| format!("unknown stock kind '{value}'"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Quantity must be greater than zero, got {0}")]
    InvalidQuantity(i32),

    #[error("Product '{0}' not found")]
    ProductNotFound(String),

    #[error("{kind} '{name}' not found")]
    ItemNotFound { kind: StockKind, name: String },

    #[error("Product '{0}' has no material or filling assigned")]
    IncompleteComposition(String),

    #[error("Insufficient {kind} stock for '{name}': available {available}, requested {requested}")]
    Insufficient {
        kind: StockKind,
        name: String,
        available: i32,
        requested: i32,
    },

    #[error("Amount overflow while computing {0}")]
    Overflow(&'static str),
}

impl StockError {
    /// Not-found failures map to 404, everything else is a client error.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StockError::ProductNotFound(_) | StockError::ItemNotFound { .. }
        )
    }
}

pub fn ensure_positive_quantity(quantity: i32) -> Result<(), StockError> {
    if quantity <= 0 {
        return Err(StockError::InvalidQuantity(quantity));
    }
    Ok(())
}

/// Material and filling a product is assembled from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssemblyParts {
    pub material_id: i32,
    pub material_name: String,
    pub filling_id: i32,
    pub filling_name: String,
}

pub fn assembly_parts(product: &ProductComposition) -> Result<AssemblyParts, StockError> {
    match (
        product.material_id,
        product.material_name.as_ref(),
        product.filling_id,
        product.filling_name.as_ref(),
    ) {
        (Some(material_id), Some(material_name), Some(filling_id), Some(filling_name)) => {
            Ok(AssemblyParts {
                material_id,
                material_name: material_name.clone(),
                filling_id,
                filling_name: filling_name.clone(),
            })
        }
        _ => Err(StockError::IncompleteComposition(product.name.clone())),
    }
}

/// A missing ledger row counts as zero available units.
pub fn ensure_available(
    kind: StockKind,
    name: &str,
    row: Option<&WarehouseItem>,
    requested: i32,
) -> Result<(), StockError> {
    ensure_units(kind, name, row.map(|r| r.stock).unwrap_or(0), requested)
}

pub fn ensure_units(
    kind: StockKind,
    name: &str,
    available: i32,
    requested: i32,
) -> Result<(), StockError> {
    if available < requested {
        return Err(StockError::Insufficient {
            kind,
            name: name.to_string(),
            available,
            requested,
        });
    }

    Ok(())
}

/// Checks that both raw-material rows can cover `quantity` units, material first.
pub fn check_assembly<'a>(
    parts: &AssemblyParts,
    material: Option<&'a WarehouseItem>,
    filling: Option<&'a WarehouseItem>,
    quantity: i32,
) -> Result<(&'a WarehouseItem, &'a WarehouseItem), StockError> {
    ensure_positive_quantity(quantity)?;
    ensure_available(StockKind::Material, &parts.material_name, material, quantity)?;
    ensure_available(StockKind::Filling, &parts.filling_name, filling, quantity)?;

    match (material, filling) {
        (Some(material), Some(filling)) => Ok((material, filling)),
        // unreachable for quantity > 0, kept total for the type checker
        _ => Err(StockError::Insufficient {
            kind: StockKind::Material,
            name: parts.material_name.clone(),
            available: 0,
            requested: quantity,
        }),
    }
}

/// Result of assembling finished doors out of raw stock.
#[derive(Debug, Clone)]
pub struct AssemblyOutcome {
    pub finished: WarehouseItem,
    pub material: WarehouseItem,
    pub filling: WarehouseItem,
    pub finished_created: bool,
}

/// Result of registering a purchase against the ledger.
#[derive(Debug, Clone)]
pub struct PurchaseOutcome {
    pub item: WarehouseItem,
    pub purchase: Purchase,
    pub created: bool,
}

/// New `(stock, cost)` of a ledger row after a purchase lands on it.
pub fn apply_purchase(
    existing: Option<&WarehouseItem>,
    quantity: i32,
    cost: i64,
) -> Result<(i32, i64), StockError> {
    ensure_positive_quantity(quantity)?;

    let (stock, total_cost) = existing.map(|row| (row.stock, row.cost)).unwrap_or((0, 0));

    let stock = stock
        .checked_add(quantity)
        .ok_or(StockError::Overflow("stock"))?;
    let total_cost = total_cost
        .checked_add(cost)
        .ok_or(StockError::Overflow("cost"))?;

    Ok((stock, total_cost))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleLine {
    pub product_id: i32,
    pub quantity: i32,
}

/// Sums repeated products and orders lines by product id, the order rows get locked in.
pub fn merge_sale_lines(lines: &[SaleLine]) -> Result<Vec<SaleLine>, StockError> {
    let mut merged: BTreeMap<i32, i32> = BTreeMap::new();

    for line in lines {
        ensure_positive_quantity(line.quantity)?;
        let entry = merged.entry(line.product_id).or_insert(0);
        *entry = entry
            .checked_add(line.quantity)
            .ok_or(StockError::Overflow("quantity"))?;
    }

    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| SaleLine {
            product_id,
            quantity,
        })
        .collect())
}

pub fn line_subtotal(unit_price: i64, quantity: i32) -> Result<i64, StockError> {
    unit_price
        .checked_mul(i64::from(quantity))
        .ok_or(StockError::Overflow("subtotal"))
}
