mod catalog;
mod dashboard;
mod notification;
mod order;
mod product;
mod quote;
mod refresh_token;
mod sale;
mod user;
mod warehouse;

pub use self::catalog::CatalogRepository;
pub use self::dashboard::DashboardRepository;
pub use self::notification::NotificationRepository;
pub use self::order::OrderRepository;
pub use self::product::{ProductCommandRepository, ProductQueryRepository};
pub use self::quote::QuoteRepository;
pub use self::refresh_token::RefreshTokenRepository;
pub use self::sale::SaleRepository;
pub use self::user::{UserCommandRepository, UserQueryRepository};
pub use self::warehouse::WarehouseRepository;

use crate::errors::RepositoryError;
use sqlx::{FromRow, Row, postgres::PgRow};

/// Splits `COUNT(*) OVER() AS total_count` listings into the rows and the total.
pub(crate) fn split_total<T>(rows: Vec<PgRow>) -> Result<(Vec<T>, i64), RepositoryError>
where
    T: for<'r> FromRow<'r, PgRow>,
{
    let total = match rows.first() {
        Some(row) => row.try_get::<i64, _>("total_count")?,
        None => 0,
    };

    let items = rows
        .iter()
        .map(T::from_row)
        .collect::<Result<Vec<_>, _>>()?;

    Ok((items, total))
}

#[cfg(test)]
mod tests {
    const SCHEMA: &str = include_str!("../../migrations/20250101000000_init.sql");

    fn column(table: &str, name: &str) -> String {
        let body = SCHEMA
            .split("CREATE TABLE IF NOT EXISTS ")
            .find(|chunk| chunk.starts_with(&format!("{table} (")))
            .unwrap_or_else(|| panic!("no table {table}"));

        body.lines()
            .map(str::trim)
            .find(|line| line.starts_with(name))
            .unwrap_or_else(|| panic!("no column {table}.{name}"))
            .to_string()
    }

    #[test]
    fn stock_history_survives_catalog_deletes() {
        for (table, name) in [
            ("warehouse_items", "product_id"),
            ("warehouse_items", "material_id"),
            ("warehouse_items", "filling_id"),
            ("purchases", "warehouse_item_id"),
        ] {
            let line = column(table, name);
            assert!(line.contains("ON DELETE RESTRICT"), "{table}.{name}: {line}");
        }
    }
}
