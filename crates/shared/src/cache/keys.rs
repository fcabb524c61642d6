//! Key layout for cached storefront products.

use chrono::Duration;
use std::collections::BTreeSet;

pub const PRODUCT_FEATURED_KEY: &str = "product:featured";

pub fn product_detail_key(id: i32) -> String {
    format!("product:{id}")
}

pub fn product_ttl() -> Duration {
    Duration::minutes(5)
}

/// Every key that can hold a copy of one of `ids`: their detail entries plus the featured list.
pub fn product_keys<I>(ids: I) -> Vec<String>
where
    I: IntoIterator<Item = i32>,
{
    ids.into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(product_detail_key)
        .chain(std::iter::once(PRODUCT_FEATURED_KEY.to_string()))
        .collect()
}
