use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct OrderStatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq, Eq)]
pub struct DashboardResponse {
    pub total_products: i64,
    pub orders_by_status: Vec<OrderStatusCount>,
    pub pending_quotes: i64,
    pub low_stock_items: i64,
    pub approved_sales_total: i64,
}
