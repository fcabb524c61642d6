mod api;
mod catalog;
mod dashboard;
mod notification;
mod order;
mod pagination;
mod product;
mod quote;
mod sale;
mod token;
mod upload;
mod user;
mod warehouse;

pub use self::api::{ApiResponse, ApiResponsePagination};
pub use self::catalog::CatalogItemResponse;
pub use self::dashboard::{DashboardResponse, OrderStatusCount};
pub use self::notification::NotificationResponse;
pub use self::order::OrderResponse;
pub use self::pagination::{Pagination, page_window};
pub use self::product::{ProductResponse, ProductResponseDeleteAt};
pub use self::quote::QuoteResponse;
pub use self::sale::{SaleItemResponse, SaleResponse, SaleWithItemsResponse};
pub use self::token::TokenResponse;
pub use self::upload::UploadResponse;
pub use self::user::{UserResponse, UserResponseDeleteAt};
pub use self::warehouse::{
    AssemblyResponse, PurchaseResponse, PurchaseResultResponse, WarehouseItemResponse,
};
