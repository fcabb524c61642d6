mod auth;
mod catalog;
mod dashboard;
mod notification;
mod order;
mod product;
mod quote;
mod sale;
mod upload;
mod user;
mod warehouse;

pub use self::auth::{AuthService, AuthServiceDeps};
pub use self::catalog::CatalogService;
pub use self::dashboard::DashboardService;
pub use self::notification::NotificationService;
pub use self::order::OrderService;
pub use self::product::{ProductCache, ProductCommandService, ProductQueryService};
pub use self::quote::QuoteService;
pub use self::sale::SaleService;
pub use self::upload::{UPLOADS_ROUTE, UploadService};
pub use self::user::{UserCommandService, UserCommandServiceDeps, UserQueryService};
pub use self::warehouse::WarehouseService;
