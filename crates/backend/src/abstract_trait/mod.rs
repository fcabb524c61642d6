mod auth;
mod catalog;
mod dashboard;
mod hashing;
mod jwt;
mod notification;
mod order;
mod product;
mod quote;
mod refresh_token;
mod sale;
mod upload;
mod user;
mod warehouse;

pub use self::auth::{AuthServiceTrait, DynAuthService};
pub use self::catalog::{
    CatalogRepositoryTrait, CatalogServiceTrait, DynCatalogRepository, DynCatalogService,
};
pub use self::dashboard::{
    DashboardRepositoryTrait, DashboardServiceTrait, DynDashboardRepository, DynDashboardService,
};
pub use self::hashing::{DynHashing, HashingTrait};
pub use self::jwt::{DynJwtService, JwtServiceTrait};
pub use self::notification::{
    DynNotificationRepository, DynNotificationService, NotificationRepositoryTrait,
    NotificationServiceTrait,
};
pub use self::order::{DynOrderRepository, DynOrderService, OrderRepositoryTrait, OrderServiceTrait};
pub use self::product::{
    DynProductCache, DynProductCommandRepository, DynProductCommandService,
    DynProductQueryRepository, DynProductQueryService, ProductCacheTrait,
    ProductCommandRepositoryTrait, ProductCommandServiceTrait, ProductQueryRepositoryTrait,
    ProductQueryServiceTrait,
};
pub use self::quote::{DynQuoteRepository, DynQuoteService, QuoteRepositoryTrait, QuoteServiceTrait};
pub use self::refresh_token::{DynRefreshTokenRepository, RefreshTokenRepositoryTrait};
pub use self::sale::{
    DynSaleRepository, DynSaleService, PaymentOutcome, SaleRepositoryTrait, SaleServiceTrait,
};
pub use self::upload::{DynUploadService, UploadServiceTrait};
pub use self::user::{
    DynUserCommandRepository, DynUserCommandService, DynUserQueryRepository, DynUserQueryService,
    NewUser, UserCommandRepositoryTrait, UserCommandServiceTrait, UserQueryRepositoryTrait,
    UserQueryServiceTrait,
};
pub use self::warehouse::{
    DynWarehouseRepository, DynWarehouseService, WarehouseRepositoryTrait, WarehouseServiceTrait,
};
