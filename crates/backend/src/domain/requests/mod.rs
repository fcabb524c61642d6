mod auth;
mod catalog;
mod checkout;
mod order;
mod product;
mod quote;
mod user;
mod warehouse;

pub use self::auth::{LoginRequest, RefreshTokenRequest, RegisterRequest};
pub use self::catalog::{CatalogItemRequest, FindAllCatalog};
pub use self::checkout::{CheckoutItemRequest, CheckoutRequest, FindAllSales, PaymentWebhookRequest};
pub use self::order::{CreateOrderRequest, FindAllOrders, UpdateOrderStatusRequest};
pub use self::product::{CreateProductRequest, FindAllProducts, UpdateFeaturedRequest, UpdateProductRequest};
pub use self::quote::{CreateQuoteRequest, FindAllQuotes, QuoteDecisionRequest, QuotePriceRequest};
pub use self::user::{CreateUserRequest, FindAllUsers, UpdateUserRequest, UpdateUserRoleRequest};
pub use self::warehouse::{AssembleRequest, FindAllPurchases, FindAllWarehouse, PurchaseRequest};

/// Which rows of a soft-deletable table a listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordScope {
    All,
    Active,
    Trashed,
}

impl RecordScope {
    pub fn deleted_at_filter(&self) -> &'static str {
        match self {
            RecordScope::All => "TRUE",
            RecordScope::Active => "deleted_at IS NULL",
            RecordScope::Trashed => "deleted_at IS NOT NULL",
        }
    }
}

pub(crate) fn default_page() -> i32 {
    1
}

pub(crate) fn default_page_size() -> i32 {
    10
}
