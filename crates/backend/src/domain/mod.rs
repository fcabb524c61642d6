pub mod catalog;
pub mod event;
pub mod requests;
pub mod responses;
pub mod role;
pub mod status;
pub mod stock;

pub use self::catalog::CatalogKind;
pub use self::role::{CurrentUser, Role};
pub use self::status::{OrderStatus, PaymentStatus, QuoteStatus};
pub use self::stock::{StockError, StockKind};
