mod catalog;
mod custom_quote;
mod notification;
mod order;
mod product;
mod purchase;
mod refresh_token;
mod sale;
mod user;
mod warehouse;

pub use self::catalog::CatalogEntry;
pub use self::custom_quote::CustomQuote;
pub use self::notification::Notification;
pub use self::order::Order;
pub use self::product::{Product, ProductComposition};
pub use self::purchase::Purchase;
pub use self::refresh_token::RefreshToken;
pub use self::sale::{Sale, SaleItem};
pub use self::user::User;
pub use self::warehouse::WarehouseItem;
