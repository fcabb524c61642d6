mod cache;
mod command;
mod query;

pub use self::cache::ProductCache;
pub use self::command::ProductCommandService;
pub use self::query::ProductQueryService;
