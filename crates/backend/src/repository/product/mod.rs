mod command;
mod query;

pub use self::command::ProductCommandRepository;
pub use self::query::ProductQueryRepository;

pub(crate) const PRODUCT_COLUMNS: &str = "product_id, name, description, price, stock, width_cm, \
     height_cm, material_id, filling_id, images, featured, created_at, updated_at, deleted_at";
