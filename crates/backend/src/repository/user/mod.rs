mod command;
mod query;

pub use self::command::UserCommandRepository;
pub use self::query::UserQueryRepository;

pub(crate) const USER_COLUMNS: &str = "user_id, firstname, lastname, email, password, role, \
     store_name, created_at, updated_at, deleted_at";
