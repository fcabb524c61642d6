use crate::{
    domain::{CurrentUser, Role},
    errors::HttpError,
};

/// Answers 403 unless the caller holds one of `allowed`.
pub fn ensure_role(user: &CurrentUser, allowed: &[Role]) -> Result<(), HttpError> {
    if user.has_any(allowed) {
        return Ok(());
    }

    let required = allowed
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(" or ");

    Err(HttpError::Forbidden(format!(
        "Access denied. Required role: {required}"
    )))
}

pub const ADMIN: &[Role] = &[Role::Administrador];
pub const FACTORY: &[Role] = &[Role::Fabrica, Role::Administrador];
pub const STORE: &[Role] = &[Role::Tienda, Role::Administrador];
pub const STAFF: &[Role] = &[Role::Fabrica, Role::Tienda, Role::Administrador];
