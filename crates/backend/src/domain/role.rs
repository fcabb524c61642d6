use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Account role. Stored as lowercase text in `users.role`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Cliente,
    Fabrica,
    Tienda,
    Administrador,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Cliente,
        Role::Fabrica,
        Role::Tienda,
        Role::Administrador,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Cliente => "cliente",
            Role::Fabrica => "fabrica",
            Role::Tienda => "tienda",
            Role::Administrador => "administrador",
        }
    }

    pub fn is_staff(&self) -> bool {
        !matches!(self, Role::Cliente)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| format!("unknown role '{value}'"))
    }
}

/// Authenticated caller, resolved from the access token by the auth middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub user_id: i32,
    pub role: Role,
}

impl CurrentUser {
    pub fn new(user_id: i32, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn has_any(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}
