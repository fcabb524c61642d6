use crate::{domain::CurrentUser, model::Notification};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone)]
pub struct NotificationResponse {
    pub id: i32,
    pub user_id: Option<i32>,
    pub target_role: Option<String>,
    pub kind: String,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub created_at: Option<String>,
}

impl From<Notification> for NotificationResponse {
    fn from(value: Notification) -> Self {
        NotificationResponse {
            id: value.notification_id,
            user_id: value.user_id,
            target_role: value.target_role,
            kind: value.kind,
            title: value.title,
            message: value.message,
            is_read: value.is_read,
            created_at: value.created_at.map(|dt| dt.to_string()),
        }
    }
}

impl NotificationResponse {
    /// Direct notifications go to one user, role-targeted ones to everyone holding the role.
    pub fn is_addressed_to(&self, user: &CurrentUser) -> bool {
        match (self.user_id, self.target_role.as_deref()) {
            (Some(id), _) => id == user.user_id,
            (None, Some(role)) => role == user.role.as_str(),
            (None, None) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    fn notification(user_id: Option<i32>, target_role: Option<&str>) -> NotificationResponse {
        NotificationResponse {
            id: 1,
            user_id,
            target_role: target_role.map(str::to_owned),
            kind: "order_created".into(),
            title: "Nuevo pedido".into(),
            message: "Pedido #1".into(),
            is_read: false,
            created_at: None,
        }
    }

    #[test]
    fn routes_by_user_or_role() {
        let store = CurrentUser::new(4, Role::Tienda);

        assert!(notification(Some(4), None).is_addressed_to(&store));
        assert!(!notification(Some(5), None).is_addressed_to(&store));
        assert!(notification(None, Some("tienda")).is_addressed_to(&store));
        assert!(!notification(None, Some("fabrica")).is_addressed_to(&store));
        assert!(!notification(None, None).is_addressed_to(&store));
    }
}
