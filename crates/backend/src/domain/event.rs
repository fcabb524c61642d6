use crate::domain::{OrderStatus, PaymentStatus, Role, StockKind};
use serde::{Deserialize, Serialize};

/// Who a stored notification is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Audience {
    User(i32),
    Role(Role),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNotification {
    pub audience: Audience,
    pub kind: &'static str,
    pub title: String,
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum DomainEvent {
    LowStock {
        kind: StockKind,
        name: String,
        stock: i32,
        threshold: i32,
    },
    OrderCreated {
        order_id: i32,
        product_id: i32,
        quantity: i32,
        destination: String,
    },
    OrderStatusChanged {
        order_id: i32,
        from: OrderStatus,
        to: OrderStatus,
    },
    QuoteRequested {
        quote_id: i32,
        customer_name: String,
    },
    QuotePriced {
        quote_id: i32,
        user_id: Option<i32>,
        quoted_price: i64,
    },
    PaymentUpdated {
        sale_id: i32,
        user_id: Option<i32>,
        status: PaymentStatus,
    },
}

impl DomainEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::LowStock { .. } => "low_stock",
            DomainEvent::OrderCreated { .. } => "order_created",
            DomainEvent::OrderStatusChanged { .. } => "order_status",
            DomainEvent::QuoteRequested { .. } => "new_quote",
            DomainEvent::QuotePriced { .. } => "quote_priced",
            DomainEvent::PaymentUpdated { .. } => "payment",
        }
    }

    /// Expands the event into one notification per recipient.
    pub fn notifications(&self) -> Vec<NewNotification> {
        let kind = self.kind();
        let build = |audience: Audience, title: &str, message: String| NewNotification {
            audience,
            kind,
            title: title.to_string(),
            message,
        };

        match self {
            DomainEvent::LowStock {
                kind: stock_kind,
                name,
                stock,
                threshold,
            } => vec![build(
                Audience::Role(Role::Fabrica),
                "Stock bajo",
                format!("{stock_kind} '{name}' has {stock} units left (threshold {threshold})"),
            )],
            DomainEvent::OrderCreated {
                order_id,
                product_id,
                quantity,
                destination,
            } => vec![build(
                Audience::Role(Role::Fabrica),
                "Nueva orden",
                format!(
                    "Order #{order_id}: {quantity} x product #{product_id} for {destination}"
                ),
            )],
            DomainEvent::OrderStatusChanged { order_id, from, to } => {
                let message = format!("Order #{order_id} moved from {from} to {to}");
                vec![
                    build(Audience::Role(Role::Tienda), "Estado de orden", message.clone()),
                    build(Audience::Role(Role::Fabrica), "Estado de orden", message),
                ]
            }
            DomainEvent::QuoteRequested {
                quote_id,
                customer_name,
            } => vec![build(
                Audience::Role(Role::Administrador),
                "Nueva cotización",
                format!("Quote #{quote_id} requested by {customer_name}"),
            )],
            DomainEvent::QuotePriced {
                quote_id,
                user_id,
                quoted_price,
            } => user_id
                .map(|user_id| {
                    vec![build(
                        Audience::User(user_id),
                        "Cotización lista",
                        format!("Quote #{quote_id} was priced at {quoted_price}"),
                    )]
                })
                .unwrap_or_default(),
            DomainEvent::PaymentUpdated {
                sale_id,
                user_id,
                status,
            } => {
                let message = format!("Payment for sale #{sale_id} is {status}");
                let mut out = vec![build(
                    Audience::Role(Role::Administrador),
                    "Pago actualizado",
                    message.clone(),
                )];
                if let Some(user_id) = user_id {
                    out.push(build(Audience::User(*user_id), "Pago actualizado", message));
                }
                out
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_change_reaches_store_and_factory() {
        let event = DomainEvent::OrderStatusChanged {
            order_id: 4,
            from: OrderStatus::Pendiente,
            to: OrderStatus::EnProduccion,
        };

        let notifications = event.notifications();
        let audiences: Vec<_> = notifications.iter().map(|n| n.audience).collect();

        assert_eq!(
            audiences,
            vec![Audience::Role(Role::Tienda), Audience::Role(Role::Fabrica)]
        );
        assert!(notifications.iter().all(|n| n.kind == "order_status"));
        assert!(notifications[0].message.contains("pendiente"));
        assert!(notifications[0].message.contains("en_produccion"));
    }

    #[test]
    fn low_stock_goes_to_factory() {
        let event = DomainEvent::LowStock {
            kind: StockKind::Material,
            name: "Roble".into(),
            stock: 2,
            threshold: 5,
        };

        let notifications = event.notifications();
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].audience, Audience::Role(Role::Fabrica));
        assert_eq!(notifications[0].kind, "low_stock");
    }

    #[test]
    fn anonymous_quote_pricing_notifies_nobody() {
        let event = DomainEvent::QuotePriced {
            quote_id: 1,
            user_id: None,
            quoted_price: 10,
        };
        assert!(event.notifications().is_empty());
    }

    #[test]
    fn payment_update_notifies_buyer_when_known() {
        let event = DomainEvent::PaymentUpdated {
            sale_id: 9,
            user_id: Some(3),
            status: PaymentStatus::Aprobado,
        };

        let audiences: Vec<_> = event.notifications().iter().map(|n| n.audience).collect();
        assert_eq!(
            audiences,
            vec![Audience::Role(Role::Administrador), Audience::User(3)]
        );
    }
}
