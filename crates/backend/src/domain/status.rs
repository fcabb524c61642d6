use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use utoipa::ToSchema;

/// Lifecycle of a factory-to-store dispatch order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pendiente,
    EnProduccion,
    Fabricada,
    Despachada,
    Cancelada,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pendiente,
        OrderStatus::EnProduccion,
        OrderStatus::Fabricada,
        OrderStatus::Despachada,
        OrderStatus::Cancelada,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pendiente => "pendiente",
            OrderStatus::EnProduccion => "en_produccion",
            OrderStatus::Fabricada => "fabricada",
            OrderStatus::Despachada => "despachada",
            OrderStatus::Cancelada => "cancelada",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Despachada | OrderStatus::Cancelada)
    }

    /// Forward-only production flow; cancellation is allowed from any open state.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;

        match (self, next) {
            (Pendiente, EnProduccion) | (EnProduccion, Fabricada) | (Fabricada, Despachada) => {
                true
            }
            (current, Cancelada) => !current.is_terminal(),
            _ => false,
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("unknown order status '{value}'"))
    }
}

/// State of a custom-door quote request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pendiente,
    Cotizado,
    Aceptado,
    Rechazado,
}

impl QuoteStatus {
    pub const ALL: [QuoteStatus; 4] = [
        QuoteStatus::Pendiente,
        QuoteStatus::Cotizado,
        QuoteStatus::Aceptado,
        QuoteStatus::Rechazado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuoteStatus::Pendiente => "pendiente",
            QuoteStatus::Cotizado => "cotizado",
            QuoteStatus::Aceptado => "aceptado",
            QuoteStatus::Rechazado => "rechazado",
        }
    }

    pub fn can_transition_to(&self, next: QuoteStatus) -> bool {
        use QuoteStatus::*;

        matches!(
            (self, next),
            (Pendiente, Cotizado)
                | (Pendiente, Rechazado)
                | (Cotizado, Cotizado)
                | (Cotizado, Aceptado)
                | (Cotizado, Rechazado)
        )
    }
}

impl fmt::Display for QuoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuoteStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        QuoteStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("unknown quote status '{value}'"))
    }
}

/// Payment state of a storefront sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pendiente,
    Aprobado,
    Rechazado,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 3] = [
        PaymentStatus::Pendiente,
        PaymentStatus::Aprobado,
        PaymentStatus::Rechazado,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pendiente => "pendiente",
            PaymentStatus::Aprobado => "aprobado",
            PaymentStatus::Rechazado => "rechazado",
        }
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, PaymentStatus::Pendiente)
    }

    /// Maps a Mercado Pago payment status onto the sale's payment state.
    pub fn from_gateway(status: &str) -> Self {
        match status.to_ascii_lowercase().as_str() {
            "approved" | "authorized" => PaymentStatus::Aprobado,
            "rejected" | "cancelled" | "refunded" | "charged_back" => PaymentStatus::Rechazado,
            _ => PaymentStatus::Pendiente,
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == value)
            .ok_or_else(|| format!("unknown payment status '{value}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn order_status_round_trips_through_storage_text() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>(), Ok(status));
        }
    }

    #[test]
    fn order_status_rejects_values_outside_the_enum() {
        assert!("en producción".parse::<OrderStatus>().is_err());
        assert!("shipped".parse::<OrderStatus>().is_err());
        assert!(serde_json::from_str::<OrderStatus>("\"entregada\"").is_err());
        assert_eq!(
            serde_json::from_str::<OrderStatus>("\"en_produccion\"").unwrap(),
            OrderStatus::EnProduccion
        );
    }

    #[test]
    fn order_follows_production_flow() {
        use OrderStatus::*;

        assert!(Pendiente.can_transition_to(EnProduccion));
        assert!(EnProduccion.can_transition_to(Fabricada));
        assert!(Fabricada.can_transition_to(Despachada));

        assert!(!Pendiente.can_transition_to(Fabricada));
        assert!(!Pendiente.can_transition_to(Despachada));
        assert!(!Despachada.can_transition_to(Pendiente));
        assert!(!Fabricada.can_transition_to(EnProduccion));
        assert!(!Pendiente.can_transition_to(Pendiente));
    }

    #[test]
    fn only_open_orders_can_be_cancelled() {
        use OrderStatus::*;

        assert!(Pendiente.can_transition_to(Cancelada));
        assert!(EnProduccion.can_transition_to(Cancelada));
        assert!(Fabricada.can_transition_to(Cancelada));
        assert!(!Despachada.can_transition_to(Cancelada));
        assert!(!Cancelada.can_transition_to(Cancelada));
        assert!(!Cancelada.can_transition_to(Pendiente));
    }

    #[test]
    fn quote_decisions_require_a_price_first() {
        use QuoteStatus::*;

        assert!(Pendiente.can_transition_to(Cotizado));
        assert!(Pendiente.can_transition_to(Rechazado));
        assert!(!Pendiente.can_transition_to(Aceptado));
        assert!(Cotizado.can_transition_to(Cotizado));
        assert!(Cotizado.can_transition_to(Aceptado));
        assert!(!Aceptado.can_transition_to(Rechazado));
        assert!(!Rechazado.can_transition_to(Cotizado));
    }

    #[test]
    fn gateway_statuses_map_onto_payment_states() {
        assert_eq!(PaymentStatus::from_gateway("approved"), PaymentStatus::Aprobado);
        assert_eq!(PaymentStatus::from_gateway("REJECTED"), PaymentStatus::Rechazado);
        assert_eq!(PaymentStatus::from_gateway("cancelled"), PaymentStatus::Rechazado);
        assert_eq!(PaymentStatus::from_gateway("in_process"), PaymentStatus::Pendiente);
        assert!(!PaymentStatus::Pendiente.is_final());
        assert!(PaymentStatus::Aprobado.is_final());
    }
}
