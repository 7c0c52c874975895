//! # Order State Machine
//!
//! The lifecycle graph of an order:
//!
//! ```text
//! en_attente     -> confirmee | en_preparation | annulee
//! confirmee      -> en_preparation | annulee
//! en_preparation -> prete | annulee
//! prete          -> en_livraison | livree
//! en_livraison   -> livree
//! ```
//!
//! `livree` and `annulee` are terminal. Staff may cancel anything that has not
//! left the kitchen; a client may only cancel before preparation starts.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::domain::OrderStatus;

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::InPreparation,
        OrderStatus::Ready,
        OrderStatus::InDelivery,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// Wire code used by the storefront API.
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "en_attente",
            OrderStatus::Confirmed => "confirmee",
            OrderStatus::InPreparation => "en_preparation",
            OrderStatus::Ready => "prete",
            OrderStatus::InDelivery => "en_livraison",
            OrderStatus::Delivered => "livree",
            OrderStatus::Cancelled => "annulee",
        }
    }

    /// Human-readable label used in notification messages.
    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Pending => "En attente",
            OrderStatus::Confirmed => "Confirmée",
            OrderStatus::InPreparation => "En préparation",
            OrderStatus::Ready => "Prête",
            OrderStatus::InDelivery => "En livraison",
            OrderStatus::Delivered => "Livrée",
            OrderStatus::Cancelled => "Annulée",
        }
    }

    pub fn allowed_transitions(self) -> &'static [OrderStatus] {
        use OrderStatus::*;
        match self {
            Pending => &[Confirmed, InPreparation, Cancelled],
            Confirmed => &[InPreparation, Cancelled],
            InPreparation => &[Ready, Cancelled],
            Ready => &[InDelivery, Delivered],
            InDelivery => &[Delivered],
            Delivered | Cancelled => &[],
        }
    }

    /// Self-loops are never legal.
    pub fn can_transition_to(self, next: OrderStatus) -> bool {
        self.allowed_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.allowed_transitions().is_empty()
    }

    /// Whether the owning client may still cancel.
    pub fn is_cancellable(self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Confirmed)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for OrderStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}
