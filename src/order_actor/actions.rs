use chrono::{DateTime, Utc};

use crate::domain::{Order, OrderStatus, UserId};

/// State machine operations applied to one order inside a single actor message.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Staff-driven move along the transition table.
    Transition {
        to: OrderStatus,
        /// Status the caller last observed; checked against the stored one.
        expected: Option<OrderStatus>,
        actor: UserId,
        comment: Option<String>,
        at: DateTime<Utc>,
    },
    /// Client cancellation of an order that has not entered preparation.
    Cancel { client: UserId, at: DateTime<Utc> },
    /// Sets or clears the assigned employee.
    Assign { employee: Option<UserId> },
}

/// Results from OrderActions
#[derive(Debug, Clone)]
pub enum OrderActionResult {
    Transitioned {
        order: Order,
        from: OrderStatus,
        to: OrderStatus,
    },
    Assigned(Order),
}
