use chrono::{DateTime, Utc};

use super::actions::{OrderAction, OrderActionResult};
use super::error::OrderError;
use crate::access::{AccessError, DenyReason};
use crate::actor_framework::Entity;
use crate::domain::{reserved_total, HistoryEntry, Order, OrderCreate, OrderId, OrderLine, OrderStatus, UserId};

impl Order {
    /// Moves the order to `to` and appends the matching history entry.
    fn record_transition(&mut self, to: OrderStatus, actor: UserId, comment: Option<String>, at: DateTime<Utc>) -> OrderStatus {
        let from = self.status;
        self.status = to;
        self.updated_at = at;
        self.history.push(HistoryEntry {
            order_id: self.id,
            previous_status: from,
            new_status: to,
            actor_id: actor,
            comment,
            at,
        });
        from
    }
}

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type UpdateParams = ();
    type Action = OrderAction;
    type ActionResult = OrderActionResult;
    type Error = OrderError;

    const KIND: &'static str = "order";

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Creates a new Order from the reserved items.
    ///
    /// Lines are numbered from 1 in cart order. The order starts `en_attente`.
    ///
    /// # Errors
    /// Fails with `Validation` when there are no items, when a line is
    /// inconsistent, or when the declared total differs from the sum of lines.
    fn from_create_params(id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        if params.number.trim().is_empty() {
            return Err(OrderError::Validation("order number is required".into()));
        }
        if params.items.is_empty() {
            return Err(OrderError::Validation("an order needs at least one line".into()));
        }

        let lines: Vec<OrderLine> = params
            .items
            .iter()
            .enumerate()
            .map(|(idx, item)| OrderLine::new(idx as u32 + 1, id, item))
            .collect::<Option<_>>()
            .ok_or_else(|| OrderError::Validation("line total exceeds the supported amount".into()))?;
        if let Some(bad) = lines.iter().find(|line| !line.is_consistent()) {
            return Err(OrderError::Validation(format!(
                "inconsistent line for product {}",
                bad.product_id
            )));
        }

        let sum = reserved_total(&params.items)
            .ok_or_else(|| OrderError::Validation("order total exceeds the supported amount".into()))?;
        if sum != params.total {
            return Err(OrderError::Validation(format!(
                "order total {} does not match line total {}",
                params.total, sum
            )));
        }

        let now = Utc::now();
        Ok(Self {
            id,
            number: params.number,
            client_id: params.client_id,
            status: OrderStatus::Pending,
            total: params.total,
            payment_mode: params.payment_mode,
            delivery_address: params.delivery_address,
            delivery_phone: params.delivery_phone,
            notes: params.notes,
            staff_comment: None,
            employee_id: None,
            lines,
            history: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.number.clone())
    }

    /// Orders only change through [`OrderAction`]s.
    fn on_update(&mut self, _params: ()) -> Result<(), OrderError> {
        Err(OrderError::Validation("orders cannot be edited directly".into()))
    }

    /// Orders are never deleted.
    fn on_delete(&self) -> Result<(), OrderError> {
        Err(OrderError::Validation("orders cannot be deleted".into()))
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, OrderError> {
        match action {
            OrderAction::Transition { to, expected, actor, comment, at } => {
                let stale = expected.is_some_and(|seen| seen != self.status);
                if stale || !self.status.can_transition_to(to) {
                    return Err(OrderError::InvalidTransition { from: self.status, to });
                }
                self.staff_comment = comment.clone();
                self.employee_id = Some(actor);
                let from = self.record_transition(to, actor, comment, at);
                Ok(OrderActionResult::Transitioned { order: self.clone(), from, to })
            }
            OrderAction::Cancel { client, at } => {
                if client != self.client_id {
                    return Err(AccessError::Forbidden { reason: DenyReason::NotOwner }.into());
                }
                if !self.status.is_cancellable() {
                    return Err(OrderError::NotCancellable(self.status));
                }
                let from = self.record_transition(OrderStatus::Cancelled, client, None, at);
                Ok(OrderActionResult::Transitioned {
                    order: self.clone(),
                    from,
                    to: OrderStatus::Cancelled,
                })
            }
            OrderAction::Assign { employee } => {
                self.employee_id = employee;
                self.updated_at = Utc::now();
                Ok(OrderActionResult::Assigned(self.clone()))
            }
        }
    }
}
