use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, instrument, warn};
use validator::Validate;

use super::dispatcher::NotificationDispatcher;
use super::product_client::ProductClient;
use super::user_client::UserClient;
use crate::access::{authorize, authorize_caller, authorize_identity, Action, Caller, Resource};
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::domain::{
    reserved_total, HistoryEntry, Order, OrderCreate, OrderFilter, OrderId, OrderStatus, OrderView, PlaceOrderRequest, ReservedItem,
    StatusUpdateRequest, TransitionOutcome, User, UserId, UserSummary,
};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError, OrderNumberGenerator};

/// Staff listing: filtered orders plus per-status counts over every order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderListing {
    #[serde(rename = "data")]
    pub orders: Vec<OrderView>,
    #[serde(rename = "statistiques")]
    pub counts: BTreeMap<OrderStatus, usize>,
    pub total: usize,
}

/// Client for interacting with the Order actor.
///
/// Owns the order workflows that span several actors: placing an order against
/// the inventory ledger, cancelling it, and moving it through the state machine.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    users: UserClient,
    products: ProductClient,
    dispatcher: NotificationDispatcher,
    numbers: OrderNumberGenerator,
    number_attempts: u32,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

fn transitioned(result: OrderActionResult) -> Result<(Order, OrderStatus, OrderStatus), OrderError> {
    match result {
        OrderActionResult::Transitioned { order, from, to } => Ok((order, from, to)),
        other => Err(OrderError::Failure(format!("unexpected action result: {other:?}"))),
    }
}

fn newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
}

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        users: UserClient,
        products: ProductClient,
        dispatcher: NotificationDispatcher,
        numbers: OrderNumberGenerator,
        number_attempts: u32,
    ) -> Self {
        Self {
            inner,
            users,
            products,
            dispatcher,
            numbers,
            number_attempts: number_attempts.max(1),
        }
    }

    // --- Order builder ---

    /// Validates the cart, reserves every line and persists the order.
    ///
    /// Reservation is all-or-nothing: the first failing line releases every
    /// reservation already made in this call.
    #[instrument(skip(self, request), fields(lines = request.articles.len()))]
    pub async fn place_order(&self, caller: Option<&Caller>, request: PlaceOrderRequest) -> Result<Order, OrderError> {
        let caller = authorize_caller(caller, Action::PlaceOrder, Resource::Any)?;
        request.check().map_err(OrderError::Validation)?;
        for line in &request.articles {
            if self.products.get_product(line.product_id).await?.is_none() {
                return Err(OrderError::Validation(format!("product {} does not exist", line.product_id)));
            }
        }

        let mut reserved: Vec<ReservedItem> = Vec::with_capacity(request.articles.len());
        for line in &request.articles {
            match self.products.check_and_reserve(line.product_id, line.quantite).await {
                Ok(item) => reserved.push(item),
                Err(e) => {
                    warn!(product_id = line.product_id, error = %e, "Reservation failed, rolling back");
                    self.release_all(&reserved).await;
                    return Err(e.into());
                }
            }
        }
        let Some(total) = reserved_total(&reserved) else {
            warn!("Order total overflows, rolling back");
            self.release_all(&reserved).await;
            return Err(OrderError::Validation("order total exceeds the supported amount".into()));
        };

        let today = Utc::now().date_naive();
        let mut attempt = 0;
        let order = loop {
            attempt += 1;
            let params = OrderCreate {
                number: self.numbers.next(today),
                client_id: caller.user_id,
                payment_mode: request.mode_paiement,
                delivery_address: request.adresse_livraison.clone(),
                delivery_phone: request.telephone_livraison.clone(),
                notes: request.notes.clone(),
                items: reserved.clone(),
                total,
            };
            match self.inner.create(params).await {
                Ok(order) => break order,
                Err(FrameworkError::Conflict { key, .. }) if attempt < self.number_attempts => {
                    debug!(number = %key, attempt, "Order number taken, retrying");
                }
                Err(e) => {
                    error!(error = %e, attempt, "Order persistence failed, releasing stock");
                    self.release_all(&reserved).await;
                    return Err(OrderError::Failure(e.to_string()));
                }
            }
        };

        info!(order_id = order.id, number = %order.number, total = %order.total, "Order placed");
        self.dispatcher.order_created(&order).await;
        Ok(order)
    }

    async fn release_all(&self, items: &[ReservedItem]) {
        for item in items {
            if let Err(e) = self.products.release(item.product_id, item.quantity).await {
                error!(product_id = item.product_id, quantity = item.quantity, error = %e, "Stock release failed");
            }
        }
    }

    async fn release_lines(&self, order: &Order) {
        for line in &order.lines {
            if let Err(e) = self.products.release(line.product_id, line.quantity).await {
                error!(product_id = line.product_id, quantity = line.quantity, error = %e, "Stock release failed");
            }
        }
    }

    // --- State machine ---

    /// Client cancellation. The status change is applied first so that only
    /// one of several racing cancellations gets to release the stock.
    #[instrument(skip(self))]
    pub async fn cancel_order(&self, caller: Option<&Caller>, order_id: OrderId) -> Result<Order, OrderError> {
        let caller = authorize_identity(caller, Action::CancelOrder)?;
        let order = self.require_order(order_id).await?;
        authorize(Some(caller), Action::CancelOrder, Resource::OwnedBy(order.client_id))?;
        if !order.status.is_cancellable() {
            return Err(OrderError::NotCancellable(order.status));
        }

        let result = self
            .inner
            .perform_action(order_id, OrderAction::Cancel { client: caller.user_id, at: Utc::now() })
            .await?;
        let (order, from, to) = transitioned(result)?;
        self.release_lines(&order).await;
        info!(number = %order.number, "Order cancelled by client");

        self.dispatcher.notify(&order, from, to).await;
        Ok(order)
    }

    /// Staff status change. Moving an order to `annulee` puts its stock back.
    #[instrument(skip(self, request), fields(to = %request.nouveau_statut))]
    pub async fn update_status(
        &self,
        caller: Option<&Caller>,
        order_id: OrderId,
        request: StatusUpdateRequest,
    ) -> Result<TransitionOutcome, OrderError> {
        let caller = authorize_caller(caller, Action::UpdateOrderStatus, Resource::Any)?;
        request.validate().map_err(|e| OrderError::Validation(e.to_string()))?;

        let action = OrderAction::Transition {
            to: request.nouveau_statut,
            expected: request.statut_attendu,
            actor: caller.user_id,
            comment: request.commentaire_employe,
            at: Utc::now(),
        };
        let (order, from, to) = transitioned(self.inner.perform_action(order_id, action).await?)?;
        info!(number = %order.number, %from, %to, "Order status changed");

        if to == OrderStatus::Cancelled {
            self.release_lines(&order).await;
        }
        let notification_sent = self.dispatcher.notify(&order, from, to).await;
        Ok(TransitionOutcome {
            order,
            old_status: from,
            new_status: to,
            notification_sent,
        })
    }

    /// Sets the assigned employee, or clears it with `None`.
    #[instrument(skip(self))]
    pub async fn assign_order(
        &self,
        caller: Option<&Caller>,
        order_id: OrderId,
        employee_id: Option<UserId>,
    ) -> Result<Order, OrderError> {
        authorize_caller(caller, Action::AssignOrder, Resource::Any)?;
        if let Some(id) = employee_id {
            let employee = self.users.require_user(id).await?;
            if !employee.role.is_staff() {
                return Err(OrderError::Validation(format!("user {id} is not an employee")));
            }
        }
        match self.inner.perform_action(order_id, OrderAction::Assign { employee: employee_id }).await? {
            OrderActionResult::Assigned(order) => Ok(order),
            other => Err(OrderError::Failure(format!("unexpected action result: {other:?}"))),
        }
    }

    // --- Client reads ---

    #[instrument(skip(self))]
    pub async fn my_orders(&self, caller: Option<&Caller>) -> Result<Vec<Order>, OrderError> {
        let caller = authorize_caller(caller, Action::ListOwnOrders, Resource::Any)?;
        let mut orders: Vec<Order> = self
            .inner
            .list()
            .await?
            .into_iter()
            .filter(|o| o.client_id == caller.user_id)
            .collect();
        newest_first(&mut orders);
        Ok(orders)
    }

    #[instrument(skip(self))]
    pub async fn my_order(&self, caller: Option<&Caller>, order_id: OrderId) -> Result<Order, OrderError> {
        let caller = authorize_identity(caller, Action::ViewOwnOrder)?;
        let order = self.require_order(order_id).await?;
        authorize(Some(caller), Action::ViewOwnOrder, Resource::OwnedBy(order.client_id))?;
        Ok(order)
    }

    // --- Staff reads ---

    /// Orders matching `filter`, newest first, with owner and assignee attached.
    #[instrument(skip(self))]
    pub async fn staff_orders(&self, caller: Option<&Caller>, filter: &OrderFilter) -> Result<OrderListing, OrderError> {
        authorize_caller(caller, Action::ListAllOrders, Resource::Any)?;
        let status = match filter.statut.as_deref() {
            None | Some("tous") | Some("") => None,
            Some(code) => Some(code.parse::<OrderStatus>().map_err(|e| OrderError::Validation(e.to_string()))?),
        };

        let all = self.inner.list().await?;
        let mut counts: BTreeMap<OrderStatus, usize> = OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        for order in &all {
            *counts.entry(order.status).or_default() += 1;
        }
        let total = all.len();

        let mut selected: Vec<Order> = all
            .into_iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .filter(|o| filter.date_debut.map_or(true, |d| o.created_at.date_naive() >= d))
            .filter(|o| filter.date_fin.map_or(true, |d| o.created_at.date_naive() <= d))
            .collect();
        newest_first(&mut selected);

        let users: HashMap<UserId, User> = self.users.list_all_users().await?.into_iter().map(|u| (u.id, u)).collect();
        let summary = |id: Option<UserId>| id.and_then(|id| users.get(&id)).map(UserSummary::from);
        let orders = selected
            .into_iter()
            .map(|order| OrderView {
                owner: summary(Some(order.client_id)),
                assignee: summary(order.employee_id),
                order,
            })
            .collect();

        Ok(OrderListing { orders, counts, total })
    }

    #[instrument(skip(self))]
    pub async fn staff_order(&self, caller: Option<&Caller>, order_id: OrderId) -> Result<OrderView, OrderError> {
        authorize_caller(caller, Action::ViewAnyOrder, Resource::Any)?;
        let order = self.require_order(order_id).await?;
        let owner = self.users.summary(order.client_id).await?;
        let assignee = match order.employee_id {
            Some(id) => self.users.summary(id).await?,
            None => None,
        };
        Ok(OrderView { order, owner, assignee })
    }

    /// Audit trail of an order, oldest first.
    #[instrument(skip(self))]
    pub async fn history(&self, caller: Option<&Caller>, order_id: OrderId) -> Result<Vec<HistoryEntry>, OrderError> {
        authorize_caller(caller, Action::ViewAnyOrder, Resource::Any)?;
        Ok(self.require_order(order_id).await?.history)
    }
}
