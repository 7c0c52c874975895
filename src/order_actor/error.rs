use thiserror::Error;

use crate::access::AccessError;
use crate::actor_framework::FrameworkError;
use crate::domain::OrderStatus;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Order validation error: {0}")]
    Validation(String),
    #[error("Product not found: {0}")]
    ProductNotFound(String),
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    OutOfStock {
        product: String,
        requested: u32,
        available: u32,
    },
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },
    #[error("Order cannot be cancelled in status {0}")]
    NotCancellable(OrderStatus),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Order processing failed: {0}")]
    Failure(String),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<OrderError>> for OrderError {
    fn from(err: FrameworkError<OrderError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound { id, .. } => OrderError::NotFound(id),
            FrameworkError::Conflict { key, .. } => OrderError::Failure(format!("order number {key} already taken")),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}

/// Ledger failures seen while placing or cancelling an order.
impl From<ProductError> for OrderError {
    fn from(err: ProductError) -> Self {
        match err {
            ProductError::NotFound(id) => OrderError::ProductNotFound(id),
            ProductError::OutOfStock { product, requested, available } => {
                OrderError::OutOfStock { product, requested, available }
            }
            ProductError::InvalidQuantity(q) => OrderError::Validation(format!("invalid quantity {q}")),
            ProductError::ValidationError(msg) => OrderError::Validation(msg),
            ProductError::Access(e) => OrderError::Access(e),
            ProductError::ActorCommunicationError(msg) => OrderError::Failure(msg),
        }
    }
}

impl From<UserError> for OrderError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(id) => OrderError::Validation(format!("user {id} does not exist")),
            UserError::AlreadyExists(msg) | UserError::ValidationError(msg) => OrderError::Validation(msg),
            UserError::Access(e) => OrderError::Access(e),
            UserError::ActorCommunicationError(msg) => OrderError::Failure(msg),
        }
    }
}
