use thiserror::Error;

use crate::access::AccessError;
use crate::actor_framework::FrameworkError;

/// Errors that can occur during catalog and stock operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Product not found: {0}")]
    NotFound(String),
    #[error("Insufficient stock for {product}: requested {requested}, available {available}")]
    OutOfStock { product: String, requested: u32, available: u32 },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Product validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<ProductError>> for ProductError {
    fn from(e: FrameworkError<ProductError>) -> Self {
        match e {
            FrameworkError::Entity(inner) => inner,
            FrameworkError::NotFound { id, .. } => ProductError::NotFound(id),
            other => ProductError::ActorCommunicationError(other.to_string()),
        }
    }
}
