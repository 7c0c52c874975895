use thiserror::Error;

use crate::access::AccessError;
use crate::actor_framework::FrameworkError;

/// Errors that can occur during user operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum UserError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
    #[error("User validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<UserError>> for UserError {
    fn from(err: FrameworkError<UserError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound { id, .. } => UserError::NotFound(id),
            FrameworkError::Conflict { key, .. } => UserError::AlreadyExists(key),
            other => UserError::ActorCommunicationError(other.to_string()),
        }
    }
}
