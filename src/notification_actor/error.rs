use thiserror::Error;

use crate::access::AccessError;
use crate::actor_framework::FrameworkError;

/// Errors that can occur during notification operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NotificationError {
    #[error("Notification not found: {0}")]
    NotFound(String),
    #[error("Notification validation error: {0}")]
    ValidationError(String),
    #[error(transparent)]
    Access(#[from] AccessError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<FrameworkError<NotificationError>> for NotificationError {
    fn from(err: FrameworkError<NotificationError>) -> Self {
        match err {
            FrameworkError::Entity(e) => e,
            FrameworkError::NotFound { id, .. } => NotificationError::NotFound(id),
            other => NotificationError::ActorCommunicationError(other.to_string()),
        }
    }
}
