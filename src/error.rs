//! Crate-wide error type.
//!
//! Every module keeps its own error enum; at the edge they all collapse into
//! [`AppError`], which carries a machine-checkable [`ErrorKind`], the HTTP
//! status a transport layer should answer with, and a serializable body.

use std::collections::HashMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::access::AccessError;
use crate::app_system::ConfigError;
use crate::notification_actor::NotificationError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::user_actor::UserError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    NotFound,
    OutOfStock,
    InvalidTransition,
    NotCancellable,
    Forbidden,
    Unauthenticated,
    Failure,
}

impl ErrorKind {
    pub fn http_status(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::OutOfStock | ErrorKind::InvalidTransition | ErrorKind::NotCancellable => StatusCode::CONFLICT,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorKind::Failure => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct AppError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

/// Wire shape of an error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: ErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details.get_or_insert_with(HashMap::new).insert(key.into(), value.into());
        self
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Failure, message)
    }

    pub fn http_status(&self) -> StatusCode {
        self.kind.http_status()
    }

    pub fn body(&self) -> ErrorBody {
        ErrorBody {
            kind: self.kind,
            message: self.message.clone(),
            details: self.details.clone(),
        }
    }
}

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Unauthenticated => AppError::new(ErrorKind::Unauthenticated, err.to_string()),
            AccessError::Forbidden { reason } => {
                AppError::new(ErrorKind::Forbidden, err.to_string()).with_detail("reason", reason.code())
            }
        }
    }
}

fn out_of_stock(message: String, product: String, requested: u32, available: u32) -> AppError {
    AppError::new(ErrorKind::OutOfStock, message)
        .with_detail("product", product)
        .with_detail("requested", requested)
        .with_detail("available", available)
}

impl From<ProductError> for AppError {
    fn from(err: ProductError) -> Self {
        let message = err.to_string();
        match err {
            ProductError::NotFound(_) => AppError::new(ErrorKind::NotFound, message),
            ProductError::OutOfStock { product, requested, available } => {
                out_of_stock(message, product, requested, available)
            }
            ProductError::InvalidQuantity(_) | ProductError::ValidationError(_) => {
                AppError::new(ErrorKind::Validation, message)
            }
            ProductError::Access(e) => e.into(),
            ProductError::ActorCommunicationError(_) => AppError::failure(message),
        }
    }
}

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        let message = err.to_string();
        match err {
            OrderError::NotFound(_) | OrderError::ProductNotFound(_) => AppError::new(ErrorKind::NotFound, message),
            OrderError::Validation(_) => AppError::new(ErrorKind::Validation, message),
            OrderError::OutOfStock { product, requested, available } => {
                out_of_stock(message, product, requested, available)
            }
            OrderError::InvalidTransition { from, to } => AppError::new(ErrorKind::InvalidTransition, message)
                .with_detail("from", from.as_str())
                .with_detail("to", to.as_str()),
            OrderError::NotCancellable(status) => {
                AppError::new(ErrorKind::NotCancellable, message).with_detail("status", status.as_str())
            }
            OrderError::Access(e) => e.into(),
            OrderError::Failure(_) | OrderError::ActorCommunicationError(_) => AppError::failure(message),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        let message = err.to_string();
        match err {
            UserError::NotFound(_) => AppError::new(ErrorKind::NotFound, message),
            UserError::AlreadyExists(_) | UserError::ValidationError(_) => AppError::new(ErrorKind::Validation, message),
            UserError::Access(e) => e.into(),
            UserError::ActorCommunicationError(_) => AppError::failure(message),
        }
    }
}

impl From<NotificationError> for AppError {
    fn from(err: NotificationError) -> Self {
        let message = err.to_string();
        match err {
            NotificationError::NotFound(_) => AppError::new(ErrorKind::NotFound, message),
            NotificationError::ValidationError(_) => AppError::new(ErrorKind::Validation, message),
            NotificationError::Access(e) => e.into(),
            NotificationError::ActorCommunicationError(_) => AppError::failure(message),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::failure(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::failure(format!("actor task failed: {err}"))
    }
}
