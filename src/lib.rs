//! Order-lifecycle core of a bakery storefront: inventory ledger, order
//! builder, order state machine, notification dispatch and the access gate.

pub mod access;
pub mod actor_framework;
pub mod app_system;
pub mod clients;
pub mod domain;
pub mod error;
pub mod mailer;
pub mod notification_actor;
pub mod order_actor;
pub mod product_actor;
pub mod user_actor;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod mock_framework;

pub use error::{AppError, ErrorKind};
