//! Typed clients over the resource actors.
//!
//! Each client wraps a [`ResourceClient`](crate::actor_framework::ResourceClient),
//! checks the access gate on caller-facing operations and maps framework
//! failures into its own error type. Cross-actor orchestration (order
//! placement, cancellation, transitions) lives in [`OrderClient`].

#[macro_use]
mod macros;

pub mod dispatcher;
pub mod notification_client;
pub mod order_client;
pub mod product_client;
pub mod user_client;

pub use dispatcher::NotificationDispatcher;
pub use notification_client::NotificationClient;
pub use order_client::{OrderClient, OrderListing};
pub use product_client::ProductClient;
pub use user_client::UserClient;
