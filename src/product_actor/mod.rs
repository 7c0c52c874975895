//! Product-specific domain logic: catalog hooks and the inventory ledger actions.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
