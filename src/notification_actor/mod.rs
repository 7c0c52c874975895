pub mod entity;
pub mod error;
pub use entity::NotificationAction;
pub use error::*;
