//! Business domain entities and wire DTOs. Pure data with no actor concerns.

pub mod notification;
pub mod order;
pub mod product;
pub mod requests;
pub mod user;

pub use notification::*;
pub use order::*;
pub use product::*;
pub use requests::*;
pub use user::*;
