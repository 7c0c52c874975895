mod actions;
pub mod entity;
pub mod error;
pub mod number;
pub mod state_machine;
pub use actions::*;
pub use error::*;
pub use number::OrderNumberGenerator;
