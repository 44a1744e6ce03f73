//! Order records: atomic placement of an order with its lines, status updates,
//! and the mark-served procedure.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
