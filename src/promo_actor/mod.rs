//! Promo codes (with the usage-increment procedure) and banner promotions.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
