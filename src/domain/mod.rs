//! Plain data types for the café. No actor or backend concerns live here.

pub mod account;
pub mod cart;
pub mod menu;
pub mod order;
pub mod promo;
pub mod store;

pub use account::*;
pub use cart::*;
pub use menu::*;
pub use order::*;
pub use promo::*;
pub use store::*;
