//! Menu tables: categories, menu items and customization options.

pub mod entity;
pub mod error;

pub use error::*;
