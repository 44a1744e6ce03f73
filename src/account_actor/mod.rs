//! Identity, profile and staff tables behind sign-in and staff management.

pub mod entity;
pub mod error;

pub use error::*;
