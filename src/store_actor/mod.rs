//! Store-wide tables: settings, loyalty rewards, feedback, notifications,
//! the activity log and uploaded objects.

mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;
