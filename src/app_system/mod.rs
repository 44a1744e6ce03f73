//! System orchestration, configuration, startup, and shutdown logic.

pub mod cafe_system;
pub mod config;
pub mod tracing;

pub use self::cafe_system::CafeSystem;
pub use self::config::{Config, ConfigError};
pub use self::tracing::setup_tracing;
