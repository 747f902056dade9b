//! # floe-core
//!
//! Configuration types shared across all Floe crates.

// Configuration types shared across all Floe crates
pub mod config;

// Re-export commonly used config types for convenience
pub use config::{
    ConfigError, ExclusionConfig, ExclusionKind, FloeConfig, LoggingConfig, ServerConfig,
    WarehouseConfig,
};
