//! CLI command implementations for Floe.

pub mod check;
pub mod classify;
pub mod tools;
