//! Shared wire and domain model for the lilycall session engine.

pub mod model;

pub use model::*;
