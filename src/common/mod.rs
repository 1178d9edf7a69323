//! Shared types, traits and errors

pub mod errors;
pub mod traits;
pub mod types;
