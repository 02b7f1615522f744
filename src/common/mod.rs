//! Types, errors and traits shared across modules

pub mod errors;
pub mod traits;
pub mod types;
