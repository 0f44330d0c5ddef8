//! # studiodesk-core
//!
//! Core crate for Studiodesk. Contains configuration schemas, typed
//! identifiers, pagination types, the clock abstraction used to decide
//! what "today" is, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Studiodesk crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
