//! Convenience result type alias for Studiodesk.

use crate::error::AppError;

/// A specialized `Result` type for Studiodesk operations.
pub type AppResult<T> = Result<T, AppError>;
