//! Task entities as seen by the due-date scanner.

pub mod model;
pub mod status;

pub use model::TaskDue;
pub use status::TaskStatus;
