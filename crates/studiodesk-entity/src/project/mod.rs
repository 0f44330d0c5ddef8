//! Project entities as seen by the deadline scanner.

pub mod model;
pub mod status;

pub use model::ProjectDeadline;
pub use status::ProjectStatus;
