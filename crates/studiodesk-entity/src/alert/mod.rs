//! Alert domain entities.

pub mod candidate;
pub mod kind;
pub mod model;
pub mod settings;
pub mod triple;

pub use candidate::AlertCandidate;
pub use kind::{AlertKind, EntityKind, ParseKindError};
pub use model::Alert;
pub use settings::AlertSettings;
pub use triple::AlertTriple;
