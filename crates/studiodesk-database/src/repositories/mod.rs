//! Repository implementations for the tables the alert engine touches.

pub mod alert;
pub mod payment;
pub mod project;
pub mod settings;
pub mod task;

pub use alert::AlertRepository;
pub use payment::PaymentRepository;
pub use project::ProjectRepository;
pub use settings::AlertSettingsRepository;
pub use task::TaskRepository;
