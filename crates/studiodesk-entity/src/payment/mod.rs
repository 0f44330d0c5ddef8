//! Payment entities as seen by the aging scanner.

pub mod model;
pub mod status;

pub use model::PendingPayment;
pub use status::PaymentStatus;
