//! Pending payment projection.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use studiodesk_core::types::UserId;

use super::status::PaymentStatus;

/// The subset of a payment row needed to decide aging alerts.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PendingPayment {
    /// Payment identifier.
    pub id: Uuid,
    /// Owning user.
    pub user_id: UserId,
    /// Invoiced amount.
    pub amount: Decimal,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Optional free-text description (client, invoice number).
    pub description: Option<String>,
    /// Settlement status.
    pub status: PaymentStatus,
    /// When the payment was recorded; aging is measured from here.
    pub created_at: DateTime<Utc>,
}

impl PendingPayment {
    /// Human-readable amount, e.g. `1250.00 EUR`.
    pub fn display_amount(&self) -> String {
        format!("{:.2} {}", self.amount, self.currency)
    }
}
