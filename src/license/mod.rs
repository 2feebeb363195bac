pub mod client;
pub mod entitlement;

pub use client::{LicenseClient, LicenseVerifier, TransportError};
pub use entitlement::{evaluate, AccessDecision};

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Vendor-reported state of one license purchase.
///
/// Deserialized from the untyped `purchase` object in the vendor envelope;
/// every field the vendor omits falls back to its default instead of erroring.
/// Built fresh for each verification round-trip and discarded after one
/// evaluation, never persisted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PurchaseRecord {
    #[serde(default)]
    pub refunded: bool,
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub subscription_failed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub subscription_ended_at: Option<DateTime<Utc>>,
}
