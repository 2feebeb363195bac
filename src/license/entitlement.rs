use chrono::{DateTime, Utc};

use super::PurchaseRecord;

/// Outcome of evaluating a purchase record. Derived once per request and
/// consumed immediately; the reason text is part of the user-facing contract
/// and must stay stable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl AccessDecision {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: &str) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
        }
    }
}

/// Decide whether a purchase grants access. Pure and deterministic; the
/// evaluation instant is an explicit argument.
///
/// Precedence is fixed: refund is an absolute revocation regardless of
/// subscription state, and a payment failure outranks the end-date check
/// because a reinstated subscription can carry a stale `subscription_ended_at`
/// alongside a fresh failure. One-time purchases have no `subscription_id`
/// and are allowed once they clear the refund check. An end date in the
/// future is a grace period: access continues until the effective end date.
pub fn evaluate(record: &PurchaseRecord, now: DateTime<Utc>) -> AccessDecision {
    if record.refunded {
        return AccessDecision::deny("This license has been refunded.");
    }

    if record.subscription_id.is_some() {
        if record.subscription_failed_at.is_some() {
            return AccessDecision::deny(
                "Subscription payment failed. Please update your payment method.",
            );
        }
        if let Some(ended_at) = record.subscription_ended_at {
            if ended_at < now {
                return AccessDecision::deny("Your subscription has ended.");
            }
        }
    }

    AccessDecision::allow()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(year: i32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn refund_denies_regardless_of_every_other_field() {
        let record = PurchaseRecord {
            refunded: true,
            subscription_id: Some("s1".to_string()),
            subscription_failed_at: Some(at(2024)),
            subscription_ended_at: Some(at(2030)),
        };
        let decision = evaluate(&record, at(2025));
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("This license has been refunded."));

        let bare = PurchaseRecord {
            refunded: true,
            ..Default::default()
        };
        assert!(!evaluate(&bare, at(2025)).allowed);
    }

    #[test]
    fn one_time_purchase_is_allowed() {
        let record = PurchaseRecord::default();
        let decision = evaluate(&record, at(2025));
        assert!(decision.allowed);
        assert!(decision.reason.is_none());
    }

    #[test]
    fn payment_failure_takes_precedence_over_missing_end_date() {
        let record = PurchaseRecord {
            refunded: false,
            subscription_id: Some("s1".to_string()),
            subscription_failed_at: Some(at(2024)),
            subscription_ended_at: None,
        };
        let decision = evaluate(&record, at(2025));
        assert!(!decision.allowed);
        assert_eq!(
            decision.reason.as_deref(),
            Some("Subscription payment failed. Please update your payment method.")
        );
    }

    #[test]
    fn payment_failure_takes_precedence_over_a_stale_end_date() {
        let record = PurchaseRecord {
            refunded: false,
            subscription_id: Some("s1".to_string()),
            subscription_failed_at: Some(at(2024)),
            subscription_ended_at: Some(at(2020)),
        };
        let decision = evaluate(&record, at(2025));
        assert_eq!(
            decision.reason.as_deref(),
            Some("Subscription payment failed. Please update your payment method.")
        );
    }

    #[test]
    fn expired_subscription_denies() {
        let record = PurchaseRecord {
            refunded: false,
            subscription_id: Some("s1".to_string()),
            subscription_failed_at: None,
            subscription_ended_at: Some(at(2020)),
        };
        let decision = evaluate(&record, at(2025));
        assert!(!decision.allowed);
        assert_eq!(decision.reason.as_deref(), Some("Your subscription has ended."));
    }

    #[test]
    fn future_end_date_is_a_grace_period() {
        let record = PurchaseRecord {
            refunded: false,
            subscription_id: Some("s1".to_string()),
            subscription_failed_at: None,
            subscription_ended_at: Some(at(2030)),
        };
        assert!(evaluate(&record, at(2025)).allowed);
    }

    #[test]
    fn end_date_without_subscription_id_is_ignored() {
        // Without a subscription id the whole subscription branch is skipped.
        let record = PurchaseRecord {
            refunded: false,
            subscription_id: None,
            subscription_failed_at: Some(at(2024)),
            subscription_ended_at: Some(at(2020)),
        };
        assert!(evaluate(&record, at(2025)).allowed);
    }
}
