use std::fmt;

use serde::{Deserialize, Serialize};

/// Billing lifecycle of a subscription, as last reported by Stripe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "subscription_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubscriptionStatus {
    Inactive,
    Active,
    Trialing,
    PastDue,
    Canceled,
}

impl SubscriptionStatus {
    /// Whether a paid plan in this state may consume its quota.
    pub fn is_in_good_standing(self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trialing)
    }
}

/// Which provider a submission goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Gsc,
    IndexNow,
}

/// A metered operation. Doubles as the audit-log channel.
///
/// JSON uses the lowercase operation names (`gsc`, `bulk_indexnow`, ...);
/// the database uses the upper-case channel names (`GSC`, `BULK_INDEXNOW`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "indexing_channel")]
pub enum OperationType {
    #[serde(rename = "gsc")]
    #[sqlx(rename = "GSC")]
    Gsc,
    #[serde(rename = "indexnow")]
    #[sqlx(rename = "INDEXNOW")]
    IndexNow,
    #[serde(rename = "bulk_gsc")]
    #[sqlx(rename = "BULK_GSC")]
    BulkGsc,
    #[serde(rename = "bulk_indexnow")]
    #[sqlx(rename = "BULK_INDEXNOW")]
    BulkIndexNow,
}

impl OperationType {
    /// Single-URL submissions are plain operations, anything larger is bulk.
    pub fn for_batch(provider: Provider, url_count: usize) -> Self {
        match (provider, url_count > 1) {
            (Provider::Gsc, false) => OperationType::Gsc,
            (Provider::Gsc, true) => OperationType::BulkGsc,
            (Provider::IndexNow, false) => OperationType::IndexNow,
            (Provider::IndexNow, true) => OperationType::BulkIndexNow,
        }
    }

    pub fn provider(self) -> Provider {
        match self {
            OperationType::Gsc | OperationType::BulkGsc => Provider::Gsc,
            OperationType::IndexNow | OperationType::BulkIndexNow => Provider::IndexNow,
        }
    }

    pub fn is_bulk(self) -> bool {
        matches!(self, OperationType::BulkGsc | OperationType::BulkIndexNow)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Gsc => "gsc",
            OperationType::IndexNow => "indexnow",
            OperationType::BulkGsc => "bulk_gsc",
            OperationType::BulkIndexNow => "bulk_indexnow",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single URL submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "indexing_status", rename_all = "lowercase")]
pub enum IndexingStatus {
    Success,
    Error,
    Pending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_size_selects_bulk_operation() {
        assert_eq!(OperationType::for_batch(Provider::Gsc, 1), OperationType::Gsc);
        assert_eq!(OperationType::for_batch(Provider::Gsc, 2), OperationType::BulkGsc);
        assert_eq!(OperationType::for_batch(Provider::IndexNow, 1), OperationType::IndexNow);
        assert_eq!(
            OperationType::for_batch(Provider::IndexNow, 25),
            OperationType::BulkIndexNow
        );
    }

    #[test]
    fn bulk_operations_share_their_provider() {
        assert_eq!(OperationType::BulkGsc.provider(), Provider::Gsc);
        assert_eq!(OperationType::BulkIndexNow.provider(), Provider::IndexNow);
        assert!(OperationType::BulkGsc.is_bulk());
        assert!(!OperationType::IndexNow.is_bulk());
    }

    #[test]
    fn operation_names_match_the_dashboard_api() {
        let op: OperationType = serde_json::from_str("\"bulk_indexnow\"").unwrap();
        assert_eq!(op, OperationType::BulkIndexNow);
        assert_eq!(serde_json::to_string(&OperationType::IndexNow).unwrap(), "\"indexnow\"");
    }

    #[test]
    fn only_active_and_trialing_are_in_good_standing() {
        assert!(SubscriptionStatus::Active.is_in_good_standing());
        assert!(SubscriptionStatus::Trialing.is_in_good_standing());
        assert!(!SubscriptionStatus::PastDue.is_in_good_standing());
        assert!(!SubscriptionStatus::Canceled.is_in_good_standing());
        assert!(!SubscriptionStatus::Inactive.is_in_good_standing());
    }
}
