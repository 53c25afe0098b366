use common::{
    error::{AppError, Res},
    misc::{OperationType, Provider},
    plan::PlanId,
};
use db::models::{subscription::Subscription, usage::Usage};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

/// Why a usage check was denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    NotFound,
    SubscriptionInactive,
    PlanRestriction,
    BatchTooLarge,
    QuotaExceeded,
}

/// Outcome of a quota check. `limit` and `current` are only meaningful
/// when the denial (or approval) was decided on counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageCheck {
    pub allowed: bool,
    pub limit: i64,
    pub current: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<DenialReason>,
}

impl UsageCheck {
    fn allow(limit: i64, current: i64) -> Self {
        Self {
            allowed: true,
            limit,
            current,
            message: None,
            reason: None,
        }
    }

    fn deny(reason: DenialReason, message: String, limit: i64, current: i64) -> Self {
        Self {
            allowed: false,
            limit,
            current,
            message: Some(message),
            reason: Some(reason),
        }
    }

    pub fn not_found() -> Self {
        Self::deny(DenialReason::NotFound, "User not found".to_string(), 0, 0)
    }

    /// Turns a denial into the error the HTTP layer renders.
    pub fn into_result(self) -> Res<Self> {
        if self.allowed {
            return Ok(self);
        }
        match self.reason {
            Some(DenialReason::NotFound) => Err(AppError::NotFound(
                self.message.unwrap_or_else(|| "User not found".to_string()),
            )),
            Some(DenialReason::BatchTooLarge) => {
                Err(AppError::BadRequest(self.message.unwrap_or_default()))
            }
            _ => Err(AppError::UsageLimit {
                message: self.message.unwrap_or_default(),
                limit: self.limit,
                current: self.current,
            }),
        }
    }
}

/// Decides whether `count` more `op` submissions fit the subscription.
///
/// `usage` must already be reconciled to the current day. Rules apply in
/// order: standing of a paid plan, bulk permission, batch size, then the
/// daily quota.
pub fn evaluate(sub: &Subscription, usage: &Usage, op: OperationType, count: u32) -> UsageCheck {
    if sub.plan.is_paid() && !sub.status.is_in_good_standing() {
        return UsageCheck::deny(
            DenialReason::SubscriptionInactive,
            "Your subscription is not active. Please update your payment method.".to_string(),
            0,
            0,
        );
    }

    let features = sub.plan.features();

    if op.is_bulk() && !features.bulk_indexing {
        return UsageCheck::deny(
            DenialReason::PlanRestriction,
            "Bulk indexing requires a paid plan".to_string(),
            0,
            0,
        );
    }

    if count > features.urls_per_batch {
        return UsageCheck::deny(
            DenialReason::BatchTooLarge,
            format!(
                "Too many URLs: the {} plan allows {} URLs per request",
                sub.plan, features.urls_per_batch
            ),
            i64::from(features.urls_per_batch),
            i64::from(count),
        );
    }

    let limit = i64::from(match op.provider() {
        Provider::Gsc => features.gsc_requests_per_day,
        Provider::IndexNow => features.index_now_requests_per_day,
    });
    let current = i64::from(usage.today(op));

    if current + i64::from(count) <= limit {
        return UsageCheck::allow(limit, current);
    }

    let message = if sub.plan == PlanId::Free {
        format!(
            "Free plan limit: {} requests per day. Resets tomorrow, or upgrade for more.",
            limit
        )
    } else {
        format!("Daily limit reached ({}/{}). Resets tomorrow.", current, limit)
    };
    UsageCheck::deny(DenialReason::QuotaExceeded, message, limit, current)
}

/// Checks whether the user may submit `count` more URLs through `op`.
///
/// Reads the subscription and the reconciled usage record; nothing is
/// reserved, so a later commit may still overshoot under concurrency.
pub async fn check_usage_limit(
    pool: &PgPool,
    user_id: Uuid,
    op: OperationType,
    count: u32,
) -> Res<UsageCheck> {
    if count == 0 {
        return Err(AppError::BadRequest("No URLs provided".to_string()));
    }

    let Some(sub) = db::subscription::get_subscription_by_user_id(pool, user_id).await? else {
        log::warn!("Usage check for user {} without a subscription", user_id);
        return Ok(UsageCheck::not_found());
    };

    let usage = db::usage::load_or_create(pool, user_id).await?;
    let check = evaluate(&sub, &usage, op, count);

    if !check.allowed {
        log::info!(
            "Denied {} x{} for user {} on {}: {}",
            op,
            count,
            user_id,
            sub.plan,
            check.message.as_deref().unwrap_or_default()
        );
    }

    Ok(check)
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use common::misc::SubscriptionStatus;

    use super::*;

    fn subscription(plan: PlanId, status: SubscriptionStatus) -> Subscription {
        let now = Utc::now();
        Subscription {
            user_id: Uuid::nil(),
            plan,
            status,
            stripe_customer_id: None,
            stripe_subscription_id: None,
            stripe_price_id: None,
            current_period_start: None,
            current_period_end: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn usage() -> Usage {
        Usage::new(Uuid::nil(), Utc.with_ymd_and_hms(2025, 3, 14, 9, 0, 0).unwrap())
    }

    #[test]
    fn free_user_gets_exactly_ten_single_gsc_submissions() {
        let sub = subscription(PlanId::Free, SubscriptionStatus::Inactive);
        let mut usage = usage();
        usage.apply(OperationType::Gsc, 9);

        let check = evaluate(&sub, &usage, OperationType::Gsc, 1);
        assert!(check.allowed);
        assert_eq!((check.limit, check.current), (10, 9));

        usage.apply(OperationType::Gsc, 1);
        let check = evaluate(&sub, &usage, OperationType::Gsc, 1);
        assert!(!check.allowed);
        assert_eq!(check.reason, Some(DenialReason::QuotaExceeded));
        assert_eq!((check.limit, check.current), (10, 10));
        assert_eq!(
            check.message.as_deref(),
            Some("Free plan limit: 10 requests per day. Resets tomorrow, or upgrade for more.")
        );
    }

    #[test]
    fn free_plan_never_gets_bulk_regardless_of_counters() {
        let sub = subscription(PlanId::Free, SubscriptionStatus::Active);

        for op in [OperationType::BulkGsc, OperationType::BulkIndexNow] {
            let check = evaluate(&sub, &usage(), op, 2);
            assert!(!check.allowed);
            assert_eq!(check.reason, Some(DenialReason::PlanRestriction));
            assert_eq!((check.limit, check.current), (0, 0));
        }
    }

    #[test]
    fn free_plan_ignores_subscription_status() {
        let sub = subscription(PlanId::Free, SubscriptionStatus::Canceled);
        assert!(evaluate(&sub, &usage(), OperationType::IndexNow, 1).allowed);
    }

    #[test]
    fn paid_plan_out_of_good_standing_is_denied_even_when_idle() {
        for status in [
            SubscriptionStatus::PastDue,
            SubscriptionStatus::Canceled,
            SubscriptionStatus::Inactive,
        ] {
            let sub = subscription(PlanId::Pro, status);
            let check = evaluate(&sub, &usage(), OperationType::Gsc, 1);
            assert!(!check.allowed);
            assert_eq!(check.reason, Some(DenialReason::SubscriptionInactive));
            assert_eq!((check.limit, check.current), (0, 0));
        }
    }

    #[test]
    fn trialing_counts_as_good_standing() {
        let sub = subscription(PlanId::Starter, SubscriptionStatus::Trialing);
        assert!(evaluate(&sub, &usage(), OperationType::BulkGsc, 5).allowed);
    }

    #[test]
    fn batch_must_fit_entirely_under_the_limit() {
        let sub = subscription(PlanId::Starter, SubscriptionStatus::Active);
        let mut usage = usage();
        usage.apply(OperationType::IndexNow, 495);

        assert!(evaluate(&sub, &usage, OperationType::BulkIndexNow, 5).allowed);

        let check = evaluate(&sub, &usage, OperationType::BulkIndexNow, 6);
        assert!(!check.allowed);
        assert_eq!((check.limit, check.current), (500, 495));
        assert_eq!(
            check.message.as_deref(),
            Some("Daily limit reached (495/500). Resets tomorrow.")
        );
    }

    #[test]
    fn oversized_free_batch_is_a_plan_restriction() {
        let sub = subscription(PlanId::Free, SubscriptionStatus::Inactive);
        let check = evaluate(&sub, &usage(), OperationType::BulkGsc, 11);

        assert_eq!(check.reason, Some(DenialReason::PlanRestriction));
        assert!(matches!(
            check.into_result(),
            Err(AppError::UsageLimit { message, .. }) if message == "Bulk indexing requires a paid plan"
        ));
    }

    #[test]
    fn lapsed_paid_plan_is_denied_before_batch_size() {
        let sub = subscription(PlanId::Pro, SubscriptionStatus::PastDue);
        let check = evaluate(&sub, &usage(), OperationType::BulkGsc, 600);

        assert_eq!(check.reason, Some(DenialReason::SubscriptionInactive));
        assert!(matches!(check.into_result(), Err(AppError::UsageLimit { .. })));
    }

    #[test]
    fn batch_over_plan_size_is_a_bad_request() {
        let sub = subscription(PlanId::Pro, SubscriptionStatus::Active);
        assert!(evaluate(&sub, &usage(), OperationType::BulkIndexNow, 500).allowed);

        let check = evaluate(&sub, &usage(), OperationType::BulkIndexNow, 501);
        assert_eq!(check.reason, Some(DenialReason::BatchTooLarge));
        assert_eq!((check.limit, check.current), (500, 501));
        assert!(matches!(check.into_result(), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn providers_are_metered_independently() {
        let sub = subscription(PlanId::Free, SubscriptionStatus::Inactive);
        let mut usage = usage();
        usage.apply(OperationType::Gsc, 10);

        assert!(!evaluate(&sub, &usage, OperationType::Gsc, 1).allowed);

        let check = evaluate(&sub, &usage, OperationType::IndexNow, 1);
        assert!(check.allowed);
        assert_eq!((check.limit, check.current), (50, 0));
    }

    #[test]
    fn usage_limit_error_carries_counters() {
        let sub = subscription(PlanId::Agency, SubscriptionStatus::Active);
        let mut usage = usage();
        usage.apply(OperationType::Gsc, 2000);

        match evaluate(&sub, &usage, OperationType::Gsc, 1).into_result() {
            Err(AppError::UsageLimit { limit, current, .. }) => {
                assert_eq!((limit, current), (2000, 2000));
            }
            other => panic!("expected a usage limit error, got {other:?}"),
        }
    }

    #[test]
    fn missing_subscription_maps_to_not_found() {
        let check = UsageCheck::not_found();
        assert_eq!((check.limit, check.current), (0, 0));
        assert!(matches!(check.into_result(), Err(AppError::NotFound(_))));
    }

    #[test]
    fn allowed_check_serializes_without_message() {
        let json = serde_json::to_value(UsageCheck::allow(100, 3)).unwrap();
        assert_eq!(json["allowed"], true);
        assert!(json.get("message").is_none());
        assert!(json.get("reason").is_none());
    }
}
