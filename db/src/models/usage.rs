use chrono::{DateTime, Datelike, Utc};
use common::misc::{OperationType, Provider};
use serde::Serialize;
use uuid::Uuid;

/// Per-user consumption counters.
///
/// Daily counters reset on the first read of a new UTC day, monthly counters
/// on the first read of a new UTC month, lifetime totals never reset.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    #[serde(skip)]
    pub user_id: Uuid,
    pub gsc_requests_today: i32,
    pub index_now_requests_today: i32,
    pub urls_indexed_today: i32,
    pub gsc_requests_this_month: i32,
    pub urls_indexed_this_month: i32,
    pub total_gsc_requests: i64,
    pub total_urls_indexed: i64,
    pub last_reset_date: DateTime<Utc>,
    pub last_monthly_reset: DateTime<Utc>,
}

/// Which periodic resets fired during a reconciliation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reset {
    pub daily: bool,
    pub monthly: bool,
}

impl Reset {
    pub fn any(self) -> bool {
        self.daily || self.monthly
    }
}

impl Usage {
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            gsc_requests_today: 0,
            index_now_requests_today: 0,
            urls_indexed_today: 0,
            gsc_requests_this_month: 0,
            urls_indexed_this_month: 0,
            total_gsc_requests: 0,
            total_urls_indexed: 0,
            last_reset_date: now,
            last_monthly_reset: now,
        }
    }

    /// Zeroes counters whose period ended before `now`.
    ///
    /// The daily and monthly checks are independent; both may fire.
    pub fn reconcile(&mut self, now: DateTime<Utc>) -> Reset {
        let mut reset = Reset::default();

        if self.last_reset_date.date_naive() != now.date_naive() {
            self.gsc_requests_today = 0;
            self.index_now_requests_today = 0;
            self.urls_indexed_today = 0;
            self.last_reset_date = now;
            reset.daily = true;
        }

        let last_month = (self.last_monthly_reset.year(), self.last_monthly_reset.month());
        if last_month != (now.year(), now.month()) {
            self.gsc_requests_this_month = 0;
            self.urls_indexed_this_month = 0;
            self.last_monthly_reset = now;
            reset.monthly = true;
        }

        reset
    }

    /// Adds the cost of `count` successful submissions.
    ///
    /// Every submitted URL also counts as an indexed URL in all three
    /// windows, whichever provider it went to.
    pub fn apply(&mut self, op: OperationType, count: u32) {
        let n = i32::try_from(count).unwrap_or(i32::MAX);

        if op.provider() == Provider::Gsc {
            self.gsc_requests_today = self.gsc_requests_today.saturating_add(n);
            self.gsc_requests_this_month = self.gsc_requests_this_month.saturating_add(n);
            self.total_gsc_requests = self.total_gsc_requests.saturating_add(i64::from(n));
        } else {
            self.index_now_requests_today = self.index_now_requests_today.saturating_add(n);
        }

        self.urls_indexed_today = self.urls_indexed_today.saturating_add(n);
        self.urls_indexed_this_month = self.urls_indexed_this_month.saturating_add(n);
        self.total_urls_indexed = self.total_urls_indexed.saturating_add(i64::from(n));
    }

    /// Today's counter the quota for `op` is measured against.
    pub fn today(&self, op: OperationType) -> i32 {
        match op.provider() {
            Provider::Gsc => self.gsc_requests_today,
            Provider::IndexNow => self.index_now_requests_today,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn usage_at(now: DateTime<Utc>) -> Usage {
        Usage::new(Uuid::new_v4(), now)
    }

    #[test]
    fn reconcile_is_idempotent_within_a_day() {
        let morning = at(2025, 3, 14, 8, 0);
        let mut usage = usage_at(morning);
        usage.apply(OperationType::Gsc, 4);

        let first = usage.reconcile(at(2025, 3, 14, 12, 0));
        let snapshot = usage.clone();
        let second = usage.reconcile(at(2025, 3, 14, 23, 59));

        assert!(!first.any());
        assert!(!second.any());
        assert_eq!(usage, snapshot);
        assert_eq!(usage.gsc_requests_today, 4);
    }

    #[test]
    fn first_read_after_midnight_resets_daily_counters_only() {
        let yesterday = at(2025, 3, 13, 22, 0);
        let mut usage = usage_at(yesterday);
        usage.apply(OperationType::Gsc, 7);
        usage.apply(OperationType::IndexNow, 3);

        let now = at(2025, 3, 14, 0, 1);
        let reset = usage.reconcile(now);

        assert_eq!(reset, Reset { daily: true, monthly: false });
        assert_eq!(usage.gsc_requests_today, 0);
        assert_eq!(usage.index_now_requests_today, 0);
        assert_eq!(usage.urls_indexed_today, 0);
        assert_eq!(usage.last_reset_date, now);
        assert_eq!(usage.gsc_requests_this_month, 7);
        assert_eq!(usage.urls_indexed_this_month, 10);
        assert_eq!(usage.last_monthly_reset, yesterday);
    }

    #[test]
    fn new_month_resets_monthly_counters_and_keeps_totals() {
        let mut usage = usage_at(at(2025, 1, 31, 23, 0));
        usage.apply(OperationType::BulkGsc, 5);

        let reset = usage.reconcile(at(2025, 2, 1, 0, 0));

        assert_eq!(reset, Reset { daily: true, monthly: true });
        assert_eq!(usage.gsc_requests_this_month, 0);
        assert_eq!(usage.urls_indexed_this_month, 0);
        assert_eq!(usage.total_gsc_requests, 5);
        assert_eq!(usage.total_urls_indexed, 5);
    }

    #[test]
    fn monthly_reset_fires_even_if_daily_was_already_reset() {
        let mut usage = usage_at(at(2025, 4, 30, 10, 0));
        usage.apply(OperationType::Gsc, 2);
        // Daily counters were already zeroed today, but the month marker is stale.
        usage.last_reset_date = at(2025, 5, 1, 0, 5);
        usage.gsc_requests_today = 0;

        let reset = usage.reconcile(at(2025, 5, 1, 9, 0));

        assert_eq!(reset, Reset { daily: false, monthly: true });
        assert_eq!(usage.gsc_requests_this_month, 0);
    }

    #[test]
    fn same_day_number_in_another_month_is_a_new_day() {
        let mut usage = usage_at(at(2025, 6, 10, 9, 0));
        usage.apply(OperationType::IndexNow, 1);

        let reset = usage.reconcile(at(2025, 7, 10, 9, 0));

        assert!(reset.daily && reset.monthly);
        assert_eq!(usage.index_now_requests_today, 0);
    }

    #[test]
    fn gsc_commit_increments_every_gsc_window_exactly() {
        let mut usage = usage_at(at(2025, 3, 14, 8, 0));
        usage.apply(OperationType::IndexNow, 2);
        let before = usage.clone();

        usage.apply(OperationType::Gsc, 3);

        assert_eq!(usage.gsc_requests_today, before.gsc_requests_today + 3);
        assert_eq!(usage.gsc_requests_this_month, before.gsc_requests_this_month + 3);
        assert_eq!(usage.total_gsc_requests, before.total_gsc_requests + 3);
        assert_eq!(usage.index_now_requests_today, before.index_now_requests_today);
    }

    #[test]
    fn indexnow_commit_leaves_gsc_counters_alone() {
        let mut usage = usage_at(at(2025, 3, 14, 8, 0));

        usage.apply(OperationType::BulkIndexNow, 20);

        assert_eq!(usage.index_now_requests_today, 20);
        assert_eq!(usage.gsc_requests_today, 0);
        assert_eq!(usage.total_gsc_requests, 0);
        assert_eq!(usage.urls_indexed_today, 20);
        assert_eq!(usage.urls_indexed_this_month, 20);
        assert_eq!(usage.total_urls_indexed, 20);
    }

    #[test]
    fn windows_stay_nested_across_days() {
        let mut usage = usage_at(at(2025, 3, 1, 8, 0));
        for day in 1..=5 {
            usage.reconcile(at(2025, 3, day, 9, 0));
            usage.apply(OperationType::Gsc, day);
            usage.apply(OperationType::IndexNow, 2 * day);

            assert!(usage.gsc_requests_today <= usage.gsc_requests_this_month);
            assert!(i64::from(usage.gsc_requests_this_month) <= usage.total_gsc_requests);
            assert!(usage.urls_indexed_today <= usage.urls_indexed_this_month);
            assert!(i64::from(usage.urls_indexed_this_month) <= usage.total_urls_indexed);
        }
        assert_eq!(usage.gsc_requests_today, 5);
        assert_eq!(usage.gsc_requests_this_month, 15);
    }

    #[test]
    fn bulk_operations_are_measured_against_their_provider_counter() {
        let mut usage = usage_at(at(2025, 3, 14, 8, 0));
        usage.apply(OperationType::Gsc, 4);
        usage.apply(OperationType::IndexNow, 9);

        assert_eq!(usage.today(OperationType::BulkGsc), 4);
        assert_eq!(usage.today(OperationType::BulkIndexNow), 9);
    }
}
