use std::fmt;

use serde::{Deserialize, Serialize};

/// Subscription tiers offered by the product.
///
/// The set is closed: every tier carries its limits through [`PlanId::features`],
/// so adding a tier is a compile error until its feature set exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[sqlx(type_name = "plan_id", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanId {
    Free,
    Starter,
    Pro,
    Agency,
}

/// Numeric and boolean limits of a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureSet {
    pub gsc_requests_per_day: u32,
    pub index_now_requests_per_day: u32,
    pub urls_per_batch: u32,
    pub sites: u32,
    pub bulk_indexing: bool,
    pub priority_support: bool,
}

/// Catalogue entry shown on the pricing page.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PlanInfo {
    pub id: PlanId,
    pub name: &'static str,
    pub description: &'static str,
    /// Monthly price in whole USD.
    pub price: u32,
    pub features: &'static FeatureSet,
}

const FREE: FeatureSet = FeatureSet {
    gsc_requests_per_day: 10,
    index_now_requests_per_day: 50,
    urls_per_batch: 10,
    sites: 1,
    bulk_indexing: false,
    priority_support: false,
};

const STARTER: FeatureSet = FeatureSet {
    gsc_requests_per_day: 100,
    index_now_requests_per_day: 500,
    urls_per_batch: 100,
    sites: 3,
    bulk_indexing: true,
    priority_support: false,
};

const PRO: FeatureSet = FeatureSet {
    gsc_requests_per_day: 500,
    index_now_requests_per_day: 2000,
    urls_per_batch: 500,
    sites: 10,
    bulk_indexing: true,
    priority_support: true,
};

const AGENCY: FeatureSet = FeatureSet {
    gsc_requests_per_day: 2000,
    index_now_requests_per_day: 10000,
    urls_per_batch: 2000,
    sites: 50,
    bulk_indexing: true,
    priority_support: true,
};

impl PlanId {
    pub const ALL: [PlanId; 4] = [PlanId::Free, PlanId::Starter, PlanId::Pro, PlanId::Agency];

    /// Limits for this plan.
    pub fn features(self) -> &'static FeatureSet {
        match self {
            PlanId::Free => &FREE,
            PlanId::Starter => &STARTER,
            PlanId::Pro => &PRO,
            PlanId::Agency => &AGENCY,
        }
    }

    pub fn info(self) -> PlanInfo {
        let (name, description, price) = match self {
            PlanId::Free => ("Free", "For personal use", 0),
            PlanId::Starter => ("Starter", "For small websites", 9),
            PlanId::Pro => ("Pro", "For growing businesses", 29),
            PlanId::Agency => ("Agency", "For SEO agencies", 99),
        };
        PlanInfo {
            id: self,
            name,
            description,
            price,
            features: self.features(),
        }
    }

    pub fn is_paid(self) -> bool {
        self != PlanId::Free
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PlanId::Free => "FREE",
            PlanId::Starter => "STARTER",
            PlanId::Pro => "PRO",
            PlanId::Agency => "AGENCY",
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_plan_has_no_bulk_indexing() {
        let free = PlanId::Free.features();
        assert_eq!(free.gsc_requests_per_day, 10);
        assert_eq!(free.index_now_requests_per_day, 50);
        assert!(!free.bulk_indexing);
    }

    #[test]
    fn paid_plans_allow_bulk_and_grow_monotonically() {
        let paid = [PlanId::Starter, PlanId::Pro, PlanId::Agency];
        for plan in paid {
            assert!(plan.features().bulk_indexing, "{plan} should allow bulk");
            assert!(plan.is_paid());
        }
        for pair in PlanId::ALL.windows(2) {
            let (lower, higher) = (pair[0].features(), pair[1].features());
            assert!(lower.gsc_requests_per_day < higher.gsc_requests_per_day);
            assert!(lower.index_now_requests_per_day < higher.index_now_requests_per_day);
            assert!(lower.urls_per_batch <= higher.urls_per_batch);
        }
    }

    #[test]
    fn every_plan_allows_at_least_one_url_and_site() {
        for plan in PlanId::ALL {
            assert!(plan.features().urls_per_batch >= 1);
            assert!(plan.features().sites >= 1);
        }
    }

    #[test]
    fn features_serialize_with_dashboard_field_names() {
        let json = serde_json::to_value(PlanId::Pro.features()).unwrap();
        assert_eq!(json["gscRequestsPerDay"], 500);
        assert_eq!(json["indexNowRequestsPerDay"], 2000);
        assert_eq!(json["prioritySupport"], true);
    }
}
