use chrono::{DateTime, Utc};
use common::{
    misc::{IndexingStatus, OperationType},
    plan::{FeatureSet, PlanId},
};
use db::models::usage::Usage;
use serde::{Deserialize, Serialize};

/// Google Indexing API notification kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationType {
    #[default]
    UrlUpdated,
    UrlDeleted,
}

#[derive(Debug, Deserialize)]
pub struct GscPublishRequest {
    pub urls: Vec<String>,
    #[serde(rename = "type", default)]
    pub notification_type: NotificationType,
}

#[derive(Debug, Deserialize)]
pub struct IndexNowRequest {
    pub host: String,
    pub key: String,
    pub urls: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct InspectRequest {
    pub url: String,
    #[serde(alias = "siteUrl")]
    pub site_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlResult {
    pub url: String,
    pub status: IndexingStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionReport {
    pub operation: OperationType,
    pub submitted: usize,
    pub succeeded: u32,
    pub failed: u32,
    pub results: Vec<UrlResult>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteEntry {
    pub site_url: String,
    #[serde(default)]
    pub permission_level: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SitesResponse {
    pub sites: Vec<SiteEntry>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InspectResponse {
    pub is_indexed: bool,
    pub coverage_state: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_verdict: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UsageResponse {
    pub usage: Usage,
    pub limits: &'static FeatureSet,
    pub plan: PlanId,
}

#[derive(Debug, Deserialize)]
pub struct LogQuery {
    pub channel: Option<OperationType>,
    pub status: Option<IndexingStatus>,
    pub limit: Option<i64>,
    pub ending_before: Option<DateTime<Utc>>,
    pub starting_after: Option<DateTime<Utc>>,
}
