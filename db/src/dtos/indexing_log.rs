use chrono::{DateTime, Utc};
use common::misc::{IndexingStatus, OperationType};
use uuid::Uuid;

pub struct LogCreateRequest {
    pub user_id: Uuid,
    pub url: String,
    pub channel: OperationType,
    pub status: IndexingStatus,
    pub message: Option<String>,
}

pub struct LogFilter {
    pub user_id: Uuid,
    pub channel: Option<OperationType>,
    pub status: Option<IndexingStatus>,
    pub limit: Option<i64>,
    pub ending_before: Option<DateTime<Utc>>,
    pub starting_after: Option<DateTime<Utc>>,
}
