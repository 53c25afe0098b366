use chrono::{DateTime, Utc};
use common::misc::{IndexingStatus, OperationType};
use serde::Serialize;
use uuid::Uuid;

#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct IndexingLog {
    pub id: Uuid,
    pub user_id: Uuid,
    pub url: String,
    pub channel: OperationType,
    pub status: IndexingStatus,
    pub message: Option<String>,
    pub created_at: DateTime<Utc>,
}
