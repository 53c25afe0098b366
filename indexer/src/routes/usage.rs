use std::sync::Arc;

use actix_web::{Responder, get, web};
use common::{
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use db::dtos::indexing_log::LogFilter;
use sqlx::PgPool;

use crate::dtos::indexing::{LogQuery, UsageResponse};

/// Today's counters next to the plan limits they are measured against.
///
/// # Output
/// - Success: `{ usage: { gscRequestsToday, ... }, limits: { gscRequestsPerDay, ... }, plan }`
/// - Error: 404 if the user has no subscription record
#[get("/usage")]
pub async fn get_usage(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let sub = db::subscription::get_subscription_by_user_id(&***pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    let usage = db::usage::load_or_create(&pool, claims.user_id).await?;

    Success::ok(UsageResponse {
        usage,
        limits: sub.plan.features(),
        plan: sub.plan,
    })
}

/// Audit trail of submitted URLs, newest first.
///
/// # Input
/// - `query`: optional `channel`, `status`, `limit` (1..=500, default 50),
///   `ending_before` and `starting_after` (RFC 3339) cursors
#[get("/logs")]
pub async fn get_logs(
    claims: web::ReqData<JwtClaims>,
    query: web::Query<LogQuery>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let query = query.into_inner();
    let logs = db::indexing_log::get_logs(
        &***pool,
        LogFilter {
            user_id: claims.user_id,
            channel: query.channel,
            status: query.status,
            limit: query.limit,
            ending_before: query.ending_before,
            starting_after: query.starting_after,
        },
    )
    .await?;

    Success::ok(serde_json::json!({ "logs": logs }))
}
