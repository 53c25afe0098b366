use crate::{
    dtos::indexing_log::{LogCreateRequest, LogFilter},
    models::indexing_log::IndexingLog,
};
use common::error::{AppError, Res};
use sqlx::{Executor, Postgres, QueryBuilder};

const MAX_PAGE: i64 = 500;

pub async fn get_logs<'e, E>(executor: E, filter: LogFilter) -> Res<Vec<IndexingLog>>
where
    E: Executor<'e, Database = Postgres>,
{
    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM indexing_logs WHERE user_id = ");
    qb.push_bind(filter.user_id);

    if let Some(channel) = filter.channel {
        qb.push(" AND channel = ").push_bind(channel);
    }

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }

    if let Some(ending_before) = filter.ending_before {
        qb.push(" AND created_at < ").push_bind(ending_before);
    }

    if let Some(starting_after) = filter.starting_after {
        qb.push(" AND created_at > ").push_bind(starting_after);
    }

    qb.push(" ORDER BY created_at DESC LIMIT ")
        .push_bind(filter.limit.unwrap_or(50).clamp(1, MAX_PAGE));

    let query = qb.build_query_as::<IndexingLog>();

    query.fetch_all(executor).await.map_err(AppError::from)
}

pub async fn insert_log<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    log: LogCreateRequest,
) -> Res<IndexingLog> {
    sqlx::query_as::<_, IndexingLog>(
        "INSERT INTO indexing_logs (user_id, url, channel, status, message)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING *",
    )
    .bind(log.user_id)
    .bind(&log.url)
    .bind(log.channel)
    .bind(log.status)
    .bind(log.message)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
