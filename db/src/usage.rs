use chrono::{DateTime, Utc};
use common::{
    error::{AppError, Res},
    misc::OperationType,
};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::models::usage::Usage;

/// Returns the user's usage record, creating it on first need.
///
/// Stale daily/monthly counters are reset and persisted before returning,
/// so callers never see counters from a finished period.
pub async fn load_or_create(pool: &PgPool, user_id: Uuid) -> Res<Usage> {
    load_or_create_at(pool, user_id, Utc::now()).await
}

pub async fn load_or_create_at(pool: &PgPool, user_id: Uuid, now: DateTime<Utc>) -> Res<Usage> {
    let mut tx = pool.begin().await?;
    let usage = lock_reconciled(&mut *tx, user_id, now).await?;
    tx.commit().await?;
    Ok(usage)
}

/// Adds `count` successful `op` submissions to the user's counters.
///
/// Runs as one transaction holding the row lock, so concurrent commits for
/// the same user serialize instead of overwriting each other.
pub async fn commit(pool: &PgPool, user_id: Uuid, op: OperationType, count: u32) -> Res<Usage> {
    commit_at(pool, user_id, op, count, Utc::now()).await
}

pub async fn commit_at(
    pool: &PgPool,
    user_id: Uuid,
    op: OperationType,
    count: u32,
    now: DateTime<Utc>,
) -> Res<Usage> {
    let mut tx = pool.begin().await?;
    let mut usage = lock_reconciled(&mut *tx, user_id, now).await?;
    usage.apply(op, count);
    store(&mut *tx, &usage).await?;
    tx.commit().await?;
    Ok(usage)
}

/// Creates the record if missing, then locks and reconciles it.
async fn lock_reconciled(
    conn: &mut PgConnection,
    user_id: Uuid,
    now: DateTime<Utc>,
) -> Res<Usage> {
    sqlx::query(
        "INSERT INTO usage (user_id, last_reset_date, last_monthly_reset)
         VALUES ($1, $2, $2)
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let mut usage = sqlx::query_as::<_, Usage>("SELECT * FROM usage WHERE user_id = $1 FOR UPDATE")
        .bind(user_id)
        .fetch_one(&mut *conn)
        .await?;

    let reset = usage.reconcile(now);
    if reset.any() {
        log::debug!(
            "Reset usage for user {} (daily: {}, monthly: {})",
            user_id,
            reset.daily,
            reset.monthly
        );
        store(conn, &usage).await?;
    }

    Ok(usage)
}

async fn store(conn: &mut PgConnection, usage: &Usage) -> Res<()> {
    sqlx::query(
        "UPDATE usage SET
            gsc_requests_today = $2,
            index_now_requests_today = $3,
            urls_indexed_today = $4,
            gsc_requests_this_month = $5,
            urls_indexed_this_month = $6,
            total_gsc_requests = $7,
            total_urls_indexed = $8,
            last_reset_date = $9,
            last_monthly_reset = $10
         WHERE user_id = $1",
    )
    .bind(usage.user_id)
    .bind(usage.gsc_requests_today)
    .bind(usage.index_now_requests_today)
    .bind(usage.urls_indexed_today)
    .bind(usage.gsc_requests_this_month)
    .bind(usage.urls_indexed_this_month)
    .bind(usage.total_gsc_requests)
    .bind(usage.total_urls_indexed)
    .bind(usage.last_reset_date)
    .bind(usage.last_monthly_reset)
    .execute(conn)
    .await
    .map_err(AppError::from)?;

    Ok(())
}

/// Inserts an empty record for a new user; no-op if one exists.
pub async fn ensure_usage<'e, E: sqlx::Executor<'e, Database = sqlx::Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query("INSERT INTO usage (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(executor)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::dtos::user::UserUpsertRequest;

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, d, h, 0, 0).unwrap()
    }

    async fn new_user(pool: &PgPool) -> Uuid {
        crate::user::upsert_user(
            pool,
            UserUpsertRequest {
                email: "owner@example.com".to_string(),
                name: None,
                image: None,
                google_id: None,
            },
        )
        .await
        .unwrap()
        .id
    }

    #[sqlx::test]
    async fn first_load_creates_a_zeroed_record(pool: PgPool) {
        let user_id = new_user(&pool).await;
        let now = at(14, 9);

        let usage = load_or_create_at(&pool, user_id, now).await.unwrap();

        assert_eq!(usage, Usage::new(user_id, now));
    }

    #[sqlx::test]
    async fn same_day_loads_change_nothing(pool: PgPool) {
        let user_id = new_user(&pool).await;
        commit_at(&pool, user_id, OperationType::Gsc, 3, at(14, 9))
            .await
            .unwrap();

        let first = load_or_create_at(&pool, user_id, at(14, 12)).await.unwrap();
        let second = load_or_create_at(&pool, user_id, at(14, 23)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(second.gsc_requests_today, 3);
        assert_eq!(second.last_reset_date, at(14, 9));
    }

    #[sqlx::test]
    async fn commits_survive_midnight_only_in_monthly_and_lifetime_counters(pool: PgPool) {
        let user_id = new_user(&pool).await;
        commit_at(&pool, user_id, OperationType::Gsc, 9, at(14, 9))
            .await
            .unwrap();
        let usage = commit_at(&pool, user_id, OperationType::Gsc, 1, at(14, 22))
            .await
            .unwrap();
        assert_eq!(usage.gsc_requests_today, 10);

        let next_day = load_or_create_at(&pool, user_id, at(15, 0)).await.unwrap();

        assert_eq!(next_day.gsc_requests_today, 0);
        assert_eq!(next_day.urls_indexed_today, 0);
        assert_eq!(next_day.gsc_requests_this_month, 10);
        assert_eq!(next_day.total_gsc_requests, 10);
        assert_eq!(next_day.last_reset_date, at(15, 0));
        assert_eq!(next_day.last_monthly_reset, at(14, 9));
    }
}
