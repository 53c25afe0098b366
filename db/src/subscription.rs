use common::{
    error::{AppError, Res},
    misc::SubscriptionStatus,
};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{
    dtos::subscription::{SubscriptionActivation, SubscriptionUpdate},
    models::subscription::Subscription,
};

pub async fn get_subscription_by_user_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<Option<Subscription>> {
    sqlx::query_as::<_, Subscription>("SELECT * FROM subscriptions WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await
        .map_err(AppError::from)
}

/// Creates the default FREE/INACTIVE subscription; no-op if one exists.
pub async fn ensure_default_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<()> {
    sqlx::query(
        "INSERT INTO subscriptions (user_id, plan, status)
         VALUES ($1, 'FREE', 'INACTIVE')
         ON CONFLICT (user_id) DO NOTHING",
    )
    .bind(user_id)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn set_customer_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
    customer_id: &str,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions (user_id, plan, status, stripe_customer_id)
         VALUES ($1, 'FREE', 'INACTIVE', $2)
         ON CONFLICT (user_id) DO UPDATE
            SET stripe_customer_id = EXCLUDED.stripe_customer_id, updated_at = now()
         RETURNING *",
    )
    .bind(user_id)
    .bind(customer_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Marks the user's subscription ACTIVE after a completed checkout.
pub async fn activate_subscription<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionActivation,
) -> Res<Subscription> {
    sqlx::query_as::<_, Subscription>(
        "INSERT INTO subscriptions (
            user_id, plan, status, stripe_customer_id, stripe_subscription_id,
            stripe_price_id, current_period_start, current_period_end
         )
         VALUES ($1, $2, 'ACTIVE', $3, $4, $5, $6, $7)
         ON CONFLICT (user_id) DO UPDATE SET
            plan = EXCLUDED.plan,
            status = 'ACTIVE',
            stripe_customer_id = COALESCE(EXCLUDED.stripe_customer_id, subscriptions.stripe_customer_id),
            stripe_subscription_id = EXCLUDED.stripe_subscription_id,
            stripe_price_id = EXCLUDED.stripe_price_id,
            current_period_start = EXCLUDED.current_period_start,
            current_period_end = EXCLUDED.current_period_end,
            updated_at = now()
         RETURNING *",
    )
    .bind(data.user_id)
    .bind(data.plan)
    .bind(data.stripe_customer_id)
    .bind(data.stripe_subscription_id)
    .bind(data.stripe_price_id)
    .bind(data.current_period_start)
    .bind(data.current_period_end)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}

/// Applies a Stripe-side change. Returns the number of rows touched.
pub async fn update_by_stripe_subscription_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: SubscriptionUpdate,
) -> Res<u64> {
    let result = sqlx::query(
        "UPDATE subscriptions SET
            plan = $2,
            stripe_price_id = COALESCE($3, stripe_price_id),
            status = $4,
            current_period_start = COALESCE($5, current_period_start),
            current_period_end = COALESCE($6, current_period_end),
            updated_at = now()
         WHERE stripe_subscription_id = $1",
    )
    .bind(data.stripe_subscription_id)
    .bind(data.plan)
    .bind(data.stripe_price_id)
    .bind(data.status)
    .bind(data.current_period_start)
    .bind(data.current_period_end)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

pub async fn set_status_by_stripe_subscription_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
    status: SubscriptionStatus,
    period: Option<(chrono::DateTime<chrono::Utc>, chrono::DateTime<chrono::Utc>)>,
) -> Res<u64> {
    let (start, end) = period.unzip();
    let result = sqlx::query(
        "UPDATE subscriptions SET
            status = $2,
            current_period_start = COALESCE($3, current_period_start),
            current_period_end = COALESCE($4, current_period_end),
            updated_at = now()
         WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .bind(status)
    .bind(start)
    .bind(end)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Subscription ended on Stripe: back to FREE, status CANCELED.
pub async fn cancel_by_stripe_subscription_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    stripe_subscription_id: &str,
) -> Res<u64> {
    let result = sqlx::query(
        "UPDATE subscriptions SET plan = 'FREE', status = 'CANCELED', updated_at = now()
         WHERE stripe_subscription_id = $1",
    )
    .bind(stripe_subscription_id)
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}
