use common::error::Res;
use db::{dtos::user::UserUpsertRequest, models::user::User};
use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::auth::OAuthUserData;

pub async fn get_user_by_id(pool: &PgPool, user_id: Uuid) -> Res<User> {
    db::user::get_user_by_id(pool, user_id).await
}

/// Creates or refreshes the user after a Google sign-in.
///
/// First sign-in also creates the empty usage record and the default
/// FREE/INACTIVE subscription, all in one transaction.
pub async fn bootstrap_user(pool: &PgPool, user_data: OAuthUserData) -> Res<User> {
    let mut tx = pool.begin().await?;

    let user = db::user::upsert_user(
        &mut *tx,
        UserUpsertRequest {
            email: user_data.email,
            name: user_data.name,
            image: user_data.image,
            google_id: Some(user_data.provider_user_id).filter(|id| !id.is_empty()),
        },
    )
    .await?;
    db::usage::ensure_usage(&mut *tx, user.id).await?;
    db::subscription::ensure_default_subscription(&mut *tx, user.id).await?;

    tx.commit().await?;
    log::info!("Signed in user {}", user.id);

    Ok(user)
}
