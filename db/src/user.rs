use common::error::{AppError, Res};
use sqlx::{Executor, Postgres};
use uuid::Uuid;

use crate::{dtos::user::UserUpsertRequest, models::user::User};

pub async fn get_user_by_id<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    user_id: Uuid,
) -> Res<User> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(executor)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

/// Inserts the user or refreshes the profile fields of an existing one.
pub async fn upsert_user<'e, E: Executor<'e, Database = Postgres>>(
    executor: E,
    data: UserUpsertRequest,
) -> Res<User> {
    sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, name, image, google_id)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET
            name = EXCLUDED.name,
            image = EXCLUDED.image,
            google_id = EXCLUDED.google_id,
            updated_at = now()
        RETURNING *
        "#,
    )
    .bind(data.email)
    .bind(data.name)
    .bind(data.image)
    .bind(data.google_id)
    .fetch_one(executor)
    .await
    .map_err(AppError::from)
}
