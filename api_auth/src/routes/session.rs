use std::sync::Arc;

use actix_session::Session;
use actix_web::{Responder, get, post, web};
use common::{
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{dtos::auth::AuthResponse, services};

/// Retrieves current session data for the signed-in user from session cookies.
///
/// # Input
/// - `session`: The user's session containing authentication data
/// - `pool`: Database connection pool
///
/// # Output
/// - Success: Returns JSON with user data and token
/// - Error: Returns 401 Unauthorized if no valid session exists
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/auth/session', {
///   credentials: 'include' // Important for sending session cookies
/// });
///
/// if (response.ok) {
///   const { token, user } = await response.json();
/// } else if (response.status === 401) {
///   window.location.href = '/login';
/// }
/// ```
#[get("/session")]
pub async fn get_session(session: Session, pool: web::Data<Arc<PgPool>>) -> Res<impl Responder> {
    let user_id = session
        .get::<Uuid>("user_id")
        .map_err(|_| AppError::BadRequest("Session user error".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No user data found".to_string()))?;
    let token = session
        .get::<String>("token")
        .map_err(|_| AppError::BadRequest("Session token error".to_string()))?
        .ok_or_else(|| AppError::Unauthorized("No session token found".to_string()))?;

    let user = services::user::get_user_by_id(&pool, user_id).await?;
    Success::ok(AuthResponse { token, user })
}

/// Clears the session cookie.
#[post("/logout")]
pub async fn post_logout(session: Session) -> Res<impl Responder> {
    session.purge();
    Success::ok(serde_json::json!({ "success": true }))
}

/// Endpoint to retrieve the current authenticated user's information.
///
/// # Input
/// - `claims`: The JWT claims extracted from the authentication token, containing the user ID
/// - `pool`: A database connection pool for retrieving user data
///
/// # Output
/// - Success: Returns a JSON object with the user's profile information
/// - Error: Returns 401 Unauthorized if no valid token is provided or 404 Not Found if user doesn't exist
#[get("/me")]
pub async fn get_me(
    claims: web::ReqData<JwtClaims>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let pg_pool: &PgPool = &**pool;
    let user = services::user::get_user_by_id(pg_pool, claims.user_id).await?;
    Success::ok(user)
}
