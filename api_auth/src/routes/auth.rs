use actix_session::Session;
use actix_web::{HttpResponse, Responder, get, http::header::LOCATION, web};
use common::env_config::Config;
use common::error::{AppError, Res};
use common::jwt::{self, ClaimsSpec};
use oauth2::{AuthorizationCode, CsrfToken, Scope, TokenResponse, reqwest};
use sqlx::PgPool;
use std::sync::Arc;

use crate::dtos::auth::OAuthCallbackQuery;
use crate::misc::oauth::OAuthProvider;
use crate::services;

const OAUTH_STATE_KEY: &str = "oauth_state";

/// Initiates OAuth authentication flow with the specified provider.
///
/// # Input
/// - `path`: OAuth provider name (google)
/// - `config`: Application configuration with OAuth settings
/// - `session`: Stores the CSRF state checked by the callback
///
/// # Output
/// - Success: Redirects user to the OAuth provider's consent page
/// - Error: Returns 400 Bad Request for invalid provider names
///
/// # Frontend Example
/// ```javascript
/// // This is a plain link in the dashboard, not an API call
/// function SignInButton() {
///   return <a href="/api/auth/oauth/google">Sign in with Google</a>;
/// }
/// ```
#[get("oauth/{provider}")]
pub async fn get_auth_provider(
    path: web::Path<String>,
    config: web::Data<Arc<Config>>,
    session: Session,
) -> Res<impl Responder> {
    let provider = OAuthProvider::from_str(path.as_str())?;
    let client = services::auth::create_oauth_client(&provider, &config)?;

    // offline access with forced consent so Google always returns the indexing scopes
    let (auth_url, csrf_token) = client
        .authorize_url(CsrfToken::new_random)
        .add_scopes(
            provider
                .get_scopes()
                .into_iter()
                .map(|s| Scope::new(s.to_string())),
        )
        .add_extra_param("access_type", "offline")
        .add_extra_param("prompt", "consent")
        .url();

    session
        .insert(OAUTH_STATE_KEY, csrf_token.secret())
        .map_err(|_| AppError::Internal("Failed to store OAuth state".to_string()))?;

    Ok(HttpResponse::Found()
        .append_header((LOCATION, auth_url.to_string()))
        .finish())
}

/// Handles OAuth callback after user authenticates with the provider.
///
/// # Input
/// - `path`: OAuth provider name (google)
/// - `query`: Query parameters containing the authorization code and state
/// - `config`: Application configuration
/// - `pool`: Database connection pool
/// - `session`: User session for storing authentication data
///
/// # Output
/// - Success: Redirects to the application callback URL with session data set
/// - Error: Returns 401 Unauthorized when the state does not match
///
/// # Note
/// This endpoint is the redirect URL registered with Google, users land here
/// after the consent screen. The first sign-in creates the user together with
/// an empty usage record and the FREE plan.
#[get("oauth/{provider}/callback")]
pub async fn get_auth_provider_callback(
    path: web::Path<String>,
    query: web::Query<OAuthCallbackQuery>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
    session: Session,
) -> Res<impl Responder> {
    let provider = OAuthProvider::from_str(path.as_str())?;

    let expected_state = session
        .remove_as::<String>(OAUTH_STATE_KEY)
        .and_then(Result::ok);
    if expected_state.is_none() || expected_state != query.state {
        return Err(AppError::Unauthorized("Invalid OAuth state".to_string()));
    }

    let client = services::auth::create_oauth_client(&provider, &config)?;
    let pg_pool: &PgPool = &**pool;

    let http_client = reqwest::ClientBuilder::new()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .map_err(|e| AppError::Internal(format!("Failed to build HTTP client. {}", e)))?;

    let token = client
        .exchange_code(AuthorizationCode::new(query.code.clone()))
        .request_async(&http_client)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to exchange code. {}", e)))?;

    let access_token = token.access_token().secret().to_string();
    let user_data = services::auth::fetch_provider_user_data(&provider, &access_token).await?;
    let user = services::user::bootstrap_user(pg_pool, user_data).await?;

    let token = jwt::generate_jwt(
        ClaimsSpec {
            user_id: user.id,
            email: user.email.clone(),
            google_access_token: Some(access_token),
        },
        &config.jwt_config,
    )?;

    session
        .insert("token", &token)
        .map_err(|_| AppError::Internal("Failed to insert token cookie".to_string()))?;
    session
        .insert("user_id", user.id)
        .map_err(|_| AppError::Internal("Failed to insert user cookie".to_string()))?;

    Ok(HttpResponse::Found()
        .append_header((LOCATION, config.web_app_auth_callback_url.as_str()))
        .finish())
}
