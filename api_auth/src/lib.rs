use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{
    cookie::{Key, SameSite},
    web::{self},
};
use middleware::auth::AuthMiddleware;

pub mod middleware {
    pub mod auth;
}

pub mod routes {
    pub mod auth;
    pub mod session;
}

mod services {
    pub(crate) mod auth;
    pub(crate) mod user;
}

mod dtos {
    pub(crate) mod auth;
}

mod misc {
    pub(crate) mod oauth;
}

/// Validates the dashboard JWT from the `Authorization` header or the session cookie.
pub fn auth_middleware(jwt_secret: &str) -> AuthMiddleware {
    AuthMiddleware::new(jwt_secret.to_string())
}

/// Cookie session holding the token issued after the OAuth callback.
///
/// `secret` must be at least 32 bytes long.
pub fn session_middleware(
    cookie_secure: bool,
    is_production: bool,
    secret: &[u8],
) -> SessionMiddleware<CookieSessionStore> {
    let same_site = if is_production {
        SameSite::None
    } else {
        SameSite::Lax
    };

    SessionMiddleware::builder(CookieSessionStore::default(), Key::derive_from(secret))
        .cookie_name("session".to_string())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(same_site)
        .build()
}

pub fn mount_auth() -> actix_web::Scope {
    web::scope("/auth")
        .service(routes::auth::get_auth_provider)
        .service(routes::auth::get_auth_provider_callback)
        .service(routes::session::get_session)
        .service(routes::session::post_logout)
}

/// Profile of the signed-in user. Register behind the auth middleware.
pub fn mount_user(cfg: &mut web::ServiceConfig) {
    cfg.service(routes::session::get_me);
}
