use actix_web::{HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    env_config::JwtConfig,
    error::{AppError, Res},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub email: String,
    /// Google OAuth access token used for Search Console calls.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_access_token: Option<String>,
    pub exp: usize,
}

pub struct ClaimsSpec {
    pub user_id: Uuid,
    pub email: String,
    pub google_access_token: Option<String>,
}

/// Generates JWT token based on user object and JWT configuration options
pub fn generate_jwt(spec: ClaimsSpec, config: &JwtConfig) -> Res<String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(config.expiration_hours))
        .ok_or_else(|| AppError::Internal("Invalid token expiration".to_string()))?
        .timestamp();

    let claims = JwtClaims {
        user_id: spec.user_id,
        email: spec.email,
        google_access_token: spec.google_access_token,
        exp: expiration as usize,
    };

    jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(AppError::from)
}

/// Extracts claims object from JWT token.
/// Requires JWT secret.
pub fn validate_jwt(token: &str, secret: &str) -> Res<JwtClaims> {
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}

/// Claims stored on the request by the auth middleware, if any.
pub fn get_jwt_claims(req: &HttpRequest) -> Option<JwtClaims> {
    req.extensions().get::<JwtClaims>().cloned()
}

impl JwtClaims {
    /// Google access token or 401 when the user signed in without Google.
    pub fn google_token(&self) -> Res<&str> {
        self.google_access_token.as_deref().ok_or_else(|| {
            AppError::Unauthorized("Please sign in with Google.".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(secret: &str) -> JwtConfig {
        JwtConfig {
            secret: secret.to_string(),
            expiration_hours: 1,
        }
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let token = generate_jwt(
            ClaimsSpec {
                user_id: Uuid::new_v4(),
                email: "owner@example.com".to_string(),
                google_access_token: None,
            },
            &config("a-secret-that-is-long-enough-for-tests"),
        )
        .unwrap();

        assert!(validate_jwt(&token, "another-secret-that-is-long-enough").is_err());
    }

    #[test]
    fn google_token_is_required_for_search_console() {
        let claims = JwtClaims {
            user_id: Uuid::new_v4(),
            email: "owner@example.com".to_string(),
            google_access_token: None,
            exp: 0,
        };
        assert!(matches!(claims.google_token(), Err(AppError::Unauthorized(_))));
    }
}
