use common::{
    env_config::Config,
    error::{AppError, Res},
};
use oauth2::basic::BasicClient;
use oauth2::*;

use crate::{dtos::auth::OAuthUserData, misc::oauth::OAuthProvider};

pub type OAuthClient = BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Create OAuth client object.
///
/// # Arguments
///
/// * `provider` - The OAuth provider.
/// * `config` - The application configuration.
///
/// # Returns
///
/// A `Client` object for the specified OAuth provider, or an error if one of
/// the configured endpoint URLs is malformed.
pub fn create_oauth_client(provider: &OAuthProvider, config: &Config) -> Res<OAuthClient> {
    let provider_client = match provider {
        OAuthProvider::Google => &config.google_client,
    };

    let invalid = |what: &str, e: oauth2::url::ParseError| {
        AppError::Internal(format!("Invalid {} URL for {}: {}", what, provider, e))
    };

    let client_id = ClientId::new(provider_client.client_id.clone());
    let client_secret = ClientSecret::new(provider_client.client_secret.clone());
    let auth_url = AuthUrl::new(provider_client.auth_url.clone())
        .map_err(|e| invalid("authorization endpoint", e))?;
    let token_url =
        TokenUrl::new(provider_client.token_url.clone()).map_err(|e| invalid("token endpoint", e))?;
    let redirect_url = RedirectUrl::new(provider_client.redirect_uri.clone())
        .map_err(|e| invalid("redirect", e))?;

    let client = BasicClient::new(client_id)
        .set_client_secret(client_secret)
        .set_auth_uri(auth_url)
        .set_token_uri(token_url)
        .set_redirect_uri(redirect_url);

    Ok(client)
}

/// Fetches additional user data from providers OAuth API.
pub async fn fetch_provider_user_data(
    provider: &OAuthProvider,
    access_token: &str,
) -> Res<OAuthUserData> {
    match provider {
        OAuthProvider::Google => fetch_google_user_data(access_token).await,
    }
}

async fn fetch_google_user_data(access_token: &str) -> Res<OAuthUserData> {
    let client = reqwest::Client::new();
    let request = client
        .get(GOOGLE_USERINFO_URL)
        .header("Authorization", format!("Bearer {}", access_token));

    let response = request
        .send()
        .await
        .map_err(|e| AppError::Internal(format!("Failed to fetch Google user data: {}", e)))?;

    if response.status().is_success() {
        let google_user: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to parse Google user data: {}", e)))?;

        parse_google_user(&google_user)
    } else {
        Err(AppError::Internal(format!(
            "Google API returned error status: {}",
            response.status()
        )))
    }
}

fn parse_google_user(google_user: &serde_json::Value) -> Res<OAuthUserData> {
    let email = google_user["email"]
        .as_str()
        .filter(|email| !email.is_empty())
        .ok_or_else(|| AppError::Unauthorized("Google account has no email".to_string()))?
        .to_lowercase();

    Ok(OAuthUserData {
        email,
        name: google_user["name"].as_str().map(str::to_string),
        image: google_user["picture"].as_str().map(str::to_string),
        provider_user_id: google_user["sub"].as_str().unwrap_or_default().to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_profile_is_normalized() {
        let user = parse_google_user(&serde_json::json!({
            "sub": "1096",
            "email": "Owner@Example.com",
            "name": "Site Owner",
            "picture": "https://lh3.googleusercontent.com/a/photo"
        }))
        .unwrap();

        assert_eq!(user.email, "owner@example.com");
        assert_eq!(user.name.as_deref(), Some("Site Owner"));
        assert_eq!(user.provider_user_id, "1096");
    }

    #[test]
    fn profile_without_email_is_rejected() {
        let result = parse_google_user(&serde_json::json!({ "sub": "1096" }));
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }
}
