use std::fmt;

use common::error::{AppError, Res};
use serde::{Deserialize, Serialize};

/// Sign-in providers. Google is the only one: its token is also what
/// authorizes the Search Console and Indexing API calls.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum OAuthProvider {
    Google,
}

impl OAuthProvider {
    /// Returns the OAuth provider as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            OAuthProvider::Google => "google",
        }
    }

    /// Creates an OAuth provider from a string.
    pub fn from_str(s: &str) -> Res<Self> {
        match s {
            "google" => Ok(OAuthProvider::Google),
            ps => Err(AppError::BadRequest(format!("Invalid OAuth provider: {}", ps))),
        }
    }

    /// Returns the scopes for the OAuth provider.
    pub fn get_scopes(&self) -> Vec<&'static str> {
        match self {
            OAuthProvider::Google => vec![
                "openid",
                "email",
                "profile",
                "https://www.googleapis.com/auth/webmasters.readonly",
                "https://www.googleapis.com/auth/indexing",
            ],
        }
    }
}

impl fmt::Display for OAuthProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_requests_indexing_and_search_console_scopes() {
        let scopes = OAuthProvider::Google.get_scopes();
        assert!(scopes.contains(&"https://www.googleapis.com/auth/indexing"));
        assert!(scopes.contains(&"https://www.googleapis.com/auth/webmasters.readonly"));
    }

    #[test]
    fn unknown_provider_is_a_bad_request() {
        assert_eq!(OAuthProvider::from_str("google").unwrap(), OAuthProvider::Google);
        assert!(matches!(
            OAuthProvider::from_str("github"),
            Err(AppError::BadRequest(_))
        ));
    }
}
