use std::time::Duration;

use common::{env_config::ProviderConfig, error::Res};

/// Shared HTTP client for the indexing providers.
///
/// Every outbound call inherits the configured timeout, so a hung provider
/// cannot hold a request open indefinitely.
#[derive(Clone)]
pub struct ProviderClient {
    pub(crate) http: reqwest::Client,
    pub(crate) endpoints: ProviderConfig,
}

impl ProviderClient {
    pub fn new(config: &ProviderConfig) -> Res<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            endpoints: config.clone(),
        })
    }

    /// Delay between two URLs of the same batch.
    pub fn pacing(&self) -> Duration {
        Duration::from_millis(self.endpoints.pacing_ms)
    }
}

/// Best human-readable message from a failed Google API response.
///
/// Google wraps errors as `{"error": {"code", "message", "status"}}`; other
/// bodies are passed through trimmed.
pub(crate) fn google_error_message(status: reqwest::StatusCode, body: &str) -> String {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.trim().chars().take(200).collect());

    if message.is_empty() {
        format!("Google API returned {}", status)
    } else {
        format!("Google API returned {}: {}", status, message)
    }
}

#[cfg(test)]
mod tests {
    use reqwest::StatusCode;

    use super::*;

    #[test]
    fn google_error_envelope_is_unwrapped() {
        let body = r#"{"error":{"code":403,"message":"Permission denied. Failed to verify the URL ownership.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            google_error_message(StatusCode::FORBIDDEN, body),
            "Google API returned 403 Forbidden: Permission denied. Failed to verify the URL ownership."
        );
    }

    #[test]
    fn empty_body_still_names_the_status() {
        assert_eq!(
            google_error_message(StatusCode::TOO_MANY_REQUESTS, ""),
            "Google API returned 429 Too Many Requests"
        );
    }
}
