use serde::Serialize;

use crate::services::client::ProviderClient;

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexNowPayload<'a> {
    pub host: &'a str,
    pub key: &'a str,
    pub key_location: String,
    pub url_list: &'a [String],
}

/// The key file must be served from the root of `host`.
pub fn payload<'a>(host: &'a str, key: &'a str, urls: &'a [String]) -> IndexNowPayload<'a> {
    IndexNowPayload {
        host,
        key,
        key_location: format!("https://{}/{}.txt", host, key),
        url_list: urls,
    }
}

/// Submits the whole batch in one call. The protocol answers for the batch
/// as a whole, so the error message applies to every URL.
pub async fn submit(client: &ProviderClient, payload: &IndexNowPayload<'_>) -> Result<(), String> {
    let response = client
        .http
        .post(&client.endpoints.indexnow_endpoint)
        .header("Content-Type", "application/json; charset=utf-8")
        .json(payload)
        .send()
        .await
        .map_err(|e| format!("Failed to reach IndexNow: {}", e))?;

    let status = response.status();
    if status.is_success() {
        return Ok(());
    }

    let body = response.text().await.unwrap_or_default();
    log::warn!("IndexNow rejected batch for {}: {}", payload.host, status);
    Err(rejection_message(status.as_u16(), &body))
}

fn rejection_message(status: u16, body: &str) -> String {
    let reason = match status {
        400 => "invalid format",
        403 => "key not valid for this host",
        422 => "URLs do not belong to the host or key mismatch",
        429 => "too many requests",
        _ => "",
    };
    let body = body.trim();

    match (reason.is_empty(), body.is_empty()) {
        (true, true) => format!("IndexNow API error: {}", status),
        (true, false) => format!("IndexNow API error: {} {}", status, body),
        (false, true) => format!("IndexNow API error: {} ({})", status, reason),
        (false, false) => format!("IndexNow API error: {} ({}) {}", status, reason, body),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_points_at_the_key_file_on_the_host() {
        let urls = vec![
            "https://example.com/a".to_string(),
            "https://example.com/b".to_string(),
        ];
        let json = serde_json::to_value(payload("example.com", "a1b2c3d4e5", &urls)).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "host": "example.com",
                "key": "a1b2c3d4e5",
                "keyLocation": "https://example.com/a1b2c3d4e5.txt",
                "urlList": ["https://example.com/a", "https://example.com/b"]
            })
        );
    }

    #[test]
    fn known_statuses_are_explained() {
        assert_eq!(
            rejection_message(403, ""),
            "IndexNow API error: 403 (key not valid for this host)"
        );
        assert_eq!(rejection_message(500, "oops "), "IndexNow API error: 500 oops");
    }
}
