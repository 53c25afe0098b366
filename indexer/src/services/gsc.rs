use common::error::{AppError, Res};
use limiter::recorder::UrlOutcome;
use serde_json::{Value, json};

use crate::{
    dtos::indexing::{InspectResponse, NotificationType, SiteEntry},
    services::client::{ProviderClient, google_error_message},
};

/// Sends one URL notification to the Google Indexing API.
///
/// Never fails: transport and API errors become an error outcome so the
/// rest of the batch can continue.
pub async fn publish(
    client: &ProviderClient,
    access_token: &str,
    url: &str,
    kind: NotificationType,
) -> UrlOutcome {
    let response = client
        .http
        .post(&client.endpoints.gsc_indexing_endpoint)
        .bearer_auth(access_token)
        .json(&json!({ "url": url, "type": kind }))
        .send()
        .await;

    match response {
        Ok(res) if res.status().is_success() => UrlOutcome::success(url),
        Ok(res) => {
            let status = res.status();
            let body = res.text().await.unwrap_or_default();
            log::warn!("Indexing API rejected {}: {}", url, status);
            UrlOutcome::error(url, google_error_message(status, &body))
        }
        Err(e) => {
            log::warn!("Indexing API call for {} failed: {}", url, e);
            UrlOutcome::error(url, format!("Failed to reach Google: {}", e))
        }
    }
}

/// Lists the Search Console properties the user can access.
pub async fn list_sites(client: &ProviderClient, access_token: &str) -> Res<Vec<SiteEntry>> {
    let res = client
        .http
        .get(format!("{}/sites", client.endpoints.gsc_webmasters_endpoint))
        .bearer_auth(access_token)
        .send()
        .await?;

    let body = read_google_json(res).await?;
    let sites = match body.get("siteEntry") {
        Some(entries) => serde_json::from_value(entries.clone())
            .map_err(|e| AppError::Upstream(format!("Unexpected sites payload: {}", e)))?,
        None => Vec::new(),
    };
    Ok(sites)
}

/// Asks Search Console whether `url` is indexed under `site_url`.
pub async fn inspect(
    client: &ProviderClient,
    access_token: &str,
    url: &str,
    site_url: &str,
) -> Res<InspectResponse> {
    let res = client
        .http
        .post(&client.endpoints.gsc_inspection_endpoint)
        .bearer_auth(access_token)
        .json(&json!({
            "inspectionUrl": url,
            "siteUrl": site_url,
            "languageCode": "en-US",
        }))
        .send()
        .await?;

    let body = read_google_json(res).await?;
    Ok(parse_inspection(&body))
}

pub(crate) fn parse_inspection(body: &Value) -> InspectResponse {
    let index_status = &body["inspectionResult"]["indexStatusResult"];
    let verdict = index_status["verdict"].as_str().map(str::to_string);

    InspectResponse {
        is_indexed: verdict.as_deref() == Some("PASS"),
        coverage_state: index_status["coverageState"]
            .as_str()
            .unwrap_or("Unknown")
            .to_string(),
        raw_verdict: verdict,
    }
}

async fn read_google_json(res: reqwest::Response) -> Res<Value> {
    let status = res.status();
    if status.is_success() {
        return res.json::<Value>().await.map_err(AppError::from);
    }

    let body = res.text().await.unwrap_or_default();
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(AppError::Unauthorized(
            "Google session expired. Please sign in with Google.".to_string(),
        ));
    }
    Err(AppError::Upstream(google_error_message(status, &body)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_verdict_means_indexed() {
        let body = json!({
            "inspectionResult": {
                "indexStatusResult": {
                    "verdict": "PASS",
                    "coverageState": "Submitted and indexed"
                }
            }
        });

        assert_eq!(
            parse_inspection(&body),
            InspectResponse {
                is_indexed: true,
                coverage_state: "Submitted and indexed".to_string(),
                raw_verdict: Some("PASS".to_string()),
            }
        );
    }

    #[test]
    fn missing_result_is_unknown_and_not_indexed() {
        let inspection = parse_inspection(&json!({}));
        assert!(!inspection.is_indexed);
        assert_eq!(inspection.coverage_state, "Unknown");
        assert_eq!(inspection.raw_verdict, None);
    }

    #[test]
    fn neutral_verdict_is_not_indexed() {
        let body = json!({
            "inspectionResult": {
                "indexStatusResult": { "verdict": "NEUTRAL", "coverageState": "Discovered - currently not indexed" }
            }
        });
        assert!(!parse_inspection(&body).is_indexed);
    }
}
