use common::{
    error::{AppError, Res},
    jwt::JwtClaims,
    misc::{OperationType, Provider},
};
use limiter::{
    quota,
    recorder::{self, UrlOutcome},
};
use sqlx::PgPool;
use url::Url;
use uuid::Uuid;

use crate::{
    dtos::indexing::{GscPublishRequest, IndexNowRequest, SubmissionReport, UrlResult},
    services::{client::ProviderClient, gsc, indexnow},
};

/// Trims, drops blanks and duplicates, and rejects anything that is not an
/// absolute http(s) URL.
pub fn normalize_urls(urls: &[String]) -> Res<Vec<String>> {
    let mut normalized: Vec<String> = Vec::with_capacity(urls.len());

    for raw in urls.iter().map(|u| u.trim()).filter(|u| !u.is_empty()) {
        let parsed =
            Url::parse(raw).map_err(|_| AppError::BadRequest(format!("Invalid URL: {}", raw)))?;
        if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
            return Err(AppError::BadRequest(format!("Invalid URL: {}", raw)));
        }
        if !normalized.iter().any(|u| u == raw) {
            normalized.push(raw.to_string());
        }
    }

    if normalized.is_empty() {
        return Err(AppError::BadRequest("No URLs provided".to_string()));
    }
    Ok(normalized)
}

/// IndexNow keys are 8 to 128 characters of `a-z`, `A-Z`, `0-9` and `-`,
/// and every URL must live on the submitted host. The host is a bare
/// hostname; ports are rejected.
pub fn validate_indexnow(host: &str, key: &str, urls: &[String]) -> Res<()> {
    if host.is_empty() || host.contains('/') {
        return Err(AppError::BadRequest(format!("Invalid host: {}", host)));
    }
    if host.contains(':') {
        return Err(AppError::BadRequest(format!(
            "Host must not include a port: {}",
            host
        )));
    }

    let key_ok = (8..=128).contains(&key.len())
        && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
    if !key_ok {
        return Err(AppError::BadRequest("Invalid IndexNow key".to_string()));
    }

    for url in urls {
        let url_host = Url::parse(url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_lowercase));
        if url_host.as_deref() != Some(host) {
            return Err(AppError::BadRequest(format!(
                "URL {} does not belong to host {}",
                url, host
            )));
        }
    }
    Ok(())
}

/// Runs every pre-flight check of a batch and returns the metered operation.
///
/// The subscription is read once by the quota check, which decides standing,
/// bulk permission, batch size and the daily counter in that order. Nothing
/// is reserved; the quota is consumed only when outcomes are recorded.
async fn authorize_batch(
    pool: &PgPool,
    user_id: Uuid,
    provider: Provider,
    url_count: usize,
) -> Res<OperationType> {
    let op = OperationType::for_batch(provider, url_count);
    let count = u32::try_from(url_count).unwrap_or(u32::MAX);
    quota::check_usage_limit(pool, user_id, op, count)
        .await?
        .into_result()?;

    Ok(op)
}

fn report(op: OperationType, outcomes: Vec<UrlOutcome>) -> SubmissionReport {
    let succeeded = recorder::successes(&outcomes);
    let submitted = outcomes.len();

    SubmissionReport {
        operation: op,
        submitted,
        succeeded,
        failed: u32::try_from(submitted).unwrap_or(u32::MAX) - succeeded,
        results: outcomes
            .into_iter()
            .map(|o| UrlResult {
                url: o.url,
                status: o.status,
                message: o.message,
            })
            .collect(),
    }
}

/// Publishes each URL to the Google Indexing API, one paced call per URL.
pub async fn submit_to_gsc(
    pool: &PgPool,
    client: &ProviderClient,
    claims: &JwtClaims,
    req: GscPublishRequest,
) -> Res<SubmissionReport> {
    let access_token = claims.google_token()?;
    let urls = normalize_urls(&req.urls)?;
    let op = authorize_batch(pool, claims.user_id, Provider::Gsc, urls.len()).await?;

    let pacer = limiter::pacer::Pacer::new(client.pacing());
    let mut outcomes = Vec::with_capacity(urls.len());
    for url in &urls {
        pacer.wait().await;
        outcomes.push(gsc::publish(client, access_token, url, req.notification_type).await);
    }

    recorder::record_outcomes(pool, claims.user_id, op, &outcomes).await;
    let report = report(op, outcomes);
    log::info!(
        "User {} submitted {} URLs to Google ({} ok)",
        claims.user_id,
        report.submitted,
        report.succeeded
    );
    Ok(report)
}

/// Submits the batch to IndexNow in a single call.
pub async fn submit_to_indexnow(
    pool: &PgPool,
    client: &ProviderClient,
    user_id: Uuid,
    req: IndexNowRequest,
) -> Res<SubmissionReport> {
    let host = req.host.trim().to_lowercase();
    let key = req.key.trim();
    let urls = normalize_urls(&req.urls)?;
    validate_indexnow(&host, key, &urls)?;
    let op = authorize_batch(pool, user_id, Provider::IndexNow, urls.len()).await?;

    let result = indexnow::submit(client, &indexnow::payload(&host, key, &urls)).await;
    let outcomes: Vec<UrlOutcome> = match result {
        Ok(()) => urls.iter().map(UrlOutcome::success).collect(),
        Err(message) => urls
            .iter()
            .map(|url| UrlOutcome::error(url, message.clone()))
            .collect(),
    };

    recorder::record_outcomes(pool, user_id, op, &outcomes).await;
    let report = report(op, outcomes);
    log::info!(
        "User {} submitted {} URLs to IndexNow ({} ok)",
        user_id,
        report.submitted,
        report.succeeded
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use common::misc::IndexingStatus;

    use super::*;

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn urls_are_trimmed_and_deduplicated() {
        let normalized = normalize_urls(&urls(&[
            " https://example.com/a ",
            "",
            "https://example.com/a",
            "https://example.com/b",
        ]))
        .unwrap();

        assert_eq!(normalized, urls(&["https://example.com/a", "https://example.com/b"]));
    }

    #[test]
    fn empty_batch_is_rejected() {
        assert!(matches!(normalize_urls(&[]), Err(AppError::BadRequest(_))));
        assert!(matches!(normalize_urls(&urls(&["  "])), Err(AppError::BadRequest(_))));
    }

    #[test]
    fn non_http_urls_are_rejected() {
        for bad in ["ftp://example.com/a", "example.com/a", "mailto:owner@example.com"] {
            assert!(
                matches!(normalize_urls(&urls(&[bad])), Err(AppError::BadRequest(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn indexnow_urls_must_match_the_host() {
        let key = "0123456789abcdef";
        assert!(validate_indexnow("example.com", key, &urls(&["https://example.com/a"])).is_ok());
        assert!(validate_indexnow("example.com", key, &urls(&["https://other.com/a"])).is_err());
        assert!(validate_indexnow("example.com", "short", &urls(&["https://example.com/a"])).is_err());
        assert!(
            validate_indexnow("example.com", "bad key with spaces", &urls(&["https://example.com/a"]))
                .is_err()
        );
    }

    #[test]
    fn indexnow_host_with_port_is_rejected() {
        let key = "0123456789abcdef";
        let result =
            validate_indexnow("example.com:8080", key, &urls(&["https://example.com:8080/a"]));
        assert!(
            matches!(result, Err(AppError::BadRequest(message)) if message.contains("port"))
        );
    }

    #[test]
    fn report_counts_partial_failures() {
        let report = report(
            OperationType::BulkGsc,
            vec![
                UrlOutcome::success("https://example.com/a"),
                UrlOutcome::error("https://example.com/b", "Permission denied"),
                UrlOutcome::success("https://example.com/c"),
            ],
        );

        assert_eq!(report.submitted, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.results[1].status, IndexingStatus::Error);
        assert_eq!(report.results[1].message.as_deref(), Some("Permission denied"));
    }
}
