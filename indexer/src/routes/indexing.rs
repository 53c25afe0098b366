use std::sync::Arc;

use actix_web::{Responder, get, post, web};
use common::{error::Res, http::Success, jwt::JwtClaims};
use sqlx::PgPool;

use crate::{
    dtos::indexing::{GscPublishRequest, IndexNowRequest, InspectRequest, SitesResponse},
    services::{self, client::ProviderClient},
};

/// Submits URLs to the Google Indexing API.
///
/// # Input
/// - `claims`: JWT claims; must carry the Google access token from sign-in
/// - `req`: `{ urls: [...], type?: "URL_UPDATED" | "URL_DELETED" }`
///
/// # Output
/// - Success: a submission report with one result per URL
/// - Error: 400 for an empty or oversized batch, 401 without a Google
///   token, 429 with `{ error, limit, current, upgrade }` when the quota
///   does not cover the whole batch
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/gsc/publish', {
///   method: 'POST',
///   credentials: 'include',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ urls: ['https://example.com/new-post'] })
/// });
///
/// if (response.status === 429) {
///   const { error, limit, current } = await response.json();
///   showUpgradePrompt(error, current, limit);
/// }
/// ```
#[post("/publish")]
pub async fn post_gsc_publish(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<GscPublishRequest>,
    pool: web::Data<Arc<PgPool>>,
    client: web::Data<ProviderClient>,
) -> Res<impl Responder> {
    let report =
        services::submit::submit_to_gsc(&pool, &client, &claims, req.into_inner()).await?;
    Success::ok(report)
}

/// Lists the Search Console properties of the signed-in Google account.
#[get("/sites")]
pub async fn get_gsc_sites(
    claims: web::ReqData<JwtClaims>,
    client: web::Data<ProviderClient>,
) -> Res<impl Responder> {
    let sites = services::gsc::list_sites(&client, claims.google_token()?).await?;
    Success::ok(SitesResponse { sites })
}

/// Checks whether a URL is indexed. Not metered.
///
/// # Input
/// - `req`: `{ url, site_url }`, where `site_url` is the Search Console property
///
/// # Output
/// - Success: `{ isIndexed, coverageState, rawVerdict }`
#[post("/inspect")]
pub async fn post_gsc_inspect(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<InspectRequest>,
    client: web::Data<ProviderClient>,
) -> Res<impl Responder> {
    let inspection =
        services::gsc::inspect(&client, claims.google_token()?, &req.url, &req.site_url).await?;
    Success::ok(inspection)
}

/// Submits URLs of one host to IndexNow.
///
/// # Input
/// - `req`: `{ host, key, urls }`; the key file must be reachable at
///   `https://{host}/{key}.txt`
///
/// # Output
/// - Success: a submission report with one result per URL
/// - Error: 400 for invalid input, 429 when over quota
#[post("/indexnow")]
pub async fn post_indexnow(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<IndexNowRequest>,
    pool: web::Data<Arc<PgPool>>,
    client: web::Data<ProviderClient>,
) -> Res<impl Responder> {
    let report =
        services::submit::submit_to_indexnow(&pool, &client, claims.user_id, req.into_inner())
            .await?;
    Success::ok(report)
}
