use std::sync::Arc;

use actix_web::{HttpRequest, Responder, post, web};
use common::{
    env_config::Config,
    error::{AppError, Res},
    http::Success,
    jwt::JwtClaims,
    plan::PlanId,
    stripe,
};
use sqlx::PgPool;

use crate::{
    dtos::sub::{CheckoutRequest, SessionUrlResponse},
    misc::pay::price_for_plan,
    services,
};

/// Handles Stripe webhook events that drive the subscription lifecycle.
///
/// # Input
/// - `payload`: Raw string containing the webhook event data
/// - `req`: HTTP request containing Stripe signature in headers
/// - `config`: Application configuration with webhook secret and price ids
///
/// # Output
/// - Success: Returns 200 OK when webhook is processed successfully
/// - Error: Returns 400 Bad Request for invalid signature or 500 for processing errors
///
/// # Note
/// This endpoint is called by Stripe's servers, not by the dashboard.
/// Configure `https://yourapp.com/api/pay/webhook` in the Stripe Dashboard
/// and set the signing secret as STRIPE_WEBHOOK_SECRET.
///
/// # Event Types Handled
/// - checkout.session.completed: activates the purchased plan
/// - invoice.payment_succeeded: marks the subscription active for the new period
/// - invoice.payment_failed: marks the subscription past due
/// - customer.subscription.updated: syncs plan, status and billing period
/// - customer.subscription.deleted: falls back to the free plan
#[post("/webhook")]
pub async fn post_webhook(
    payload: String,
    req: HttpRequest,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let signature = match req.headers().get("stripe-signature") {
        Some(signature) => signature.to_str().unwrap_or(""),
        None => return Err(AppError::BadRequest("Stripe signature missing".to_string())),
    };

    let event = services::pay::construct_event(&payload, signature, &config.stripe_webhook_secret)?;
    let client = stripe::create_client(&config.stripe_secret_key);
    services::webhook::process_webhook_event(&pool, &client, &config.stripe_prices, event).await?;

    Success::ok(serde_json::json!({ "received": true }))
}

/// Creates a subscription checkout session for the authenticated user.
///
/// # Input
/// - `claims`: JWT claims of the authenticated user
/// - `req`: JSON payload with the Stripe `price_id` of the chosen plan
///
/// # Output
/// - Success: Returns a JSON object with the URL of the Stripe Checkout page
/// - Error: Returns 400 Bad Request if the price is not one of the paid plans
///
/// # Frontend Example
/// ```javascript
/// const response = await fetch('/api/dashboard/billing/checkout', {
///   method: 'POST',
///   credentials: 'include',
///   headers: { 'Content-Type': 'application/json' },
///   body: JSON.stringify({ price_id: "price_1234567890" })
/// });
///
/// if (response.ok) {
///   const data = await response.json();
///   window.location.href = data.url;
/// }
/// ```
#[post("/checkout")]
pub async fn post_checkout(
    claims: web::ReqData<JwtClaims>,
    req: web::Json<CheckoutRequest>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let price_id = req.price_id.trim();
    let is_known_price = PlanId::ALL
        .iter()
        .any(|plan| price_for_plan(&config.stripe_prices, *plan) == Some(price_id));
    if !is_known_price {
        return Err(AppError::BadRequest(format!("Unknown price: {}", price_id)));
    }

    let user = db::user::get_user_by_id(&***pool, claims.user_id).await?;
    let client = stripe::create_client(&config.stripe_secret_key);
    let customer_id = services::pay::get_or_create_customer(&pool, &client, &user).await?;

    let session = services::pay::create_checkout_session(
        &client,
        customer_id,
        &user,
        price_id,
        &config.web_app_url,
    )
    .await?;

    let url = session
        .url
        .ok_or_else(|| AppError::Internal("Checkout session has no URL".to_string()))?;
    Success::created(SessionUrlResponse { url })
}

/// Opens the Stripe customer portal for managing payment methods and cancellation.
///
/// # Output
/// - Success: Returns a JSON object with the portal URL
/// - Error: Returns 400 Bad Request if the user never started a checkout
#[post("/portal")]
pub async fn post_portal(
    claims: web::ReqData<JwtClaims>,
    config: web::Data<Arc<Config>>,
    pool: web::Data<Arc<PgPool>>,
) -> Res<impl Responder> {
    let customer_id = db::subscription::get_subscription_by_user_id(&***pool, claims.user_id)
        .await?
        .and_then(|sub| sub.stripe_customer_id)
        .ok_or_else(|| AppError::BadRequest("No billing account found".to_string()))?;

    let client = stripe::create_client(&config.stripe_secret_key);
    let session =
        services::pay::create_portal_session(&client, &customer_id, &config.web_app_url).await?;

    Success::ok(SessionUrlResponse { url: session.url })
}
