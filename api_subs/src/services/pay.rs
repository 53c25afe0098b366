use std::collections::HashMap;

use common::error::{AppError, Res};
use db::models::user::User;
use sqlx::PgPool;
use stripe::{
    BillingPortalSession, CheckoutSession, CheckoutSessionMode, Client,
    CreateBillingPortalSession, CreateCheckoutSession, CreateCheckoutSessionSubscriptionData,
    CustomerId, Event, Webhook,
};

fn parse_customer_id(customer_id: &str) -> Res<CustomerId> {
    customer_id.parse::<CustomerId>().map_err(|e| {
        AppError::Internal(format!(
            "Failed to parse customer id: {}. {}",
            customer_id, e
        ))
    })
}

/// Returns the user's Stripe customer, creating and storing it on first use.
pub async fn get_or_create_customer(pool: &PgPool, client: &Client, user: &User) -> Res<CustomerId> {
    let existing = db::subscription::get_subscription_by_user_id(pool, user.id)
        .await?
        .and_then(|sub| sub.stripe_customer_id);

    if let Some(customer_id) = existing {
        return parse_customer_id(&customer_id);
    }

    let name = user.name.clone().unwrap_or_default();
    log::info!("Creating stripe customer for user {}", user.id);
    let customer = common::stripe::create_customer(client, user.id, &user.email, &name).await?;
    db::subscription::set_customer_id(pool, user.id, customer.id.as_str()).await?;

    Ok(customer.id)
}

/// Creates a subscription checkout session for `price_id`.
///
/// The user id travels as `client_reference_id` and as metadata on both the
/// session and the subscription, so every later webhook can find the user.
pub async fn create_checkout_session(
    client: &Client,
    customer_id: CustomerId,
    user: &User,
    price_id: &str,
    web_app_url: &str,
) -> Res<CheckoutSession> {
    let user_id = user.id.to_string();
    let metadata = HashMap::from([("user_id".to_string(), user_id.clone())]);
    let success_url = format!("{}/dashboard?success=true", web_app_url);
    let cancel_url = format!("{}/pricing?canceled=true", web_app_url);

    let params = CreateCheckoutSession {
        payment_method_types: Some(vec![stripe::CreateCheckoutSessionPaymentMethodTypes::Card]),
        line_items: Some(vec![stripe::CreateCheckoutSessionLineItems {
            price: Some(price_id.to_string()),
            quantity: Some(1),
            ..Default::default()
        }]),
        mode: Some(CheckoutSessionMode::Subscription),
        success_url: Some(success_url.as_str()),
        cancel_url: Some(cancel_url.as_str()),
        customer: Some(customer_id),
        client_reference_id: Some(user_id.as_str()),
        metadata: Some(metadata.clone()),
        subscription_data: Some(CreateCheckoutSessionSubscriptionData {
            metadata: Some(metadata),
            ..Default::default()
        }),
        ..Default::default()
    };
    CheckoutSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates a customer portal session returning to the dashboard.
pub async fn create_portal_session(
    client: &Client,
    customer_id: &str,
    web_app_url: &str,
) -> Res<BillingPortalSession> {
    let return_url = format!("{}/dashboard/billing", web_app_url);
    let mut params = CreateBillingPortalSession::new(parse_customer_id(customer_id)?);
    params.return_url = Some(return_url.as_str());

    BillingPortalSession::create(client, params)
        .await
        .map_err(AppError::from)
}

/// Creates an event for the webhook based on the request payload and signature.
/// Requires a webhook secret key.
pub fn construct_event(payload: &str, signature: &str, webhook_secret: &str) -> Res<Event> {
    match Webhook::construct_event(payload, signature, webhook_secret) {
        Ok(event) => Ok(event),
        Err(e) => {
            log::error!("Error constructing webhook event: {}", e);
            Err(AppError::BadRequest(format!("Webhook Error: {}", e)))
        }
    }
}
