use common::{
    env_config::StripePrices,
    error::{AppError, Res},
    misc::SubscriptionStatus,
};
use db::dtos::subscription::{SubscriptionActivation, SubscriptionUpdate};
use sqlx::PgPool;
use stripe::{
    CheckoutSession, Client, Event, EventObject, EventType, Expandable, Invoice, Subscription,
    SubscriptionId,
};
use uuid::Uuid;

use crate::misc::pay::{ends_subscription, map_status, plan_for_price, to_datetime};

/// Applies a verified Stripe event to the local subscription state.
///
/// Events for unknown subscriptions are acknowledged and ignored, Stripe
/// retries anything that returns an error.
pub async fn process_webhook_event(
    pool: &PgPool,
    client: &Client,
    prices: &StripePrices,
    event: Event,
) -> Res<()> {
    log::info!("Processing webhook event: {}", event.type_);

    match (event.type_, event.data.object) {
        (EventType::CheckoutSessionCompleted, EventObject::CheckoutSession(session)) => {
            on_checkout_completed(pool, client, prices, session).await
        }
        (EventType::InvoicePaymentSucceeded, EventObject::Invoice(invoice)) => {
            on_invoice_paid(pool, client, invoice).await
        }
        (EventType::InvoicePaymentFailed, EventObject::Invoice(invoice)) => {
            on_invoice_failed(pool, invoice).await
        }
        (EventType::CustomerSubscriptionDeleted, EventObject::Subscription(subscription)) => {
            let touched =
                db::subscription::cancel_by_stripe_subscription_id(pool, subscription.id.as_str())
                    .await?;
            log_touched("canceled", subscription.id.as_str(), touched);
            Ok(())
        }
        (EventType::CustomerSubscriptionUpdated, EventObject::Subscription(subscription)) => {
            on_subscription_updated(pool, prices, subscription).await
        }
        (event_type, _) => {
            log::info!("Unhandled event type: {}", event_type);
            Ok(())
        }
    }
}

async fn on_checkout_completed(
    pool: &PgPool,
    client: &Client,
    prices: &StripePrices,
    session: CheckoutSession,
) -> Res<()> {
    let Some(user_id) = checkout_user_id(&session) else {
        log::warn!("Checkout session {} carries no user id", session.id);
        return Ok(());
    };
    let Some(subscription_id) = session.subscription.as_ref().map(Expandable::id) else {
        log::warn!("Checkout session {} has no subscription", session.id);
        return Ok(());
    };

    let subscription = retrieve_subscription(client, &subscription_id).await?;
    let price_id = subscription_price_id(&subscription);
    let plan = price_id
        .as_deref()
        .map(|id| plan_for_price(prices, id))
        .unwrap_or(common::plan::PlanId::Starter);

    let activated = db::subscription::activate_subscription(
        pool,
        SubscriptionActivation {
            user_id,
            stripe_customer_id: session.customer.as_ref().map(|c| c.id().to_string()),
            stripe_subscription_id: subscription_id.to_string(),
            stripe_price_id: price_id,
            plan,
            current_period_start: to_datetime(subscription.current_period_start),
            current_period_end: to_datetime(subscription.current_period_end),
        },
    )
    .await?;

    log::info!("Activated {} for user {}", activated.plan, user_id);
    Ok(())
}

async fn on_invoice_paid(pool: &PgPool, client: &Client, invoice: Invoice) -> Res<()> {
    let Some(subscription_id) = invoice.subscription.as_ref().map(Expandable::id) else {
        return Ok(());
    };

    let subscription = retrieve_subscription(client, &subscription_id).await?;
    let period = to_datetime(subscription.current_period_start)
        .zip(to_datetime(subscription.current_period_end));

    let touched = db::subscription::set_status_by_stripe_subscription_id(
        pool,
        subscription_id.as_str(),
        SubscriptionStatus::Active,
        period,
    )
    .await?;
    log_touched("renewed", subscription_id.as_str(), touched);
    Ok(())
}

async fn on_invoice_failed(pool: &PgPool, invoice: Invoice) -> Res<()> {
    let Some(subscription_id) = invoice.subscription.as_ref().map(Expandable::id) else {
        return Ok(());
    };

    let touched = db::subscription::set_status_by_stripe_subscription_id(
        pool,
        subscription_id.as_str(),
        SubscriptionStatus::PastDue,
        None,
    )
    .await?;
    log_touched("marked past due", subscription_id.as_str(), touched);
    Ok(())
}

async fn on_subscription_updated(
    pool: &PgPool,
    prices: &StripePrices,
    subscription: Subscription,
) -> Res<()> {
    if ends_subscription(subscription.status) {
        let touched =
            db::subscription::cancel_by_stripe_subscription_id(pool, subscription.id.as_str())
                .await?;
        log_touched("canceled", subscription.id.as_str(), touched);
        return Ok(());
    }

    let price_id = subscription_price_id(&subscription);
    let plan = price_id
        .as_deref()
        .map(|id| plan_for_price(prices, id))
        .unwrap_or(common::plan::PlanId::Starter);

    let touched = db::subscription::update_by_stripe_subscription_id(
        pool,
        SubscriptionUpdate {
            stripe_subscription_id: subscription.id.to_string(),
            stripe_price_id: price_id,
            plan,
            status: map_status(subscription.status),
            current_period_start: to_datetime(subscription.current_period_start),
            current_period_end: to_datetime(subscription.current_period_end),
        },
    )
    .await?;
    log_touched("updated", subscription.id.as_str(), touched);
    Ok(())
}

async fn retrieve_subscription(client: &Client, id: &SubscriptionId) -> Res<Subscription> {
    Subscription::retrieve(client, id, &[])
        .await
        .map_err(AppError::from)
}

fn checkout_user_id(session: &CheckoutSession) -> Option<Uuid> {
    session
        .client_reference_id
        .as_deref()
        .or_else(|| {
            session
                .metadata
                .as_ref()
                .and_then(|m| m.get("user_id"))
                .map(String::as_str)
        })
        .and_then(|id| Uuid::parse_str(id).ok())
}

fn subscription_price_id(subscription: &Subscription) -> Option<String> {
    subscription
        .items
        .data
        .first()
        .and_then(|item| item.price.as_ref())
        .map(|price| price.id.to_string())
}

fn log_touched(action: &str, subscription_id: &str, rows: u64) {
    if rows == 0 {
        log::warn!("No local subscription for {}, nothing {}", subscription_id, action);
    } else {
        log::info!("Subscription {} {}", subscription_id, action);
    }
}
