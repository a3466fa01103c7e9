//! Host event entry points.
//!
//! Every handler resolves the local order itself, invokes the core, and
//! swallows all failures after logging them: a broken reconciliation or
//! shipment attempt must never block the host action (saving an order,
//! answering a webhook) that triggered it.

use mollie_api::PaymentId;
use storefront_models::{LocalOrderId, LocalPaymentStatus};
use tracing::instrument;

use crate::{
    checkout::{UrlTarget, TRANSACTION_NUMBER_PREFIX},
    context::PluginContext,
    reconcile::{
        check_order_status, check_payment_status, check_payment_status_for_order,
        ReconcileOutcome,
    },
    shipping::ship_order_if_ready,
};

/// What the host should do with the confirmation mail it was about to send.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MailDisposition {
    /// The variables were captured; the mail is sent later, on completion.
    Suppress,
    SendNormally,
}

/// Provider webhook: something changed on the remote resource for
/// `order_number`. Payment-shaped notifications may name the payment.
#[instrument(skip(ctx, payment_id))]
pub async fn handle_payment_webhook(
    ctx: &PluginContext,
    order_number: &str,
    payment_id: Option<&PaymentId>,
    target: UrlTarget,
) {
    let order = match ctx.store.find_order_by_number(order_number).await {
        Ok(order) => order,
        Err(error) => {
            tracing::warn!(order_number, ?error, "webhook for unknown order");
            return;
        }
    };

    let result = match target {
        UrlTarget::Payment => check_payment_status(ctx, &order, payment_id).await,
        UrlTarget::Order => match check_order_status(ctx, &order).await {
            Ok(ReconcileOutcome::NoDecision) => {
                check_payment_status_for_order(ctx, &order).await
            }
            other => other,
        },
    };

    match result {
        Ok(outcome) => {
            tracing::info!(order_number, ?outcome, "webhook reconciliation finished");
        }
        Err(error) => {
            tracing::warn!(order_number, ?error, "webhook reconciliation failed");
        }
    }
}

/// Backend admin saved an order.
pub async fn handle_backend_order_saved(ctx: &PluginContext, order_id: LocalOrderId) {
    ship_trigger(ctx, order_id).await;
}

/// The platform order API processed a PUT for an order.
pub async fn handle_order_api_put(ctx: &PluginContext, order_id: LocalOrderId) {
    ship_trigger(ctx, order_id).await;
}

#[instrument(skip(ctx))]
async fn ship_trigger(ctx: &PluginContext, order_id: LocalOrderId) {
    let order = match ctx.store.find_order_by_id(order_id).await {
        Ok(order) => order,
        Err(error) => {
            tracing::warn!(%order_id, ?error, "ship trigger for unknown order");
            return;
        }
    };

    match ship_order_if_ready(ctx, &order).await {
        Ok(Some(shipment)) => {
            tracing::info!(%order_id, shipment_id = %shipment.id, "order reported as shipped");
        }
        Ok(None) => {
            tracing::debug!(%order_id, "nothing to ship");
        }
        Err(error) => {
            tracing::warn!(%order_id, ?error, "shipment attempt failed");
        }
    }
}

/// The host is about to send the order confirmation mail.
///
/// While our payment is still open the variables are captured on the
/// transaction and the mail is suppressed; it is released through the
/// [`crate::context::ConfirmationMailer`] once the payment completes.
/// Orders that are not ours, or whose mail was already captured, are left
/// alone.
#[instrument(skip(ctx, variables))]
pub async fn capture_ordermail_variables(
    ctx: &PluginContext,
    order_number: &str,
    variables: serde_json::Value,
) -> MailDisposition {
    let order = match ctx.store.find_order_by_number(order_number).await {
        Ok(order) => order,
        Err(error) => {
            tracing::debug!(order_number, ?error, "mail capture for unknown order");
            return MailDisposition::SendNormally;
        }
    };

    if !order
        .transaction_number
        .starts_with(TRANSACTION_NUMBER_PREFIX)
    {
        return MailDisposition::SendNormally;
    }
    if order.payment_status != LocalPaymentStatus::Open {
        return MailDisposition::SendNormally;
    }

    let transaction = match ctx
        .store
        .find_transaction_by_number(&order.transaction_number)
        .await
    {
        Ok(transaction) => transaction,
        Err(error) => {
            tracing::warn!(order_number, ?error, "no transaction for mail capture");
            return MailDisposition::SendNormally;
        }
    };
    if transaction.ordermail_variables.is_some() {
        return MailDisposition::SendNormally;
    }

    let captured = storefront_models::Transaction {
        ordermail_variables: Some(variables),
        ..transaction
    };
    if let Err(error) = ctx.store.update_transaction(captured).await {
        tracing::warn!(order_number, ?error, "failed to capture mail variables");
    }
    MailDisposition::Suppress
}
