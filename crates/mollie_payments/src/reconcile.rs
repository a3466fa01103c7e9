//! The reconciliation engine: fetch remote state, classify, apply the local
//! status change.
//!
//! Every entry point applies at most one decision and tolerates being
//! invoked again for the same remote event: the status funnel always writes
//! (no compare-against-current), and the local applier is required to treat
//! a write of the current value as a no-op.

use error_stack::{report, ResultExt};
use mollie_api::{MollieOrder, MolliePayment, PaymentId};
use storefront_models::{LocalOrder, LocalOrderStatus, LocalPaymentStatus, Transaction};
use tracing::instrument;

use crate::{
    context::PluginContext,
    errors::{CoreResult, PaymentsError, StorageErrorExt},
    status::{classify_order, classify_payment, PaymentTally, RemoteState, StatusSubject},
};

/// One applied status decision.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct StatusDecision {
    pub state: RemoteState,
    pub subject: StatusSubject,
}

/// What a reconciliation entry point concluded.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReconcileOutcome {
    /// A decision was reached and pushed through the status funnel.
    Applied(StatusDecision),
    /// Remote state was inspected but matched no decision (mixed or unknown
    /// sub-payment states); nothing was written.
    NoDecision,
    /// The remote side could not be consulted; nothing was written and a
    /// later trigger will retry.
    RemoteUnavailable,
}

impl ReconcileOutcome {
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }
}

/// Reconciles against the remote *order* resource's own coarse state.
///
/// Remote fetch failures propagate to the caller here; triggers that must
/// not fail wrap this in [`crate::triggers`].
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn check_order_status(
    ctx: &PluginContext,
    order: &LocalOrder,
) -> CoreResult<ReconcileOutcome> {
    let _guard = ctx.lock_order(order.id).await;
    let transaction = latest_transaction(ctx, order).await?;
    let mollie_order = fetch_order(ctx, order, &transaction).await?;

    match classify_order(&mollie_order) {
        Some((state, subject)) => {
            let decision = StatusDecision { state, subject };
            apply_status(ctx, order, decision).await?;
            Ok(ReconcileOutcome::Applied(decision))
        }
        None => Ok(ReconcileOutcome::NoDecision),
    }
}

/// Reconciles against a remote *payment* resource: the transaction's
/// payment, or an explicitly supplied one (webhooks name the payment).
///
/// When no payment-level predicate matches, or the checkout went through
/// the Orders API and there is no standalone payment at all, the order's
/// sub-payment aggregate is consulted instead, so a payment-shaped trigger
/// still converges for order-flow checkouts.
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn check_payment_status(
    ctx: &PluginContext,
    order: &LocalOrder,
    payment_id: Option<&PaymentId>,
) -> CoreResult<ReconcileOutcome> {
    let _guard = ctx.lock_order(order.id).await;
    let transaction = latest_transaction(ctx, order).await?;

    let payment_ref = payment_id
        .cloned()
        .or_else(|| transaction.mollie_payment_id.clone());
    let Some(payment_ref) = payment_ref else {
        return reconcile_sub_payments(ctx, order, &transaction).await;
    };

    let payment = fetch_payment(ctx, &payment_ref).await?;
    match classify_payment(&payment) {
        Some(state) => {
            let decision = StatusDecision {
                state,
                subject: StatusSubject::Payment,
            };
            apply_status(ctx, order, decision).await?;
            Ok(ReconcileOutcome::Applied(decision))
        }
        None => reconcile_sub_payments(ctx, order, &transaction).await,
    }
}

/// Reconciles against the aggregate of the remote order's sub-payments.
///
/// A remote fetch failure here is logged and reported as
/// [`ReconcileOutcome::RemoteUnavailable`] rather than an error: this path
/// runs as a best-effort fallback and "no remote data this time" must stay
/// distinguishable from a broken store.
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn check_payment_status_for_order(
    ctx: &PluginContext,
    order: &LocalOrder,
) -> CoreResult<ReconcileOutcome> {
    let _guard = ctx.lock_order(order.id).await;
    let transaction = latest_transaction(ctx, order).await?;
    reconcile_sub_payments(ctx, order, &transaction).await
}

/// Read-only uniformity check: do 100% of the order's sub-payments satisfy
/// `state`? Never writes local status.
#[instrument(skip_all, fields(order_id = %order.id, state = %state))]
pub async fn is_order_payments_status(
    ctx: &PluginContext,
    order: &LocalOrder,
    state: RemoteState,
) -> CoreResult<bool> {
    let transaction = latest_transaction(ctx, order).await?;
    let mollie_order = fetch_order(ctx, order, &transaction).await?;
    Ok(PaymentTally::tally(mollie_order.payments()).is_uniform(state))
}

async fn reconcile_sub_payments(
    ctx: &PluginContext,
    order: &LocalOrder,
    transaction: &Transaction,
) -> CoreResult<ReconcileOutcome> {
    let Some(remote_order_id) = transaction.mollie_order_id.as_ref() else {
        tracing::warn!(
            order_id = %order.id,
            "transaction holds no remote order, sub-payment state unavailable"
        );
        return Ok(ReconcileOutcome::RemoteUnavailable);
    };

    let mollie_order = match ctx.gateway.get_order(remote_order_id, true).await {
        Ok(mollie_order) => mollie_order,
        Err(error) => {
            tracing::warn!(
                order_id = %order.id,
                remote_order_id = %remote_order_id,
                ?error,
                "remote order unavailable, skipping reconciliation attempt"
            );
            return Ok(ReconcileOutcome::RemoteUnavailable);
        }
    };

    match PaymentTally::tally(mollie_order.payments()).outcome() {
        Some(outcome) => {
            let decision = StatusDecision {
                state: outcome.into(),
                subject: StatusSubject::Payment,
            };
            apply_status(ctx, order, decision).await?;
            Ok(ReconcileOutcome::Applied(decision))
        }
        None => Ok(ReconcileOutcome::NoDecision),
    }
}

/// The single funnel for local status writes.
///
/// Deliberately not idempotency-checked: every recognized decision issues
/// its local write unconditionally, and the applier must be safe to call
/// with a status equal to the current one.
pub(crate) async fn apply_status(
    ctx: &PluginContext,
    order: &LocalOrder,
    decision: StatusDecision,
) -> CoreResult<()> {
    let send_mail = ctx.config.send_status_mail;
    match (decision.state, decision.subject) {
        (RemoteState::Completed, StatusSubject::Order) => {
            if ctx.config.update_order_status {
                ctx.store
                    .set_order_status(
                        order.id,
                        LocalOrderStatus::Completed,
                        send_mail,
                    )
                    .await
                    .change_context(PaymentsError::Storage)?;
            }
        }
        (RemoteState::Paid, _) => {
            ctx.store
                .set_payment_status(order.id, LocalPaymentStatus::CompletelyPaid, send_mail)
                .await
                .change_context(PaymentsError::Storage)?;
            release_ordermail_variables(ctx, order).await;
        }
        (RemoteState::Authorized, _) => {
            ctx.store
                .set_payment_status(order.id, ctx.config.authorized_payment_status, send_mail)
                .await
                .change_context(PaymentsError::Storage)?;
            release_ordermail_variables(ctx, order).await;
        }
        (RemoteState::Delayed, _) => {
            ctx.store
                .set_payment_status(order.id, LocalPaymentStatus::Delayed, send_mail)
                .await
                .change_context(PaymentsError::Storage)?;
        }
        (RemoteState::Open, _) => {
            ctx.store
                .set_payment_status(order.id, LocalPaymentStatus::Open, send_mail)
                .await
                .change_context(PaymentsError::Storage)?;
        }
        (RemoteState::Canceled, StatusSubject::Order) => {
            if ctx.config.update_order_status {
                ctx.store
                    .set_order_status(
                        order.id,
                        LocalOrderStatus::CancelledRejected,
                        send_mail,
                    )
                    .await
                    .change_context(PaymentsError::Storage)?;
            }
        }
        (RemoteState::Canceled, StatusSubject::Payment)
        | (RemoteState::Failed | RemoteState::Expired, StatusSubject::Payment) => {
            ctx.store
                .set_payment_status(order.id, LocalPaymentStatus::ProcessCancelled, send_mail)
                .await
                .change_context(PaymentsError::Storage)?;
        }
        // Failure states never move the order enumeration, and completion
        // is an order-level concept only.
        (RemoteState::Failed | RemoteState::Expired, StatusSubject::Order)
        | (RemoteState::Completed, StatusSubject::Payment) => {}
    }
    Ok(())
}

/// Hands captured confirmation-mail variables to the host mailer exactly
/// once a payment turns out paid or authorized. Failures are logged, never
/// propagated: mail must not break reconciliation.
async fn release_ordermail_variables(ctx: &PluginContext, order: &LocalOrder) {
    let Some(mailer) = ctx.mailer.as_ref() else {
        return;
    };
    let transaction = match ctx
        .store
        .find_most_recent_transaction_for_order(order.id)
        .await
    {
        Ok(transaction) => transaction,
        Err(_) => return,
    };
    let Some(variables) = transaction.ordermail_variables.clone() else {
        return;
    };

    mailer.send_confirmation(order, variables).await;

    let cleared = Transaction {
        ordermail_variables: None,
        ..transaction
    };
    if let Err(error) = ctx.store.update_transaction(cleared).await {
        tracing::warn!(order_id = %order.id, ?error, "failed to clear released mail variables");
    }
}

async fn latest_transaction(ctx: &PluginContext, order: &LocalOrder) -> CoreResult<Transaction> {
    ctx.store
        .find_most_recent_transaction_for_order(order.id)
        .await
        .or_payments_error(PaymentsError::MissingTransaction {
            order_id: order.id.get(),
        })
}

async fn fetch_order(
    ctx: &PluginContext,
    order: &LocalOrder,
    transaction: &Transaction,
) -> CoreResult<MollieOrder> {
    let remote_order_id = transaction.mollie_order_id.as_ref().ok_or_else(|| {
        report!(PaymentsError::MissingRemoteReference {
            order_id: order.id.get(),
        })
    })?;
    ctx.gateway
        .get_order(remote_order_id, true)
        .await
        .change_context(PaymentsError::RemoteFetch)
}

async fn fetch_payment(ctx: &PluginContext, payment_id: &PaymentId) -> CoreResult<MolliePayment> {
    ctx.gateway
        .get_payment(payment_id)
        .await
        .change_context(PaymentsError::RemoteFetch)
}
