//! Shipment notification towards the provider.

use error_stack::{report, ResultExt};
use mollie_api::{OrderId, Shipment};
use storefront_models::LocalOrder;
use tracing::instrument;

use crate::{
    context::PluginContext,
    errors::{CoreResult, PaymentsError},
};

/// Reports the remote order as completely shipped.
///
/// Preconditions are checked against fresh remote state: the order must
/// exist, must not already be completed, and must be paid or authorized.
/// Each failure is a distinct domain error; none of them is retried here.
#[instrument(skip(ctx))]
pub async fn send_order(ctx: &PluginContext, mollie_order_id: &OrderId) -> CoreResult<Shipment> {
    let mollie_order = ctx
        .gateway
        .get_order(mollie_order_id, false)
        .await
        .change_context(PaymentsError::OrderNotFoundAtProvider {
            id: mollie_order_id.to_string(),
        })?;

    if !mollie_order.is_paid() && !mollie_order.is_authorized() {
        if mollie_order.is_completed() {
            return Err(report!(PaymentsError::OrderAlreadyCompleted));
        }
        return Err(report!(PaymentsError::OrderNotShippable));
    }

    ctx.gateway
        .ship_order_completely(mollie_order_id)
        .await
        .change_context(PaymentsError::ShipmentRejected)
}

/// Ships the order's remote counterpart when the local order status has
/// reached the configured ship-on status.
///
/// Returns `Ok(None)` when there is nothing to do: the order has no
/// transaction, was checked out through the Payments API (nothing shippable
/// exists remotely), or has not reached the configured status yet.
#[instrument(skip_all, fields(order_id = %order.id))]
pub async fn ship_order_if_ready(
    ctx: &PluginContext,
    order: &LocalOrder,
) -> CoreResult<Option<Shipment>> {
    let _guard = ctx.lock_order(order.id).await;

    let transaction = match ctx
        .store
        .find_most_recent_transaction_for_order(order.id)
        .await
    {
        Ok(transaction) => transaction,
        Err(report) if report.current_context().is_not_found() => return Ok(None),
        Err(report) => return Err(report.change_context(PaymentsError::Storage)),
    };
    let Some(remote_order_id) = transaction.mollie_order_id else {
        return Ok(None);
    };

    if order.order_status != ctx.config.klarna_ship_on_status {
        return Ok(None);
    }

    send_order(ctx, &remote_order_id).await.map(Some)
}
