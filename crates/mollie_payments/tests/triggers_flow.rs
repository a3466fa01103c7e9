//! Host trigger handlers: webhooks, backend hooks, mail capture/release.

mod support;

use std::sync::Arc;

use async_trait::async_trait;
use mollie_api::resources::{OrderStatus, PaymentStatus};
use mollie_payments::{
    reconcile::check_payment_status,
    triggers::{
        capture_ordermail_variables, handle_backend_order_saved, handle_payment_webhook,
        MailDisposition,
    },
    ConfirmationMailer, PluginConfig, PluginContext, UrlTarget,
};
use storefront_models::{
    LocalOrder, LocalOrderStatus, LocalPaymentStatus, LocalStatusWrite, MemoryStore,
};
use support::*;
use tokio::sync::Mutex;

#[derive(Default)]
struct RecordingMailer {
    sent: Mutex<Vec<(String, serde_json::Value)>>,
}

#[async_trait]
impl ConfirmationMailer for RecordingMailer {
    async fn send_confirmation(&self, order: &LocalOrder, variables: serde_json::Value) {
        self.sent
            .lock()
            .await
            .push((order.number.clone(), variables));
    }
}

#[tokio::test]
async fn webhook_for_unknown_order_is_swallowed() {
    let h = harness(PluginConfig::default());
    // Must not panic or error; the webhook answer stays neutral.
    handle_payment_webhook(&h.ctx, "99999", None, UrlTarget::Payment).await;
    assert!(h.store.status_writes().await.is_empty());
}

#[tokio::test]
async fn order_webhook_falls_back_to_the_aggregate_when_coarse_state_is_silent() {
    let h = harness(PluginConfig::default());
    let order = local_order(1, "20001");
    h.store.seed_order(order.clone(), vec![]).await;
    link_remote_order(&h.store, &order, "ord_1").await;
    // Remote order still "created" (no coarse predicate), but every
    // sub-payment is paid.
    h.gateway
        .put_order(remote_order(
            "ord_1",
            OrderStatus::Created,
            vec![remote_payment("tr_1", PaymentStatus::Paid, true)],
        ))
        .await;

    handle_payment_webhook(&h.ctx, "20001", None, UrlTarget::Order).await;

    assert_eq!(
        h.store.status_writes().await[0].write,
        LocalStatusWrite::Payment(LocalPaymentStatus::CompletelyPaid)
    );
}

#[tokio::test]
async fn payment_webhook_reconciles_the_named_payment() {
    let h = harness(PluginConfig::default());
    let order = local_order(2, "20002");
    h.store.seed_order(order.clone(), vec![]).await;
    link_remote_payment(&h.store, &order, "tr_other").await;
    h.gateway
        .put_payment(remote_payment("tr_named", PaymentStatus::Paid, true))
        .await;

    handle_payment_webhook(
        &h.ctx,
        "20002",
        Some(&mollie_api::PaymentId::new("tr_named")),
        UrlTarget::Payment,
    )
    .await;

    assert_eq!(
        h.store.status_writes().await[0].write,
        LocalStatusWrite::Payment(LocalPaymentStatus::CompletelyPaid)
    );
}

#[tokio::test]
async fn backend_save_ships_delivered_pay_later_orders() {
    let h = harness(PluginConfig::default());
    let mut order = local_order(3, "20003");
    order.order_status = LocalOrderStatus::CompletelyDelivered;
    h.store.seed_order(order.clone(), vec![]).await;
    link_remote_order(&h.store, &order, "ord_3").await;
    h.gateway
        .put_order(remote_order("ord_3", OrderStatus::Authorized, vec![]))
        .await;

    handle_backend_order_saved(&h.ctx, order.id).await;

    assert_eq!(h.gateway.ship_call_count().await, 1);
}

#[tokio::test]
async fn backend_save_failures_never_escape() {
    let h = harness(PluginConfig::default());
    let mut order = local_order(4, "20004");
    order.order_status = LocalOrderStatus::CompletelyDelivered;
    h.store.seed_order(order.clone(), vec![]).await;
    link_remote_order(&h.store, &order, "ord_4").await;
    // Remote order missing: send_order fails, the trigger swallows it.
    handle_backend_order_saved(&h.ctx, order.id).await;
    assert_eq!(h.gateway.ship_call_count().await, 0);
}

#[tokio::test]
async fn mail_variables_are_captured_once_while_payment_is_open() {
    let h = harness(PluginConfig::default());
    let order = local_order(5, "20005");
    h.store.seed_order(order.clone(), vec![]).await;
    link_remote_payment(&h.store, &order, "tr_5").await;

    let variables = serde_json::json!({"ordernumber": "20005", "sArticles": []});

    let first = capture_ordermail_variables(&h.ctx, "20005", variables.clone()).await;
    assert_eq!(first, MailDisposition::Suppress);

    // Already captured: the host sends its mail normally.
    let second = capture_ordermail_variables(&h.ctx, "20005", variables).await;
    assert_eq!(second, MailDisposition::SendNormally);

    let transactions = h.store.transactions().await;
    assert!(transactions[0].ordermail_variables.is_some());
}

#[tokio::test]
async fn mail_capture_ignores_foreign_and_settled_orders() {
    let h = harness(PluginConfig::default());

    // Not one of ours.
    let mut foreign = local_order(6, "20006");
    foreign.transaction_number = "psp_12345".to_owned();
    h.store.seed_order(foreign, vec![]).await;
    assert_eq!(
        capture_ordermail_variables(&h.ctx, "20006", serde_json::json!({})).await,
        MailDisposition::SendNormally
    );

    // Ours, but the payment is already settled.
    let mut settled = local_order(7, "20007");
    settled.payment_status = LocalPaymentStatus::CompletelyPaid;
    h.store.seed_order(settled.clone(), vec![]).await;
    link_remote_payment(&h.store, &settled, "tr_7").await;
    assert_eq!(
        capture_ordermail_variables(&h.ctx, "20007", serde_json::json!({})).await,
        MailDisposition::SendNormally
    );
}

#[tokio::test]
async fn captured_mail_is_released_once_when_the_payment_settles() {
    let gateway = Arc::new(MockGateway::default());
    let store = Arc::new(MemoryStore::new());
    let mailer = Arc::new(RecordingMailer::default());
    let ctx = PluginContext::new(gateway.clone(), store.clone(), PluginConfig::default())
        .with_mailer(mailer.clone());

    let order = local_order(8, "20008");
    store.seed_order(order.clone(), vec![]).await;
    link_remote_payment(&store, &order, "tr_8").await;

    let variables = serde_json::json!({"ordernumber": "20008"});
    capture_ordermail_variables(&ctx, "20008", variables.clone()).await;

    gateway
        .put_payment(remote_payment("tr_8", PaymentStatus::Paid, true))
        .await;
    check_payment_status(&ctx, &order, None).await.unwrap();

    let sent = mailer.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "20008");
    assert_eq!(sent[0].1, variables);
    drop(sent);

    // Variables are cleared; a provider retry does not resend the mail.
    check_payment_status(&ctx, &order, None).await.unwrap();
    assert_eq!(mailer.sent.lock().await.len(), 1);
}
