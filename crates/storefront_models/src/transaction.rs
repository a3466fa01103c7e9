//! Plugin-owned persistence rows.

use mollie_api::types::{OrderId, OrderLineId, PaymentId};
use time::OffsetDateTime;

use crate::records::LocalOrderId;

/// Links a host order to the remote resource created for it. Exactly one of
/// `mollie_order_id` / `mollie_payment_id` is meaningfully set once the
/// transaction has been started.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Transaction {
    pub id: i64,
    pub order_id: Option<LocalOrderId>,
    /// Host-facing reference, also stored on the order (`mollie_<uuid>`).
    pub transaction_number: String,
    pub mollie_order_id: Option<OrderId>,
    pub mollie_payment_id: Option<PaymentId>,
    /// Confirmation-mail template variables captured while the payment was
    /// still open, released once the payment completes.
    pub ordermail_variables: Option<serde_json::Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Insert shape for [`Transaction`]; the store assigns id and timestamp.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct TransactionNew {
    pub order_id: Option<LocalOrderId>,
    pub transaction_number: String,
}

/// One remote order line recorded locally, written once at preparation time.
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OrderLineRow {
    pub id: i64,
    pub order_id: LocalOrderId,
    pub mollie_orderline_id: OrderLineId,
}

/// Insert shape for [`OrderLineRow`].
#[derive(Clone, Debug, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OrderLineNew {
    pub order_id: LocalOrderId,
    pub mollie_orderline_id: OrderLineId,
}
