//! Error taxonomy of the plugin core.

use storefront_models::StorageResult;

pub type CoreResult<T> = error_stack::Result<T, PaymentsError>;

#[derive(Debug, thiserror::Error)]
pub enum PaymentsError {
    /// A remote fetch or create failed; the attempt is simply over, local
    /// state is untouched and the next trigger retries naturally.
    #[error("failed to reach the payments provider")]
    RemoteFetch,

    #[error("no transaction recorded for order {order_id}")]
    MissingTransaction { order_id: i64 },

    #[error("transaction for order {order_id} carries no usable remote reference")]
    MissingRemoteReference { order_id: i64 },

    #[error("the created resource has no checkout URL")]
    MissingCheckoutUrl,

    #[error("payment method `{method}` is not offered by this plugin")]
    UnsupportedPaymentMethod { method: String },

    #[error("currency `{currency}` is not supported by the payments provider")]
    UnsupportedCurrency { currency: String },

    #[error("order {id} could not be found at the payments provider")]
    OrderNotFoundAtProvider { id: String },

    #[error("the order is already completed at the payments provider")]
    OrderAlreadyCompleted,

    #[error("the order doesn't seem to be paid or authorized")]
    OrderNotShippable,

    #[error("the order can't be shipped")]
    ShipmentRejected,

    #[error("invalid plugin configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("storage operation failed")]
    Storage,
}

/// Maps storage failures into the core taxonomy, keeping "row does not
/// exist" distinguishable from "store is broken".
pub(crate) trait StorageErrorExt<T> {
    fn or_payments_error(self, not_found: PaymentsError) -> CoreResult<T>;
}

impl<T> StorageErrorExt<T> for StorageResult<T> {
    fn or_payments_error(self, not_found: PaymentsError) -> CoreResult<T> {
        self.map_err(|report| {
            if report.current_context().is_not_found() {
                report.change_context(not_found)
            } else {
                report.change_context(PaymentsError::Storage)
            }
        })
    }
}
