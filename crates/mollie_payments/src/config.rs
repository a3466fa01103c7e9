//! Plugin configuration, supplied by the host at wiring time.

use storefront_models::{LocalOrderStatus, LocalPaymentStatus};

#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Use the Payments API except where the chosen method mandates the
    /// Orders API. When false, every checkout goes through the Orders API.
    pub use_orders_api_only_where_mandatory: bool,

    /// Allow the plugin to move the local *order* status (completed and
    /// cancelled transitions). Payment-status writes are unaffected.
    pub update_order_status: bool,

    /// Forwarded to the host on every status write; the host decides what a
    /// status mail looks like.
    pub send_status_mail: bool,

    /// Local payment status written for authorized remote payments.
    pub authorized_payment_status: LocalPaymentStatus,

    /// Local order status on which pay-later orders are reported as shipped
    /// to the provider.
    pub klarna_ship_on_status: LocalOrderStatus,

    /// Absolute base URL of the shop; redirect and webhook URLs are built
    /// under it.
    pub shop_base_url: String,
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            use_orders_api_only_where_mandatory: false,
            update_order_status: false,
            send_status_mail: false,
            authorized_payment_status: LocalPaymentStatus::Authorized,
            klarna_ship_on_status: LocalOrderStatus::CompletelyDelivered,
            shop_base_url: String::new(),
        }
    }
}
