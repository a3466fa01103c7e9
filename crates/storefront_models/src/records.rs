//! Order records as the host platform hands them to the plugin.

use std::fmt;

use mollie_api::types::OrderLineKind;
use rust_decimal::Decimal;

use crate::enums::{LocalOrderStatus, LocalPaymentStatus};

/// Primary key of an order row on the host platform.
#[derive(
    Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, serde::Deserialize,
    serde::Serialize,
)]
#[serde(transparent)]
pub struct LocalOrderId(i64);

impl LocalOrderId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocalOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Billing or shipping address attached to an order.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct AddressRecord {
    pub salutation: String,
    pub first_name: String,
    pub last_name: String,
    pub street: String,
    pub additional_address_line: Option<String>,
    pub zip_code: String,
    pub city: String,
    pub country_iso: Option<String>,
}

/// Snapshot of an order as the host platform exposes it to plugins.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct LocalOrder {
    pub id: LocalOrderId,
    pub number: String,
    pub currency: String,
    /// Gross invoice total.
    pub invoice_amount: Decimal,
    /// Gross shipping costs.
    pub invoice_shipping: Decimal,
    /// Net shipping costs.
    pub invoice_shipping_net: Decimal,
    pub tax_free: bool,
    /// Host-side payment method name, e.g. `mollie_ideal`.
    pub payment_method: String,
    /// Host-side transaction reference linking the order to a [`crate::Transaction`].
    pub transaction_number: String,
    pub customer_email: String,
    pub billing_address: AddressRecord,
    pub shipping_address: AddressRecord,
    pub shop_locale: Option<String>,
    pub order_status: LocalOrderStatus,
    pub payment_status: LocalPaymentStatus,
}

/// One position of an order: an article, a discount, a surcharge.
///
/// The shipping fee is NOT part of the detail rows; it lives on the order
/// itself (`invoice_shipping`) and is appended as a synthetic line when the
/// order is prepared for the provider.
#[derive(Clone, Debug, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct OrderDetailRow {
    pub kind: OrderLineKind,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_amount: Decimal,
    pub vat_rate: Decimal,
    pub vat_amount: Decimal,
}
