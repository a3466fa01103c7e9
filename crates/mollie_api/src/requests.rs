//! Request bodies for creating remote resources.

use crate::types::{Amount, Locale, OrderLineKind, PaymentMethod};

/// Address block attached to an order creation request.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderAddress {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub given_name: String,
    pub family_name: String,
    pub email: String,
    pub street_and_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street_additional: Option<String>,
    pub postal_code: String,
    pub city: String,
    pub country: String,
}

/// One line of an order creation request. Rates are serialized as strings
/// with two decimals, the same convention as [`Amount::value`].
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    #[serde(rename = "type")]
    pub kind: OrderLineKind,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Amount,
    pub total_amount: Amount,
    pub vat_rate: String,
    pub vat_amount: Amount,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// Method-specific parameters nested under an order creation request.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentParameters {
    pub webhook_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}

/// Body of `POST /v2/orders`.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub amount: Amount,
    pub order_number: String,
    pub lines: Vec<OrderLineRequest>,
    pub billing_address: OrderAddress,
    pub shipping_address: OrderAddress,
    pub redirect_url: String,
    pub webhook_url: String,
    pub locale: Locale,
    pub method: PaymentMethod,
    pub payment: PaymentParameters,
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /v2/payments`.
#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: Amount,
    pub description: String,
    pub method: PaymentMethod,
    pub redirect_url: String,
    pub webhook_url: String,
    pub locale: Locale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,
}
