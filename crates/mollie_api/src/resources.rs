//! Deserialized resource representations.
//!
//! Remote state is only ever consumed through the boolean predicates below.
//! A new provider status therefore surfaces as a new enum variant plus a new
//! predicate, never as a string comparison at a call site.

use time::OffsetDateTime;

use crate::types::{Amount, OrderId, OrderLineId, OrderLineKind, PaymentId, ShipmentId};

/// Lifecycle states of an order resource.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Created,
    Paid,
    Authorized,
    Canceled,
    Shipping,
    Completed,
    Expired,
}

/// Lifecycle states of a payment resource.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Open,
    Canceled,
    Pending,
    Authorized,
    Expired,
    Failed,
    Paid,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Link {
    pub href: String,
    #[serde(rename = "type", default)]
    pub media_type: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Links {
    #[serde(default)]
    pub checkout: Option<Link>,
}

/// One line under a remote order.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    #[serde(rename = "type", default)]
    pub kind: OrderLineKind,
    pub name: String,
    pub quantity: u32,
    #[serde(default)]
    pub unit_price: Option<Amount>,
    #[serde(default)]
    pub total_amount: Option<Amount>,
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Embedded {
    #[serde(default)]
    pub payments: Vec<MolliePayment>,
}

/// A remote order resource, optionally with its sub-payments embedded.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MollieOrder {
    pub id: OrderId,
    #[serde(default)]
    pub order_number: String,
    #[serde(default)]
    pub amount: Amount,
    pub status: OrderStatus,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(rename = "_links", default)]
    pub links: Links,
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

impl MollieOrder {
    pub fn is_created(&self) -> bool {
        self.status == OrderStatus::Created
    }

    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    pub fn is_authorized(&self) -> bool {
        self.status == OrderStatus::Authorized
    }

    pub fn is_canceled(&self) -> bool {
        self.status == OrderStatus::Canceled
    }

    pub fn is_completed(&self) -> bool {
        self.status == OrderStatus::Completed
    }

    pub fn is_expired(&self) -> bool {
        self.status == OrderStatus::Expired
    }

    /// Sub-payments embedded in the fetch, empty when none were requested.
    pub fn payments(&self) -> &[MolliePayment] {
        &self.embedded.payments
    }

    /// Hosted checkout URL the shopper is redirected to.
    pub fn checkout_url(&self) -> Option<&str> {
        self.links.checkout.as_ref().map(|link| link.href.as_str())
    }
}

/// A remote payment resource, standalone or under an order.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MolliePayment {
    pub id: PaymentId,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub amount: Amount,
    pub status: PaymentStatus,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub paid_at: Option<OffsetDateTime>,
    #[serde(rename = "_links", default)]
    pub links: Links,
}

impl MolliePayment {
    /// A payment is paid once the provider stamps `paidAt`; the status field
    /// alone is not authoritative for pay-later methods, which can report an
    /// `authorized` status on an already-settled payment.
    pub fn is_paid(&self) -> bool {
        self.paid_at.is_some()
    }

    pub fn is_open(&self) -> bool {
        self.status == PaymentStatus::Open
    }

    pub fn is_pending(&self) -> bool {
        self.status == PaymentStatus::Pending
    }

    pub fn is_authorized(&self) -> bool {
        self.status == PaymentStatus::Authorized
    }

    pub fn is_canceled(&self) -> bool {
        self.status == PaymentStatus::Canceled
    }

    pub fn is_expired(&self) -> bool {
        self.status == PaymentStatus::Expired
    }

    pub fn is_failed(&self) -> bool {
        self.status == PaymentStatus::Failed
    }

    pub fn checkout_url(&self) -> Option<&str> {
        self.links.checkout.as_ref().map(|link| link.href.as_str())
    }
}

/// A shipment created for a remote order.
#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shipment {
    pub id: ShipmentId,
    pub order_id: OrderId,
    #[serde(default)]
    pub lines: Vec<OrderLine>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
}
