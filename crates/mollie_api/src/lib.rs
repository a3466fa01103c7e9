//! Typed client for the Mollie Orders and Payments APIs.
//!
//! Resources expose remote state exclusively through boolean predicates
//! backed by closed status enums; callers never compare raw status strings.
//! The [`client::MollieGateway`] trait is the seam consumed by the plugin
//! core, with [`client::MollieClient`] as the HTTP implementation.

pub mod client;
pub mod consts;
pub mod errors;
pub mod requests;
pub mod resources;
pub mod types;

pub use self::{
    client::{MollieClient, MollieGateway},
    errors::{ApiError, ApiResult},
    requests::{OrderAddress, OrderLineRequest, OrderRequest, PaymentParameters, PaymentRequest},
    resources::{MollieOrder, MolliePayment, OrderStatus, PaymentStatus, Shipment},
    types::{Amount, Currency, Locale, OrderId, OrderLineId, OrderLineKind, PaymentId, PaymentMethod, ShipmentId},
};
