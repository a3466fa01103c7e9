//! Mollie checkout and payment-status reconciliation for storefront orders.
//!
//! The crate is wired once into a [`context::PluginContext`] (gateway,
//! store, config, optional mailer) and then driven entirely by host events:
//!
//! - checkout creates a local transaction and the matching remote resource
//!   ([`checkout`]),
//! - provider webhooks and backend hooks reconcile remote state into local
//!   order/payment statuses ([`reconcile`], [`triggers`]),
//! - delivered pay-later orders are reported as shipped ([`shipping`]).
//!
//! Reconciliation is safe under repeated and concurrent invocation: entries
//! are serialized per order within the process, at most one decision is
//! applied per entry, and status writes rely on the host applier treating
//! repeat writes of the current value as no-ops.

pub mod checkout;
pub mod config;
pub mod context;
pub mod errors;
pub mod reconcile;
pub mod shipping;
pub mod status;
pub mod triggers;

pub use self::{
    checkout::{CheckoutOptions, StartedCheckout, UrlAction, UrlTarget},
    config::PluginConfig,
    context::{ConfirmationMailer, PluginContext},
    errors::{CoreResult, PaymentsError},
    reconcile::{ReconcileOutcome, StatusDecision},
    status::{AggregateOutcome, PaymentTally, RemoteState, StatusSubject},
    triggers::MailDisposition,
};
