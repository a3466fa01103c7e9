//! Remote-state taxonomy: classification tables and the sub-payment
//! aggregator.

pub mod aggregate;
pub mod classify;

pub use self::{
    aggregate::{AggregateOutcome, PaymentTally, AGGREGATE_PRIORITY},
    classify::{
        classify_order, classify_payment, RemoteState, StatusSubject, ORDER_STATE_PRIORITY,
        PAYMENT_STATE_PRIORITY,
    },
};
