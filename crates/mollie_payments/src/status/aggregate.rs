//! Aggregation of sub-payment states under one remote order.

use mollie_api::MolliePayment;

use super::classify::{RemoteState, PAYMENT_STATE_PRIORITY};

/// Outcome of aggregating a remote order's sub-payments. Only produced when
/// every sub-payment satisfies the category's predicate; mixed or empty
/// payment sets yield no outcome at all.
#[derive(
    Clone,
    Copy,
    Debug,
    Eq,
    Hash,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AggregateOutcome {
    Paid,
    Delayed,
    Authorized,
    Canceled,
    Open,
}

impl From<AggregateOutcome> for RemoteState {
    fn from(outcome: AggregateOutcome) -> Self {
        match outcome {
            AggregateOutcome::Paid => Self::Paid,
            AggregateOutcome::Delayed => Self::Delayed,
            AggregateOutcome::Authorized => Self::Authorized,
            AggregateOutcome::Canceled => Self::Canceled,
            AggregateOutcome::Open => Self::Open,
        }
    }
}

/// Resolution order when several categories cover 100% of the payments at
/// once (possible because one payment may satisfy several predicates).
pub const AGGREGATE_PRIORITY: [AggregateOutcome; 5] = [
    AggregateOutcome::Paid,
    AggregateOutcome::Delayed,
    AggregateOutcome::Authorized,
    AggregateOutcome::Canceled,
    AggregateOutcome::Open,
];

/// Per-category counters over one order's sub-payments.
///
/// A payment increments the counter of *every* category whose predicate it
/// satisfies; the counters are deliberately not deduplicated against each
/// other. Failed and expired payments are counted too, so read-only
/// uniformity checks can ask about them even though they never win an
/// aggregate outcome.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PaymentTally {
    total: usize,
    counts: [usize; PAYMENT_STATE_PRIORITY.len()],
}

impl PaymentTally {
    pub fn tally(payments: &[MolliePayment]) -> Self {
        let mut result = Self::default();
        for payment in payments {
            result.total += 1;
            for (slot, state) in result.counts.iter_mut().zip(PAYMENT_STATE_PRIORITY) {
                if state.holds_for_payment(payment) {
                    *slot += 1;
                }
            }
        }
        result
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// Payments satisfying the category's predicate; zero for states that
    /// cannot occur on payments.
    pub fn count(&self, state: RemoteState) -> usize {
        PAYMENT_STATE_PRIORITY
            .iter()
            .position(|category| *category == state)
            .map_or(0, |index| self.counts[index])
    }

    /// True iff there is at least one payment and every payment satisfies
    /// the category's predicate.
    pub fn is_uniform(&self, state: RemoteState) -> bool {
        self.total > 0 && self.count(state) == self.total
    }

    /// The single outcome covering 100% of the payments, if any. An empty
    /// or mixed payment set is a no-decision, not an error.
    pub fn outcome(&self) -> Option<AggregateOutcome> {
        AGGREGATE_PRIORITY
            .into_iter()
            .find(|outcome| self.is_uniform(RemoteState::from(*outcome)))
    }
}
