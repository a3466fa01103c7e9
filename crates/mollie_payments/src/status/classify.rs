//! Ordered classification of remote resources.
//!
//! The provider's predicates are not mutually exclusive (a settled pay-later
//! payment is both paid and authorized), so each resource is reduced to
//! exactly one [`RemoteState`] by walking an explicit priority table and
//! taking the first predicate that holds. The tables are constants, not
//! code order, and are covered by tests.

use mollie_api::{MollieOrder, MolliePayment};

/// The closed set of remote states the plugin reacts to.
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
    strum::EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RemoteState {
    Paid,
    Delayed,
    Authorized,
    Open,
    Canceled,
    Expired,
    Failed,
    Completed,
}

/// Which local enumeration a decision writes to.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSubject {
    Order,
    Payment,
}

impl RemoteState {
    /// Whether this state's predicate holds for a payment resource.
    /// `Completed` never does; it exists on orders only.
    pub fn holds_for_payment(self, payment: &MolliePayment) -> bool {
        match self {
            Self::Paid => payment.is_paid(),
            Self::Delayed => payment.is_pending(),
            Self::Authorized => payment.is_authorized(),
            Self::Open => payment.is_open(),
            Self::Canceled => payment.is_canceled(),
            Self::Expired => payment.is_expired(),
            Self::Failed => payment.is_failed(),
            Self::Completed => false,
        }
    }

    /// Whether this state's predicate holds for an order resource. Orders
    /// expose only the four coarse states of [`ORDER_STATE_PRIORITY`].
    pub fn holds_for_order(self, order: &MollieOrder) -> bool {
        match self {
            Self::Paid => order.is_paid(),
            Self::Authorized => order.is_authorized(),
            Self::Canceled => order.is_canceled(),
            Self::Completed => order.is_completed(),
            Self::Delayed | Self::Open | Self::Expired | Self::Failed => false,
        }
    }
}

/// Classification order for payment resources: first hit wins.
pub const PAYMENT_STATE_PRIORITY: [RemoteState; 7] = [
    RemoteState::Paid,
    RemoteState::Delayed,
    RemoteState::Authorized,
    RemoteState::Open,
    RemoteState::Canceled,
    RemoteState::Expired,
    RemoteState::Failed,
];

/// Classification order for order resources, with the local enumeration
/// each state is allowed to touch. Cancellation and completion of a whole
/// order may move the local *order* status; the paid/authorized states only
/// ever move the payment status.
pub const ORDER_STATE_PRIORITY: [(RemoteState, StatusSubject); 4] = [
    (RemoteState::Paid, StatusSubject::Payment),
    (RemoteState::Authorized, StatusSubject::Payment),
    (RemoteState::Canceled, StatusSubject::Order),
    (RemoteState::Completed, StatusSubject::Order),
];

/// Reduces a payment resource to one state, or None when no predicate holds
/// (the caller then falls back to the order-level view).
pub fn classify_payment(payment: &MolliePayment) -> Option<RemoteState> {
    PAYMENT_STATE_PRIORITY
        .into_iter()
        .find(|state| state.holds_for_payment(payment))
}

/// Reduces an order resource to one state and the subject it may write to.
pub fn classify_order(order: &MollieOrder) -> Option<(RemoteState, StatusSubject)> {
    ORDER_STATE_PRIORITY
        .into_iter()
        .find(|(state, _)| state.holds_for_order(order))
}

#[cfg(test)]
mod tests {
    use mollie_api::resources::{OrderStatus, PaymentStatus};
    use time::OffsetDateTime;

    use super::*;

    fn payment(status: PaymentStatus, paid: bool) -> MolliePayment {
        MolliePayment {
            status,
            paid_at: paid.then(OffsetDateTime::now_utc),
            ..Default::default()
        }
    }

    fn order(status: OrderStatus) -> MollieOrder {
        MollieOrder {
            status,
            ..Default::default()
        }
    }

    #[test]
    fn payment_priority_table_lists_every_payment_state_once() {
        for state in PAYMENT_STATE_PRIORITY {
            assert_eq!(
                PAYMENT_STATE_PRIORITY
                    .iter()
                    .filter(|other| **other == state)
                    .count(),
                1
            );
        }
        assert!(!PAYMENT_STATE_PRIORITY.contains(&RemoteState::Completed));
    }

    #[test]
    fn ambiguous_payment_flags_resolve_to_paid() {
        // A settled pay-later payment reports authorized *and* carries a
        // paid timestamp; paid must win.
        let payment = payment(PaymentStatus::Authorized, true);
        assert!(payment.is_authorized());
        assert!(payment.is_paid());
        assert_eq!(classify_payment(&payment), Some(RemoteState::Paid));
    }

    #[test]
    fn single_flag_payments_classify_to_their_state() {
        let cases = [
            (PaymentStatus::Pending, RemoteState::Delayed),
            (PaymentStatus::Authorized, RemoteState::Authorized),
            (PaymentStatus::Open, RemoteState::Open),
            (PaymentStatus::Canceled, RemoteState::Canceled),
            (PaymentStatus::Expired, RemoteState::Expired),
            (PaymentStatus::Failed, RemoteState::Failed),
        ];
        for (status, expected) in cases {
            assert_eq!(classify_payment(&payment(status, false)), Some(expected));
        }
        assert_eq!(
            classify_payment(&payment(PaymentStatus::Paid, true)),
            Some(RemoteState::Paid)
        );
    }

    #[test]
    fn order_classification_tags_the_subject() {
        assert_eq!(
            classify_order(&order(OrderStatus::Paid)),
            Some((RemoteState::Paid, StatusSubject::Payment))
        );
        assert_eq!(
            classify_order(&order(OrderStatus::Canceled)),
            Some((RemoteState::Canceled, StatusSubject::Order))
        );
        assert_eq!(
            classify_order(&order(OrderStatus::Completed)),
            Some((RemoteState::Completed, StatusSubject::Order))
        );
        assert_eq!(classify_order(&order(OrderStatus::Created)), None);
        assert_eq!(classify_order(&order(OrderStatus::Expired)), None);
    }
}
