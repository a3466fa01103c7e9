//! The host platform's own status enumerations.

/// Order state as the storefront tracks it.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum LocalOrderStatus {
    #[default]
    Open,
    InProcess,
    Completed,
    PartiallyDelivered,
    CompletelyDelivered,
    CancelledRejected,
}

/// Payment state as the storefront tracks it, distinct from the order state.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
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
pub enum LocalPaymentStatus {
    #[default]
    Open,
    Delayed,
    Authorized,
    PartiallyPaid,
    CompletelyPaid,
    ProcessCancelled,
    ReviewNecessary,
}
