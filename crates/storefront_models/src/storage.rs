//! Async storage interfaces the host platform implements.

use async_trait::async_trait;

use crate::{
    enums::{LocalOrderStatus, LocalPaymentStatus},
    records::{LocalOrder, LocalOrderId, OrderDetailRow},
    transaction::{OrderLineNew, OrderLineRow, Transaction, TransactionNew},
};

pub type StorageResult<T> = error_stack::Result<T, StorageError>;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("storage operation failed")]
    Database,
}

impl StorageError {
    /// True when the failure means "no such row" rather than a broken store.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// A single local status write, as issued through [`OrderStatusInterface`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LocalStatusWrite {
    Order(LocalOrderStatus),
    Payment(LocalPaymentStatus),
}

#[async_trait]
pub trait TransactionInterface: Send + Sync {
    async fn insert_transaction(&self, transaction: TransactionNew) -> StorageResult<Transaction>;

    async fn update_transaction(&self, transaction: Transaction) -> StorageResult<Transaction>;

    /// The transaction reconciliation reads: the latest one for the order.
    async fn find_most_recent_transaction_for_order(
        &self,
        order_id: LocalOrderId,
    ) -> StorageResult<Transaction>;

    async fn find_transaction_by_number(&self, number: &str) -> StorageResult<Transaction>;
}

#[async_trait]
pub trait OrderLinesInterface: Send + Sync {
    async fn insert_order_line(&self, line: OrderLineNew) -> StorageResult<OrderLineRow>;

    async fn find_order_lines(&self, order_id: LocalOrderId) -> StorageResult<Vec<OrderLineRow>>;
}

#[async_trait]
pub trait OrderInterface: Send + Sync {
    async fn find_order_by_id(&self, id: LocalOrderId) -> StorageResult<LocalOrder>;

    async fn find_order_by_number(&self, number: &str) -> StorageResult<LocalOrder>;

    async fn find_order_details(&self, id: LocalOrderId) -> StorageResult<Vec<OrderDetailRow>>;
}

/// The host's status-setting primitive.
///
/// Contract: setting a status equal to the current one must be a safe no-op;
/// the reconciliation engine deliberately does not check the current value
/// before writing.
#[async_trait]
pub trait OrderStatusInterface: Send + Sync {
    async fn set_order_status(
        &self,
        id: LocalOrderId,
        status: LocalOrderStatus,
        send_mail: bool,
    ) -> StorageResult<()>;

    async fn set_payment_status(
        &self,
        id: LocalOrderId,
        status: LocalPaymentStatus,
        send_mail: bool,
    ) -> StorageResult<()>;
}

/// Everything the plugin needs from the host, as one object-safe trait.
pub trait StorefrontStore:
    TransactionInterface + OrderLinesInterface + OrderInterface + OrderStatusInterface
{
}

impl<T> StorefrontStore for T where
    T: TransactionInterface + OrderLinesInterface + OrderInterface + OrderStatusInterface
{
}
