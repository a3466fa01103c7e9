//! In-memory implementation of the storage interfaces.
//!
//! Backs the test suites and small demo hosts. Status writes are applied to
//! the stored order (the applier contract: repeat writes of the same value
//! are harmless) and additionally journaled so tests can assert on exactly
//! what was issued.

use std::collections::HashMap;

use async_trait::async_trait;
use error_stack::report;
use time::OffsetDateTime;
use tokio::sync::Mutex;

use crate::{
    enums::{LocalOrderStatus, LocalPaymentStatus},
    records::{LocalOrder, LocalOrderId, OrderDetailRow},
    storage::{
        LocalStatusWrite, OrderInterface, OrderLinesInterface, OrderStatusInterface, StorageError,
        StorageResult, TransactionInterface,
    },
    transaction::{OrderLineNew, OrderLineRow, Transaction, TransactionNew},
};

/// Journal entry for one status write.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusWriteRecord {
    pub order_id: LocalOrderId,
    pub write: LocalStatusWrite,
    pub send_mail: bool,
}

#[derive(Default)]
struct Inner {
    orders: HashMap<LocalOrderId, LocalOrder>,
    order_details: HashMap<LocalOrderId, Vec<OrderDetailRow>>,
    transactions: Vec<Transaction>,
    order_lines: Vec<OrderLineRow>,
    status_writes: Vec<StatusWriteRecord>,
    next_transaction_id: i64,
    next_order_line_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an order together with its detail rows.
    pub async fn seed_order(&self, order: LocalOrder, details: Vec<OrderDetailRow>) {
        let mut inner = self.inner.lock().await;
        inner.order_details.insert(order.id, details);
        inner.orders.insert(order.id, order);
    }

    pub async fn order(&self, id: LocalOrderId) -> Option<LocalOrder> {
        self.inner.lock().await.orders.get(&id).cloned()
    }

    /// Every status write issued so far, in order.
    pub async fn status_writes(&self) -> Vec<StatusWriteRecord> {
        self.inner.lock().await.status_writes.clone()
    }

    pub async fn transactions(&self) -> Vec<Transaction> {
        self.inner.lock().await.transactions.clone()
    }

    pub async fn order_lines(&self) -> Vec<OrderLineRow> {
        self.inner.lock().await.order_lines.clone()
    }
}

#[async_trait]
impl TransactionInterface for MemoryStore {
    async fn insert_transaction(&self, transaction: TransactionNew) -> StorageResult<Transaction> {
        let mut inner = self.inner.lock().await;
        inner.next_transaction_id += 1;
        let row = Transaction {
            id: inner.next_transaction_id,
            order_id: transaction.order_id,
            transaction_number: transaction.transaction_number,
            mollie_order_id: None,
            mollie_payment_id: None,
            ordermail_variables: None,
            created_at: OffsetDateTime::now_utc(),
        };
        inner.transactions.push(row.clone());
        Ok(row)
    }

    async fn update_transaction(&self, transaction: Transaction) -> StorageResult<Transaction> {
        let mut inner = self.inner.lock().await;
        let slot = inner
            .transactions
            .iter_mut()
            .find(|row| row.id == transaction.id)
            .ok_or_else(|| report!(StorageError::NotFound { entity: "transaction" }))?;
        *slot = transaction.clone();
        Ok(transaction)
    }

    async fn find_most_recent_transaction_for_order(
        &self,
        order_id: LocalOrderId,
    ) -> StorageResult<Transaction> {
        let inner = self.inner.lock().await;
        inner
            .transactions
            .iter()
            .filter(|row| row.order_id == Some(order_id))
            .max_by_key(|row| row.id)
            .cloned()
            .ok_or_else(|| report!(StorageError::NotFound { entity: "transaction" }))
    }

    async fn find_transaction_by_number(&self, number: &str) -> StorageResult<Transaction> {
        let inner = self.inner.lock().await;
        inner
            .transactions
            .iter()
            .find(|row| row.transaction_number == number)
            .cloned()
            .ok_or_else(|| report!(StorageError::NotFound { entity: "transaction" }))
    }
}

#[async_trait]
impl OrderLinesInterface for MemoryStore {
    async fn insert_order_line(&self, line: OrderLineNew) -> StorageResult<OrderLineRow> {
        let mut inner = self.inner.lock().await;
        inner.next_order_line_id += 1;
        let row = OrderLineRow {
            id: inner.next_order_line_id,
            order_id: line.order_id,
            mollie_orderline_id: line.mollie_orderline_id,
        };
        inner.order_lines.push(row.clone());
        Ok(row)
    }

    async fn find_order_lines(&self, order_id: LocalOrderId) -> StorageResult<Vec<OrderLineRow>> {
        let inner = self.inner.lock().await;
        Ok(inner
            .order_lines
            .iter()
            .filter(|row| row.order_id == order_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl OrderInterface for MemoryStore {
    async fn find_order_by_id(&self, id: LocalOrderId) -> StorageResult<LocalOrder> {
        self.inner
            .lock()
            .await
            .orders
            .get(&id)
            .cloned()
            .ok_or_else(|| report!(StorageError::NotFound { entity: "order" }))
    }

    async fn find_order_by_number(&self, number: &str) -> StorageResult<LocalOrder> {
        self.inner
            .lock()
            .await
            .orders
            .values()
            .find(|order| order.number == number)
            .cloned()
            .ok_or_else(|| report!(StorageError::NotFound { entity: "order" }))
    }

    async fn find_order_details(&self, id: LocalOrderId) -> StorageResult<Vec<OrderDetailRow>> {
        Ok(self
            .inner
            .lock()
            .await
            .order_details
            .get(&id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl OrderStatusInterface for MemoryStore {
    async fn set_order_status(
        &self,
        id: LocalOrderId,
        status: LocalOrderStatus,
        send_mail: bool,
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(order) = inner.orders.get_mut(&id) {
            order.order_status = status;
        }
        inner.status_writes.push(StatusWriteRecord {
            order_id: id,
            write: LocalStatusWrite::Order(status),
            send_mail,
        });
        Ok(())
    }

    async fn set_payment_status(
        &self,
        id: LocalOrderId,
        status: LocalPaymentStatus,
        send_mail: bool,
    ) -> StorageResult<()> {
        let mut inner = self.inner.lock().await;
        if let Some(order) = inner.orders.get_mut(&id) {
            order.payment_status = status;
        }
        inner.status_writes.push(StatusWriteRecord {
            order_id: id,
            write: LocalStatusWrite::Payment(status),
            send_mail,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn most_recent_transaction_wins() {
        let store = MemoryStore::new();
        let order_id = LocalOrderId::new(7);

        let first = store
            .insert_transaction(TransactionNew {
                order_id: Some(order_id),
                transaction_number: "mollie_a".to_owned(),
            })
            .await
            .unwrap();
        let second = store
            .insert_transaction(TransactionNew {
                order_id: Some(order_id),
                transaction_number: "mollie_b".to_owned(),
            })
            .await
            .unwrap();

        let found = store
            .find_most_recent_transaction_for_order(order_id)
            .await
            .unwrap();
        assert_eq!(found.id, second.id);
        assert_ne!(found.id, first.id);
    }

    #[tokio::test]
    async fn status_writes_are_journaled_and_applied() {
        let store = MemoryStore::new();
        let order_id = LocalOrderId::new(1);
        store
            .seed_order(
                LocalOrder {
                    id: order_id,
                    number: "20001".to_owned(),
                    currency: "EUR".to_owned(),
                    invoice_amount: rust_decimal::Decimal::new(1000, 2),
                    invoice_shipping: rust_decimal::Decimal::ZERO,
                    invoice_shipping_net: rust_decimal::Decimal::ZERO,
                    tax_free: false,
                    payment_method: "mollie_ideal".to_owned(),
                    transaction_number: "mollie_x".to_owned(),
                    customer_email: "shopper@example.com".to_owned(),
                    billing_address: Default::default(),
                    shipping_address: Default::default(),
                    shop_locale: None,
                    order_status: LocalOrderStatus::Open,
                    payment_status: LocalPaymentStatus::Open,
                },
                vec![],
            )
            .await;

        store
            .set_payment_status(order_id, LocalPaymentStatus::CompletelyPaid, true)
            .await
            .unwrap();

        let order = store.order(order_id).await.unwrap();
        assert_eq!(order.payment_status, LocalPaymentStatus::CompletelyPaid);
        assert_eq!(
            store.status_writes().await,
            vec![StatusWriteRecord {
                order_id,
                write: LocalStatusWrite::Payment(LocalPaymentStatus::CompletelyPaid),
                send_mail: true,
            }]
        );
    }
}
