//! Contract types of the host storefront platform.
//!
//! The plugin never touches the host's ORM or session machinery; it sees the
//! platform through the record types and async storage interfaces defined
//! here. [`memory::MemoryStore`] implements the full interface in memory and
//! backs the test suites.

pub mod enums;
pub mod memory;
pub mod records;
pub mod storage;
pub mod transaction;

pub use self::{
    enums::{LocalOrderStatus, LocalPaymentStatus},
    memory::{MemoryStore, StatusWriteRecord},
    records::{AddressRecord, LocalOrder, LocalOrderId, OrderDetailRow},
    storage::{
        LocalStatusWrite, OrderInterface, OrderLinesInterface, OrderStatusInterface,
        StorageError, StorageResult, StorefrontStore, TransactionInterface,
    },
    transaction::{OrderLineNew, OrderLineRow, Transaction, TransactionNew},
};
