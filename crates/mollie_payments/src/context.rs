//! Collaborators of the plugin core, injected once at wiring time.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex as StdMutex},
};

use async_trait::async_trait;
use mollie_api::MollieGateway;
use storefront_models::{LocalOrder, LocalOrderId, StorefrontStore};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::config::PluginConfig;

/// Host seam for re-issuing the confirmation mail whose variables were
/// captured while the payment was still open.
#[async_trait]
pub trait ConfirmationMailer: Send + Sync {
    async fn send_confirmation(&self, order: &LocalOrder, variables: serde_json::Value);
}

/// Serializes reconciliation per local order within this process. Entries
/// are one `Arc<Mutex<()>>` each and are kept for the process lifetime.
#[derive(Default)]
struct OrderLockMap {
    locks: StdMutex<HashMap<LocalOrderId, Arc<Mutex<()>>>>,
}

impl OrderLockMap {
    async fn acquire(&self, id: LocalOrderId) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self
                .locks
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            Arc::clone(locks.entry(id).or_default())
        };
        lock.lock_owned().await
    }
}

/// Everything the core operations need, behind trait objects so hosts and
/// tests wire their own implementations.
pub struct PluginContext {
    pub gateway: Arc<dyn MollieGateway>,
    pub store: Arc<dyn StorefrontStore>,
    pub config: Arc<PluginConfig>,
    pub mailer: Option<Arc<dyn ConfirmationMailer>>,
    order_locks: OrderLockMap,
}

impl PluginContext {
    pub fn new(
        gateway: Arc<dyn MollieGateway>,
        store: Arc<dyn StorefrontStore>,
        config: PluginConfig,
    ) -> Self {
        Self {
            gateway,
            store,
            config: Arc::new(config),
            mailer: None,
            order_locks: OrderLockMap::default(),
        }
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn ConfirmationMailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Concurrent triggers for the same order (provider retries, backend
    /// saves) run one at a time; cross-process overlap still relies on the
    /// applier being safe to call with an unchanged status.
    pub(crate) async fn lock_order(&self, id: LocalOrderId) -> OwnedMutexGuard<()> {
        self.order_locks.acquire(id).await
    }
}
