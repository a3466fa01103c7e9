#![allow(dead_code)]

//! Shared fixtures: a scripted gateway and record builders.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use error_stack::report;
use mollie_api::{
    errors::{ApiError, ApiResult},
    requests::{OrderRequest, PaymentRequest},
    resources::{Embedded, MollieOrder, MolliePayment, OrderLine, OrderStatus, PaymentStatus, Shipment},
    types::{OrderId, OrderLineId, PaymentId, ShipmentId},
    MollieGateway,
};
use mollie_payments::{PluginConfig, PluginContext};
use rust_decimal::Decimal;
use storefront_models::{
    AddressRecord, LocalOrder, LocalOrderId, LocalOrderStatus, LocalPaymentStatus, MemoryStore,
    OrderDetailRow, Transaction, TransactionInterface, TransactionNew,
};
use tokio::sync::Mutex;

/// Scripted stand-in for the provider API.
#[derive(Default)]
pub struct MockGateway {
    pub orders: Mutex<HashMap<OrderId, MollieOrder>>,
    pub payments: Mutex<HashMap<PaymentId, MolliePayment>>,
    pub create_order_response: Mutex<Option<MollieOrder>>,
    pub create_payment_response: Mutex<Option<MolliePayment>>,
    pub fail_order_fetch: AtomicBool,
    pub fail_shipment: AtomicBool,
    pub ship_calls: Mutex<Vec<OrderId>>,
    pub created_order_requests: Mutex<Vec<OrderRequest>>,
    pub created_payment_requests: Mutex<Vec<PaymentRequest>>,
}

impl MockGateway {
    pub async fn put_order(&self, order: MollieOrder) {
        self.orders.lock().await.insert(order.id.clone(), order);
    }

    pub async fn put_payment(&self, payment: MolliePayment) {
        self.payments
            .lock()
            .await
            .insert(payment.id.clone(), payment);
    }

    pub async fn ship_call_count(&self) -> usize {
        self.ship_calls.lock().await.len()
    }
}

#[async_trait]
impl MollieGateway for MockGateway {
    async fn create_order(&self, request: &OrderRequest) -> ApiResult<MollieOrder> {
        self.created_order_requests
            .lock()
            .await
            .push(request.clone());
        self.create_order_response
            .lock()
            .await
            .clone()
            .ok_or_else(|| report!(ApiError::Request))
    }

    async fn create_payment(&self, request: &PaymentRequest) -> ApiResult<MolliePayment> {
        self.created_payment_requests
            .lock()
            .await
            .push(request.clone());
        self.create_payment_response
            .lock()
            .await
            .clone()
            .ok_or_else(|| report!(ApiError::Request))
    }

    async fn get_order(&self, id: &OrderId, _embed_payments: bool) -> ApiResult<MollieOrder> {
        if self.fail_order_fetch.load(Ordering::SeqCst) {
            return Err(report!(ApiError::Request));
        }
        self.orders
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| report!(ApiError::NotFound { id: id.to_string() }))
    }

    async fn get_payment(&self, id: &PaymentId) -> ApiResult<MolliePayment> {
        self.payments
            .lock()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| report!(ApiError::NotFound { id: id.to_string() }))
    }

    async fn ship_order_completely(&self, id: &OrderId) -> ApiResult<Shipment> {
        self.ship_calls.lock().await.push(id.clone());
        if self.fail_shipment.load(Ordering::SeqCst) {
            return Err(report!(ApiError::Provider {
                status: 422,
                detail: "order not shippable".to_owned(),
            }));
        }
        Ok(Shipment {
            id: ShipmentId::new("shp_1"),
            order_id: id.clone(),
            lines: vec![],
            created_at: None,
        })
    }
}

pub struct TestHarness {
    pub gateway: Arc<MockGateway>,
    pub store: Arc<MemoryStore>,
    pub ctx: PluginContext,
}

pub fn harness(config: PluginConfig) -> TestHarness {
    let gateway = Arc::new(MockGateway::default());
    let store = Arc::new(MemoryStore::new());
    let ctx = PluginContext::new(gateway.clone(), store.clone(), config);
    TestHarness {
        gateway,
        store,
        ctx,
    }
}

pub fn remote_payment(id: &str, status: PaymentStatus, paid: bool) -> MolliePayment {
    MolliePayment {
        id: PaymentId::new(id),
        status,
        paid_at: paid.then(time::OffsetDateTime::now_utc),
        ..Default::default()
    }
}

pub fn remote_order(id: &str, status: OrderStatus, payments: Vec<MolliePayment>) -> MollieOrder {
    MollieOrder {
        id: OrderId::new(id),
        status,
        embedded: Embedded { payments },
        ..Default::default()
    }
}

pub fn remote_order_line(id: &str) -> OrderLine {
    OrderLine {
        id: OrderLineId::new(id),
        name: "item".to_owned(),
        quantity: 1,
        ..Default::default()
    }
}

pub fn local_order(id: i64, number: &str) -> LocalOrder {
    LocalOrder {
        id: LocalOrderId::new(id),
        number: number.to_owned(),
        currency: "EUR".to_owned(),
        invoice_amount: Decimal::new(29900, 2),
        invoice_shipping: Decimal::new(595, 2),
        invoice_shipping_net: Decimal::new(500, 2),
        tax_free: false,
        payment_method: "mollie_ideal".to_owned(),
        transaction_number: format!("mollie_{number}"),
        customer_email: "shopper@example.com".to_owned(),
        billing_address: AddressRecord {
            salutation: "mr".to_owned(),
            first_name: "Jan".to_owned(),
            last_name: "Modaal".to_owned(),
            street: "Keizersgracht 313".to_owned(),
            additional_address_line: None,
            zip_code: "1016 EE".to_owned(),
            city: "Amsterdam".to_owned(),
            country_iso: Some("NL".to_owned()),
        },
        shipping_address: AddressRecord::default(),
        shop_locale: Some("nl_NL".to_owned()),
        order_status: LocalOrderStatus::Open,
        payment_status: LocalPaymentStatus::Open,
    }
}

pub fn order_detail(name: &str, unit_price: Decimal, vat_rate: Decimal) -> OrderDetailRow {
    OrderDetailRow {
        kind: mollie_api::types::OrderLineKind::Physical,
        name: name.to_owned(),
        quantity: 1,
        unit_price,
        total_amount: unit_price,
        vat_rate,
        vat_amount: Decimal::ZERO,
    }
}

/// Inserts a transaction already linked to a remote order resource.
pub async fn link_remote_order(
    store: &MemoryStore,
    order: &LocalOrder,
    remote_order_id: &str,
) -> Transaction {
    let transaction = store
        .insert_transaction(TransactionNew {
            order_id: Some(order.id),
            transaction_number: order.transaction_number.clone(),
        })
        .await
        .unwrap();
    store
        .update_transaction(Transaction {
            mollie_order_id: Some(OrderId::new(remote_order_id)),
            ..transaction
        })
        .await
        .unwrap()
}

/// Inserts a transaction already linked to a standalone remote payment.
pub async fn link_remote_payment(
    store: &MemoryStore,
    order: &LocalOrder,
    remote_payment_id: &str,
) -> Transaction {
    let transaction = store
        .insert_transaction(TransactionNew {
            order_id: Some(order.id),
            transaction_number: order.transaction_number.clone(),
        })
        .await
        .unwrap();
    store
        .update_transaction(Transaction {
            mollie_payment_id: Some(PaymentId::new(remote_payment_id)),
            ..transaction
        })
        .await
        .unwrap()
}
