//! Checkout-time transaction lifecycle: create the local transaction,
//! create the remote resource, hand back the hosted checkout URL.

use error_stack::{report, ResultExt};
use mollie_api::{
    requests::{OrderAddress, OrderLineRequest, OrderRequest, PaymentParameters, PaymentRequest},
    types::{Amount, Currency, Locale, OrderLineKind, PaymentMethod},
};
use rust_decimal::{Decimal, RoundingStrategy};
use storefront_models::{
    AddressRecord, LocalOrder, OrderDetailRow, OrderLineNew, Transaction, TransactionNew,
};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::{
    config::PluginConfig,
    context::PluginContext,
    errors::{CoreResult, PaymentsError},
};

/// Prefix of transaction numbers owned by this plugin; the host stores the
/// number on the order, which is how later triggers recognize our orders.
pub const TRANSACTION_NUMBER_PREFIX: &str = "mollie_";

/// Per-checkout knobs resolved from the shopper's session by the host.
#[derive(Clone, Debug, Default)]
pub struct CheckoutOptions {
    /// iDEAL issuer the shopper picked in the method selection, if any.
    pub selected_ideal_issuer: Option<String>,
}

/// Result of a successfully started checkout.
#[derive(Clone, Debug)]
pub struct StartedCheckout {
    pub transaction: Transaction,
    /// Hosted payment page to redirect the shopper to.
    pub checkout_url: String,
}

/// Where a redirect/webhook URL points back into the plugin.
#[derive(Clone, Copy, Debug, Eq, PartialEq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum UrlAction {
    Return,
    Notify,
}

/// Which resource flavor a callback URL is about.
#[derive(
    Clone, Copy, Debug, Eq, PartialEq, serde::Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UrlTarget {
    Order,
    Payment,
}

/// Creates the empty transaction row before the order exists on the host
/// side; the number doubles as the host-facing transaction reference.
pub async fn create_transaction(ctx: &PluginContext) -> CoreResult<Transaction> {
    let transaction_number = format!("{TRANSACTION_NUMBER_PREFIX}{}", Uuid::new_v4().simple());
    ctx.store
        .insert_transaction(TransactionNew {
            order_id: None,
            transaction_number,
        })
        .await
        .change_context(PaymentsError::Storage)
}

/// Creates the remote resource for the order and finalizes the transaction.
///
/// Pay-later methods must use the Orders API; everything else follows the
/// `use_orders_api_only_where_mandatory` switch. Whichever flow runs, the
/// transaction ends up with exactly one remote reference set.
#[instrument(skip_all, fields(order_id = %order.id, order_number = %order.number))]
pub async fn start_transaction(
    ctx: &PluginContext,
    order: &LocalOrder,
    mut transaction: Transaction,
    options: &CheckoutOptions,
) -> CoreResult<StartedCheckout> {
    let method = PaymentMethod::from_storefront_name(&order.payment_method).ok_or_else(|| {
        report!(PaymentsError::UnsupportedPaymentMethod {
            method: order.payment_method.clone(),
        })
    })?;
    let currency: Currency = order.currency.parse().map_err(|_| {
        report!(PaymentsError::UnsupportedCurrency {
            currency: order.currency.clone(),
        })
    })?;

    transaction.order_id = Some(order.id);

    let use_orders_api =
        method.requires_orders_api() || !ctx.config.use_orders_api_only_where_mandatory;

    let checkout_url = if use_orders_api {
        let details = ctx
            .store
            .find_order_details(order.id)
            .await
            .change_context(PaymentsError::Storage)?;
        let request = build_order_request(&ctx.config, order, currency, method, &details, options)?;
        let mollie_order = ctx
            .gateway
            .create_order(&request)
            .await
            .change_context(PaymentsError::RemoteFetch)?;

        for line in &mollie_order.lines {
            ctx.store
                .insert_order_line(OrderLineNew {
                    order_id: order.id,
                    mollie_orderline_id: line.id.clone(),
                })
                .await
                .change_context(PaymentsError::Storage)?;
        }

        transaction.mollie_order_id = Some(mollie_order.id.clone());
        transaction.mollie_payment_id = None;
        mollie_order
            .checkout_url()
            .ok_or_else(|| report!(PaymentsError::MissingCheckoutUrl))?
            .to_owned()
    } else {
        let request = build_payment_request(&ctx.config, order, currency, method, options)?;
        let payment = ctx
            .gateway
            .create_payment(&request)
            .await
            .change_context(PaymentsError::RemoteFetch)?;

        transaction.mollie_payment_id = Some(payment.id.clone());
        transaction.mollie_order_id = None;
        payment
            .checkout_url()
            .ok_or_else(|| report!(PaymentsError::MissingCheckoutUrl))?
            .to_owned()
    };

    let transaction = ctx
        .store
        .update_transaction(transaction)
        .await
        .change_context(PaymentsError::Storage)?;

    Ok(StartedCheckout {
        transaction,
        checkout_url,
    })
}

/// Builds a callback URL under the shop base URL, e.g.
/// `https://shop.example/mollie/notify?type=payment&orderNumber=20001`.
/// Return URLs additionally carry the session-append marker the host's
/// front controller expects.
pub(crate) fn assemble_url(
    config: &PluginConfig,
    order: &LocalOrder,
    action: UrlAction,
    target: UrlTarget,
) -> CoreResult<String> {
    let invalid = || PaymentsError::InvalidConfiguration {
        message: format!("shop base URL `{}` is not an absolute URL", config.shop_base_url),
    };
    let mut url = Url::parse(&config.shop_base_url).map_err(|_| report!(invalid()))?;
    {
        let mut segments = url.path_segments_mut().map_err(|_| report!(invalid()))?;
        segments.pop_if_empty();
        segments.push("mollie");
        segments.push(&action.to_string());
    }
    url.query_pairs_mut()
        .append_pair("type", &target.to_string())
        .append_pair("orderNumber", &order.number);
    if action == UrlAction::Return {
        url.query_pairs_mut().append_pair("appendSession", "1");
    }
    Ok(url.into())
}

fn build_order_request(
    config: &PluginConfig,
    order: &LocalOrder,
    currency: Currency,
    method: PaymentMethod,
    details: &[OrderDetailRow],
    options: &CheckoutOptions,
) -> CoreResult<OrderRequest> {
    Ok(OrderRequest {
        amount: Amount::from_decimal(currency, order.invoice_amount),
        order_number: order.number.clone(),
        lines: order_request_lines(order, currency, details),
        billing_address: order_address(&order.billing_address, &order.customer_email),
        shipping_address: order_address(&order.shipping_address, &order.customer_email),
        redirect_url: assemble_url(config, order, UrlAction::Return, UrlTarget::Order)?,
        webhook_url: assemble_url(config, order, UrlAction::Notify, UrlTarget::Order)?,
        locale: Locale::from_shop_locale(order.shop_locale.as_deref()),
        method,
        payment: PaymentParameters {
            webhook_url: assemble_url(config, order, UrlAction::Notify, UrlTarget::Payment)?,
            issuer: ideal_issuer(method, options),
        },
        metadata: serde_json::Map::new(),
    })
}

fn build_payment_request(
    config: &PluginConfig,
    order: &LocalOrder,
    currency: Currency,
    method: PaymentMethod,
    options: &CheckoutOptions,
) -> CoreResult<PaymentRequest> {
    let billing_email = matches!(
        method,
        PaymentMethod::BankTransfer | PaymentMethod::Przelewy24
    )
    .then(|| order.customer_email.clone());

    Ok(PaymentRequest {
        amount: Amount::from_decimal(currency, order.invoice_amount),
        description: format!("Order {}", order.number),
        method,
        redirect_url: assemble_url(config, order, UrlAction::Return, UrlTarget::Payment)?,
        webhook_url: assemble_url(config, order, UrlAction::Notify, UrlTarget::Payment)?,
        locale: Locale::from_shop_locale(order.shop_locale.as_deref()),
        billing_email,
        issuer: ideal_issuer(method, options),
    })
}

fn ideal_issuer(method: PaymentMethod, options: &CheckoutOptions) -> Option<String> {
    (method == PaymentMethod::Ideal)
        .then(|| options.selected_ideal_issuer.clone())
        .flatten()
}

fn order_request_lines(
    order: &LocalOrder,
    currency: Currency,
    details: &[OrderDetailRow],
) -> Vec<OrderLineRequest> {
    let mut lines: Vec<OrderLineRequest> = details
        .iter()
        .map(|row| OrderLineRequest {
            kind: row.kind,
            name: row.name.clone(),
            quantity: row.quantity,
            unit_price: Amount::from_decimal(currency, row.unit_price),
            total_amount: Amount::from_decimal(currency, row.total_amount),
            vat_rate: format_rate(row.vat_rate),
            vat_amount: Amount::from_decimal(currency, row.vat_amount),
            sku: None,
        })
        .collect();
    lines.push(shipping_fee_line(order, currency));
    lines
}

/// The shipping fee is not a detail row on the host side; it is appended as
/// its own line. Tax-free orders ship at the net price with zero VAT.
fn shipping_fee_line(order: &LocalOrder, currency: Currency) -> OrderLineRequest {
    let mut unit_price = order.invoice_shipping;
    let mut vat_amount = order.invoice_shipping - order.invoice_shipping_net;
    if order.tax_free {
        vat_amount = Decimal::ZERO;
        unit_price = order.invoice_shipping_net;
    }
    let vat_rate = if vat_amount.is_zero() {
        Decimal::ZERO
    } else {
        shipping_tax_rate(order)
    };

    OrderLineRequest {
        kind: OrderLineKind::ShippingFee,
        name: "Shipping fee".to_owned(),
        quantity: 1,
        unit_price: Amount::from_decimal(currency, unit_price),
        total_amount: Amount::from_decimal(currency, unit_price),
        vat_rate: format_rate(vat_rate),
        vat_amount: Amount::from_decimal(currency, vat_amount),
        sku: None,
    }
}

/// Derives the shipping tax rate from gross and net shipping costs, rounded
/// to the nearest half percentage point (19.03% VAT does not exist; 19% and
/// 19.5% do).
fn shipping_tax_rate(order: &LocalOrder) -> Decimal {
    if order.invoice_shipping == order.invoice_shipping_net
        || order.invoice_shipping_net.is_zero()
    {
        return Decimal::ZERO;
    }
    let tax = order.invoice_shipping - order.invoice_shipping_net;
    let rate = tax / order.invoice_shipping_net * Decimal::ONE_HUNDRED;
    (rate * Decimal::TWO).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        / Decimal::TWO
}

fn format_rate(rate: Decimal) -> String {
    let rounded = rate.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{rounded:.2}")
}

fn order_address(address: &AddressRecord, email: &str) -> OrderAddress {
    OrderAddress {
        title: (!address.salutation.is_empty()).then(|| format!("{}.", address.salutation)),
        given_name: address.first_name.clone(),
        family_name: address.last_name.clone(),
        email: email.to_owned(),
        street_and_number: address.street.clone(),
        street_additional: address.additional_address_line.clone(),
        postal_code: address.zip_code.clone(),
        city: address.city.clone(),
        country: address
            .country_iso
            .clone()
            .unwrap_or_else(|| "NL".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use storefront_models::{AddressRecord, LocalOrderId, LocalOrderStatus, LocalPaymentStatus};

    use super::*;

    fn order() -> LocalOrder {
        LocalOrder {
            id: LocalOrderId::new(12),
            number: "20012".to_owned(),
            currency: "EUR".to_owned(),
            invoice_amount: Decimal::new(12100, 2),
            invoice_shipping: Decimal::new(595, 2),
            invoice_shipping_net: Decimal::new(500, 2),
            tax_free: false,
            payment_method: "mollie_ideal".to_owned(),
            transaction_number: "mollie_t".to_owned(),
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

    fn config() -> PluginConfig {
        PluginConfig {
            shop_base_url: "https://shop.example".to_owned(),
            ..Default::default()
        }
    }

    #[test]
    fn urls_carry_action_target_and_order_number() {
        let url = assemble_url(&config(), &order(), UrlAction::Notify, UrlTarget::Payment)
            .unwrap();
        assert_eq!(
            url,
            "https://shop.example/mollie/notify?type=payment&orderNumber=20012"
        );

        let url = assemble_url(&config(), &order(), UrlAction::Return, UrlTarget::Order).unwrap();
        assert_eq!(
            url,
            "https://shop.example/mollie/return?type=order&orderNumber=20012&appendSession=1"
        );
    }

    #[test]
    fn relative_shop_base_url_is_a_configuration_error() {
        let config = PluginConfig {
            shop_base_url: "/shop".to_owned(),
            ..Default::default()
        };
        let result = assemble_url(&config, &order(), UrlAction::Return, UrlTarget::Order);
        assert!(result.is_err());
    }

    #[test]
    fn shipping_fee_line_derives_the_tax_rate() {
        let line = shipping_fee_line(&order(), Currency::EUR);
        assert_eq!(line.kind, OrderLineKind::ShippingFee);
        assert_eq!(line.unit_price.value, "5.95");
        assert_eq!(line.vat_amount.value, "0.95");
        // 0.95 / 5.00 = 19%
        assert_eq!(line.vat_rate, "19.00");
    }

    #[test]
    fn tax_free_orders_ship_at_net_price_without_vat() {
        let mut order = order();
        order.tax_free = true;
        let line = shipping_fee_line(&order, Currency::EUR);
        assert_eq!(line.unit_price.value, "5.00");
        assert_eq!(line.vat_amount.value, "0.00");
        assert_eq!(line.vat_rate, "0.00");
    }

    #[test]
    fn bank_transfer_payments_carry_the_billing_email() {
        let request = build_payment_request(
            &config(),
            &order(),
            Currency::EUR,
            PaymentMethod::BankTransfer,
            &CheckoutOptions::default(),
        )
        .unwrap();
        assert_eq!(request.billing_email.as_deref(), Some("shopper@example.com"));

        let request = build_payment_request(
            &config(),
            &order(),
            Currency::EUR,
            PaymentMethod::Ideal,
            &CheckoutOptions::default(),
        )
        .unwrap();
        assert_eq!(request.billing_email, None);
    }

    #[test]
    fn issuer_is_only_set_for_ideal() {
        let options = CheckoutOptions {
            selected_ideal_issuer: Some("ideal_INGBNL2A".to_owned()),
        };
        assert_eq!(
            ideal_issuer(PaymentMethod::Ideal, &options).as_deref(),
            Some("ideal_INGBNL2A")
        );
        assert_eq!(ideal_issuer(PaymentMethod::CreditCard, &options), None);
    }
}
