//! Identifier newtypes and small value types used on the wire.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};

macro_rules! id_type {
    ($(#[$docs:meta])* $name:ident) => {
        $(#[$docs])*
        #[derive(
            Clone, Debug, Default, Eq, Hash, PartialEq, serde::Deserialize, serde::Serialize,
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_owned())
            }
        }
    };
}

id_type!(
    /// Identifier of a remote order resource (`ord_…`).
    OrderId
);
id_type!(
    /// Identifier of a remote payment resource (`tr_…`).
    PaymentId
);
id_type!(
    /// Identifier of one line under a remote order (`odl_…`).
    OrderLineId
);
id_type!(
    /// Identifier of a shipment created for a remote order (`shp_…`).
    ShipmentId
);

/// Currencies accepted by the provider's checkout.
#[allow(clippy::upper_case_acronyms)]
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
pub enum Currency {
    AUD,
    BGN,
    CAD,
    CHF,
    CZK,
    DKK,
    #[default]
    EUR,
    GBP,
    HKD,
    HUF,
    ILS,
    ISK,
    JPY,
    NOK,
    NZD,
    PLN,
    RON,
    SEK,
    SGD,
    USD,
}

/// A monetary amount as the provider expects it: an ISO currency code and a
/// string value with exactly two decimals.
#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Amount {
    pub currency: Currency,
    pub value: String,
}

impl Amount {
    /// Rounds half away from zero to two decimals, matching how the host
    /// platform rounds invoice totals before handing them over.
    pub fn from_decimal(currency: Currency, value: Decimal) -> Self {
        let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        Self {
            currency,
            value: format!("{rounded:.2}"),
        }
    }
}

/// Checkout locales supported by the provider's hosted pages.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
pub enum Locale {
    #[default]
    #[serde(rename = "en_US")]
    #[strum(serialize = "en_US")]
    EnUs,
    #[serde(rename = "nl_NL")]
    #[strum(serialize = "nl_NL")]
    NlNl,
    #[serde(rename = "fr_FR")]
    #[strum(serialize = "fr_FR")]
    FrFr,
    #[serde(rename = "it_IT")]
    #[strum(serialize = "it_IT")]
    ItIt,
    #[serde(rename = "de_DE")]
    #[strum(serialize = "de_DE")]
    DeDe,
    #[serde(rename = "de_AT")]
    #[strum(serialize = "de_AT")]
    DeAt,
    #[serde(rename = "de_CH")]
    #[strum(serialize = "de_CH")]
    DeCh,
    #[serde(rename = "es_ES")]
    #[strum(serialize = "es_ES")]
    EsEs,
    #[serde(rename = "ca_ES")]
    #[strum(serialize = "ca_ES")]
    CaEs,
    #[serde(rename = "nb_NO")]
    #[strum(serialize = "nb_NO")]
    NbNo,
    #[serde(rename = "pt_PT")]
    #[strum(serialize = "pt_PT")]
    PtPt,
    #[serde(rename = "sv_SE")]
    #[strum(serialize = "sv_SE")]
    SvSe,
    #[serde(rename = "fi_FI")]
    #[strum(serialize = "fi_FI")]
    FiFi,
    #[serde(rename = "da_DK")]
    #[strum(serialize = "da_DK")]
    DaDk,
    #[serde(rename = "is_IS")]
    #[strum(serialize = "is_IS")]
    IsIs,
    #[serde(rename = "hu_HU")]
    #[strum(serialize = "hu_HU")]
    HuHu,
    #[serde(rename = "pl_PL")]
    #[strum(serialize = "pl_PL")]
    PlPl,
    #[serde(rename = "lv_LV")]
    #[strum(serialize = "lv_LV")]
    LvLv,
    #[serde(rename = "lt_LT")]
    #[strum(serialize = "lt_LT")]
    LtLt,
}

impl Locale {
    /// Maps an arbitrary host shop locale onto a supported checkout locale,
    /// falling back to `en_US`.
    pub fn from_shop_locale(locale: Option<&str>) -> Self {
        locale
            .and_then(|value| value.parse().ok())
            .unwrap_or_default()
    }
}

/// Payment methods the plugin can offer at checkout.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PaymentMethod {
    ApplePay,
    Bancontact,
    BankTransfer,
    Belfius,
    CreditCard,
    Eps,
    GiroPay,
    Ideal,
    Kbc,
    KlarnaPayLater,
    KlarnaSliceIt,
    PayPal,
    Przelewy24,
    Sofort,
}

/// Prefix the host platform puts in front of this plugin's method names.
pub const STOREFRONT_METHOD_PREFIX: &str = "mollie_";

impl PaymentMethod {
    /// Parses a host-side payment method name, with or without the
    /// storefront prefix.
    pub fn from_storefront_name(name: &str) -> Option<Self> {
        let name = name
            .strip_prefix(STOREFRONT_METHOD_PREFIX)
            .unwrap_or(name);
        name.parse().ok()
    }

    /// Pay-after-delivery methods must go through the Orders API; the
    /// provider rejects them on the Payments API.
    pub fn requires_orders_api(self) -> bool {
        matches!(self, Self::KlarnaPayLater | Self::KlarnaSliceIt)
    }
}

/// Line types accepted on a remote order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderLineKind {
    #[default]
    Physical,
    Digital,
    ShippingFee,
    Discount,
    StoreCredit,
    GiftCard,
    Surcharge,
}
