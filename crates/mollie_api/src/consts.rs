//! Constants shared across the client.

/// Production endpoint of the payments provider.
pub const API_BASE_URL: &str = "https://api.mollie.com/";

/// API version segment prepended to every resource path.
pub const API_VERSION: &str = "v2";

/// Query value used to embed sub-payments in an order fetch.
pub const EMBED_PAYMENTS: &str = "payments";
