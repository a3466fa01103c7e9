//! Gateway trait and its HTTP implementation.

use async_trait::async_trait;
use error_stack::{report, ResultExt};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::{
    consts,
    errors::{ApiError, ApiResult},
    requests::{OrderRequest, PaymentRequest},
    resources::{MollieOrder, MolliePayment, Shipment},
    types::{OrderId, PaymentId},
};

/// The seam between the plugin core and the provider's API.
///
/// Implemented by [`MollieClient`] in production and by scripted fakes in
/// tests.
#[async_trait]
pub trait MollieGateway: Send + Sync {
    async fn create_order(&self, request: &OrderRequest) -> ApiResult<MollieOrder>;

    async fn create_payment(&self, request: &PaymentRequest) -> ApiResult<MolliePayment>;

    /// Fetches an order, optionally with its sub-payments embedded.
    async fn get_order(&self, id: &OrderId, embed_payments: bool) -> ApiResult<MollieOrder>;

    async fn get_payment(&self, id: &PaymentId) -> ApiResult<MolliePayment>;

    /// Creates a shipment covering every remaining line of the order.
    async fn ship_order_completely(&self, id: &OrderId) -> ApiResult<Shipment>;
}

/// Error body the provider returns on non-success responses.
#[derive(Debug, serde::Deserialize)]
struct ProviderErrorBody {
    #[serde(default)]
    title: String,
    #[serde(default)]
    detail: String,
}

/// HTTP implementation of [`MollieGateway`] over reqwest.
pub struct MollieClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
}

impl MollieClient {
    pub fn new(api_key: SecretString) -> ApiResult<Self> {
        Self::with_base_url(api_key, consts::API_BASE_URL)
    }

    /// Points the client at a non-default endpoint, e.g. a test double.
    pub fn with_base_url(api_key: SecretString, base_url: &str) -> ApiResult<Self> {
        let base_url = Url::parse(base_url).change_context(ApiError::InvalidBaseUrl)?;
        if base_url.cannot_be_a_base() {
            return Err(report!(ApiError::InvalidBaseUrl));
        }
        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        })
    }

    fn resource_url(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| report!(ApiError::InvalidBaseUrl))?;
            path.pop_if_empty();
            path.push(consts::API_VERSION);
            for segment in segments {
                path.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, id: &str) -> ApiResult<T> {
        let response = self
            .http
            .get(url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await
            .change_context(ApiError::Request)?;
        Self::decode_response(response, id).await
    }

    async fn post_json<B, T>(&self, url: Url, body: &B, id: &str) -> ApiResult<T>
    where
        B: serde::Serialize + Sync,
        T: serde::de::DeserializeOwned,
    {
        let response = self
            .http
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .send()
            .await
            .change_context(ApiError::Request)?;
        Self::decode_response(response, id).await
    }

    async fn decode_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        id: &str,
    ) -> ApiResult<T> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(report!(ApiError::NotFound { id: id.to_owned() }));
        }
        if !status.is_success() {
            let detail = match response.json::<ProviderErrorBody>().await {
                Ok(body) if !body.detail.is_empty() => body.detail,
                Ok(body) => body.title,
                Err(_) => String::new(),
            };
            tracing::info!(status = status.as_u16(), %detail, "provider rejected the request");
            return Err(report!(ApiError::Provider {
                status: status.as_u16(),
                detail,
            }));
        }
        response
            .json::<T>()
            .await
            .change_context(ApiError::ResponseDeserialization)
    }
}

#[async_trait]
impl MollieGateway for MollieClient {
    async fn create_order(&self, request: &OrderRequest) -> ApiResult<MollieOrder> {
        let url = self.resource_url(&["orders"])?;
        self.post_json(url, request, &request.order_number).await
    }

    async fn create_payment(&self, request: &PaymentRequest) -> ApiResult<MolliePayment> {
        let url = self.resource_url(&["payments"])?;
        self.post_json(url, request, &request.description).await
    }

    async fn get_order(&self, id: &OrderId, embed_payments: bool) -> ApiResult<MollieOrder> {
        let mut url = self.resource_url(&["orders", id.as_str()])?;
        if embed_payments {
            url.query_pairs_mut()
                .append_pair("embed", consts::EMBED_PAYMENTS);
        }
        self.get_json(url, id.as_str()).await
    }

    async fn get_payment(&self, id: &PaymentId) -> ApiResult<MolliePayment> {
        let url = self.resource_url(&["payments", id.as_str()])?;
        self.get_json(url, id.as_str()).await
    }

    async fn ship_order_completely(&self, id: &OrderId) -> ApiResult<Shipment> {
        let url = self.resource_url(&["orders", id.as_str(), "shipments"])?;
        // An empty lines array ships every remaining line of the order.
        let body = serde_json::json!({ "lines": [] });
        self.post_json(url, &body, id.as_str()).await
    }
}
