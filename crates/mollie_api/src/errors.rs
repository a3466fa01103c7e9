//! Error taxonomy of the API client.

/// Result alias wrapping [`ApiError`] into an `error_stack` report.
pub type ApiResult<T> = error_stack::Result<T, ApiError>;

/// Failures surfaced by the client.
///
/// Consumers other than the shipment flow must treat every variant as an
/// opaque "request failed"; only [`ApiError::NotFound`] carries meaning the
/// shipment flow is allowed to rely on.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The HTTP request could not be sent or the response never arrived.
    #[error("request to the payments provider failed")]
    Request,

    /// The provider answered with a non-success status code.
    #[error("payments provider returned {status}: {detail}")]
    Provider { status: u16, detail: String },

    /// The requested resource does not exist at the provider.
    #[error("resource {id} was not found at the payments provider")]
    NotFound { id: String },

    /// A success response failed to deserialize into the expected shape.
    #[error("failed to deserialize a payments provider response")]
    ResponseDeserialization,

    /// The configured base URL cannot be used to build resource URLs.
    #[error("invalid payments provider base URL")]
    InvalidBaseUrl,
}
