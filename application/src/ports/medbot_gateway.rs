//! MedBot gateway port
//!
//! Defines the interface for talking to the MedBot server.

use crate::config::Endpoint;
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use std::pin::Pin;
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Non-2xx response. `message` is the server's `error` field when it
    /// sent one, otherwise the status reason.
    #[error("Server returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Transport closed")]
    TransportClosed,

    #[error("Other error: {0}")]
    Other(String),
}

/// Raw body of a streamed response, chunked however the network delivers it.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, GatewayError>> + Send>>;

/// A file field plus plain text fields for a multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartUpload {
    pub file_field: String,
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub fields: Vec<(String, String)>,
}

/// Gateway to the MedBot server
///
/// This port defines how the application layer reaches the backend.
/// Implementations (adapters) live in the infrastructure layer and map each
/// [`Endpoint`] to a configured path.
#[async_trait]
pub trait MedbotGateway: Send + Sync {
    /// POST `body` and return the response body as a byte stream.
    ///
    /// Fails before any bytes are yielded on a non-2xx status.
    async fn open_stream(&self, endpoint: Endpoint, body: Value)
    -> Result<ByteStream, GatewayError>;

    /// POST `body` and decode the JSON response.
    async fn post_json(&self, endpoint: Endpoint, body: Value) -> Result<Value, GatewayError>;

    /// GET and decode the JSON response.
    async fn get_json(&self, endpoint: Endpoint) -> Result<Value, GatewayError>;

    /// POST a multipart form and decode the JSON response.
    async fn post_multipart(
        &self,
        endpoint: Endpoint,
        upload: MultipartUpload,
    ) -> Result<Value, GatewayError>;

    /// POST `body` and return the raw response bytes.
    async fn post_for_bytes(&self, endpoint: Endpoint, body: Value)
    -> Result<Vec<u8>, GatewayError>;

    /// Turn a server-relative URL (e.g. `/static/speech.mp3`) into an
    /// absolute one.
    fn resolve_url(&self, url: &str) -> String;
}

/// Decode a JSON value into a typed response.
pub fn decode_response<T: serde::de::DeserializeOwned>(value: Value) -> Result<T, GatewayError> {
    serde_json::from_value(value).map_err(|e| GatewayError::InvalidResponse(e.to_string()))
}
