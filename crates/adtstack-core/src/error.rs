//! Error types for the transport layer.

/// Errors raised by a [`Transport`](crate::Transport) implementation.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response could not be read.
    #[error("request {method} {url} failed: {source}")]
    Request {
        /// HTTP method of the failed request.
        method: String,
        /// Fully resolved request URL.
        url: String,
        /// Underlying client error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The server answered with a non-success status code.
    #[error("request {method} {url} returned HTTP {status}: {body}")]
    Status {
        /// HTTP method of the failed request.
        method: String,
        /// Fully resolved request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body, usually an ADT exception document.
        body: String,
    },

    /// The connection configuration is unusable.
    #[error("invalid connection configuration: {0}")]
    Config(String),
}

/// Convenience result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
