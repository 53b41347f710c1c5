//! Error types exposed by the review widgets and their transport.

use thiserror::Error;

/// Errors surfaced while loading configuration, reading page markup, or
/// talking to the reviews endpoint.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Configuration could not be loaded or is inconsistent.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// A URL could not be parsed or joined.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// Neither the page nor the configuration supplied a request nonce.
    #[error("no request nonce found on the page (use --nonce)")]
    MissingNonce,

    /// Networking failed while calling the site.
    #[error("network error talking to the site: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// The request did not complete before its deadline.
    #[error("request timed out after {after_ms} ms")]
    Timeout {
        /// Deadline that elapsed, in milliseconds.
        after_ms: u64,
    },

    /// The endpoint rejected the request, typically a stale nonce.
    #[error("request rejected: {message}")]
    Rejected {
        /// Rejection detail returned by the endpoint.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("response decoding failed: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },

    /// Page markup did not follow the widget contract.
    #[error("page markup error: {message}")]
    Markup {
        /// Which part of the contract was violated.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl ReviewError {
    /// Returns true when the failure came from the transport rather than
    /// from local configuration.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Network { .. } | Self::Timeout { .. } | Self::Rejected { .. } | Self::Decode { .. }
        )
    }
}
