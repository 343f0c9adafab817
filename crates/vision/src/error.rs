//! Error type for the capability client.

/// Errors from the vision/generation capability layer.
#[derive(Debug, thiserror::Error)]
pub enum VisionError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The capability endpoint returned a non-2xx status code.
    #[error("capability API error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The response body did not have the expected shape.
    #[error("malformed capability response: {0}")]
    Parse(String),

    /// A structurally valid response carried no usable content.
    #[error("capability response missing content")]
    MissingContent,
}
