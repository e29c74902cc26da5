//! Payment gateway errors.

use thiserror::Error;

/// Errors that can occur when communicating with the payment gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway refused the request.
    #[error("gateway rejected request with status {status}: {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, as returned
        body: String,
    },

    /// The gateway answered with something other than a confirmation.
    #[error("unexpected response from gateway: {0}")]
    UnexpectedResponse(String),
}
