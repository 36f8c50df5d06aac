//! Library error type realizing the failure taxonomy. Credential rejections
//! are not errors (the exchange returns typed outcomes); this enum covers the
//! failures that escape an authenticated call: forced de-authentication,
//! connectivity, unexpected HTTP statuses, and malformed responses.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// The backend rejected the session credential (HTTP 401). The session
    /// has already been invalidated when this is returned; the UI should
    /// route back to the matching login surface, not show an error dialog.
    SessionExpired,
    /// No response reached the server. Carries a generic user-facing message,
    /// never transport internals.
    Network(String),
    /// A non-2xx status a feature client chose to surface. The message is the
    /// sanitized response body.
    Http { status: u16, message: String },
    /// The response arrived but did not match the expected shape.
    Parse(String),
}

impl fmt::Display for Error {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SessionExpired => write!(formatter, "Session expired, please sign in again"),
            Error::Network(message) => write!(formatter, "Network error: {message}"),
            Error::Http { status, message } => {
                write!(formatter, "Request failed ({status}): {message}")
            }
            Error::Parse(message) => write!(formatter, "Response error: {message}"),
        }
    }
}

impl std::error::Error for Error {}

/// Generic connectivity message shown whenever no response reached the
/// server. Transport details stay in the logs.
pub const CONNECTIVITY_MESSAGE: &str = "Could not reach the server. Please try again.";

/// Maximum number of error body characters surfaced to the UI.
const MAX_ERROR_CHARS: usize = 200;

/// Sanitizes HTTP error bodies for user-facing messages by trimming and
/// truncating.
pub(crate) fn sanitize_body(body: String) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_body_falls_back_on_empty() {
        assert_eq!(sanitize_body(String::new()), "Request failed.");
        assert_eq!(sanitize_body("   ".to_string()), "Request failed.");
    }

    #[test]
    fn sanitize_body_trims_and_truncates() {
        assert_eq!(sanitize_body("  nope \n".to_string()), "nope");
        let long = "x".repeat(500);
        assert_eq!(sanitize_body(long).len(), 200);
    }

    #[test]
    fn display_does_not_leak_transport_details() {
        let err = Error::Network("Could not reach the server. Please try again.".to_string());
        assert!(!err.to_string().contains("hyper"));
        assert!(err.to_string().starts_with("Network error"));
    }
}
