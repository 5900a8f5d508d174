//! Error types for the mail-finder crate.
//!
//! All errors implement [`std::error::Error`] and provide context about what went wrong.
//! Errors are categorized by their retryability - see [`Error::is_retryable`].

use std::time::Duration;
use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while searching a mailbox or decoding a message.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    // ─────────────────────────────────────────────────────────────────────────
    // Configuration / validation errors (NOT retryable)
    // ─────────────────────────────────────────────────────────────────────────
    /// Invalid configuration provided.
    #[error("invalid configuration: {message}")]
    InvalidConfig {
        /// Description of the configuration error.
        message: String,
    },

    /// Mailbox user id is neither `me` nor a valid email address.
    #[error("invalid mailbox user id: {user_id}")]
    InvalidUserId {
        /// The rejected user id.
        user_id: String,
    },

    /// Extraction pattern failed to compile.
    #[error("invalid extraction pattern '{pattern}'")]
    InvalidPattern {
        /// The pattern source.
        pattern: String,
        /// The underlying regex error.
        #[source]
        source: regex::Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Transport errors (mostly RETRYABLE)
    // ─────────────────────────────────────────────────────────────────────────
    /// A mail client call failed.
    ///
    /// Generic variant for [`MailClient`](crate::MailClient) implementations
    /// that are not backed by HTTP.
    #[error("{operation} failed: {message}")]
    Transport {
        /// The collaborator operation that failed.
        operation: &'static str,
        /// Description of the failure.
        message: String,
    },

    /// HTTP request could not be sent or its response could not be read.
    #[error("HTTP request for {operation} failed")]
    Http {
        /// The collaborator operation that failed.
        operation: &'static str,
        /// The underlying HTTP error.
        #[source]
        source: reqwest::Error,
    },

    /// The mail API answered with a non-success status.
    #[error("{operation} returned HTTP {status}: {body}")]
    Api {
        /// The collaborator operation that failed.
        operation: &'static str,
        /// HTTP status code.
        status: u16,
        /// Response body (truncated by the server, kept for diagnostics).
        body: String,
    },

    /// A mail client call exceeded its timeout.
    #[error("{operation} timed out after {timeout:?}")]
    RequestTimeout {
        /// The collaborator operation that timed out.
        operation: &'static str,
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Body decoding errors (NOT retryable - content won't change)
    // ─────────────────────────────────────────────────────────────────────────
    /// Concatenated body parts are not valid URL-safe base64.
    #[error("failed to decode message body")]
    DecodeBody {
        /// The underlying base64 error.
        #[source]
        source: base64::DecodeError,
    },

    /// Decoded body bytes are not valid UTF-8.
    #[error("message body is not valid UTF-8")]
    InvalidUtf8 {
        /// The underlying conversion error.
        #[source]
        source: std::string::FromUtf8Error,
    },

    // ─────────────────────────────────────────────────────────────────────────
    // Search / extraction results
    // ─────────────────────────────────────────────────────────────────────────
    /// No message matched after every attempt.
    #[error("no matching message found in {attempts} attempts")]
    NotFound {
        /// Number of listing attempts made.
        attempts: u32,
    },

    /// The decoded text does not contain the expected pattern.
    #[error("no match for {matcher} in message body")]
    Extraction {
        /// Description of the matcher that failed.
        matcher: String,
    },
}

impl Error {
    /// Returns `true` if this error represents a transient failure that might succeed on retry.
    ///
    /// [`Error::NotFound`] counts as retryable: the message may simply not be
    /// visible in the listing yet.
    ///
    /// ```
    /// use mail_finder::Error;
    ///
    /// assert!(Error::NotFound { attempts: 5 }.is_retryable());
    /// assert!(!Error::Extraction { matcher: "Sign In".into() }.is_retryable());
    /// ```
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport { .. }
            | Error::Http { .. }
            | Error::RequestTimeout { .. }
            | Error::NotFound { .. } => true,

            // Throttling and server-side failures may clear up, auth and
            // client errors won't.
            Error::Api { status, .. } => *status == 429 || *status >= 500,

            Error::InvalidConfig { .. }
            | Error::InvalidUserId { .. }
            | Error::InvalidPattern { .. }
            | Error::DecodeBody { .. }
            | Error::InvalidUtf8 { .. }
            | Error::Extraction { .. } => false,
        }
    }

    /// Returns the error category for metrics/logging purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidConfig { .. }
            | Error::InvalidUserId { .. }
            | Error::InvalidPattern { .. } => ErrorCategory::Configuration,

            Error::Transport { .. } | Error::Http { .. } | Error::Api { .. } => {
                ErrorCategory::Transport
            }

            Error::RequestTimeout { .. } => ErrorCategory::Timeout,

            Error::DecodeBody { .. } | Error::InvalidUtf8 { .. } => ErrorCategory::Decode,

            Error::NotFound { .. } => ErrorCategory::NotFound,

            Error::Extraction { .. } => ErrorCategory::Extraction,
        }
    }
}

/// Error categories for metrics and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Configuration or validation errors.
    Configuration,
    /// Mail client call failures.
    Transport,
    /// Mail client call timeouts.
    Timeout,
    /// Message body decoding errors.
    Decode,
    /// No matching message found.
    NotFound,
    /// Pattern not present in the message body.
    Extraction,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Configuration => write!(f, "configuration"),
            ErrorCategory::Transport => write!(f, "transport"),
            ErrorCategory::Timeout => write!(f, "timeout"),
            ErrorCategory::Decode => write!(f, "decode"),
            ErrorCategory::NotFound => write!(f, "not_found"),
            ErrorCategory::Extraction => write!(f, "extraction"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_classification() {
        let err = Error::InvalidConfig {
            message: "max_attempts must be at least 1".into(),
        };
        assert!(!err.is_retryable());

        let err = Error::Transport {
            operation: "list_recent",
            message: "connection reset".into(),
        };
        assert!(err.is_retryable());

        let err = Error::Api {
            operation: "get_metadata",
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());

        // Bad credentials stay bad
        let err = Error::Api {
            operation: "get_metadata",
            status: 401,
            body: String::new(),
        };
        assert!(!err.is_retryable());

        let err = Error::Extraction {
            matcher: "Sign In".into(),
        };
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_error_categories() {
        let err = Error::RequestTimeout {
            operation: "list_recent",
            timeout: Duration::from_secs(10),
        };
        assert_eq!(err.category(), ErrorCategory::Timeout);

        let err = Error::NotFound { attempts: 3 };
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(err.category().to_string(), "not_found");

        let err = Error::Api {
            operation: "list_recent",
            status: 500,
            body: String::new(),
        };
        assert_eq!(err.category(), ErrorCategory::Transport);
    }

    #[test]
    fn test_not_found_message_carries_attempts() {
        let err = Error::NotFound { attempts: 4 };
        assert_eq!(err.to_string(), "no matching message found in 4 attempts");
    }
}
