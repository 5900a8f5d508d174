//! # mail-finder
//!
//! Async mailbox search: locate an email by sender and send time, decode its
//! body and extract content using pattern matching.
//!
//! This crate provides a high-level, async API for:
//! - Finding the first recent message from a sender, widening the listing
//!   window on every attempt (listings are eventually consistent)
//! - Decoding the message body from its URL-safe base64 parts
//! - Extracting values such as sign-in links from the decoded text
//!
//! The mailbox itself is reached through the [`MailClient`] trait. A Gmail REST
//! implementation ([`GmailClient`]) is included; credentials are acquired
//! elsewhere and handed over as an access token.
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use mail_finder::{FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria};
//!
//! # async fn example() -> mail_finder::Result<()> {
//! // Construct the mail client once and inject it
//! let config = GmailConfig::builder()
//!     .access_token("ya29.a0...")
//!     .build()?;
//! let finder = MessageFinder::new(GmailClient::new(config)?, FinderConfig::default());
//!
//! // Find the first match sent in the last ten minutes
//! let criteria = SearchCriteria::new(
//!     "Example <noreply@example.com>",
//!     Utc::now() - Duration::minutes(10),
//! );
//! let body = finder.find_text(&criteria).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```
//!
//! ## Extracting a Value
//!
//! ```
//! use mail_finder::matcher::{extract, LabeledValueMatcher};
//!
//! let text = "Hello!\nSign In ( https://example.com/login?t=abc )";
//! let link = extract(text, &LabeledValueMatcher::new("Sign In")).unwrap();
//! assert_eq!(link, "https://example.com/login?t=abc");
//! ```
//!
//! ## Error Handling
//!
//! All errors implement `std::error::Error` and provide context. Use
//! [`Error::category`] to tell a message that is not there yet
//! ([`ErrorCategory::NotFound`]) from a failing mailbox
//! ([`ErrorCategory::Transport`]):
//!
//! ```
//! use mail_finder::{Error, ErrorCategory};
//!
//! fn handle_error(error: &Error) {
//!     match error.category() {
//!         ErrorCategory::NotFound => println!("Not delivered yet: {error}"),
//!         _ if error.is_retryable() => println!("Transient error, can retry: {error}"),
//!         _ => println!("Permanent error: {error}"),
//!     }
//! }
//! ```
//!
//! ## Observability
//!
//! The crate uses `tracing` for instrumentation.
//!
//! ### Span Naming Convention
//!
//! - `MessageFinder::find` - Widening search
//! - `MessageFinder::fetch_text` - Body fetch and decode
//! - `MessageFinder::find_and_extract` - Search, decode and extract
//! - `GmailClient::list_recent` / `get_metadata` / `get_full_content` - API calls
//!
//! ### Standard Fields
//!
//! - `sender` - Expected sender
//! - `attempt` / `window` - Attempt number and listing size
//! - `message_id` - Message identifier
//! - `matcher` - Matcher description

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// Public modules
pub mod config;
pub mod error;
pub mod mailbox;
pub mod matcher;
pub mod proxy;

// Internal modules
mod finder;
mod gmail;
mod parser;

// Re-exports for ergonomic API
pub use config::{
    FinderConfig, FinderConfigBuilder, GmailConfig, GmailConfigBuilder, TimeoutConfig,
};
pub use error::{Error, ErrorCategory, Result};
pub use finder::{MessageFinder, SearchCriteria};
pub use gmail::GmailClient;
pub use mailbox::{MailClient, MessageContent, MessageMetadata, MessageSummary};
pub use proxy::{ProxyAuth, Socks5Proxy};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_api_accessible() {
        let _ = FinderConfig::builder();
        let _ = GmailConfig::builder();
        let _ = Socks5Proxy::new("localhost", 1080);
        let _ = matcher::LabeledValueMatcher::new("Sign In");
    }
}
