//! Mailbox data model and the collaborator trait the finder consumes.
//!
//! [`MailClient`] is the only way the search core talks to a mailbox. The crate
//! ships a Gmail implementation ([`GmailClient`](crate::GmailClient)); tests and
//! other backends provide their own.

use crate::error::Result;
use async_trait::async_trait;

/// Header carrying the sender identity.
pub const FROM_HEADER: &str = "From";
/// Header carrying the send timestamp.
pub const DATE_HEADER: &str = "Date";

/// One entry of a mailbox listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageSummary {
    /// Opaque message identifier.
    pub id: String,
}

impl MessageSummary {
    /// Creates a summary for the given identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Header view of a single message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageMetadata {
    /// Message identifier.
    pub id: String,
    /// Header `(name, value)` pairs in wire order.
    pub headers: Vec<(String, String)>,
}

impl MessageMetadata {
    /// Creates metadata from an identifier and header pairs.
    #[must_use]
    pub fn new(id: impl Into<String>, headers: Vec<(String, String)>) -> Self {
        Self {
            id: id.into(),
            headers,
        }
    }

    /// Returns the value of the header named `name` (case-insensitive).
    ///
    /// A repeated header resolves to its last occurrence.
    ///
    /// ```
    /// use mail_finder::MessageMetadata;
    ///
    /// let meta = MessageMetadata::new("m1", vec![("from".into(), "a@b.c".into())]);
    /// assert_eq!(meta.header("From"), Some("a@b.c"));
    /// assert_eq!(meta.header("Date"), None);
    /// ```
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .rev()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Full body of a single message, still transport-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageContent {
    /// Message identifier.
    pub id: String,
    /// URL-safe base64 body fragments, in order.
    pub parts: Vec<String>,
}

impl MessageContent {
    /// Creates content from an identifier and encoded parts.
    #[must_use]
    pub fn new(id: impl Into<String>, parts: Vec<String>) -> Self {
        Self {
            id: id.into(),
            parts,
        }
    }
}

/// Minimal mailbox capability used by [`MessageFinder`](crate::MessageFinder).
///
/// Implementations enforce their own per-call timeouts and report every
/// failure as an error; the finder never retries a failed call.
#[async_trait]
pub trait MailClient: Send + Sync {
    /// Lists up to `count` most recent messages, newest first.
    async fn list_recent(&self, count: usize) -> Result<Vec<MessageSummary>>;

    /// Fetches the headers of one message.
    async fn get_metadata(&self, id: &str) -> Result<MessageMetadata>;

    /// Fetches the encoded body parts of one message.
    async fn get_full_content(&self, id: &str) -> Result<MessageContent>;
}

#[async_trait]
impl<C: MailClient + ?Sized> MailClient for &C {
    async fn list_recent(&self, count: usize) -> Result<Vec<MessageSummary>> {
        (**self).list_recent(count).await
    }

    async fn get_metadata(&self, id: &str) -> Result<MessageMetadata> {
        (**self).get_metadata(id).await
    }

    async fn get_full_content(&self, id: &str) -> Result<MessageContent> {
        (**self).get_full_content(id).await
    }
}
