//! Widening-window search for a message by sender and send time.
//!
//! [`MessageFinder`] is the main entry point for this crate. It provides async
//! methods to:
//!
//! - Find the first recent message from a sender sent at or after a given time
//! - Fetch and decode a message body
//! - Extract a value from the decoded body
//!
//! # Example
//!
//! ```no_run
//! use chrono::{Duration, Utc};
//! use mail_finder::matcher::LabeledValueMatcher;
//! use mail_finder::{FinderConfig, GmailClient, GmailConfig, MessageFinder, SearchCriteria};
//!
//! # async fn example() -> mail_finder::Result<()> {
//! let client = GmailClient::new(GmailConfig::builder().access_token("ya29...").build()?)?;
//! let finder = MessageFinder::new(client, FinderConfig::default());
//!
//! let criteria = SearchCriteria::new(
//!     "Example <noreply@example.com>",
//!     Utc::now() - Duration::minutes(5),
//! );
//! let link = finder
//!     .find_and_extract(&criteria, &LabeledValueMatcher::new("Sign In"))
//!     .await?;
//! println!("Sign-in link: {link}");
//! # Ok(())
//! # }
//! ```

use crate::config::FinderConfig;
use crate::error::{Error, Result};
use crate::mailbox::{MailClient, MessageMetadata, MessageSummary, DATE_HEADER, FROM_HEADER};
use crate::matcher::{self, Matcher};
use crate::parser;
use chrono::{DateTime, TimeZone, Utc};
use tracing::{debug, info, instrument, warn};

/// What to look for: exact sender and earliest acceptable send time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    sender: String,
    min_time: DateTime<Utc>,
}

impl SearchCriteria {
    /// Creates search criteria.
    ///
    /// `sender` is compared for exact equality with the decoded `From` header,
    /// display name included. `min_time` is inclusive.
    #[must_use]
    pub fn new<Tz: TimeZone>(sender: impl Into<String>, min_time: DateTime<Tz>) -> Self {
        Self {
            sender: sender.into(),
            min_time: min_time.with_timezone(&Utc),
        }
    }

    /// Returns the expected sender.
    #[must_use]
    pub fn sender(&self) -> &str {
        &self.sender
    }

    /// Returns the earliest acceptable send time.
    #[must_use]
    pub fn min_time(&self) -> DateTime<Utc> {
        self.min_time
    }

    /// Returns `true` if `metadata` was sent by the expected sender at or after
    /// the minimum time.
    ///
    /// Missing headers and unparsable dates never match.
    ///
    /// ```
    /// use chrono::{TimeZone, Utc};
    /// use mail_finder::{MessageMetadata, SearchCriteria};
    ///
    /// let criteria = SearchCriteria::new(
    ///     "a@example.com",
    ///     Utc.with_ymd_and_hms(2024, 10, 15, 9, 0, 0).unwrap(),
    /// );
    /// let meta = MessageMetadata::new("m1", vec![
    ///     ("From".into(), "a@example.com".into()),
    ///     ("Date".into(), "Tue, 15 Oct 2024 09:30:00 +0000 (UTC)".into()),
    /// ]);
    /// assert!(criteria.matches(&meta));
    /// ```
    #[must_use]
    pub fn matches(&self, metadata: &MessageMetadata) -> bool {
        let Some(from) = metadata.header(FROM_HEADER) else {
            debug!(message_id = %metadata.id, "Message has no From header");
            return false;
        };
        if parser::decode_header_value(from) != self.sender {
            return false;
        }

        let Some(date) = metadata.header(DATE_HEADER) else {
            debug!(message_id = %metadata.id, "Message has no Date header");
            return false;
        };
        match parser::parse_date(date) {
            Some(sent) => sent.with_timezone(&Utc) >= self.min_time,
            None => {
                warn!(
                    message_id = %metadata.id,
                    date,
                    "Unparsable Date header, skipping message"
                );
                false
            }
        }
    }
}

/// Searches a mailbox through a [`MailClient`] and decodes what it finds.
///
/// Create using [`MessageFinder::new`] with an already constructed client.
/// The finder never touches credentials and holds no state between calls.
pub struct MessageFinder<C> {
    client: C,
    config: FinderConfig,
}

impl<C: MailClient> MessageFinder<C> {
    /// Creates a finder over `client`.
    #[must_use]
    pub fn new(client: C, config: FinderConfig) -> Self {
        Self { client, config }
    }

    /// Returns the search configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Returns the underlying mail client.
    #[must_use]
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Finds the first message matching `criteria`.
    ///
    /// Attempt `k` lists the `k * window_step` most recent messages and checks
    /// them in listing order. The first match of any attempt is returned.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] once every attempt came up empty, or the
    /// first mail client error encountered.
    #[instrument(
        name = "MessageFinder::find",
        skip(self, criteria),
        fields(
            sender = %criteria.sender(),
            min_time = %criteria.min_time(),
            max_attempts = self.config.max_attempts
        )
    )]
    pub async fn find(&self, criteria: &SearchCriteria) -> Result<String> {
        let max_attempts = self.config.max_attempts;

        for attempt in 1..=max_attempts {
            let window = self.config.window_size(attempt);
            let summaries = self.client.list_recent(window).await?;

            debug!(attempt, window, listed = summaries.len(), "Scanning window");

            if let Some(id) = self.first_match(&summaries, criteria).await? {
                info!(attempt, message_id = %id, "Found matching message");
                return Ok(id);
            }

            if attempt < max_attempts && !self.config.attempt_delay.is_zero() {
                tokio::time::sleep(self.config.attempt_delay).await;
            }
        }

        debug!(attempts = max_attempts, "No matching message");
        Err(Error::NotFound {
            attempts: max_attempts,
        })
    }

    /// Fetches message `id` once and decodes its body to text.
    ///
    /// # Errors
    ///
    /// Returns the mail client error as-is, or a decoding error if the body is
    /// not URL-safe base64 encoded UTF-8.
    #[instrument(name = "MessageFinder::fetch_text", skip(self), fields(message_id = %id))]
    pub async fn fetch_text(&self, id: &str) -> Result<String> {
        let content = self.client.get_full_content(id).await?;
        let text = parser::decode_body(&content.parts)?;

        debug!(parts = content.parts.len(), chars = text.len(), "Decoded body");

        Ok(text)
    }

    /// Finds the first matching message and returns its decoded body.
    ///
    /// # Errors
    ///
    /// See [`find`](Self::find) and [`fetch_text`](Self::fetch_text).
    pub async fn find_text(&self, criteria: &SearchCriteria) -> Result<String> {
        let id = self.find(criteria).await?;
        self.fetch_text(&id).await
    }

    /// Finds the first matching message and extracts a value from its body.
    ///
    /// # Errors
    ///
    /// See [`find_text`](Self::find_text); additionally returns
    /// [`Error::Extraction`] if `matcher` finds nothing in the body.
    #[instrument(
        name = "MessageFinder::find_and_extract",
        skip(self, criteria, matcher),
        fields(matcher = %matcher.description())
    )]
    pub async fn find_and_extract(
        &self,
        criteria: &SearchCriteria,
        matcher: &dyn Matcher,
    ) -> Result<String> {
        let text = self.find_text(criteria).await?;
        matcher::extract(&text, matcher)
    }

    /// Returns the id of the first summary whose metadata matches, in listing order.
    async fn first_match(
        &self,
        summaries: &[MessageSummary],
        criteria: &SearchCriteria,
    ) -> Result<Option<String>> {
        for summary in summaries {
            let metadata = self.client.get_metadata(&summary.id).await?;
            if criteria.matches(&metadata) {
                return Ok(Some(summary.id.clone()));
            }
        }
        Ok(None)
    }
}

impl<C> std::fmt::Debug for MessageFinder<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MessageFinder")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
