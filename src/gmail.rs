//! Gmail REST API implementation of [`MailClient`].
//!
//! The client is constructed once from a [`GmailConfig`] holding an
//! already-acquired OAuth2 access token and then injected into a
//! [`MessageFinder`](crate::MessageFinder). Token acquisition and refresh
//! happen elsewhere.
//!
//! # Example
//!
//! ```no_run
//! use mail_finder::{GmailClient, GmailConfig};
//!
//! # fn example() -> mail_finder::Result<()> {
//! let config = GmailConfig::builder()
//!     .access_token("ya29.a0...")
//!     .build()?;
//!
//! let client = GmailClient::new(config)?;
//! # Ok(())
//! # }
//! ```

use crate::config::GmailConfig;
use crate::error::{Error, Result};
use crate::mailbox::{
    MailClient, MessageContent, MessageMetadata, MessageSummary, DATE_HEADER, FROM_HEADER,
};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, instrument};

// ─────────────────────────────────────────────────────────────────────────────
// Wire types
// ─────────────────────────────────────────────────────────────────────────────

/// Most summaries the API returns for one listing request.
const MAX_PAGE_SIZE: usize = 500;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListMessagesResponse {
    #[serde(default)]
    messages: Vec<MessageRef>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageRef {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageResource {
    id: String,
    #[serde(default)]
    payload: Option<MessagePart>,
}

#[derive(Debug, Default, Deserialize)]
struct MessagePart {
    #[serde(default)]
    headers: Vec<Header>,
    #[serde(default)]
    body: Option<PartBody>,
    #[serde(default)]
    parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
struct Header {
    name: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct PartBody {
    #[serde(default)]
    data: Option<String>,
}

impl PartBody {
    fn data(body: Option<&PartBody>) -> Option<&str> {
        body.and_then(|body| body.data.as_deref())
    }
}

impl MessagePart {
    /// Encoded body fragments: each sub-part's data in order, or the part's
    /// own body when it has no sub-parts.
    fn encoded_parts(&self) -> Vec<String> {
        if self.parts.is_empty() {
            return PartBody::data(self.body.as_ref())
                .map(|data| vec![data.to_string()])
                .unwrap_or_default();
        }

        self.parts
            .iter()
            .filter_map(|part| PartBody::data(part.body.as_ref()))
            .map(str::to_string)
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Client
// ─────────────────────────────────────────────────────────────────────────────

/// Gmail API mailbox client.
pub struct GmailClient {
    http: Client,
    config: GmailConfig,
}

impl GmailClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the proxy is invalid or the HTTP client cannot be built.
    pub fn new(config: GmailConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(proxy) = &config.proxy {
            builder = builder.proxy(proxy.to_reqwest()?);
        }

        let http = builder.build().map_err(|e| Error::InvalidConfig {
            message: format!("failed to build HTTP client: {e}"),
        })?;

        Ok(Self { http, config })
    }

    /// Returns the configured mailbox owner.
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.config.user_id
    }

    /// Builds `{base}/gmail/v1/users/{user}/messages[/{id}]`.
    fn messages_url(&self, id: Option<&str>) -> Result<Url> {
        let mut url = self.config.api_base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| Error::InvalidConfig {
                message: format!(
                    "API base URL cannot be a base: {}",
                    self.config.api_base_url
                ),
            })?;
            segments
                .pop_if_empty()
                .extend(["gmail", "v1", "users", self.config.user_id.as_str(), "messages"]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Sends an authenticated GET and decodes the JSON response.
    async fn get_json<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T> {
        let response = self
            .http
            .get(url)
            .query(query)
            .bearer_auth(self.config.access_token())
            .send()
            .await
            .map_err(|source| Error::Http { operation, source })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Api {
                operation,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| Error::Http { operation, source })
    }
}

/// Bounds a call with `timeout`.
async fn with_timeout<T>(
    operation: &'static str,
    timeout: Duration,
    call: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| Error::RequestTimeout { operation, timeout })?
}

#[async_trait]
impl MailClient for GmailClient {
    /// Windows larger than one page are collected by following `nextPageToken`;
    /// each page request is bounded by the listing timeout.
    #[instrument(name = "GmailClient::list_recent", skip(self))]
    async fn list_recent(&self, count: usize) -> Result<Vec<MessageSummary>> {
        let url = self.messages_url(None)?;
        let mut summaries = Vec::with_capacity(count.min(MAX_PAGE_SIZE));
        let mut page_token: Option<String> = None;

        while summaries.len() < count {
            let page_size = (count - summaries.len()).min(MAX_PAGE_SIZE);
            let mut query = vec![("maxResults", page_size.to_string())];
            if let Some(token) = page_token.take() {
                query.push(("pageToken", token));
            }

            let page: ListMessagesResponse = with_timeout(
                "list_recent",
                self.config.timeouts.list,
                self.get_json("list_recent", url.clone(), &query),
            )
            .await?;

            let returned = page.messages.len();
            debug!(page_size, returned, "Listed messages");

            summaries.extend(
                page.messages
                    .into_iter()
                    .take(page_size)
                    .map(|message| MessageSummary::new(message.id)),
            );

            match page.next_page_token {
                Some(token) if returned > 0 => page_token = Some(token),
                _ => break,
            }
        }

        Ok(summaries)
    }

    #[instrument(name = "GmailClient::get_metadata", skip(self), fields(message_id = %id))]
    async fn get_metadata(&self, id: &str) -> Result<MessageMetadata> {
        let url = self.messages_url(Some(id))?;
        let query = [
            ("format", "metadata".to_string()),
            ("metadataHeaders", FROM_HEADER.to_string()),
            ("metadataHeaders", DATE_HEADER.to_string()),
        ];

        let message: MessageResource = with_timeout(
            "get_metadata",
            self.config.timeouts.metadata,
            self.get_json("get_metadata", url, &query),
        )
        .await?;

        let headers = message
            .payload
            .unwrap_or_default()
            .headers
            .into_iter()
            .map(|header| (header.name, header.value))
            .collect();

        Ok(MessageMetadata::new(message.id, headers))
    }

    #[instrument(name = "GmailClient::get_full_content", skip(self), fields(message_id = %id))]
    async fn get_full_content(&self, id: &str) -> Result<MessageContent> {
        let url = self.messages_url(Some(id))?;
        let query = [("format", "full".to_string())];

        let message: MessageResource = with_timeout(
            "get_full_content",
            self.config.timeouts.content,
            self.get_json("get_full_content", url, &query),
        )
        .await?;

        let parts = message
            .payload
            .as_ref()
            .map(MessagePart::encoded_parts)
            .unwrap_or_default();

        debug!(parts = parts.len(), "Fetched message content");

        Ok(MessageContent::new(message.id, parts))
    }
}

impl std::fmt::Debug for GmailClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailClient")
            .field("user_id", &self.config.user_id)
            .field("api_base_url", &self.config.api_base_url.as_str())
            .finish_non_exhaustive()
    }
}
