//! Configuration for the message finder and the Gmail client.
//!
//! Use the builders to create configurations with sensible defaults:
//!
//! ```
//! use mail_finder::{FinderConfig, GmailConfig};
//!
//! let finder = FinderConfig::builder()
//!     .max_attempts(3)
//!     .build()
//!     .expect("valid config");
//!
//! let gmail = GmailConfig::builder()
//!     .access_token("ya29.token")
//!     .build()
//!     .expect("valid config");
//! ```

use crate::error::{Error, Result};
use crate::proxy::Socks5Proxy;
use email_address::EmailAddress;
use reqwest::Url;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;

/// Default number of listing attempts.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;
/// Default window growth per attempt.
pub const DEFAULT_WINDOW_STEP: usize = 5;
/// Default Gmail API endpoint.
pub const DEFAULT_API_BASE_URL: &str = "https://gmail.googleapis.com";
/// Mailbox alias for the authenticated user.
pub const AUTHENTICATED_USER: &str = "me";

/// Search behaviour of [`MessageFinder`](crate::MessageFinder).
#[derive(Debug, Clone)]
pub struct FinderConfig {
    /// Number of listing attempts before giving up (at least 1).
    pub max_attempts: u32,
    /// Window growth per attempt: attempt `k` lists `k * window_step` messages.
    pub window_step: usize,
    /// Pause between attempts. Zero disables sleeping.
    pub attempt_delay: Duration,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window_step: DEFAULT_WINDOW_STEP,
            attempt_delay: Duration::ZERO,
        }
    }
}

impl FinderConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> FinderConfigBuilder {
        FinderConfigBuilder::default()
    }

    /// Number of summaries requested on `attempt` (1-based).
    ///
    /// ```
    /// use mail_finder::FinderConfig;
    ///
    /// let config = FinderConfig::default();
    /// assert_eq!(config.window_size(1), 5);
    /// assert_eq!(config.window_size(2), 10);
    /// ```
    #[must_use]
    pub fn window_size(&self, attempt: u32) -> usize {
        let attempt = usize::try_from(attempt).unwrap_or(usize::MAX);
        attempt.saturating_mul(self.window_step)
    }
}

/// Builder for [`FinderConfig`].
#[derive(Debug, Default)]
pub struct FinderConfigBuilder {
    max_attempts: Option<u32>,
    window_step: Option<usize>,
    attempt_delay: Option<Duration>,
}

impl FinderConfigBuilder {
    /// Sets the number of listing attempts (default 5).
    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = Some(attempts);
        self
    }

    /// Sets the window growth per attempt (default 5).
    #[must_use]
    pub fn window_step(mut self, step: usize) -> Self {
        self.window_step = Some(step);
        self
    }

    /// Sets the pause between attempts (default none).
    #[must_use]
    pub fn attempt_delay(mut self, delay: Duration) -> Self {
        self.attempt_delay = Some(delay);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] if `max_attempts` or `window_step` is zero.
    pub fn build(self) -> Result<FinderConfig> {
        let max_attempts = self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        if max_attempts == 0 {
            return Err(Error::InvalidConfig {
                message: "max_attempts must be at least 1".into(),
            });
        }

        let window_step = self.window_step.unwrap_or(DEFAULT_WINDOW_STEP);
        if window_step == 0 {
            return Err(Error::InvalidConfig {
                message: "window_step must be at least 1".into(),
            });
        }

        Ok(FinderConfig {
            max_attempts,
            window_step,
            attempt_delay: self.attempt_delay.unwrap_or_default(),
        })
    }
}

/// Configuration for [`GmailClient`](crate::GmailClient).
///
/// Create using [`GmailConfig::builder()`].
///
/// The access token is stored as a [`SecretString`] and redacted from `Debug`
/// output. Acquiring and refreshing it is the caller's job.
#[derive(Clone)]
pub struct GmailConfig {
    access_token: SecretString,
    /// Mailbox owner: `me` or the account's email address.
    pub user_id: String,
    /// API endpoint, overridable for testing.
    pub api_base_url: Url,
    /// Per-call timeouts.
    pub timeouts: TimeoutConfig,
    /// Optional SOCKS5 proxy for API traffic.
    pub proxy: Option<Socks5Proxy>,
}

impl std::fmt::Debug for GmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GmailConfig")
            .field("access_token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("api_base_url", &self.api_base_url.as_str())
            .field("timeouts", &self.timeouts)
            .field("proxy", &self.proxy)
            .finish()
    }
}

impl GmailConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> GmailConfigBuilder {
        GmailConfigBuilder::default()
    }

    /// Returns the access token.
    ///
    /// The token is intentionally not directly accessible to prevent accidental logging.
    #[must_use]
    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }
}

/// Timeout configuration for mail client calls.
#[derive(Debug, Clone)]
pub struct TimeoutConfig {
    /// Timeout for listing recent messages.
    pub list: Duration,
    /// Timeout for fetching message headers.
    pub metadata: Duration,
    /// Timeout for fetching a full message.
    pub content: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            list: Duration::from_secs(30),
            metadata: Duration::from_secs(10),
            content: Duration::from_secs(30),
        }
    }
}

/// Validates a mailbox user id: `me` or an email address.
fn validate_user_id(user_id: String) -> Result<String> {
    if user_id == AUTHENTICATED_USER {
        return Ok(user_id);
    }
    match EmailAddress::parse_with_options(&user_id, email_address::Options::default()) {
        Ok(_) => Ok(user_id),
        Err(_) => Err(Error::InvalidUserId { user_id }),
    }
}

/// Builder for [`GmailConfig`].
#[derive(Debug, Default)]
pub struct GmailConfigBuilder {
    access_token: Option<String>,
    user_id: Option<String>,
    api_base_url: Option<String>,
    timeouts: Option<TimeoutConfig>,
    proxy: Option<Socks5Proxy>,
}

impl GmailConfigBuilder {
    /// Sets the OAuth2 access token (required).
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    /// Sets the mailbox owner (default `me`).
    #[must_use]
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Overrides the API endpoint.
    #[must_use]
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Sets timeout configuration.
    #[must_use]
    pub fn timeouts(mut self, timeouts: TimeoutConfig) -> Self {
        self.timeouts = Some(timeouts);
        self
    }

    /// Sets the listing timeout.
    #[must_use]
    pub fn list_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts.get_or_insert_with(TimeoutConfig::default).list = timeout;
        self
    }

    /// Sets the header fetch timeout.
    #[must_use]
    pub fn metadata_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .metadata = timeout;
        self
    }

    /// Sets the full-content fetch timeout.
    #[must_use]
    pub fn content_timeout(mut self, timeout: Duration) -> Self {
        self.timeouts
            .get_or_insert_with(TimeoutConfig::default)
            .content = timeout;
        self
    }

    /// Sets a SOCKS5 proxy for API traffic.
    #[must_use]
    pub fn proxy(mut self, proxy: Socks5Proxy) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or empty, the user id is not
    /// `me` or an email address, or the base URL does not parse.
    pub fn build(self) -> Result<GmailConfig> {
        let token = self
            .access_token
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| Error::InvalidConfig {
                message: "access token is required".into(),
            })?;

        let user_id = validate_user_id(
            self.user_id
                .unwrap_or_else(|| AUTHENTICATED_USER.to_string()),
        )?;

        let base = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&base).map_err(|e| Error::InvalidConfig {
            message: format!("invalid API base URL '{base}': {e}"),
        })?;

        Ok(GmailConfig {
            access_token: SecretString::from(token),
            user_id,
            api_base_url,
            timeouts: self.timeouts.unwrap_or_default(),
            proxy: self.proxy,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finder_defaults() {
        let config = FinderConfig::builder().build().unwrap();
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.window_step, 5);
        assert_eq!(config.attempt_delay, Duration::ZERO);
    }

    #[test]
    fn test_finder_rejects_zero_attempts() {
        let result = FinderConfig::builder().max_attempts(0).build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_finder_rejects_zero_step() {
        let result = FinderConfig::builder().window_step(0).build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_window_strictly_increasing() {
        let config = FinderConfig::builder().window_step(10).build().unwrap();
        let sizes: Vec<usize> = (1..=5).map(|k| config.window_size(k)).collect();
        assert_eq!(sizes, vec![10, 20, 30, 40, 50]);
        assert!(sizes.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_window_saturates() {
        let config = FinderConfig::builder()
            .window_step(usize::MAX)
            .build()
            .unwrap();
        assert_eq!(config.window_size(2), usize::MAX);
    }

    #[test]
    fn test_gmail_minimal() {
        let config = GmailConfig::builder().access_token("tok").build().unwrap();
        assert_eq!(config.access_token(), "tok");
        assert_eq!(config.user_id, "me");
        assert_eq!(config.api_base_url.as_str(), "https://gmail.googleapis.com/");
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_gmail_full() {
        let config = GmailConfig::builder()
            .access_token("tok")
            .user_id("user@example.com")
            .api_base_url("http://127.0.0.1:8080")
            .list_timeout(Duration::from_secs(5))
            .proxy(Socks5Proxy::new("proxy.local", 1080))
            .build()
            .unwrap();

        assert_eq!(config.user_id, "user@example.com");
        assert_eq!(config.timeouts.list, Duration::from_secs(5));
        assert_eq!(config.timeouts.content, Duration::from_secs(30));
        assert!(config.proxy.is_some());
    }

    #[test]
    fn test_gmail_per_call_timeouts() {
        let config = GmailConfig::builder()
            .access_token("tok")
            .list_timeout(Duration::from_secs(1))
            .metadata_timeout(Duration::from_secs(2))
            .content_timeout(Duration::from_secs(3))
            .build()
            .unwrap();

        assert_eq!(config.timeouts.list, Duration::from_secs(1));
        assert_eq!(config.timeouts.metadata, Duration::from_secs(2));
        assert_eq!(config.timeouts.content, Duration::from_secs(3));
    }

    #[test]
    fn test_gmail_missing_token() {
        assert!(GmailConfig::builder().build().is_err());
        assert!(GmailConfig::builder().access_token("  ").build().is_err());
    }

    #[test]
    fn test_gmail_invalid_user_id() {
        let result = GmailConfig::builder()
            .access_token("tok")
            .user_id("not-an-email")
            .build();
        assert!(matches!(result, Err(Error::InvalidUserId { .. })));
    }

    #[test]
    fn test_gmail_invalid_base_url() {
        let result = GmailConfig::builder()
            .access_token("tok")
            .api_base_url("not a url")
            .build();
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_token_not_in_debug() {
        let config = GmailConfig::builder()
            .access_token("super-secret-token")
            .build()
            .unwrap();

        let debug_str = format!("{config:?}");
        assert!(!debug_str.contains("super-secret-token"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
