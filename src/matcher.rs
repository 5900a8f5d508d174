//! Content matching for extracting values from decoded message bodies.
//!
//! This module provides the [`Matcher`] trait, built-in implementations and
//! [`extract`], which turns a missed match into [`Error::Extraction`].
//!
//! # Example
//!
//! ```
//! use mail_finder::matcher::{LabeledValueMatcher, RegexMatcher, Matcher};
//!
//! // "Label ( value )" markers, as used by sign-in emails
//! let sign_in = LabeledValueMatcher::new("Sign In");
//! let text = "Welcome!\nSign In ( https://example.com/login?t=abc )\nBye";
//! assert_eq!(sign_in.find_match(text).as_deref(), Some("https://example.com/login?t=abc"));
//!
//! // Using custom regex
//! let custom = RegexMatcher::new(r"token=([a-f0-9]+)").unwrap();
//! let text = "Click here: https://example.com?token=abc123";
//! assert_eq!(custom.find_match(text).as_deref(), Some("abc123"));
//! ```

use crate::error::{Error, Result};
use regex::Regex;
use std::borrow::Cow;

/// Trait for matching and extracting content from message bodies.
///
/// Implement this trait to define custom matching logic.
///
/// # Example
///
/// ```
/// use mail_finder::matcher::Matcher;
/// use std::borrow::Cow;
///
/// struct FirstLineMatcher;
///
/// impl Matcher for FirstLineMatcher {
///     fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
///         text.lines().next().map(Cow::Borrowed)
///     }
///
///     fn description(&self) -> &str {
///         "first line"
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Attempts to find and extract matching content from the text.
    ///
    /// Returns `Some(matched_value)` if found, `None` otherwise.
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>>;

    /// Returns a human-readable description of what this matcher looks for.
    ///
    /// Used in logging and error messages.
    fn description(&self) -> &str;
}

/// Runs `matcher` over `text`, failing with [`Error::Extraction`] on a miss.
///
/// # Errors
///
/// Returns [`Error::Extraction`] if the matcher finds nothing.
///
/// ```
/// use mail_finder::matcher::{extract, LabeledValueMatcher};
/// use mail_finder::Error;
///
/// let matcher = LabeledValueMatcher::new("Sign In");
/// assert_eq!(extract("...Sign In ( https://x )...", &matcher).unwrap(), "https://x");
/// assert!(matches!(extract("nothing here", &matcher), Err(Error::Extraction { .. })));
/// ```
pub fn extract(text: &str, matcher: &dyn Matcher) -> Result<String> {
    matcher
        .find_match(text)
        .map(Cow::into_owned)
        .ok_or_else(|| Error::Extraction {
            matcher: matcher.description().to_string(),
        })
}

/// Regex-based matcher that extracts the first capture group.
///
/// # Example
///
/// ```
/// use mail_finder::matcher::{RegexMatcher, Matcher};
///
/// let matcher = RegexMatcher::new(r"code:\s*(\d+)").unwrap();
/// assert_eq!(matcher.find_match("Your code: 42"), Some("42".into()));
/// ```
#[derive(Debug, Clone)]
pub struct RegexMatcher {
    regex: Regex,
    description: String,
}

impl RegexMatcher {
    /// Creates a new regex matcher.
    ///
    /// The first capture group is extracted; patterns without a group yield the
    /// whole match.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the regex does not compile.
    pub fn new(pattern: &str) -> Result<Self> {
        Self::with_description(pattern, format!("regex pattern: {pattern}"))
    }

    /// Creates a new regex matcher with a custom description.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] if the regex does not compile.
    pub fn with_description(pattern: &str, description: impl Into<String>) -> Result<Self> {
        let regex = Regex::new(pattern).map_err(|source| Error::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self {
            description: description.into(),
            regex,
        })
    }
}

impl Matcher for RegexMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.regex
            .captures(text)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(0)))
            .map(|m| Cow::Borrowed(m.as_str()))
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Matcher for values written as `Label ( VALUE )`.
///
/// Whitespace inside and around the parentheses is optional and never part of
/// the returned value.
///
/// # Example
///
/// ```
/// use mail_finder::matcher::{LabeledValueMatcher, Matcher};
///
/// let matcher = LabeledValueMatcher::new("Sign In");
/// assert_eq!(matcher.find_match("Sign In (https://x)").as_deref(), Some("https://x"));
/// assert_eq!(matcher.find_match("Sign Up ( https://x )"), None);
/// ```
#[derive(Debug, Clone)]
pub struct LabeledValueMatcher {
    inner: RegexMatcher,
}

impl LabeledValueMatcher {
    /// Creates a matcher for the value following `label`.
    ///
    /// # Panics
    ///
    /// Panics if the generated regex cannot be compiled (cannot happen, the label is escaped).
    #[must_use]
    pub fn new(label: &str) -> Self {
        let pattern = format!(r"{}\s*\(\s*([^)]*?)\s*\)", regex::escape(label));
        Self {
            inner: RegexMatcher::with_description(&pattern, label).expect("valid regex"),
        }
    }
}

impl Matcher for LabeledValueMatcher {
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        self.inner
            .find_match(text)
            .filter(|value| !value.is_empty())
    }

    fn description(&self) -> &str {
        self.inner.description()
    }
}

/// Matcher using a closure for custom matching logic.
///
/// # Example
///
/// ```
/// use mail_finder::matcher::{ClosureMatcher, Matcher};
/// use std::borrow::Cow;
///
/// let matcher = ClosureMatcher::new(
///     |text| {
///         text.lines()
///             .find(|line| line.starts_with("Code:"))
///             .map(|line| Cow::Owned(line.trim_start_matches("Code:").trim().to_string()))
///     },
///     "code line extractor"
/// );
///
/// let text = "Hello\nCode: ABC123\nThanks";
/// assert_eq!(matcher.find_match(text).as_deref(), Some("ABC123"));
/// ```
pub struct ClosureMatcher<F>
where
    F: for<'a> Fn(&'a str) -> Option<Cow<'a, str>> + Send + Sync,
{
    matcher_fn: F,
    description: String,
}

impl<F> ClosureMatcher<F>
where
    F: for<'a> Fn(&'a str) -> Option<Cow<'a, str>> + Send + Sync,
{
    /// Creates a new closure-based matcher.
    #[must_use]
    pub fn new(matcher_fn: F, description: impl Into<String>) -> Self {
        Self {
            matcher_fn,
            description: description.into(),
        }
    }
}

impl<F> Matcher for ClosureMatcher<F>
where
    F: for<'a> Fn(&'a str) -> Option<Cow<'a, str>> + Send + Sync,
{
    fn find_match<'a>(&self, text: &'a str) -> Option<Cow<'a, str>> {
        (self.matcher_fn)(text)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl<F> std::fmt::Debug for ClosureMatcher<F>
where
    F: for<'a> Fn(&'a str) -> Option<Cow<'a, str>> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClosureMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}
