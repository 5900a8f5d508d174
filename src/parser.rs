//! Internal module for parsing header values and decoding message bodies.

use crate::error::{Error, Result};
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{DateTime, FixedOffset};
use tracing::debug;

/// URL-safe base64 that accepts bodies with or without trailing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Parses a `Date` header value.
///
/// Accepts RFC 2822 dates with a numeric offset, optionally followed by a
/// parenthesized zone name (`... +0000 (UTC)`). Anything else yields `None`.
pub(crate) fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = strip_zone_comment(value.trim());

    DateTime::parse_from_rfc2822(value)
        .or_else(|_| DateTime::parse_from_str(value, "%a, %d %b %Y %H:%M:%S %z"))
        .ok()
}

/// Drops a trailing `(Zone Name)` annotation.
fn strip_zone_comment(value: &str) -> &str {
    if !value.ends_with(')') {
        return value;
    }
    match value.rfind('(') {
        Some(open) => value[..open].trim_end(),
        None => value,
    }
}

/// Decodes RFC 2047 encoded-words in a header value.
///
/// Values that mailparse cannot read are returned unchanged.
pub(crate) fn decode_header_value(raw: &str) -> String {
    let line = format!("{}: {raw}", crate::mailbox::FROM_HEADER);
    match mailparse::parse_header(line.as_bytes()) {
        Ok((header, _)) => header.get_value(),
        Err(e) => {
            debug!(error = %e, "Header value not decodable, using raw value");
            raw.to_string()
        }
    }
}

/// Joins encoded body parts without separator and decodes them to UTF-8 text.
///
/// Parts are usually padded on their own, so the joined text may carry `=`
/// in the middle. It is decoded one padded segment at a time.
pub(crate) fn decode_body<S: AsRef<str>>(parts: &[S]) -> Result<String> {
    let encoded: String = parts.iter().map(AsRef::as_ref).collect();

    let mut bytes = Vec::with_capacity(encoded.len() / 4 * 3 + 3);
    for segment in padded_segments(&encoded) {
        URL_SAFE_LENIENT
            .decode_vec(segment, &mut bytes)
            .map_err(|source| Error::DecodeBody { source })?;
    }

    String::from_utf8(bytes).map_err(|source| Error::InvalidUtf8 { source })
}

/// Splits `encoded` after every run of `=` padding.
fn padded_segments(encoded: &str) -> impl Iterator<Item = &str> {
    let mut rest = encoded;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = match rest.find('=') {
            Some(pad) => rest[pad..]
                .find(|c: char| c != '=')
                .map_or(rest.len(), |len| pad + len),
            None => rest.len(),
        };
        let (segment, tail) = rest.split_at(end);
        rest = tail;
        Some(segment)
    })
}
