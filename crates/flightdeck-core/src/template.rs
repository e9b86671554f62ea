//! URL template expansion.
//!
//! A template is an absolute http(s) URL containing zero or more `{{q}}`
//! placeholders. Resolving replaces every placeholder with the query encoded
//! the way a URI component is encoded, so the result is always a well-formed
//! URL or an [`Error::InvalidTemplate`].

use crate::{Error, Result};
use flightdeck_types::QUERY_PLACEHOLDER;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use url::Url;

/// Characters left untouched by URI-component encoding.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Stand-in for the query while checking a template's shape.
const SENTINEL: &str = "X";

/// Encode a query string as a URI component.
#[must_use]
pub fn encode_query(query: &str) -> String {
    utf8_percent_encode(query, URI_COMPONENT).to_string()
}

fn parse_http(candidate: &str, template: &str) -> Result<Url> {
    let url = Url::parse(candidate).map_err(|_| Error::InvalidTemplate(template.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(Error::InvalidTemplate(template.to_string())),
    }
}

/// Check that a template is an absolute http(s) URL once its placeholders are filled.
///
/// # Errors
///
/// Returns [`Error::InvalidTemplate`] if the template does not parse or uses another scheme.
pub fn validate(template: &str) -> Result<Url> {
    parse_http(&template.replace(QUERY_PLACEHOLDER, SENTINEL), template)
}

/// Expand `template` with `query`.
///
/// # Errors
///
/// Returns [`Error::InvalidTemplate`] if the template is not a valid http(s) URL
/// with a sentinel query, or if the expanded string no longer parses.
pub fn resolve(template: &str, query: &str) -> Result<Url> {
    validate(template)?;
    let expanded = template.replace(QUERY_PLACEHOLDER, &encode_query(query));
    parse_http(&expanded, template)
}

/// Host shown on an overlay card for this template, empty when invalid.
#[must_use]
pub fn preview_host(template: &str) -> String {
    resolve(template, SENTINEL)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .unwrap_or_default()
}
