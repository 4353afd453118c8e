//! Utility functions

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters escaped inside a single path segment: everything but the
/// RFC 3986 unreserved set, so `\` and `%` can never act as separators
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Extract header value as string
pub fn header_str(headers: &http::HeaderMap, name: &str) -> Option<String> {
    headers.get(name)?.to_str().ok().map(|s| s.to_string())
}

/// Generate a new request ID
pub fn generate_request_id() -> String {
    format!("sdk-{}", uuid::Uuid::new_v4())
}

/// URL encode a path segment
pub fn encode_path(s: &str) -> String {
    utf8_percent_encode(s, SEGMENT).to_string()
}

/// Whether a segment would be collapsed as `.` or `..` by URL parsing
pub fn is_dot_segment(s: &str) -> bool {
    s == "." || s == ".."
}

/// URL encode a query value
pub fn encode_query(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}

/// Turn an `ETag` header value into a bare ref
///
/// Strips a weak validator prefix, the surrounding quotes and the `-gzip`
/// suffix some front ends append to compressed responses.
pub fn ref_from_etag(etag: &str) -> Option<String> {
    let value = etag.trim();
    let value = value.strip_prefix("W/").unwrap_or(value);
    let value = value.trim_matches('"');
    let value = value.strip_suffix("-gzip").unwrap_or(value);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Split a `Location` style header `/v0/{collection}/{key}/refs/{ref}`
/// into its decoded collection, key and ref.
pub fn split_location(location: &str) -> Option<(String, String, String)> {
    let path = location.split('?').next().unwrap_or(location);
    let mut segments = path.trim_end_matches('/').rsplit('/');
    let reference = segments.next()?;
    if segments.next()? != "refs" {
        return None;
    }
    let key = segments.next()?;
    let collection = segments.next()?;
    if reference.is_empty() || key.is_empty() || collection.is_empty() {
        return None;
    }
    Some((decode(collection), decode(key), reference.to_string()))
}

/// Read a query parameter out of a relative or absolute URL
pub fn query_param(url: &str, name: &str) -> Option<String> {
    let (_, query) = url.split_once('?')?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| decode(&v.replace('+', " ")))
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}
