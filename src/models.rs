//! Data models for the Orchestrate SDK
//!
//! These types map request options and response bodies of the key/value,
//! search and graph endpoints.
//!
//! # Key Types
//!
//! * [`Ref`] - Opaque version reference of a document revision
//! * [`Document`] - A value together with its [`Path`]
//! * [`Precondition`] - Gate for conditional writes
//! * [`ListOpts`], [`DeleteOpts`] - Options for listing and deleting
//! * [`ListResult`], [`SearchResult`] - Paged results

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque version reference assigned by the service on every write
///
/// Refs carry no ordering; the only meaningful operation is comparing one
/// against the current ref of a document, which the service does for
/// `If-Match` requests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ref(String);

impl Ref {
    /// Wrap a raw ref string
    pub fn new(reference: impl Into<String>) -> Self {
        Ref(reference.into())
    }

    /// The raw ref string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the service did not report a ref
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Quoted form used in `If-Match` headers
    pub(crate) fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl fmt::Display for Ref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Ref {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<String> for Ref {
    fn from(reference: String) -> Self {
        Ref(reference)
    }
}

impl From<&str> for Ref {
    fn from(reference: &str) -> Self {
        Ref(reference.to_string())
    }
}

/// Location of one revision of a document
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Path {
    /// Collection name
    pub collection: String,
    /// Document key
    pub key: String,
    /// Revision ref (mapped from "ref" in API)
    #[serde(rename = "ref")]
    pub reference: Ref,
}

/// A document value with its path
///
/// `T` defaults to [`serde_json::Value`] for untyped access.
///
/// # Example
///
/// ```no_run
/// # use orchestrate_sdk::{Client, Document};
/// # #[derive(serde::Deserialize)]
/// # struct User { name: String }
/// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
/// let doc: Document<User> = client.get("users", "1").await?;
/// println!("{} at ref {}", doc.value.name, doc.path.reference);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Document<T = serde_json::Value> {
    /// Collection, key and ref of this revision
    pub path: Path,
    /// Decoded document body
    pub value: T,
    /// Time of this revision, when the service reports it
    #[serde(default, deserialize_with = "millis_opt")]
    pub reftime: Option<time::OffsetDateTime>,
}

/// Result of a put operation
#[derive(Debug, Clone)]
pub struct WriteResult {
    /// Path of the revision just written
    pub path: Path,
    /// Location header as returned by the service
    pub location: Option<String>,
    /// Request ID if available
    pub request_id: Option<String>,
}

/// Result of a delete operation
#[derive(Debug, Clone)]
pub struct DeleteResult {
    /// False when there was nothing to delete
    pub deleted: bool,
    /// Request ID if available
    pub request_id: Option<String>,
}

/// Precondition attached to a write
///
/// ```
/// use orchestrate_sdk::{Precondition, Ref};
///
/// let unconditional = Precondition::default();
/// let replace = Precondition::IfMatch(Ref::new("82eafab14dc84ed3"));
/// let create_only = Precondition::IfNoneMatch;
/// # let _ = (unconditional, replace, create_only);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Precondition {
    /// Write regardless of the current state
    #[default]
    Unconditional,
    /// Write only if the current ref equals this one
    IfMatch(Ref),
    /// Write only if no document exists at the key
    IfNoneMatch,
}

/// Options for deleting a document
#[derive(Debug, Clone, Default)]
pub struct DeleteOpts {
    /// Delete only if the current ref equals this one
    pub if_match: Option<Ref>,
    /// Also remove the revision history
    pub purge: bool,
}

/// Options for listing a collection
///
/// `start_key` is an inclusive lower bound and `after_key` an exclusive
/// one; at most one of them may be set.
///
/// ```
/// use orchestrate_sdk::ListOpts;
///
/// let first_page = ListOpts::new(20);
/// let next_page = ListOpts::new(20).after_key("key-19");
/// # let _ = (first_page, next_page);
/// ```
#[derive(Debug, Clone)]
pub struct ListOpts {
    /// Maximum number of results, must be positive
    pub limit: u32,
    /// Inclusive lower bound
    pub start_key: Option<String>,
    /// Exclusive lower bound
    pub after_key: Option<String>,
}

impl ListOpts {
    /// Options with the given limit and no cursor
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            start_key: None,
            after_key: None,
        }
    }

    /// Start at this key, inclusive
    pub fn start_key(mut self, key: impl Into<String>) -> Self {
        self.start_key = Some(key.into());
        self
    }

    /// Start after this key
    pub fn after_key(mut self, key: impl Into<String>) -> Self {
        self.after_key = Some(key.into());
        self
    }
}

impl Default for ListOpts {
    fn default() -> Self {
        Self::new(crate::DEFAULT_PAGE_LIMIT)
    }
}

/// One page of a collection listing or relation query
#[derive(Debug, Clone, Deserialize)]
pub struct ListResult<T = serde_json::Value> {
    /// Number of results in this page
    pub count: u64,
    /// Documents in key order
    #[serde(default = "Vec::new")]
    pub results: Vec<Document<T>>,
    /// Link to the next page, absent on the last page
    #[serde(default)]
    pub next: Option<String>,
}

impl<T> ListResult<T> {
    /// Cursor for the next page, taken from the `next` link
    pub fn next_after_key(&self) -> Option<String> {
        crate::util::query_param(self.next.as_deref()?, "afterKey")
    }

    /// True when the page holds no documents
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// A single search match
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit<T = serde_json::Value> {
    /// Path of the matching revision
    pub path: Path,
    /// Decoded document body
    pub value: T,
    /// Relevance score
    #[serde(default)]
    pub score: f64,
    /// Time of this revision, when the service reports it
    #[serde(default, deserialize_with = "millis_opt")]
    pub reftime: Option<time::OffsetDateTime>,
}

/// One page of search results
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult<T = serde_json::Value> {
    /// Number of results in this page
    pub count: u64,
    /// Total number of matches across all pages
    #[serde(default)]
    pub total_count: u64,
    /// Matches, best first
    #[serde(default = "Vec::new")]
    pub results: Vec<SearchHit<T>>,
    /// Link to the next page
    #[serde(default)]
    pub next: Option<String>,
    /// Link to the previous page
    #[serde(default)]
    pub prev: Option<String>,
}

impl<T> SearchResult<T> {
    /// Offset of the next page, taken from the `next` link
    pub fn next_offset(&self) -> Option<u32> {
        crate::util::query_param(self.next.as_deref()?, "offset")?
            .parse()
            .ok()
    }

    /// True when nothing matched on this page
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

fn millis_opt<'de, D>(deserializer: D) -> Result<Option<time::OffsetDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = Option::<i64>::deserialize(deserializer)?;
    millis
        .map(|ms| {
            time::OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
                .map_err(serde::de::Error::custom)
        })
        .transpose()
}
