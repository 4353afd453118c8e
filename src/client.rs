//! Orchestrate Client Implementation
//!
//! This module contains the main `Client` struct that maps every operation
//! of the Orchestrate REST API onto exactly one HTTP request.
//!
//! # Architecture
//!
//! - **HTTP Layer**: Built on `reqwest` for async HTTP operations
//! - **Serialization**: Request and response bodies via `serde_json`
//! - **Authentication**: API key sent as HTTP Basic on every request
//! - **Error Mapping**: 404 and 412 become dedicated error variants
//! - **Telemetry**: Optional OpenTelemetry integration for observability
//!
//! There is no retry, caching or batching. A failed request is reported to
//! the caller as-is.
//!
//! # Examples
//!
//! ## Optimistic Concurrency
//!
//! ```no_run
//! use orchestrate_sdk::{Client, Document};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_api_key("your-api-key")?;
//!
//! client.put("users", "2", &json!({"id": 2})).await?;
//!
//! let current: Document = client.get("users", "2").await?;
//! client
//!     .put_if_match("users", "2", &json!({"id": 2, "v": 2}), &current.path.reference)
//!     .await?;
//!
//! // The same ref is stale now
//! let again = client
//!     .put_if_match("users", "2", &json!({"id": 2, "v": 3}), &current.path.reference)
//!     .await;
//! assert!(again.unwrap_err().is_precondition_failed());
//! # Ok(())
//! # }
//! ```

use crate::{
    config::ClientConfig,
    endpoints::Endpoints,
    errors::{Error, ErrorResponse, Result},
    models::*,
    telemetry::Metrics,
    util::{
        encode_query, generate_request_id, header_str, is_dot_segment, ref_from_etag,
        split_location,
    },
};

use reqwest::{header, Client as HttpClient, Method, Response};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

const USER_AGENT_PREFIX: &str = "orchestrate-sdk-rust";

/// Response header carrying the service-side request ID
const REQUEST_ID_HEADER: &str = "x-orchestrate-req-id";

/// Orchestrate client
///
/// Cheap to clone; clones share the underlying connection pool. All state
/// besides the HTTP client is immutable configuration, so one instance can
/// be used from many tasks at once.
#[derive(Clone)]
pub struct Client {
    pub(crate) config: ClientConfig,
    http: HttpClient,
    endpoints: Endpoints,
    metrics: Arc<Metrics>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.config.base_url)
            .field("auth", &self.config.auth)
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

impl Client {
    /// Create a new client with the given configuration
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        let user_agent = if let Some(suffix) = &config.user_agent_suffix {
            format!("{}/{} {}", USER_AGENT_PREFIX, crate::VERSION, suffix)
        } else {
            format!("{}/{}", USER_AGENT_PREFIX, crate::VERSION)
        };

        let http = HttpClient::builder()
            .user_agent(user_agent)
            .timeout(config.timeout)
            .https_only(!config.allow_insecure_http)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        let metrics = Arc::new(Metrics::new(&config.telemetry_config));

        Ok(Self {
            endpoints: Endpoints::new(&config.base_url),
            http,
            metrics,
            config,
        })
    }

    /// Create a client for the hosted service with an API key
    ///
    /// Equivalent to `ClientBuilder::new().api_key(key).build()`.
    pub fn with_api_key(key: impl Into<String>) -> Result<Self> {
        crate::ClientBuilder::new().api_key(key).build()
    }

    /// Create a collection by writing its first document
    ///
    /// Collections come into existence with their first document, so this
    /// is an unconditional [`put`](Self::put) that refuses a null item.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidArgument` for `item` if it serializes to JSON `null`;
    ///   no request is sent in that case
    pub async fn create_collection<T>(
        &self,
        collection: &str,
        key: &str,
        item: &T,
    ) -> Result<WriteResult>
    where
        T: Serialize + ?Sized,
    {
        let value = serde_json::to_value(item)?;
        if value.is_null() {
            return Err(Error::invalid_argument("item", "item cannot be null"));
        }

        self.put_with(collection, key, &value, Precondition::Unconditional)
            .await
    }

    /// Fetch the latest revision of a document
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` if the collection or key does not exist
    /// * `Error::Deserialize` if the stored value does not fit `T`
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use orchestrate_sdk::{Client, Document};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// match client.get::<serde_json::Value>("users", "9999").await {
    ///     Ok(doc) => println!("found {}", doc.value),
    ///     Err(e) if e.is_not_found() => println!("absent"),
    ///     Err(e) => return Err(e.into()),
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn get<T: DeserializeOwned>(&self, collection: &str, key: &str) -> Result<Document<T>> {
        check_item(collection, key)?;
        let url = self.endpoints.item(collection, key);
        let request = self.build_request(Method::GET, &url)?;
        let response = self.execute(request).await?;

        self.parse_get_response(response, collection, key, None)
            .await
    }

    /// Fetch a specific historical revision of a document
    ///
    /// # Errors
    ///
    /// * `Error::NotFound` if there is no such revision for this key
    pub async fn get_ref<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        reference: &Ref,
    ) -> Result<Document<T>> {
        check_item(collection, key)?;
        let url = self.endpoints.item_ref(collection, key, reference.as_str());
        let request = self.build_request(Method::GET, &url)?;
        let response = self.execute(request).await?;

        self.parse_get_response(response, collection, key, Some(reference))
            .await
    }

    /// Write a document unconditionally
    ///
    /// Creates the document (and the collection) if needed, otherwise
    /// replaces it. Every successful write yields a new ref.
    pub async fn put<T>(&self, collection: &str, key: &str, item: &T) -> Result<WriteResult>
    where
        T: Serialize + ?Sized,
    {
        self.put_with(collection, key, item, Precondition::Unconditional)
            .await
    }

    /// Replace a document only if its current ref is `reference`
    ///
    /// # Errors
    ///
    /// * `Error::PreconditionFailed` if the document changed since
    ///   `reference` was read, does not exist, or `reference` belongs to
    ///   another key
    pub async fn put_if_match<T>(
        &self,
        collection: &str,
        key: &str,
        item: &T,
        reference: &Ref,
    ) -> Result<WriteResult>
    where
        T: Serialize + ?Sized,
    {
        self.put_with(
            collection,
            key,
            item,
            Precondition::IfMatch(reference.clone()),
        )
        .await
    }

    /// Create a document only if nothing exists at `key`
    ///
    /// # Errors
    ///
    /// * `Error::PreconditionFailed` if a document already exists
    pub async fn put_if_none_match<T>(
        &self,
        collection: &str,
        key: &str,
        item: &T,
    ) -> Result<WriteResult>
    where
        T: Serialize + ?Sized,
    {
        self.put_with(collection, key, item, Precondition::IfNoneMatch)
            .await
    }

    /// Write a document under the given precondition
    ///
    /// [`put`](Self::put), [`put_if_match`](Self::put_if_match) and
    /// [`put_if_none_match`](Self::put_if_none_match) are shorthands for
    /// this method.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use orchestrate_sdk::{Client, Precondition};
    /// # use serde_json::json;
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let created = client
    ///     .put_with("users", "3", &json!({"id": 3}), Precondition::IfNoneMatch)
    ///     .await?;
    ///
    /// client
    ///     .put_with(
    ///         "users",
    ///         "3",
    ///         &json!({"id": 3, "active": true}),
    ///         Precondition::IfMatch(created.path.reference),
    ///     )
    ///     .await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn put_with<T>(
        &self,
        collection: &str,
        key: &str,
        item: &T,
        precondition: Precondition,
    ) -> Result<WriteResult>
    where
        T: Serialize + ?Sized,
    {
        check_item(collection, key)?;
        let url = self.endpoints.item(collection, key);
        let mut request = self.build_request(Method::PUT, &url)?.json(item);

        match &precondition {
            Precondition::Unconditional => {}
            Precondition::IfMatch(reference) => {
                request = request.header(header::IF_MATCH, reference.quoted());
            }
            Precondition::IfNoneMatch => {
                request = request.header(header::IF_NONE_MATCH, "\"*\"");
            }
        }

        let response = match self.execute(request).await {
            Ok(response) => response,
            // A missing document cannot match any ref
            Err(Error::NotFound {
                message,
                request_id,
            }) if matches!(precondition, Precondition::IfMatch(_)) => {
                return Err(Error::PreconditionFailed {
                    message,
                    request_id,
                })
            }
            Err(e) => return Err(e),
        };
        self.parse_write_response(response, collection, key)
    }

    /// Delete a document
    ///
    /// Deleting a key that does not exist is not an error; the result then
    /// has `deleted == false`.
    pub async fn delete(&self, collection: &str, key: &str) -> Result<DeleteResult> {
        self.delete_with(collection, key, DeleteOpts::default())
            .await
    }

    /// Delete a document only if its current ref is `reference`
    ///
    /// # Errors
    ///
    /// * `Error::PreconditionFailed` if the document changed or is absent
    pub async fn delete_if_match(
        &self,
        collection: &str,
        key: &str,
        reference: &Ref,
    ) -> Result<DeleteResult> {
        let opts = DeleteOpts {
            if_match: Some(reference.clone()),
            ..Default::default()
        };
        self.delete_with(collection, key, opts).await
    }

    /// Delete a document with explicit options
    ///
    /// With `purge` set the revision history is removed as well, so older
    /// refs stop resolving through [`get_ref`](Self::get_ref).
    pub async fn delete_with(
        &self,
        collection: &str,
        key: &str,
        opts: DeleteOpts,
    ) -> Result<DeleteResult> {
        check_item(collection, key)?;
        let mut url = self.endpoints.item(collection, key);
        if opts.purge {
            url.push_str("?purge=true");
        }

        let mut request = self.build_request(Method::DELETE, &url)?;
        if let Some(reference) = &opts.if_match {
            request = request.header(header::IF_MATCH, reference.quoted());
        }

        match self.execute(request).await {
            Ok(response) => Ok(deleted(&response)),
            // A missing document cannot match any ref
            Err(Error::NotFound {
                message,
                request_id,
            }) if opts.if_match.is_some() => Err(Error::PreconditionFailed {
                message,
                request_id,
            }),
            Err(Error::NotFound { request_id, .. }) => {
                trace!("Delete of absent key {}/{}", collection, key);
                Ok(DeleteResult {
                    deleted: false,
                    request_id,
                })
            }
            Err(e) => Err(e),
        }
    }

    /// List documents of a collection in key order
    ///
    /// # Errors
    ///
    /// * `Error::InvalidArgument` for `limit` if it is zero
    /// * `Error::InvalidArgument` for `startKey` if both `start_key` and
    ///   `after_key` are set
    ///
    /// An empty page is a normal result, including when `after_key` is the
    /// last key of the collection.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use orchestrate_sdk::{Client, ListOpts, ListResult};
    /// # async fn example(client: &Client) -> Result<(), Box<dyn std::error::Error>> {
    /// let mut opts = ListOpts::new(100);
    /// loop {
    ///     let page: ListResult = client.list("users", opts.clone()).await?;
    ///     for doc in &page.results {
    ///         println!("{} => {}", doc.path.key, doc.value);
    ///     }
    ///     match page.next_after_key() {
    ///         Some(cursor) => opts = ListOpts::new(100).after_key(cursor),
    ///         None => break,
    ///     }
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn list<T: DeserializeOwned>(
        &self,
        collection: &str,
        opts: ListOpts,
    ) -> Result<ListResult<T>> {
        if opts.limit == 0 {
            return Err(Error::invalid_argument(
                "limit",
                "limit must be a positive integer",
            ));
        }
        if opts.start_key.is_some() && opts.after_key.is_some() {
            return Err(Error::invalid_argument(
                "startKey",
                "startKey and afterKey are mutually exclusive",
            ));
        }

        check_segment("collection", collection)?;
        let mut url = self.endpoints.collection(collection);
        url.push_str(&format!("?limit={}", opts.limit));
        if let Some(start_key) = &opts.start_key {
            url.push_str(&format!("&startKey={}", encode_query(start_key)));
        }
        if let Some(after_key) = &opts.after_key {
            url.push_str(&format!("&afterKey={}", encode_query(after_key)));
        }

        let request = self.build_request(Method::GET, &url)?;
        let response = self.execute(request).await?;

        self.parse_json_response(response).await
    }

    /// Search a collection
    ///
    /// `query` uses the service's Lucene syntax; `"*"` matches every
    /// document. A query that matches nothing, including one on a field no
    /// document has, yields an empty page rather than an error.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidArgument` for `limit` if it is zero
    pub async fn search<T: DeserializeOwned>(
        &self,
        collection: &str,
        query: &str,
        limit: u32,
        offset: u32,
    ) -> Result<SearchResult<T>> {
        if limit == 0 {
            return Err(Error::invalid_argument(
                "limit",
                "limit must be a positive integer",
            ));
        }

        check_segment("collection", collection)?;
        let mut url = self.endpoints.collection(collection);
        url.push_str(&format!(
            "?query={}&limit={}&offset={}",
            encode_query(query),
            limit,
            offset
        ));

        let request = self.build_request(Method::GET, &url)?;
        let response = self.execute(request).await?;

        self.parse_json_response(response).await
    }

    /// Delete a collection and everything in it
    ///
    /// Deleting a collection that does not exist is not an error.
    pub async fn delete_collection(&self, collection: &str) -> Result<DeleteResult> {
        check_segment("collection", collection)?;
        let mut url = self.endpoints.collection(collection);
        url.push_str("?force=true");

        let request = self.build_request(Method::DELETE, &url)?;
        match self.execute(request).await {
            Ok(response) => Ok(deleted(&response)),
            Err(Error::NotFound { request_id, .. }) => Ok(DeleteResult {
                deleted: false,
                request_id,
            }),
            Err(e) => Err(e),
        }
    }

    /// Create a directed relation `kind` from one document to another
    pub async fn put_relation(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        to_collection: &str,
        to_key: &str,
    ) -> Result<()> {
        check_relation(collection, key, kind, to_collection, to_key)?;
        let url = self
            .endpoints
            .relation(collection, key, kind, to_collection, to_key);
        let request = self.build_request(Method::PUT, &url)?;
        let _ = self.execute(request).await?;
        Ok(())
    }

    /// Follow one or more relation kinds starting at a document
    ///
    /// `kinds` is walked hop by hop: `["friend", "likes"]` returns what the
    /// document's friends like.
    ///
    /// # Errors
    ///
    /// * `Error::InvalidArgument` for `kinds` if it is empty
    pub async fn get_relations<T: DeserializeOwned>(
        &self,
        collection: &str,
        key: &str,
        kinds: &[&str],
    ) -> Result<ListResult<T>> {
        if kinds.is_empty() {
            return Err(Error::invalid_argument(
                "kinds",
                "at least one relation kind is required",
            ));
        }
        check_item(collection, key)?;
        for kind in kinds {
            check_segment("kinds", kind)?;
        }

        let url = self.endpoints.relations(collection, key, kinds);
        let request = self.build_request(Method::GET, &url)?;
        let response = self.execute(request).await?;

        self.parse_json_response(response).await
    }

    /// Remove a relation; removing one that does not exist is not an error
    pub async fn delete_relation(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        to_collection: &str,
        to_key: &str,
    ) -> Result<DeleteResult> {
        check_relation(collection, key, kind, to_collection, to_key)?;
        let mut url = self
            .endpoints
            .relation(collection, key, kind, to_collection, to_key);
        url.push_str("?purge=true");

        let request = self.build_request(Method::DELETE, &url)?;
        match self.execute(request).await {
            Ok(response) => Ok(deleted(&response)),
            Err(Error::NotFound { request_id, .. }) => Ok(DeleteResult {
                deleted: false,
                request_id,
            }),
            Err(e) => Err(e),
        }
    }

    /// Check that the service is reachable and accepts the credential
    ///
    /// # Errors
    ///
    /// * `Error::Http` with status 401 if the API key is rejected
    pub async fn ping(&self) -> Result<()> {
        let url = self.endpoints.root();
        let request = self.build_request(Method::HEAD, &url)?;
        let _ = self.execute(request).await?;
        Ok(())
    }

    // Helper methods

    /// Build a request with common headers
    fn build_request(&self, method: Method, url: &str) -> Result<reqwest::RequestBuilder> {
        let request_id = generate_request_id();
        trace!("{} {} ({})", method, url, request_id);

        Ok(self
            .http
            .request(method, url)
            .header("X-Request-ID", request_id))
    }

    /// Authenticate, send, and classify the response
    ///
    /// Returns the response only for 2xx statuses.
    async fn execute(&self, request_builder: reqwest::RequestBuilder) -> Result<Response> {
        let (auth_header, auth_value) = self
            .config
            .auth
            .get_header()
            .await
            .map_err(|e| Error::Config(format!("Failed to get auth header: {}", e)))?;

        let request = request_builder
            .header(auth_header, auth_value)
            .build()
            .map_err(|e| Error::Other(format!("Failed to build request: {}", e)))?;

        let method = request.method().clone();
        let path = request.url().path().to_string();
        let started = Instant::now();

        let response = match self.http.execute(request).await {
            Ok(response) => response,
            Err(e) => {
                let error = Error::from(e);
                warn!("{} {} failed: {}", method, path, error);
                self.metrics.record_error(error.kind());
                return Err(error);
            }
        };

        let status = response.status();
        self.metrics.record_request(
            method.as_str(),
            status.as_u16(),
            started.elapsed().as_secs_f64(),
        );
        debug!("{} {} -> {}", method, path, status.as_u16());

        if status.is_success() {
            return Ok(response);
        }

        let error = self.parse_error_response(response).await;
        debug!("{} {} classified as {}", method, path, error.kind().as_str());
        self.metrics.record_error(error.kind());
        Err(error)
    }

    /// Parse error response from server
    async fn parse_error_response(&self, response: Response) -> Error {
        let status = response.status().as_u16();
        let request_id = header_str(response.headers(), REQUEST_ID_HEADER);

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return Error::from(e),
        };

        match serde_json::from_str::<ErrorResponse>(&body) {
            Ok(error_resp) => Error::from_response(
                status,
                error_resp.code.as_deref().unwrap_or("unknown"),
                &error_resp.message,
                request_id,
            ),
            Err(_) => {
                let message = if body.trim().is_empty() {
                    format!("HTTP error {}", status)
                } else {
                    body
                };
                Error::from_response(status, "unknown", &message, request_id)
            }
        }
    }

    /// Parse JSON response
    async fn parse_json_response<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let bytes = response.bytes().await.map_err(Error::from)?;
        serde_json::from_slice(&bytes).map_err(Error::from)
    }

    /// Build the result of a write from its response headers
    fn parse_write_response(
        &self,
        response: Response,
        collection: &str,
        key: &str,
    ) -> Result<WriteResult> {
        let headers = response.headers();
        let location = header_str(headers, "location");
        let request_id = header_str(headers, REQUEST_ID_HEADER);

        let path = path_from_headers(headers, collection, key, None).ok_or_else(|| {
            Error::Deserialize(format!(
                "write to {}/{} returned no ref (status {})",
                collection,
                key,
                response.status()
            ))
        })?;

        Ok(WriteResult {
            path,
            location,
            request_id,
        })
    }

    /// Parse get response
    async fn parse_get_response<T: DeserializeOwned>(
        &self,
        response: Response,
        collection: &str,
        key: &str,
        requested: Option<&Ref>,
    ) -> Result<Document<T>> {
        let path = path_from_headers(response.headers(), collection, key, requested)
            .ok_or_else(|| {
                Error::Deserialize(format!("read of {}/{} returned no ref", collection, key))
            })?;

        let value = self.parse_json_response(response).await?;

        Ok(Document {
            path,
            value,
            reftime: None,
        })
    }
}

/// Find the ref of a response, preferring the location headers over `ETag`
fn path_from_headers(
    headers: &http::HeaderMap,
    collection: &str,
    key: &str,
    requested: Option<&Ref>,
) -> Option<Path> {
    let from_location = header_str(headers, "location")
        .or_else(|| header_str(headers, "content-location"))
        .and_then(|l| split_location(&l))
        .map(|(_, _, reference)| reference);

    let reference = from_location
        .or_else(|| header_str(headers, "etag").and_then(|e| ref_from_etag(&e)))
        .map(Ref::from)
        .or_else(|| requested.cloned())?;

    Some(Path {
        collection: collection.to_string(),
        key: key.to_string(),
        reference,
    })
}

/// Reject names that URL parsing would collapse into the parent path
fn check_segment(argument: &'static str, value: &str) -> Result<()> {
    if is_dot_segment(value) {
        return Err(Error::invalid_argument(
            argument,
            format!("{} cannot be `{}`", argument, value),
        ));
    }
    Ok(())
}

fn check_item(collection: &str, key: &str) -> Result<()> {
    check_segment("collection", collection)?;
    check_segment("key", key)
}

fn check_relation(
    collection: &str,
    key: &str,
    kind: &str,
    to_collection: &str,
    to_key: &str,
) -> Result<()> {
    check_item(collection, key)?;
    check_segment("kind", kind)?;
    check_segment("toCollection", to_collection)?;
    check_segment("toKey", to_key)
}

fn deleted(response: &Response) -> DeleteResult {
    DeleteResult {
        deleted: response.status().is_success(),
        request_id: header_str(response.headers(), REQUEST_ID_HEADER),
    }
}
