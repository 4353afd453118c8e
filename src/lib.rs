//! Orchestrate SDK for Rust
//!
//! A client for the Orchestrate document store: collections of JSON
//! documents addressed by key, with every write producing a new opaque
//! version reference (a [`Ref`]) that can be used for optimistic
//! concurrency and for reading history.
//!
//! # Features
//!
//! - Async/await API on top of reqwest
//! - Typed documents through `serde`
//! - Conditional writes and deletes (`If-Match` / `If-None-Match`)
//! - Paginated listing and full-text search
//! - Graph relations between documents
//! - Distinct error variants for 404 and 412 answers
//! - Credentials kept out of logs and debug output
//!
//! # Example
//!
//! ```no_run
//! use orchestrate_sdk::{ClientBuilder, Document};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct TestData {
//!     id: u32,
//!     value: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ClientBuilder::new().api_key("your-api-key").build()?;
//!
//!     let item = TestData { id: 1, value: "Test Value 1".into() };
//!     let written = client.create_collection("TestCollection", "1", &item).await?;
//!     println!("stored at ref {}", written.path.reference);
//!
//!     let doc: Document<TestData> = client.get("TestCollection", "1").await?;
//!     println!("{:?}", doc.value);
//!
//!     Ok(())
//! }
//! ```

#![deny(
    missing_docs,
    missing_debug_implementations,
    unsafe_code,
    unused_results
)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod auth;
mod client;
mod config;
mod endpoints;
mod errors;
mod models;
/// Telemetry and observability support
#[cfg(feature = "metrics")]
pub mod telemetry;

#[cfg(not(feature = "metrics"))]
mod telemetry;
mod util;

pub use auth::{Auth, KeyProvider};
pub use client::Client;
pub use config::{ClientBuilder, ClientConfig, ENV_API_KEY, ENV_BASE_URL};
pub use errors::{Error, ErrorKind, Result};
pub use models::*;

// Re-export commonly used types
pub use secrecy::SecretString;

/// SDK version, matches Cargo.toml version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Base URL of the hosted service
pub const DEFAULT_BASE_URL: &str = "https://api.orchestrate.io/v0";

/// Default timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Page size used by [`ListOpts::default`]
pub const DEFAULT_PAGE_LIMIT: u32 = 10;
