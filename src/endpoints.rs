//! API endpoint URL construction

use crate::util::encode_path;

/// Endpoint builder
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
}

impl Endpoints {
    /// Create a new endpoints builder
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Get the full URL for a path
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn root(&self) -> String {
        self.base_url.clone()
    }

    // Collections
    pub fn collection(&self, collection: &str) -> String {
        self.url(&format!("/{}", encode_path(collection)))
    }

    // Key/value
    pub fn item(&self, collection: &str, key: &str) -> String {
        self.url(&format!(
            "/{}/{}",
            encode_path(collection),
            encode_path(key)
        ))
    }

    pub fn item_ref(&self, collection: &str, key: &str, reference: &str) -> String {
        self.url(&format!(
            "/{}/{}/refs/{}",
            encode_path(collection),
            encode_path(key),
            encode_path(reference)
        ))
    }

    // Graph
    pub fn relation(
        &self,
        collection: &str,
        key: &str,
        kind: &str,
        to_collection: &str,
        to_key: &str,
    ) -> String {
        self.url(&format!(
            "/{}/{}/relation/{}/{}/{}",
            encode_path(collection),
            encode_path(key),
            encode_path(kind),
            encode_path(to_collection),
            encode_path(to_key)
        ))
    }

    pub fn relations(&self, collection: &str, key: &str, kinds: &[&str]) -> String {
        let hops: Vec<String> = kinds.iter().map(|k| encode_path(k)).collect();
        self.url(&format!(
            "/{}/{}/relations/{}",
            encode_path(collection),
            encode_path(key),
            hops.join("/")
        ))
    }
}
