//! In-memory stand-in for the Orchestrate key/value and search endpoints,
//! served through wiremock.

#![allow(dead_code)]

use orchestrate_sdk::{Client, ClientBuilder};
use percent_encoding::percent_decode_str;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;
use wiremock::{matchers::any, Mock, MockServer, Request, Respond, ResponseTemplate};

pub const API_KEY: &str = "test-key";

/// Start a mock server backed by a fresh [`FakeStore`]
pub async fn setup() -> (MockServer, Client) {
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(FakeStore::default())
        .mount(&server)
        .await;

    let client = client_for(&server);
    (server, client)
}

/// Client pointed at a mock server's `/v0`
pub fn client_for(server: &MockServer) -> Client {
    ClientBuilder::new()
        .base_url(format!("{}/v0", server.uri()))
        .api_key(API_KEY)
        .timeout_ms(5000)
        .allow_insecure_http()
        .build()
        .expect("Failed to build client")
}

#[derive(Default)]
struct State {
    /// collection -> key -> (ref, value)
    current: BTreeMap<String, BTreeMap<String, (String, Value)>>,
    /// (collection, key, ref) -> value
    history: HashMap<(String, String, String), Value>,
    next_ref: u64,
}

/// Keeps documents and their history the way the service does
#[derive(Default)]
pub struct FakeStore {
    state: Mutex<State>,
}

impl Respond for FakeStore {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if request.headers.get("authorization").is_none() {
            return error(401, "security_unauthorized", "Valid credentials are required.");
        }

        let segments: Vec<String> = request
            .url
            .path_segments()
            .map(|s| {
                s.skip(1)
                    .map(|seg| percent_decode_str(seg).decode_utf8_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        let query: HashMap<String, String> = request.url.query_pairs().into_owned().collect();
        let if_match = header(request, "if-match").map(|v| v.trim_matches('"').to_string());
        let if_none_match = header(request, "if-none-match");

        let mut state = self.state.lock().unwrap();
        let seg: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (request.method.as_str(), seg.as_slice()) {
            ("PUT", [collection, key]) => {
                let current = state
                    .current
                    .get(*collection)
                    .and_then(|docs| docs.get(*key))
                    .map(|(r, _)| r.clone());

                if let Some(expected) = &if_match {
                    if current.as_deref() != Some(expected.as_str()) {
                        return error(412, "item_version_mismatch", "The version of the item does not match.");
                    }
                }
                if if_none_match.is_some() && current.is_some() {
                    return error(412, "item_already_present", "The item is already present.");
                }

                let value: Value = match serde_json::from_slice(&request.body) {
                    Ok(v) => v,
                    Err(_) => return error(400, "api_bad_request", "Invalid JSON body."),
                };

                state.next_ref += 1;
                let reference = format!("{:016x}", state.next_ref);
                let _ = state.history.insert(
                    (collection.to_string(), key.to_string(), reference.clone()),
                    value.clone(),
                );
                let _ = state
                    .current
                    .entry(collection.to_string())
                    .or_default()
                    .insert(key.to_string(), (reference.clone(), value));

                ResponseTemplate::new(201)
                    .insert_header(
                        "Location",
                        format!("/v0/{}/{}/refs/{}", collection, key, reference).as_str(),
                    )
                    .insert_header("ETag", format!("\"{}\"", reference).as_str())
            }
            ("GET", [collection, key]) => {
                match state.current.get(*collection).and_then(|d| d.get(*key)) {
                    Some((reference, value)) => ResponseTemplate::new(200)
                        .set_body_json(value)
                        .insert_header("ETag", format!("\"{}\"", reference).as_str())
                        .insert_header(
                            "Content-Location",
                            format!("/v0/{}/{}/refs/{}", collection, key, reference).as_str(),
                        ),
                    None => not_found(),
                }
            }
            ("GET", [collection, key, "refs", reference]) => {
                let id = (collection.to_string(), key.to_string(), reference.to_string());
                match state.history.get(&id) {
                    Some(value) => ResponseTemplate::new(200)
                        .set_body_json(value)
                        .insert_header("ETag", format!("\"{}\"", reference).as_str()),
                    None => not_found(),
                }
            }
            ("DELETE", [collection, key]) => {
                let current = state
                    .current
                    .get(*collection)
                    .and_then(|d| d.get(*key))
                    .map(|(r, _)| r.clone());

                if let Some(expected) = &if_match {
                    match &current {
                        None => return not_found(),
                        Some(r) if r != expected => {
                            return error(412, "item_version_mismatch", "The version of the item does not match.")
                        }
                        Some(_) => {}
                    }
                }

                let purge = query.get("purge").map(String::as_str) == Some("true");
                if current.is_none() && !purge {
                    return not_found();
                }

                if let Some(docs) = state.current.get_mut(*collection) {
                    let _ = docs.remove(*key);
                }
                if purge {
                    state
                        .history
                        .retain(|(c, k, _), _| c != collection || k != key);
                }
                ResponseTemplate::new(204)
            }
            ("DELETE", [collection]) => {
                if query.get("force").map(String::as_str) != Some("true") {
                    return error(400, "api_bad_request", "force=true is required.");
                }
                if state.current.remove(*collection).is_none() {
                    return not_found();
                }
                state.history.retain(|(c, _, _), _| c != collection);
                ResponseTemplate::new(204)
            }
            ("GET", [collection]) => {
                let empty = BTreeMap::new();
                let docs = state.current.get(*collection).unwrap_or(&empty);
                match query.get("query") {
                    Some(q) => search(collection, docs, q, &query),
                    None => list(collection, docs, &query),
                }
            }
            _ => error(404, "api_not_found", "Unknown endpoint."),
        }
    }
}

fn list(
    collection: &str,
    docs: &BTreeMap<String, (String, Value)>,
    query: &HashMap<String, String>,
) -> ResponseTemplate {
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let start = query.get("startKey");
    let after = query.get("afterKey");

    let matching: Vec<_> = docs
        .iter()
        .filter(|(k, _)| start.map_or(true, |s| k.as_str() >= s.as_str()))
        .filter(|(k, _)| after.map_or(true, |a| k.as_str() > a.as_str()))
        .collect();

    let page: Vec<Value> = matching
        .iter()
        .take(limit)
        .map(|(key, (reference, value))| item_json(collection, key, reference, value))
        .collect();

    let mut body = json!({ "count": page.len(), "results": page });
    if matching.len() > limit {
        let last = matching[limit - 1].0;
        body["next"] = json!(format!("/v0/{}?limit={}&afterKey={}", collection, limit, last));
    }
    ResponseTemplate::new(200).set_body_json(body)
}

fn search(
    collection: &str,
    docs: &BTreeMap<String, (String, Value)>,
    q: &str,
    query: &HashMap<String, String>,
) -> ResponseTemplate {
    let limit: usize = query.get("limit").and_then(|l| l.parse().ok()).unwrap_or(10);
    let offset: usize = query.get("offset").and_then(|o| o.parse().ok()).unwrap_or(0);

    let hits: Vec<_> = docs
        .iter()
        .filter(|(_, (_, value))| match q.split_once(':') {
            None => q == "*",
            Some((field, wanted)) => value.get(field).map_or(false, |v| match v {
                Value::String(s) => s == wanted,
                other => other.to_string() == wanted,
            }),
        })
        .collect();

    let page: Vec<Value> = hits
        .iter()
        .skip(offset)
        .take(limit)
        .map(|(key, (reference, value))| {
            let mut hit = item_json(collection, key, reference, value);
            hit["score"] = json!(1.0);
            hit
        })
        .collect();

    let mut body = json!({
        "count": page.len(),
        "total_count": hits.len(),
        "results": page,
    });
    if offset + limit < hits.len() {
        body["next"] = json!(format!(
            "/v0/{}?query={}&limit={}&offset={}",
            collection,
            q,
            limit,
            offset + limit
        ));
    }
    ResponseTemplate::new(200).set_body_json(body)
}

fn item_json(collection: &str, key: &str, reference: &str, value: &Value) -> Value {
    json!({
        "path": {"collection": collection, "key": key, "ref": reference, "kind": "item"},
        "value": value,
        "reftime": 1_400_000_000_000i64,
    })
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn not_found() -> ResponseTemplate {
    error(404, "items_not_found", "The requested items could not be found.")
}

fn error(status: u16, code: &str, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "message": message, "code": code }))
}
