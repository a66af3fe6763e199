//! In-memory implementation of the REST contract.
//!
//! Serves `api/<resource>` collections out of process memory: assigns ids
//! on create, answers 404 for unknown ids, rejects id misuse with 400 and
//! merges non-null attributes on PATCH. Every request is recorded so callers
//! can assert on exactly what went over the wire, and faults can be queued
//! to exercise failure paths.

use async_trait::async_trait;
use motorpool_domain::EntityId;
use serde_json::{json, Map, Value};
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Mutex;
use tracing::trace;

use crate::error::{StoreError, StoreResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport};

/// Scripted failure for the next request.
#[derive(Debug, Clone, PartialEq)]
pub enum Fault {
    /// Fail before any response (connection refused, timeout)
    Transport(String),
    /// Answer with the given status and a problem body
    Status(u16),
    /// Answer 200 with a body that is not an entity
    Malformed,
}

#[derive(Debug, Default)]
struct Inner {
    collections: HashMap<String, BTreeMap<i64, Value>>,
    next_id: i64,
    requests: Vec<ApiRequest>,
    faults: VecDeque<Fault>,
}

/// Process-local REST backend.
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    inner: Mutex<Inner>,
}

fn problem(status: u16, title: &str, detail: &str) -> ApiResponse {
    ApiResponse::json(
        status,
        json!({ "title": title, "status": status, "detail": detail }),
    )
}

fn bad_request(detail: &str) -> ApiResponse {
    problem(400, "Bad Request", detail)
}

fn not_found(detail: &str) -> ApiResponse {
    problem(404, "Not Found", detail)
}

/// `api/<resource>[/<id>]` split into its parts.
fn parse_path(path: &str) -> Option<(String, Option<&str>)> {
    let mut segments = path.trim_matches('/').split('/');
    if segments.next()? != "api" {
        return None;
    }
    let resource = segments.next().filter(|s| !s.is_empty())?.to_string();
    let id = segments.next();
    if segments.next().is_some() {
        return None;
    }
    Some((resource, id))
}

fn singular(resource: &str) -> &str {
    resource.strip_suffix('s').unwrap_or(resource)
}

impl InMemoryBackend {
    /// Empty backend; collections are created on first use.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // A poisoned lock only means a test panicked mid-request.
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Insert a record directly, bypassing the request log. Returns its id.
    pub fn seed(&self, resource: &str, mut record: Value) -> EntityId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = inner.next_id;
        if let Value::Object(map) = &mut record {
            map.insert("id".to_string(), json!(id));
        }
        inner
            .collections
            .entry(resource.to_string())
            .or_default()
            .insert(id, record);
        EntityId(id)
    }

    /// Queue a fault for an upcoming request (FIFO).
    pub fn push_fault(&self, fault: Fault) {
        self.lock().faults.push_back(fault);
    }

    /// Requests received so far, oldest first.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.lock().requests.clone()
    }

    /// Number of recorded requests with this method and exact path.
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.lock()
            .requests
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.lock().requests.clear();
    }

    /// Current records of a collection, in id order.
    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.lock()
            .collections
            .get(resource)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Answer one request, recording it first.
    pub fn handle(&self, request: ApiRequest) -> StoreResult<ApiResponse> {
        let mut inner = self.lock();
        inner.requests.push(request.clone());
        trace!(method = %request.method, path = %request.path, "In-memory request");

        if let Some(fault) = inner.faults.pop_front() {
            return match fault {
                Fault::Transport(message) => Err(StoreError::Transport(message)),
                Fault::Status(status) => Ok(problem(status, "Injected failure", "injected")),
                Fault::Malformed => Ok(ApiResponse::json(200, json!("not an entity"))),
            };
        }

        let Some((resource, id)) = parse_path(&request.path) else {
            return Ok(not_found("no such endpoint"));
        };
        let id = match id.map(str::parse::<i64>) {
            None => None,
            Some(Ok(id)) => Some(id),
            Some(Err(_)) => return Ok(bad_request("Invalid id")),
        };

        Ok(match (request.method, id) {
            (Method::Get, None) => inner.list(&resource),
            (Method::Get, Some(id)) => inner.get(&resource, id),
            (Method::Post, None) => inner.create(&resource, request.body),
            (Method::Put, Some(id)) => inner.write(&resource, id, request.body, false),
            (Method::Patch, Some(id)) => inner.write(&resource, id, request.body, true),
            (Method::Delete, Some(id)) => inner.delete(&resource, id),
            _ => problem(405, "Method Not Allowed", "unsupported method for path"),
        })
    }
}

impl Inner {
    fn list(&self, resource: &str) -> ApiResponse {
        let records: Vec<Value> = self
            .collections
            .get(resource)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        ApiResponse::json(200, Value::Array(records))
    }

    fn get(&self, resource: &str, id: i64) -> ApiResponse {
        match self.collections.get(resource).and_then(|c| c.get(&id)) {
            Some(record) => ApiResponse::json(200, record.clone()),
            None => not_found(&format!("{} {id} not found", singular(resource))),
        }
    }

    fn create(&mut self, resource: &str, body: Option<Value>) -> ApiResponse {
        let Some(Value::Object(mut record)) = body else {
            return bad_request("body must be an object");
        };
        if record.get("id").is_some_and(|id| !id.is_null()) {
            return bad_request(&format!(
                "A new {} cannot already have an ID",
                singular(resource)
            ));
        }

        self.next_id += 1;
        let id = self.next_id;
        record.insert("id".to_string(), json!(id));
        let record = Value::Object(record);
        self.collections
            .entry(resource.to_string())
            .or_default()
            .insert(id, record.clone());
        ApiResponse::json(201, record)
    }

    fn write(&mut self, resource: &str, id: i64, body: Option<Value>, merge: bool) -> ApiResponse {
        let Some(Value::Object(incoming)) = body else {
            return bad_request("body must be an object");
        };
        match incoming.get("id").and_then(Value::as_i64) {
            None => return bad_request("Invalid id"),
            Some(body_id) if body_id != id => return bad_request("Invalid ID"),
            Some(_) => {}
        }
        let Some(existing) = self
            .collections
            .get_mut(resource)
            .and_then(|c| c.get_mut(&id))
        else {
            return bad_request("Entity not found");
        };

        let updated = if merge {
            let mut merged: Map<String, Value> = existing.as_object().cloned().unwrap_or_default();
            for (key, value) in incoming {
                if !value.is_null() {
                    merged.insert(key, value);
                }
            }
            Value::Object(merged)
        } else {
            Value::Object(incoming)
        };

        *existing = updated.clone();
        ApiResponse::json(200, updated)
    }

    fn delete(&mut self, resource: &str, id: i64) -> ApiResponse {
        if let Some(collection) = self.collections.get_mut(resource) {
            collection.remove(&id);
        }
        ApiResponse::empty(204)
    }
}

#[async_trait]
impl Transport for InMemoryBackend {
    async fn send(&self, request: ApiRequest) -> StoreResult<ApiResponse> {
        self.handle(request)
    }
}
