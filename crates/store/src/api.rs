//! REST contract for one resource.
//!
//! | Operation      | Method | Path                 | Body                 |
//! |----------------|--------|----------------------|----------------------|
//! | list           | GET    | `api/<resource>`     | none                 |
//! | get            | GET    | `api/<resource>/{id}`| none                 |
//! | create         | POST   | `api/<resource>`     | cleaned entity       |
//! | update         | PUT    | `api/<resource>/{id}`| cleaned entity       |
//! | partial update | PATCH  | `api/<resource>/{id}`| cleaned entity (merge)|
//! | delete         | DELETE | `api/<resource>/{id}`| none                 |
//!
//! List requests carry an optional `sort=<field>,<dir>` hint and a
//! `cacheBuster` timestamp.

use motorpool_domain::{clean_entity, Entity, EntityId, SortSpec};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::transport::{ApiRequest, ApiResponse, Method, Transport, JSON, MERGE_PATCH_JSON};

/// Typed client for the endpoints of resource `E`.
pub struct ResourceApi<E> {
    transport: Arc<dyn Transport>,
    base_path: String,
    cache_buster: bool,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for ResourceApi<E> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            base_path: self.base_path.clone(),
            cache_buster: self.cache_buster,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> ResourceApi<E> {
    /// Client rooted at `api/<E::RESOURCE>`.
    pub fn new(transport: Arc<dyn Transport>, cache_buster: bool) -> Self {
        Self {
            transport,
            base_path: format!("api/{}", E::RESOURCE),
            cache_buster,
            _entity: PhantomData,
        }
    }

    /// Collection path.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    fn item_path(&self, id: EntityId) -> String {
        format!("{}/{}", self.base_path, id)
    }

    /// Describe the list request without sending it.
    pub fn list_request(&self, sort: Option<&SortSpec>) -> ApiRequest {
        let mut request = ApiRequest::new(Method::Get, self.base_path.clone());
        if let Some(sort) = sort {
            request = request.with_query("sort", sort.to_string());
        }
        if self.cache_buster {
            request = request.with_query("cacheBuster", chrono::Utc::now().timestamp_millis().to_string());
        }
        request
    }

    /// Fetch the whole collection in server order.
    pub async fn list(&self, sort: Option<&SortSpec>) -> StoreResult<Vec<E>> {
        let body = self.execute(self.list_request(sort)).await?;
        decode(body)
    }

    /// Fetch one entity.
    pub async fn get(&self, id: EntityId) -> StoreResult<E> {
        let body = self
            .execute(ApiRequest::new(Method::Get, self.item_path(id)))
            .await?;
        decode(body)
    }

    /// POST the cleaned entity; returns the server's representation.
    pub async fn create(&self, entity: &E) -> StoreResult<E> {
        let payload = clean_entity(entity)?;
        let request = ApiRequest::new(Method::Post, self.base_path.clone()).with_body(payload, JSON);
        decode(self.execute(request).await?)
    }

    /// PUT the cleaned entity (full replace).
    pub async fn update(&self, entity: &E) -> StoreResult<E> {
        self.write(Method::Put, entity, JSON).await
    }

    /// PATCH the cleaned entity (merge write).
    pub async fn partial_update(&self, entity: &E) -> StoreResult<E> {
        self.write(Method::Patch, entity, MERGE_PATCH_JSON).await
    }

    /// DELETE by identifier.
    pub async fn delete(&self, id: EntityId) -> StoreResult<()> {
        self.execute(ApiRequest::new(Method::Delete, self.item_path(id)))
            .await?;
        Ok(())
    }

    async fn write(&self, method: Method, entity: &E, content_type: &'static str) -> StoreResult<E> {
        let id = entity
            .id()
            .ok_or_else(|| StoreError::InvalidRequest(format!("{} has no id", E::NAME)))?;
        let payload = clean_entity(entity)?;
        let request = ApiRequest::new(method, self.item_path(id)).with_body(payload, content_type);
        decode(self.execute(request).await?)
    }

    async fn execute(&self, request: ApiRequest) -> StoreResult<Option<Value>> {
        let method = request.method;
        let path = request.path.clone();
        let response = self.transport.send(request).await?;

        debug!(
            resource = E::RESOURCE,
            method = %method,
            path = %path,
            status = response.status,
            "API response"
        );

        if response.is_success() {
            Ok(response.body)
        } else {
            Err(status_error(&response))
        }
    }
}

/// Turn a non-2xx response into an error with the most useful description.
fn status_error(response: &ApiResponse) -> StoreError {
    let described = response.body.as_ref().and_then(|body| {
        ["detail", "title", "message"]
            .iter()
            .find_map(|key| body.get(*key).and_then(Value::as_str))
            .map(str::to_string)
    });

    StoreError::Status {
        status: response.status,
        message: described.unwrap_or_else(|| reason_phrase(response.status).to_string()),
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        409 => "Conflict",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        _ => "Unexpected status",
    }
}

fn decode<T: DeserializeOwned>(body: Option<Value>) -> StoreResult<T> {
    let body = body.ok_or_else(|| StoreError::Decode("empty response body".to_string()))?;
    serde_json::from_value(body).map_err(|e| StoreError::Decode(e.to_string()))
}
