//! Test utilities: the in-memory backend served over real HTTP

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, Method as HttpMethod, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
    routing::any,
    Router,
};
use motorpool_core::{logging, Config, ReconcileMode};
use motorpool_store::transport::{JSON, MERGE_PATCH_JSON};
use motorpool_store::{ApiRequest, EntityStores, InMemoryBackend, Method};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// A running HTTP server answering `api/*` from an [`InMemoryBackend`].
pub struct TestServer {
    pub backend: Arc<InMemoryBackend>,
    pub addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind an ephemeral port and start serving.
    pub async fn start() -> Self {
        Self::with_backend(Arc::new(InMemoryBackend::new())).await
    }

    pub async fn with_backend(backend: Arc<InMemoryBackend>) -> Self {
        logging::init();

        let app = Router::new()
            .route("/api/*path", any(handle_api))
            .with_state(Arc::clone(&backend));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        info!(%addr, "Test API listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Test API stopped");
            }
        });

        Self {
            backend,
            addr,
            handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing at this server.
    pub fn config(&self, reconcile: ReconcileMode) -> Config {
        let mut config = Config::default_config();
        config.api.base_url = self.base_url();
        config.api.timeout_ms = 5_000;
        config.store.reconcile = reconcile;
        config
    }

    /// Stores talking HTTP to this server.
    pub fn stores(&self) -> EntityStores {
        EntityStores::from_config(&self.config(ReconcileMode::Refetch)).expect("http stores")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn method_of(method: &HttpMethod) -> Option<Method> {
    match *method {
        HttpMethod::GET => Some(Method::Get),
        HttpMethod::POST => Some(Method::Post),
        HttpMethod::PUT => Some(Method::Put),
        HttpMethod::PATCH => Some(Method::Patch),
        HttpMethod::DELETE => Some(Method::Delete),
        _ => None,
    }
}

async fn handle_api(
    State(backend): State<Arc<InMemoryBackend>>,
    method: HttpMethod,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Response {
    let Some(method) = method_of(&method) else {
        return StatusCode::METHOD_NOT_ALLOWED.into_response();
    };

    let mut request = ApiRequest::new(method, uri.path().trim_start_matches('/'));
    request.query = query;

    if !body.is_empty() {
        let Ok(value) = serde_json::from_slice::<Value>(&body) else {
            return (StatusCode::BAD_REQUEST, Json(json!({ "title": "Malformed JSON" }))).into_response();
        };
        let content_type = match headers.get(header::CONTENT_TYPE).and_then(|v| v.to_str().ok()) {
            Some(MERGE_PATCH_JSON) => MERGE_PATCH_JSON,
            _ => JSON,
        };
        request = request.with_body(value, content_type);
    }

    match backend.handle(request) {
        Ok(response) => {
            let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            match response.body {
                Some(body) => (status, Json(body)).into_response(),
                None => status.into_response(),
            }
        }
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "title": "Service Unavailable", "detail": e.to_string() })),
        )
            .into_response(),
    }
}

/// Seed the two owners and three cars most tests start from.
///
/// Owners get ids 1 and 2; cars 3 (Civic, owner 1), 4 (Accord, owner 2)
/// and 5 (Fit, no owner).
pub fn seed_fleet(backend: &InMemoryBackend) {
    backend.seed("owners", json!({ "name": "Ada", "gender": "F" }));
    backend.seed("owners", json!({ "name": "Bob", "gender": "M" }));
    backend.seed(
        "cars",
        json!({ "name": "Civic", "model": "EX", "price": 20000.0, "owner": { "id": 1, "name": null, "gender": null } }),
    );
    backend.seed(
        "cars",
        json!({ "name": "Accord", "model": "LX", "price": 18500.0, "owner": { "id": 2, "name": null, "gender": null } }),
    );
    backend.seed("cars", json!({ "name": "Fit", "model": "S", "price": 15000.0 }));
}
