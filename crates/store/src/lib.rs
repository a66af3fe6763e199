//! Entity Store - REST-backed client state for Motorpool resources
//!
//! One [`EntityStore`] per resource type caches the last fetched collection
//! and the current single entity, and tracks in-flight and outcome flags:
//! - `list` / `get` fetch and replace cached data
//! - `create` / `update` / `partial_update` / `delete` write through the API
//! - every successful mutation reconciles the cached collection (refetch by
//!   default) so list consumers never need manual invalidation
//!
//! Errors from the API are caught at the operation boundary and recorded in
//! the state's `error_message`; cached data is left untouched on failure.
//!
//! # Examples
//!
//! ```no_run
//! use motorpool_core::Config;
//! use motorpool_domain::SortSpec;
//! use motorpool_store::EntityStores;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let stores = EntityStores::from_config(&Config::default_config())?;
//! let _ = stores.car.list(Some(SortSpec::desc("price"))).await;
//! let state = stores.car.state();
//! println!("{} cars, loading={}", state.entities.len(), state.loading);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod api;
pub mod error;
pub mod memory;
pub mod reconcile;
pub mod registry;
pub mod state;
pub mod store;
pub mod transport;

pub use api::ResourceApi;
pub use error::{StoreError, StoreResult};
pub use memory::{Fault, InMemoryBackend};
pub use reconcile::Reconcile;
pub use registry::EntityStores;
pub use state::{Operation, StoreState};
pub use store::EntityStore;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, Method, Transport};
