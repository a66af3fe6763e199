//! Core functionality for the Motorpool entity synchronization workspace.
//!
//! This crate provides the configuration, logging and error plumbing shared
//! by the domain, store, view and CLI crates.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ApiConfig, Config, LogFormat, LoggingConfig, ReconcileMode, StoreConfig};
pub use error::{CoreError, Result};
