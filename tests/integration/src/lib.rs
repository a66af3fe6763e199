//! Integration tests for the Motorpool workspace
//!
//! This test suite validates, over real HTTP (axum server, reqwest client):
//! - The REST contract: paths, methods, query hints, payload cleaning
//! - Store state transitions and post-mutation list reconciliation
//! - Failure handling for error statuses and unreachable servers
//! - The headless view flows: list sorting, edit form submission, delete

pub mod test_utils;

#[cfg(test)]
mod store_http_tests;

#[cfg(test)]
mod view_flow_tests;
