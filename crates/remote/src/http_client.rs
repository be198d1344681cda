//! HTTP Client Factory
//!
//! Provides a factory function for building the shared reqwest client.

use std::time::Duration;

use imagegen_core::error::{RemoteError, RemoteResult};

/// User agent sent with every request
const USER_AGENT: &str = concat!("imagegen/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with a per-request timeout.
///
/// - `Some(timeout)` -> requests fail with a network error after `timeout`
/// - `None` -> no client-side timeout
pub fn build_http_client(timeout: Option<Duration>) -> RemoteResult<reqwest::Client> {
    let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder
        .build()
        .map_err(|e| RemoteError::network(format!("failed to build HTTP client: {}", e)))
}

/// Map a reqwest transport error into the shared taxonomy.
pub(crate) fn transport_error(err: reqwest::Error) -> RemoteError {
    RemoteError::network(err.to_string())
}
