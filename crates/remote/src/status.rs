//! HTTP Status Mapping
//!
//! Shared helpers for turning failed responses into `RemoteError`s.

use imagegen_core::error::RemoteError;
use imagegen_core::models::ErrorBody;

/// Helper function to create an error for a missing credential
pub fn missing_credential_error(service: &str) -> RemoteError {
    RemoteError::authentication(format!("credential not configured for {}", service))
}

/// Helper function to parse HTTP error status codes.
///
/// Backend responses carry `{"error": "..."}`; that message is preferred
/// over the raw body when present.
pub fn parse_http_error(status: u16, body: &str, service: &str) -> RemoteError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string());

    match status {
        401 => RemoteError::authentication(format!("{}: Invalid credential", service)),
        403 => RemoteError::authentication(format!("{}: Access denied", service)),
        _ => RemoteError::Status {
            status,
            body: message,
        },
    }
}
