//! Cancellation Helpers

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::{RemoteError, RemoteResult};

/// Run a remote call unless `token` fires first.
///
/// An already-cancelled token short-circuits without polling `fut`.
pub async fn run_cancellable<F, T>(token: &CancellationToken, fut: F) -> RemoteResult<T>
where
    F: Future<Output = RemoteResult<T>>,
{
    if token.is_cancelled() {
        return Err(RemoteError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = token.cancelled() => Err(RemoteError::Cancelled),
        result = fut => result,
    }
}
