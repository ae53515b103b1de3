//! Correlation id of the delivery being handled, visible to anything the
//! handler calls on the same task.

use std::future::Future;

tokio::task_local! {
    static CORRELATION_ID: String;
}

/// Runs `future` with `correlation_id` as the current correlation id.
pub async fn scope<F: Future>(correlation_id: String, future: F) -> F::Output {
    CORRELATION_ID.scope(correlation_id, future).await
}

pub fn current() -> Option<String> {
    CORRELATION_ID.try_with(|id| id.clone()).ok()
}
