use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use lapin::Consumer;
use lapin::message::Delivery;
use lapin::options::{BasicAckOptions, BasicNackOptions, BasicRejectOptions};
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinSet};
use tracing::Instrument;
use uuid::Uuid;

use crate::correlation;
use crate::error::{HandlerError, MessagingError};
use crate::handlers::MessageHandler;
use crate::retry::{RetryPolicy, retry_with_predicate};

/// How a delivery is settled with the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Ack,
    /// Malformed payload, rejected without requeue.
    Reject,
    /// Retries exhausted, nacked without requeue.
    Exhausted,
}

/// Aborts the wrapped task when dropped, so cancelling a delivery also
/// cancels the attempt it is waiting on.
struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

/// Runs one attempt on its own task so a panicking handler fails the
/// attempt instead of the consumer.
async fn run_attempt(
    handler: Arc<dyn MessageHandler>,
    payload: Arc<Vec<u8>>,
    correlation_id: String,
) -> Result<(), HandlerError> {
    let attempt = tokio::spawn(correlation::scope(correlation_id, async move {
        handler.handle(&payload).await
    }));
    let _guard = AbortOnDrop(attempt.abort_handle());

    match attempt.await {
        Ok(result) => result,
        Err(join_error) => Err(HandlerError::Panicked(join_error.to_string())),
    }
}

/// Applies the retry policy to one payload and decides how to settle it.
pub async fn process_payload(
    handler: Arc<dyn MessageHandler>,
    policy: &RetryPolicy,
    payload: Arc<Vec<u8>>,
    correlation_id: &str,
) -> Disposition {
    let result = retry_with_predicate(
        policy,
        || run_attempt(handler.clone(), payload.clone(), correlation_id.to_string()),
        HandlerError::is_retryable,
    )
    .await;

    match result {
        Ok(()) => Disposition::Ack,
        Err(HandlerError::Malformed(reason)) => {
            tracing::warn!(%reason, "Rejecting malformed message");
            Disposition::Reject
        }
        Err(error) => {
            tracing::error!(%error, "Giving up on message");
            Disposition::Exhausted
        }
    }
}

async fn process_delivery(handler: Arc<dyn MessageHandler>, policy: RetryPolicy, delivery: Delivery) {
    let Delivery {
        delivery_tag,
        redelivered,
        properties,
        data,
        acker,
        ..
    } = delivery;

    let correlation_id = properties
        .correlation_id()
        .as_ref()
        .map(|id| id.as_str().to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let span = tracing::info_span!(
        "delivery",
        handler = handler.name(),
        delivery_tag,
        redelivered,
        correlation_id = %correlation_id
    );

    async move {
        let disposition =
            process_payload(handler, &policy, Arc::new(data), &correlation_id).await;

        let settled = match disposition {
            Disposition::Ack => acker.ack(BasicAckOptions::default()).await,
            Disposition::Reject => acker.reject(BasicRejectOptions { requeue: false }).await,
            Disposition::Exhausted => {
                acker
                    .nack(BasicNackOptions {
                        multiple: false,
                        requeue: false,
                    })
                    .await
            }
        };

        if let Err(e) = settled {
            tracing::error!(error = %e, ?disposition, "Failed to settle delivery");
        }
    }
    .instrument(span)
    .await
}

/// Consumes deliveries until `shutdown` fires or the stream ends, handling
/// each delivery on its own task. In-flight deliveries get `drain_timeout`
/// to finish; anything still running after that is aborted together with
/// its handler attempt and left unacknowledged for redelivery.
pub async fn run_consumer(
    mut consumer: Consumer,
    handler: Arc<dyn MessageHandler>,
    policy: RetryPolicy,
    mut shutdown: watch::Receiver<bool>,
    drain_timeout: Duration,
) -> Result<(), MessagingError> {
    let name = handler.name();
    let mut in_flight = JoinSet::new();
    let mut outcome = Ok(());

    tracing::info!(handler = name, "Consumer started");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            next = consumer.next() => match next {
                Some(Ok(delivery)) => {
                    in_flight.spawn(process_delivery(handler.clone(), policy.clone(), delivery));
                }
                Some(Err(e)) => {
                    tracing::error!(handler = name, error = %e, "Consumer stream failed");
                    outcome = Err(MessagingError::Consume(e.to_string()));
                    break;
                }
                None => {
                    tracing::warn!(handler = name, "Consumer stream closed by broker");
                    break;
                }
            }
        }

        while in_flight.try_join_next().is_some() {}
    }

    drain(&mut in_flight, drain_timeout, name).await;
    tracing::info!(handler = name, "Consumer stopped");
    outcome
}

async fn drain(in_flight: &mut JoinSet<()>, limit: Duration, name: &'static str) {
    if in_flight.is_empty() {
        return;
    }

    tracing::info!(handler = name, in_flight = in_flight.len(), "Draining in-flight deliveries");

    let drained = tokio::time::timeout(limit, async {
        while in_flight.join_next().await.is_some() {}
    })
    .await;

    if drained.is_err() {
        tracing::warn!(
            handler = name,
            remaining = in_flight.len(),
            "Drain timed out, aborting remaining deliveries"
        );
        in_flight.abort_all();
    }
}
