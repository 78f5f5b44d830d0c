use crate::nats::traits::{JetStreamConsumer, PullConsumer};
use anyhow::{Context, Result};
use async_nats::jetstream::{self, AckKind};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Outcome of processing one delivered message.
#[derive(Debug, Clone, PartialEq)]
pub enum Disposition {
    /// Processed successfully: ack, removing the message permanently.
    Ack,
    /// Transient failure: nak so the broker redelivers the message.
    Retry(Option<String>),
    /// Permanent (poison) failure: terminate delivery, dropping the message
    /// without redelivery.
    Discard(Option<String>),
}

/// Typed dispatch seam for queue consumers.
///
/// Implementations own message decoding and business logic, and express the
/// ack decision as a `Disposition`; the consumer owns fetching and
/// acknowledgement mechanics. Must never panic on arbitrary payload bytes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait MessageProcessor: Send + Sync {
    async fn process(&self, payload: &[u8], subject: &str) -> Disposition;
}

/// JetStream pull consumer that dispatches messages to a `MessageProcessor`.
///
/// Messages are handled strictly sequentially: with the production batch
/// size of 1 (and `max_ack_pending` to match) there is exactly one in-flight
/// handler per consumer instance, the prefetch=1 backpressure choice that
/// bounds concurrent external-API calls.
pub struct NatsConsumer {
    consumer: Box<dyn PullConsumer>,
    batch_size: usize,
    max_wait: Duration,
    processor: Arc<dyn MessageProcessor>,
}

impl NatsConsumer {
    pub async fn new(
        client: Arc<dyn JetStreamConsumer>,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: Arc<dyn MessageProcessor>,
    ) -> Result<Self> {
        debug!(
            stream = stream_name,
            consumer = consumer_name,
            subject = subject_filter,
            batch_size,
            "Creating JetStream consumer"
        );

        // Create or get existing durable consumer. max_ack_pending caps
        // unacknowledged deliveries at the batch size (1 in production).
        let consumer = client
            .create_consumer(
                jetstream::consumer::pull::Config {
                    name: Some(consumer_name.to_string()),
                    durable_name: Some(consumer_name.to_string()),
                    filter_subject: subject_filter.to_string(),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    max_ack_pending: batch_size as i64,
                    ..Default::default()
                },
                stream_name,
            )
            .await
            .context("Failed to create consumer")?;

        info!(
            stream = stream_name,
            consumer = consumer_name,
            "Consumer created successfully"
        );

        Ok(Self {
            consumer,
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!("Starting consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping consumer");
                    break;
                }
                result = self.fetch_and_process() => {
                    if let Err(e) = result {
                        error!(error = %e, "Error processing batch");
                        // Back off briefly and keep consuming
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("Consumer stopped gracefully");
        Ok(())
    }

    async fn fetch_and_process(&self) -> Result<()> {
        let messages = self
            .consumer
            .fetch_messages(self.batch_size, self.max_wait)
            .await?;

        if messages.is_empty() {
            // The broker delivered nothing: a no-op, never acked or nacked
            debug!("No messages in batch");
            return Ok(());
        }

        for message in messages {
            let disposition = self
                .processor
                .process(&message.payload, message.subject.as_str())
                .await;

            match disposition {
                Disposition::Ack => {
                    if let Err(e) = message.ack().await {
                        error!(
                            error = %e,
                            subject = %message.subject,
                            "Failed to acknowledge message"
                        );
                    }
                }
                Disposition::Retry(reason) => {
                    warn!(
                        subject = %message.subject,
                        reason = reason.as_deref().unwrap_or("unspecified"),
                        "Rejecting message for redelivery"
                    );
                    if let Err(e) = message.ack_with(AckKind::Nak(None)).await {
                        error!(
                            error = %e,
                            subject = %message.subject,
                            "Failed to reject message"
                        );
                    }
                }
                Disposition::Discard(reason) => {
                    error!(
                        subject = %message.subject,
                        reason = reason.as_deref().unwrap_or("unspecified"),
                        "Discarding poison message"
                    );
                    if let Err(e) = message.ack_with(AckKind::Term).await {
                        error!(
                            error = %e,
                            subject = %message.subject,
                            "Failed to discard message"
                        );
                    }
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nats::traits::{MockJetStreamConsumer, MockPullConsumer};

    // jetstream::Message cannot be constructed without a live broker, so the
    // ack/nak/term paths are exercised by integration environments; here we
    // cover consumer creation and the empty-batch no-op.

    #[tokio::test]
    async fn test_consumer_creation_passes_prefetch_config() {
        let mut mock_client = MockJetStreamConsumer::new();
        mock_client
            .expect_create_consumer()
            .withf(|config: &jetstream::consumer::pull::Config, stream: &str| {
                stream == "weather_requests"
                    && config.durable_name.as_deref() == Some("enrichment-worker")
                    && config.max_ack_pending == 1
                    && config.ack_policy == jetstream::consumer::AckPolicy::Explicit
            })
            .times(1)
            .return_once(|_, _| Ok(Box::new(MockPullConsumer::new()) as Box<dyn PullConsumer>));

        let processor = Arc::new(MockMessageProcessor::new());
        let consumer = NatsConsumer::new(
            Arc::new(mock_client),
            "weather_requests",
            "enrichment-worker",
            "weather_requests.>",
            1,
            5,
            processor,
        )
        .await;

        assert!(consumer.is_ok());
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_noop() {
        let mut mock_pull = MockPullConsumer::new();
        mock_pull
            .expect_fetch_messages()
            .times(1)
            .returning(|_, _| Ok(Vec::new()));

        let mut mock_client = MockJetStreamConsumer::new();
        mock_client
            .expect_create_consumer()
            .return_once(|_, _| Ok(Box::new(mock_pull) as Box<dyn PullConsumer>));

        // Processor must never be invoked for an empty batch
        let processor = Arc::new(MockMessageProcessor::new());
        let consumer = NatsConsumer::new(
            Arc::new(mock_client),
            "weather_requests",
            "enrichment-worker",
            "weather_requests.>",
            1,
            5,
            processor,
        )
        .await
        .unwrap();

        assert!(consumer.fetch_and_process().await.is_ok());
    }
}
