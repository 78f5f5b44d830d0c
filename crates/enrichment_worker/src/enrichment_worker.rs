use crate::domain::{EnrichmentService, RefreshService};
use crate::nats::{NotificationConsumer, WorkItemProcessor};
use common::{NatsClient, NatsConsumer, WeatherFetcher, WeatherRecordRepository};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct EnrichmentWorkerConfig {
    /// JetStream stream backing the durable work queue
    pub work_stream: String,
    /// Subject filter for the work-queue consumer
    pub work_subject: String,
    /// Durable consumer name on the work stream
    pub consumer_name: String,
    /// Core NATS subject carrying update notifications
    pub notification_subject: String,
    /// Messages fetched (and held unacked) per batch; 1 in production for
    /// strictly sequential processing
    pub batch_size: usize,
    pub batch_wait_secs: u64,
}

/// Wires both consumer flows: the durable work queue and the best-effort
/// notification channel. The fetcher and repository are shared across both.
pub struct EnrichmentWorker {
    work_consumer: NatsConsumer,
    notification_consumer: NotificationConsumer,
}

impl EnrichmentWorker {
    pub async fn new(
        repository: Arc<dyn WeatherRecordRepository>,
        fetcher: Arc<dyn WeatherFetcher>,
        nats_client: Arc<NatsClient>,
        config: EnrichmentWorkerConfig,
    ) -> anyhow::Result<Self> {
        info!("Initializing enrichment worker");

        // Work-queue flow: decode, fetch, persist, ack/nak/term
        let enrichment_service = Arc::new(EnrichmentService::new(
            fetcher.clone(),
            repository.clone(),
        ));
        let processor = Arc::new(WorkItemProcessor::new(enrichment_service));
        let work_consumer = NatsConsumer::new(
            nats_client.create_consumer_client(),
            &config.work_stream,
            &config.consumer_name,
            &config.work_subject,
            config.batch_size,
            config.batch_wait_secs,
            processor,
        )
        .await?;

        // Notification flow: decode, fetch, replace stored report
        let refresh_service = Arc::new(RefreshService::new(fetcher, repository));
        let notification_consumer = NotificationConsumer::new(
            nats_client.core_client(),
            config.notification_subject.clone(),
            refresh_service,
        );

        info!("Enrichment worker initialized");

        Ok(Self {
            work_consumer,
            notification_consumer,
        })
    }

    pub fn into_runner_processes(
        self,
    ) -> Vec<(
        &'static str,
        Box<
            dyn FnOnce(
                    CancellationToken,
                ) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                > + Send,
        >,
    )> {
        vec![
            (
                "work_queue_consumer",
                Box::new({
                    let consumer = self.work_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
            (
                "notification_consumer",
                Box::new({
                    let consumer = self.notification_consumer;
                    move |ctx| Box::pin(async move { consumer.run(ctx).await })
                }),
            ),
        ]
    }
}
