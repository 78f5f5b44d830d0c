use async_trait::async_trait;
use common::{
    codec, DomainError, DomainResult, EnrichmentWorkItem, JetStreamPublisher,
    WorkItemProducer as WorkItemProducerTrait,
};
use std::sync::Arc;
use tracing::{debug, info};

/// JetStream producer for enrichment work items.
///
/// Publishes are durable: `enqueue` returns only once the broker has
/// acknowledged the message, so an accepted item survives a broker restart.
/// It never waits on downstream processing.
pub struct NatsWorkItemProducer {
    jetstream: Arc<dyn JetStreamPublisher>,
    subject: String,
}

impl NatsWorkItemProducer {
    pub fn new(jetstream: Arc<dyn JetStreamPublisher>, subject: String) -> Self {
        debug!(subject = %subject, "Initialized work item producer");
        Self { jetstream, subject }
    }
}

#[async_trait]
impl WorkItemProducerTrait for NatsWorkItemProducer {
    async fn enqueue(&self, item: &EnrichmentWorkItem) -> DomainResult<()> {
        let payload = codec::encode_work_item(item)?;

        self.jetstream
            .publish(self.subject.clone(), payload)
            .await
            .map_err(DomainError::PublishFailed)?;

        info!(city = %item.city, subject = %self.subject, "Work item enqueued");
        Ok(())
    }
}
