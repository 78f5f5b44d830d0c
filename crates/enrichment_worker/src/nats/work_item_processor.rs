use async_trait::async_trait;
use common::{codec, Disposition, MessageProcessor, WorkItemHandler};
use std::sync::Arc;
use tracing::{error, info, warn};

/// Decodes work-queue messages and dispatches them to the enrichment handler,
/// mapping outcomes onto ack dispositions:
///
/// - decode failure: the message is structurally invalid and can never
///   succeed, so it is discarded rather than looped forever
/// - permanent handler failures (missing credential): discarded for the same
///   reason
/// - transient handler failures (fetch, store): requeued for redelivery
pub struct WorkItemProcessor {
    handler: Arc<dyn WorkItemHandler>,
}

impl WorkItemProcessor {
    pub fn new(handler: Arc<dyn WorkItemHandler>) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl MessageProcessor for WorkItemProcessor {
    async fn process(&self, payload: &[u8], subject: &str) -> Disposition {
        let item = match codec::decode_work_item(payload) {
            Ok(item) => item,
            Err(e) => {
                error!(
                    error = %e,
                    subject = %subject,
                    payload_size = payload.len(),
                    "Failed to decode work item, discarding poison message"
                );
                return Disposition::Discard(Some(e.to_string()));
            }
        };

        info!(city = %item.city, subject = %subject, "Work item received");

        match self.handler.handle(item).await {
            Ok(record) => {
                info!(record_id = %record.id, "Work item processed");
                Disposition::Ack
            }
            Err(e) if e.is_permanent() => {
                error!(error = %e, subject = %subject, "Permanent failure, discarding work item");
                Disposition::Discard(Some(e.to_string()))
            }
            Err(e) => {
                warn!(error = %e, subject = %subject, "Transient failure, requeueing work item");
                Disposition::Retry(Some(e.to_string()))
            }
        }
    }
}
