use async_trait::async_trait;
use common::{
    codec, CorePublisher, DomainError, DomainResult,
    NotificationProducer as NotificationProducerTrait, UpdateNotification,
};
use std::sync::Arc;
use tracing::{debug, info};

/// Core NATS producer for update notifications.
///
/// Non-persistent and best-effort: no stream declaration, no broker
/// acknowledgement. A lost notification only delays a refresh; the
/// source-of-truth coordinates remain in the store.
pub struct NatsNotificationProducer {
    publisher: Arc<dyn CorePublisher>,
    subject: String,
}

impl NatsNotificationProducer {
    pub fn new(publisher: Arc<dyn CorePublisher>, subject: String) -> Self {
        debug!(subject = %subject, "Initialized notification producer");
        Self { publisher, subject }
    }
}

#[async_trait]
impl NotificationProducerTrait for NatsNotificationProducer {
    async fn publish_notification(&self, notification: &UpdateNotification) -> DomainResult<()> {
        let payload = codec::encode_notification(notification)?;

        self.publisher
            .publish(self.subject.clone(), payload)
            .await
            .map_err(DomainError::PublishFailed)?;

        info!(
            record_id = %notification.payload.id,
            subject = %self.subject,
            "Update notification published"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use common::{MockCorePublisher, NotificationPayload};

    #[tokio::test]
    async fn test_publish_wraps_payload_in_envelope() {
        let mut mock_publisher = MockCorePublisher::new();
        mock_publisher
            .expect_publish()
            .withf(|subject: &String, payload: &Bytes| {
                let json: serde_json::Value = serde_json::from_slice(payload).unwrap();
                subject == "weather-update"
                    && json["payload"]["id"] == "1"
                    && json["payload"]["city"] == "Delhi"
                    && json["payload"]["lat"] == 28.6
                    && json["payload"]["lon"] == 77.2
            })
            .times(1)
            .returning(|_, _| Ok(()));

        let producer =
            NatsNotificationProducer::new(Arc::new(mock_publisher), "weather-update".to_string());

        let notification = UpdateNotification {
            payload: NotificationPayload {
                id: "1".to_string(),
                city: "Delhi".to_string(),
                lat: 28.6,
                lon: 77.2,
            },
        };

        assert!(producer.publish_notification(&notification).await.is_ok());
    }

    #[tokio::test]
    async fn test_publish_failure_surfaces_as_publish_error() {
        let mut mock_publisher = MockCorePublisher::new();
        mock_publisher
            .expect_publish()
            .times(1)
            .returning(|_, _| Err(anyhow::anyhow!("connection reset")));

        let producer =
            NatsNotificationProducer::new(Arc::new(mock_publisher), "weather-update".to_string());

        let notification = UpdateNotification {
            payload: NotificationPayload {
                id: "1".to_string(),
                city: "Delhi".to_string(),
                lat: 28.6,
                lon: 77.2,
            },
        };

        let result = producer.publish_notification(&notification).await;
        assert!(matches!(result, Err(DomainError::PublishFailed(_))));
    }
}
