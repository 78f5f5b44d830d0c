use anyhow::{bail, Context, Result};
use common::{codec, NotificationHandler};
use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Core NATS consumer for update notifications.
///
/// There is no acknowledgement on this channel: malformed envelopes are
/// logged and dropped, handler failures are logged and the message is gone.
/// A missed refresh is recovered the next time anything touches the record.
pub struct NotificationConsumer {
    client: async_nats::Client,
    subject: String,
    handler: Arc<dyn NotificationHandler>,
}

impl NotificationConsumer {
    pub fn new(
        client: async_nats::Client,
        subject: String,
        handler: Arc<dyn NotificationHandler>,
    ) -> Self {
        Self {
            client,
            subject,
            handler,
        }
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        let mut subscription = self
            .client
            .subscribe(self.subject.clone())
            .await
            .context("Failed to subscribe to notification subject")?;

        info!(subject = %self.subject, "Listening for update notifications");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("Received shutdown signal, stopping notification consumer");
                    break;
                }
                message = subscription.next() => {
                    match message {
                        Some(message) => {
                            process_notification(self.handler.as_ref(), &message.payload).await;
                        }
                        None => {
                            bail!("Notification subscription closed unexpectedly");
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Handle one notification payload: validate the envelope, dispatch to the
/// handler, and log the outcome. Never fails; there is nothing to nack.
pub async fn process_notification(handler: &dyn NotificationHandler, payload: &[u8]) {
    let notification = match codec::decode_notification(payload) {
        Ok(notification) => notification,
        Err(e) => {
            warn!(
                error = %e,
                payload_size = payload.len(),
                "Dropping malformed update notification"
            );
            return;
        }
    };

    info!(
        record_id = %notification.payload.id,
        city = %notification.payload.city,
        "Update notification received"
    );

    match handler.handle(notification.payload).await {
        Ok(record) => {
            debug!(record_id = %record.id, "Record refreshed");
        }
        Err(e) => {
            error!(error = %e, "Failed to process update notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use common::{
        DomainError, MockNotificationHandler, NotificationPayload, WeatherRecord, WeatherReport,
    };

    #[tokio::test]
    async fn test_valid_notification_dispatches_to_handler() {
        let mut mock_handler = MockNotificationHandler::new();
        mock_handler
            .expect_handle()
            .withf(|payload: &NotificationPayload| payload.id == "1" && payload.city == "Delhi")
            .times(1)
            .returning(|payload| {
                let now = Utc::now();
                Ok(WeatherRecord {
                    id: payload.id,
                    city: payload.city,
                    lat: payload.lat,
                    lon: payload.lon,
                    report: WeatherReport {
                        temperature: 26.0,
                        humidity: 60.0,
                        pressure: 1011.0,
                    },
                    created_at: now,
                    updated_at: now,
                })
            });

        process_notification(
            &mock_handler,
            br#"{"payload":{"id":"1","city":"Delhi","lat":28.6,"lon":77.2}}"#,
        )
        .await;
    }

    #[tokio::test]
    async fn test_missing_payload_key_is_dropped_without_dispatch() {
        // Handler has no expectations: any invocation fails the test
        let mock_handler = MockNotificationHandler::new();

        process_notification(
            &mock_handler,
            br#"{"id":"1","city":"Delhi","lat":28.6,"lon":77.2}"#,
        )
        .await;
    }

    #[tokio::test]
    async fn test_handler_failure_is_swallowed() {
        let mut mock_handler = MockNotificationHandler::new();
        mock_handler
            .expect_handle()
            .times(1)
            .returning(|payload| Err(DomainError::RecordNotFound(payload.id)));

        // Must not panic or propagate: failure is logged only
        process_notification(
            &mock_handler,
            br#"{"payload":{"id":"ghost","city":"Delhi","lat":28.6,"lon":77.2}}"#,
        )
        .await;
    }
}
