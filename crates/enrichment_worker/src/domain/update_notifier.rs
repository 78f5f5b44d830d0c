use common::{
    DomainResult, NotificationPayload, NotificationProducer, UpdateNotification, WeatherFetcher,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Publishes "refresh this record" events onto the notification channel.
///
/// The fetch runs first as a liveness gate: if the provider cannot serve the
/// coordinates, no notification goes out. The published payload carries the
/// request-time coordinates, not the observed report; the downstream
/// consumer recomputes the report itself.
pub struct UpdateNotifier {
    fetcher: Arc<dyn WeatherFetcher>,
    producer: Arc<dyn NotificationProducer>,
}

impl UpdateNotifier {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, producer: Arc<dyn NotificationProducer>) -> Self {
        Self { fetcher, producer }
    }

    #[instrument(skip(self), fields(record_id = %id, city = %city))]
    pub async fn notify_update(
        &self,
        id: String,
        city: String,
        lat: f64,
        lon: f64,
    ) -> DomainResult<()> {
        let report = self.fetcher.fetch_report(lat, lon).await?;
        debug!(
            temperature = report.temperature,
            "Provider reachable, publishing update notification"
        );

        let notification = UpdateNotification {
            payload: NotificationPayload { id, city, lat, lon },
        };

        self.producer.publish_notification(&notification).await
    }
}
