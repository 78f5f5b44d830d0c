use async_trait::async_trait;
use common::{
    DomainResult, NotificationHandler, NotificationPayload, WeatherFetcher, WeatherRecord,
    WeatherRecordRepository,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Domain service for the notification flow: re-fetch live weather for an
/// existing record and replace its stored report.
///
/// The record is located by id on every invocation; no long-lived reference
/// is held. A missing record surfaces as `RecordNotFound` for that message.
pub struct RefreshService {
    fetcher: Arc<dyn WeatherFetcher>,
    repository: Arc<dyn WeatherRecordRepository>,
}

impl RefreshService {
    pub fn new(
        fetcher: Arc<dyn WeatherFetcher>,
        repository: Arc<dyn WeatherRecordRepository>,
    ) -> Self {
        Self {
            fetcher,
            repository,
        }
    }
}

#[async_trait]
impl NotificationHandler for RefreshService {
    #[instrument(skip(self), fields(record_id = %payload.id, city = %payload.city))]
    async fn handle(&self, payload: NotificationPayload) -> DomainResult<WeatherRecord> {
        let report = self.fetcher.fetch_report(payload.lat, payload.lon).await?;

        let record = self.repository.update_report(&payload.id, report).await?;

        debug!(
            record_id = %record.id,
            temperature = record.report.temperature,
            "Refreshed weather report"
        );
        Ok(record)
    }
}
