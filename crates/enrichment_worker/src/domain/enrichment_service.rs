use async_trait::async_trait;
use common::{
    CreateWeatherRecordInput, DomainResult, EnrichmentWorkItem, WeatherFetcher, WeatherRecord,
    WeatherRecordRepository, WorkItemHandler,
};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Domain service for the work-queue flow: fetch live weather for a
/// requested location and persist a new record.
///
/// The caller (the queue consumer) maps the result onto the ack decision:
/// `Ok` acks, transient errors requeue, permanent errors discard.
pub struct EnrichmentService {
    fetcher: Arc<dyn WeatherFetcher>,
    repository: Arc<dyn WeatherRecordRepository>,
}

impl EnrichmentService {
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
impl WorkItemHandler for EnrichmentService {
    #[instrument(skip(self), fields(city = %item.city))]
    async fn handle(&self, item: EnrichmentWorkItem) -> DomainResult<WeatherRecord> {
        let report = self.fetcher.fetch_report(item.lat, item.lon).await?;

        debug!(
            city = %item.city,
            temperature = report.temperature,
            "Fetched report, persisting record"
        );

        let record = self
            .repository
            .create_record(CreateWeatherRecordInput {
                city: item.city,
                lat: item.lat,
                lon: item.lon,
                report,
            })
            .await?;

        debug!(record_id = %record.id, "Enrichment complete");
        Ok(record)
    }
}
