use crate::domain::UpdateNotifier;
use anyhow::Result;
use common::{EnrichmentWorkItem, WorkItemProducer};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Configuration for the demo producer process
pub struct DemoProducerConfig {
    /// Interval between publishing work items
    pub interval: Duration,
    /// Sample location to enqueue
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    /// When set, an update notification for this record id is published on
    /// every tick as well, driving the refresh flow
    pub refresh_record_id: Option<String>,
}

impl Default for DemoProducerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            city: "Delhi".to_string(),
            lat: 28.6,
            lon: 77.2,
            refresh_record_id: None,
        }
    }
}

/// Periodically enqueues a sample work item so the pipeline can be exercised
/// without the record API, and optionally publishes a refresh notification
/// for a known record id. Disabled by default; enable via configuration.
pub async fn run_demo_producer(
    producer: Arc<dyn WorkItemProducer>,
    notifier: Arc<UpdateNotifier>,
    config: DemoProducerConfig,
    ctx: CancellationToken,
) -> Result<()> {
    info!(
        city = %config.city,
        interval_secs = config.interval.as_secs(),
        refresh_record_id = config.refresh_record_id.as_deref().unwrap_or("none"),
        "Starting demo work item producer"
    );

    let mut ticker = tokio::time::interval(config.interval);

    loop {
        tokio::select! {
            _ = ctx.cancelled() => {
                info!("Received shutdown signal, stopping demo producer");
                break;
            }
            _ = ticker.tick() => {
                let item = EnrichmentWorkItem {
                    city: config.city.clone(),
                    lat: config.lat,
                    lon: config.lon,
                };

                if let Err(e) = producer.enqueue(&item).await {
                    // Keep ticking; the broker may come back
                    error!(error = %e, city = %item.city, "Failed to enqueue demo work item");
                }

                if let Some(record_id) = &config.refresh_record_id {
                    let result = notifier
                        .notify_update(
                            record_id.clone(),
                            config.city.clone(),
                            config.lat,
                            config.lon,
                        )
                        .await;
                    if let Err(e) = result {
                        error!(error = %e, record_id = %record_id, "Failed to publish demo refresh notification");
                    }
                }
            }
        }
    }

    Ok(())
}
