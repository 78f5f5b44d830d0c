use crate::domain::result::DomainResult;
use crate::domain::WeatherRecord;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Work-queue payload requesting enrichment of a location.
///
/// Ephemeral: exists only on the wire. Redelivered on negative
/// acknowledgement until a consumer acks or discards it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichmentWorkItem {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// Coordinates of an existing record to refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub id: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
}

/// Notification-channel envelope. The `payload` key is required; consumers
/// drop envelopes without it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateNotification {
    pub payload: NotificationPayload,
}

/// Trait for publishing enrichment work items to the durable work queue
///
/// Implementations must only return once the broker has acknowledged the
/// publish, so an accepted item survives a broker restart.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkItemProducer: Send + Sync {
    async fn enqueue(&self, item: &EnrichmentWorkItem) -> DomainResult<()>;
}

/// Trait for publishing update notifications to the notification channel
///
/// Best-effort: losing a notification only delays a refresh, it never loses
/// data, since the source-of-truth coordinates remain in the store.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationProducer: Send + Sync {
    async fn publish_notification(&self, notification: &UpdateNotification) -> DomainResult<()>;
}

/// Handler for decoded work items, invoked once per delivered message.
/// The caller acks on `Ok` and decides between requeue and discard on `Err`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WorkItemHandler: Send + Sync {
    async fn handle(&self, item: EnrichmentWorkItem) -> DomainResult<WeatherRecord>;
}

/// Handler for decoded update notifications. There is no acknowledgement
/// concept on the notification channel; failures surface to the caller for
/// logging only.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait NotificationHandler: Send + Sync {
    async fn handle(&self, payload: NotificationPayload) -> DomainResult<WeatherRecord>;
}
