use crate::domain::result::DomainResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Observation snapshot produced by the weather fetcher.
///
/// Rebuilt from scratch on every fetch, never merged with a previous value.
/// Fields absent from the provider response default to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
}

/// A stored location with its most recent weather report.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRecord {
    pub id: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub report: WeatherReport,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a weather record
#[derive(Debug, Clone)]
pub struct CreateWeatherRecordInput {
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub report: WeatherReport,
}

/// Repository trait for weather record storage operations
///
/// A record's report is always a complete `WeatherReport`: `update_report`
/// replaces the whole value in one statement or fails leaving the old value
/// intact.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WeatherRecordRepository: Send + Sync {
    /// Persist a new record; the id is generated by the repository.
    async fn create_record(&self, input: CreateWeatherRecordInput) -> DomainResult<WeatherRecord>;

    /// Fetch a record by id.
    async fn get_record(&self, id: &str) -> DomainResult<Option<WeatherRecord>>;

    /// Replace the stored report and refresh `updated_at`.
    /// Fails with `RecordNotFound` if the id does not exist.
    async fn update_report(&self, id: &str, report: WeatherReport) -> DomainResult<WeatherRecord>;

    /// Delete a record by id.
    /// Fails with `RecordNotFound` if the id does not exist.
    async fn delete_record(&self, id: &str) -> DomainResult<()>;
}
