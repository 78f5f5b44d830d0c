use crate::domain::result::DomainResult;
use crate::domain::WeatherReport;
use async_trait::async_trait;

/// Trait for fetching live weather observations from the external provider.
///
/// Credential, base URL, and request timeout are injected at construction;
/// implementations never read ambient process state per call. A missing
/// credential fails with `MissingCredential` before any network I/O.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch_report(&self, lat: f64, lon: f64) -> DomainResult<WeatherReport>;
}
