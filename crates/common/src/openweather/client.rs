use crate::domain::{DomainError, DomainResult, WeatherFetcher, WeatherReport};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Connection settings for the external weather provider, injected at
/// construction rather than read from ambient process state per call.
#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    /// Base URL of the current-weather endpoint
    pub base_url: String,
    /// API credential; absence fails each fetch with `MissingCredential`
    pub api_key: Option<String>,
    /// Bound on the whole request; elapsed time maps to `FetchTimeout`
    pub timeout: Duration,
}

/// HTTP client for the external weather provider.
pub struct OpenWeatherClient {
    http: reqwest::Client,
    config: OpenWeatherConfig,
}

impl OpenWeatherClient {
    pub fn new(config: OpenWeatherConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }
}

/// Provider response shape: `{ "main": { "temp", "humidity", "pressure" } }`.
///
/// Every level defaults when absent. A thin response yields a report of
/// zeroes rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
struct ProviderResponse {
    #[serde(default)]
    main: ProviderMain,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderMain {
    #[serde(default)]
    temp: f64,
    #[serde(default)]
    humidity: f64,
    #[serde(default)]
    pressure: f64,
}

impl From<ProviderResponse> for WeatherReport {
    fn from(response: ProviderResponse) -> Self {
        WeatherReport {
            temperature: response.main.temp,
            humidity: response.main.humidity,
            pressure: response.main.pressure,
        }
    }
}

#[async_trait]
impl WeatherFetcher for OpenWeatherClient {
    #[instrument(skip(self))]
    async fn fetch_report(&self, lat: f64, lon: f64) -> DomainResult<WeatherReport> {
        // Credential precondition, checked before any network I/O
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(DomainError::MissingCredential)?;

        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("lat", lat.to_string()),
                ("lon", lon.to_string()),
                ("units", "metric".to_string()),
                ("appid", api_key.to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DomainError::FetchTimeout(self.config.timeout)
                } else {
                    DomainError::FetchFailed(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            // Preserve the upstream error body for diagnostics when present
            let body = response.text().await.unwrap_or_default();
            let detail = if body.is_empty() {
                "unknown error".to_string()
            } else {
                body
            };
            warn!(status = %status, detail = %detail, "Provider returned an error");
            return Err(DomainError::FetchFailed(detail));
        }

        let parsed: ProviderResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                DomainError::FetchTimeout(self.config.timeout)
            } else {
                DomainError::FetchFailed(e.to_string())
            }
        })?;
        let report = WeatherReport::from(parsed);

        debug!(
            temperature = report.temperature,
            humidity = report.humidity,
            pressure = report.pressure,
            "Fetched weather report"
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer, api_key: Option<&str>) -> OpenWeatherClient {
        OpenWeatherClient::new(OpenWeatherConfig {
            base_url: format!("{}/data/2.5/weather", server.uri()),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(2),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_report_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "28.6"))
            .and(query_param("lon", "77.2"))
            .and(query_param("units", "metric"))
            .and(query_param("appid", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 25.0, "humidity": 40.0, "pressure": 1010.0 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let report = client.fetch_report(28.6, 77.2).await.unwrap();

        assert_eq!(report.temperature, 25.0);
        assert_eq!(report.humidity, 40.0);
        assert_eq!(report.pressure, 1010.0);
    }

    #[tokio::test]
    async fn test_missing_fields_default_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "main": { "temp": 25.0, "pressure": 1010.0 }
            })))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let report = client.fetch_report(28.6, 77.2).await.unwrap();

        assert_eq!(report.temperature, 25.0);
        assert_eq!(report.humidity, 0.0);
        assert_eq!(report.pressure, 1010.0);
    }

    #[tokio::test]
    async fn test_missing_main_defaults_whole_report_to_zero() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let report = client.fetch_report(28.6, 77.2).await.unwrap();

        assert_eq!(report.temperature, 0.0);
        assert_eq!(report.humidity, 0.0);
        assert_eq!(report.pressure, 0.0);
    }

    #[tokio::test]
    async fn test_upstream_error_body_preserved_as_detail() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string(r#"{"cod":401,"message":"Invalid API key"}"#),
            )
            .mount(&server)
            .await;

        let client = client_for(&server, Some("bad-key"));
        let result = client.fetch_report(28.6, 77.2).await;

        match result {
            Err(DomainError::FetchFailed(detail)) => {
                assert!(detail.contains("Invalid API key"));
            }
            other => panic!("expected FetchFailed, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_empty_error_body_yields_unknown_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server, Some("test-key"));
        let result = client.fetch_report(28.6, 77.2).await;

        match result {
            Err(DomainError::FetchFailed(detail)) => assert_eq!(detail, "unknown error"),
            other => panic!("expected FetchFailed, got {:?}", other.err()),
        }
    }

    #[tokio::test]
    async fn test_missing_credential_makes_no_http_call() {
        let server = MockServer::start().await;

        let client = client_for(&server, None);
        let result = client.fetch_report(28.6, 77.2).await;

        assert!(matches!(result, Err(DomainError::MissingCredential)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_credential_is_treated_as_missing() {
        let server = MockServer::start().await;

        let client = client_for(&server, Some(""));
        let result = client.fetch_report(28.6, 77.2).await;

        assert!(matches!(result, Err(DomainError::MissingCredential)));
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_slow_provider_maps_to_fetch_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"main": {}}))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let client = OpenWeatherClient::new(OpenWeatherConfig {
            base_url: format!("{}/data/2.5/weather", server.uri()),
            api_key: Some("test-key".to_string()),
            timeout: Duration::from_millis(100),
        })
        .unwrap();

        let result = client.fetch_report(28.6, 77.2).await;
        assert!(matches!(result, Err(DomainError::FetchTimeout(_))));
    }
}
