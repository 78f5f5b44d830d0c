use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    // NATS configuration
    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// JetStream stream backing the durable work queue
    #[serde(default = "default_work_stream")]
    pub work_stream: String,

    /// Subject filter for the work-queue consumer
    #[serde(default = "default_work_subject")]
    pub work_subject: String,

    /// Subject work items are published to
    #[serde(default = "default_work_publish_subject")]
    pub work_publish_subject: String,

    /// Durable consumer name on the work stream
    #[serde(default = "default_consumer_name")]
    pub consumer_name: String,

    /// Core NATS subject carrying update notifications
    #[serde(default = "default_notification_subject")]
    pub notification_subject: String,

    /// Messages fetched (and held unacked) per batch. 1 gives strictly
    /// sequential processing with at most one in-flight provider call.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Max wait time for a message batch in seconds
    #[serde(default = "default_batch_wait_secs")]
    pub batch_wait_secs: u64,

    /// Startup timeout for connection establishment in seconds
    #[serde(default = "default_startup_timeout_secs")]
    pub startup_timeout_secs: u64,

    // PostgreSQL configuration
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    #[serde(default = "default_postgres_username")]
    pub postgres_username: String,

    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    #[serde(default = "default_postgres_pool_size")]
    pub postgres_pool_size: usize,

    // Weather provider configuration
    /// Base URL of the current-weather endpoint
    #[serde(default = "default_weather_base_url")]
    pub weather_base_url: String,

    /// Provider API key; empty means absent, failing fetches with
    /// MissingCredential
    #[serde(default = "default_weather_api_key")]
    pub weather_api_key: String,

    /// Bound on each provider request in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    // Demo producer configuration
    /// Periodically enqueue a sample work item (for exercising the pipeline)
    #[serde(default = "default_demo_producer_enabled")]
    pub demo_producer_enabled: bool,

    #[serde(default = "default_demo_interval_secs")]
    pub demo_interval_secs: u64,

    #[serde(default = "default_demo_city")]
    pub demo_city: String,

    #[serde(default = "default_demo_lat")]
    pub demo_lat: f64,

    #[serde(default = "default_demo_lon")]
    pub demo_lon: f64,

    /// Record id the demo producer refreshes each tick; empty disables the
    /// demo refresh flow
    #[serde(default = "default_demo_refresh_record_id")]
    pub demo_refresh_record_id: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

// NATS defaults
fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_work_stream() -> String {
    "weather_requests".to_string()
}

fn default_work_subject() -> String {
    "weather_requests.>".to_string()
}

fn default_work_publish_subject() -> String {
    "weather_requests.enqueue".to_string()
}

fn default_consumer_name() -> String {
    "enrichment-worker".to_string()
}

fn default_notification_subject() -> String {
    "weather-update".to_string()
}

fn default_batch_size() -> usize {
    1
}

fn default_batch_wait_secs() -> u64 {
    5
}

fn default_startup_timeout_secs() -> u64 {
    30
}

// PostgreSQL defaults
fn default_postgres_host() -> String {
    "localhost".to_string()
}

fn default_postgres_port() -> u16 {
    5432
}

fn default_postgres_database() -> String {
    "meteo".to_string()
}

fn default_postgres_username() -> String {
    "meteo".to_string()
}

fn default_postgres_password() -> String {
    "meteo".to_string()
}

fn default_postgres_pool_size() -> usize {
    5
}

// Weather provider defaults
fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5/weather".to_string()
}

fn default_weather_api_key() -> String {
    String::new()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

// Demo producer defaults
fn default_demo_producer_enabled() -> bool {
    false
}

fn default_demo_interval_secs() -> u64 {
    30
}

fn default_demo_city() -> String {
    "Delhi".to_string()
}

fn default_demo_lat() -> f64 {
    28.6
}

fn default_demo_lon() -> f64 {
    77.2
}

fn default_demo_refresh_record_id() -> String {
    String::new()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("METEO"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure tests run serially and don't interfere with each other
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("METEO_LOG_LEVEL");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.work_stream, "weather_requests");
        assert_eq!(config.notification_subject, "weather-update");
        assert_eq!(config.batch_size, 1);
        assert!(!config.demo_producer_enabled);
        assert!(config.demo_refresh_record_id.is_empty());
        assert!(config.weather_api_key.is_empty());
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("METEO_LOG_LEVEL", "debug");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");

        std::env::remove_var("METEO_LOG_LEVEL");
    }
}
