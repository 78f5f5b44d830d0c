use crate::domain::{
    CreateWeatherRecordInput, DomainError, DomainResult, WeatherRecord, WeatherRecordRepository,
    WeatherReport,
};
use crate::postgres::PostgresClient;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

/// Weather record row for PostgreSQL storage with timestamp metadata
#[derive(Debug, Clone)]
pub struct WeatherRecordRow {
    pub id: String,
    pub city: String,
    pub lat: f64,
    pub lon: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub pressure: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<WeatherRecordRow> for WeatherRecord {
    fn from(row: WeatherRecordRow) -> Self {
        WeatherRecord {
            id: row.id,
            city: row.city,
            lat: row.lat,
            lon: row.lon,
            report: WeatherReport {
                temperature: row.temperature,
                humidity: row.humidity,
                pressure: row.pressure,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn row_from_postgres(row: &tokio_postgres::Row) -> WeatherRecordRow {
    WeatherRecordRow {
        id: row.get("id"),
        city: row.get("city"),
        lat: row.get("lat"),
        lon: row.get("lon"),
        temperature: row.get("temperature"),
        humidity: row.get("humidity"),
        pressure: row.get("pressure"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// PostgreSQL implementation of WeatherRecordRepository
#[derive(Clone)]
pub struct PostgresWeatherRepository {
    client: PostgresClient,
}

impl PostgresWeatherRepository {
    pub fn new(client: PostgresClient) -> Self {
        Self { client }
    }

    /// Create the backing table if it does not exist. Called once at startup.
    pub async fn ensure_schema(&self) -> anyhow::Result<()> {
        let conn = self.client.get_connection().await?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS weather_records (
                id TEXT PRIMARY KEY,
                city TEXT NOT NULL,
                lat DOUBLE PRECISION NOT NULL,
                lon DOUBLE PRECISION NOT NULL,
                temperature DOUBLE PRECISION NOT NULL,
                humidity DOUBLE PRECISION NOT NULL,
                pressure DOUBLE PRECISION NOT NULL,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )",
            &[],
        )
        .await?;
        debug!("weather_records schema ensured");
        Ok(())
    }
}

#[async_trait]
impl WeatherRecordRepository for PostgresWeatherRepository {
    #[instrument(skip(self), fields(city = %input.city))]
    async fn create_record(&self, input: CreateWeatherRecordInput) -> DomainResult<WeatherRecord> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            "INSERT INTO weather_records
                 (id, city, lat, lon, temperature, humidity, pressure, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            &[
                &id,
                &input.city,
                &input.lat,
                &input.lon,
                &input.report.temperature,
                &input.report.humidity,
                &input.report.pressure,
                &now,
                &now,
            ],
        )
        .await
        .map_err(|e| DomainError::RepositoryError(e.into()))?;

        debug!(record_id = %id, "Weather record created in database");

        Ok(WeatherRecord {
            id,
            city: input.city,
            lat: input.lat,
            lon: input.lon,
            report: input.report,
            created_at: now,
            updated_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn get_record(&self, id: &str) -> DomainResult<Option<WeatherRecord>> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let row = conn
            .query_opt(
                "SELECT id, city, lat, lon, temperature, humidity, pressure,
                        created_at, updated_at
                 FROM weather_records
                 WHERE id = $1",
                &[&id],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        Ok(row.map(|row| row_from_postgres(&row).into()))
    }

    #[instrument(skip(self, report))]
    async fn update_report(&self, id: &str, report: WeatherReport) -> DomainResult<WeatherRecord> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let now = Utc::now();

        // Single-statement full replacement of the report: the row either
        // gets the complete new value or keeps the old one
        let row = conn
            .query_opt(
                "UPDATE weather_records
                 SET temperature = $2, humidity = $3, pressure = $4, updated_at = $5
                 WHERE id = $1
                 RETURNING id, city, lat, lon, temperature, humidity, pressure,
                           created_at, updated_at",
                &[
                    &id,
                    &report.temperature,
                    &report.humidity,
                    &report.pressure,
                    &now,
                ],
            )
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        match row {
            Some(row) => {
                debug!(record_id = %id, "Weather report replaced");
                Ok(row_from_postgres(&row).into())
            }
            None => Err(DomainError::RecordNotFound(id.to_string())),
        }
    }

    #[instrument(skip(self))]
    async fn delete_record(&self, id: &str) -> DomainResult<()> {
        let conn = self
            .client
            .get_connection()
            .await
            .map_err(DomainError::RepositoryError)?;

        let deleted = conn
            .execute("DELETE FROM weather_records WHERE id = $1", &[&id])
            .await
            .map_err(|e| DomainError::RepositoryError(e.into()))?;

        if deleted == 0 {
            return Err(DomainError::RecordNotFound(id.to_string()));
        }

        debug!(record_id = %id, "Weather record deleted");
        Ok(())
    }
}
