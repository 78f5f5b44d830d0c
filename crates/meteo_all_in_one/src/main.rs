mod config;

use common::{
    init_telemetry, BrokerConnection, NatsClient, OpenWeatherClient, OpenWeatherConfig,
    PostgresClient, PostgresWeatherRepository, TelemetryConfig,
};
use config::ServiceConfig;
use enrichment_worker::domain::UpdateNotifier;
use enrichment_worker::enrichment_worker::{EnrichmentWorker, EnrichmentWorkerConfig};
use enrichment_worker::nats::{
    run_demo_producer, DemoProducerConfig, NatsNotificationProducer, NatsWorkItemProducer,
};
use meteo_runner::Runner;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() {
    // Initialize configuration and tracing
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = init_telemetry(&TelemetryConfig {
        log_level: config.log_level.clone(),
    }) {
        eprintln!("Failed to initialize telemetry: {}", e);
        std::process::exit(1);
    }

    info!(
        nats_url = %config.nats_url,
        work_stream = %config.work_stream,
        "Starting meteo-all-in-one service"
    );
    debug!("Configuration: {:?}", config);

    // Initialize shared dependencies
    let (repository, broker) = match initialize_shared_dependencies(&config).await {
        Ok(deps) => deps,
        Err(e) => {
            error!("Failed to initialize shared dependencies: {}", e);
            std::process::exit(1);
        }
    };

    let nats_client = match broker.client().await {
        Ok(client) => client,
        Err(e) => {
            error!("Broker connection not available: {}", e);
            std::process::exit(1);
        }
    };

    let fetcher = match create_weather_client(&config) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            error!("Failed to initialize weather client: {}", e);
            std::process::exit(1);
        }
    };

    let worker = match EnrichmentWorker::new(
        repository,
        fetcher.clone(),
        nats_client.clone(),
        EnrichmentWorkerConfig {
            work_stream: config.work_stream.clone(),
            work_subject: config.work_subject.clone(),
            consumer_name: config.consumer_name.clone(),
            notification_subject: config.notification_subject.clone(),
            batch_size: config.batch_size,
            batch_wait_secs: config.batch_wait_secs,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("Failed to initialize enrichment worker: {}", e);
            std::process::exit(1);
        }
    };

    // Build runner with all processes
    let mut runner = Runner::new();

    for (name, process) in worker.into_runner_processes() {
        runner = runner.with_named_process(name, process);
    }

    // Optional demo producer (feeds the work queue with a sample location
    // and, when a record id is configured, the refresh flow as well)
    if config.demo_producer_enabled {
        let producer = Arc::new(NatsWorkItemProducer::new(
            nats_client.create_publisher_client(),
            config.work_publish_subject.clone(),
        ));
        let notification_producer = Arc::new(NatsNotificationProducer::new(
            nats_client.create_core_publisher(),
            config.notification_subject.clone(),
        ));
        let notifier = Arc::new(UpdateNotifier::new(fetcher, notification_producer));
        let demo_config = DemoProducerConfig {
            interval: Duration::from_secs(config.demo_interval_secs),
            city: config.demo_city.clone(),
            lat: config.demo_lat,
            lon: config.demo_lon,
            refresh_record_id: Some(config.demo_refresh_record_id.clone())
                .filter(|id| !id.is_empty()),
        };
        runner = runner.with_process("demo_producer", move |ctx| {
            run_demo_producer(producer, notifier, demo_config, ctx)
        });
    }

    // Add cleanup handlers
    runner = runner
        .with_closer({
            let broker_for_close = broker;
            move || async move {
                info!("Running cleanup tasks...");
                broker_for_close.close().await;
                info!("Cleanup complete");
                Ok(())
            }
        })
        .with_closer_timeout(Duration::from_secs(10));

    // Run the service
    if let Err(e) = runner.run().await {
        error!("Service exited with error: {}", e);
        std::process::exit(1);
    }
}

async fn initialize_shared_dependencies(
    config: &ServiceConfig,
) -> anyhow::Result<(Arc<PostgresWeatherRepository>, BrokerConnection)> {
    // PostgreSQL initialization
    info!("Initializing PostgreSQL...");
    let postgres_client = PostgresClient::new(
        &config.postgres_host,
        config.postgres_port,
        &config.postgres_database,
        &config.postgres_username,
        &config.postgres_password,
        config.postgres_pool_size,
    )?;
    postgres_client.ping().await?;
    let repository = Arc::new(PostgresWeatherRepository::new(postgres_client));
    repository.ensure_schema().await?;

    // NATS initialization
    info!("Initializing NATS...");
    let broker = BrokerConnection::new();
    let nats_client = broker
        .connect(
            &config.nats_url,
            Duration::from_secs(config.startup_timeout_secs),
        )
        .await?;
    ensure_nats_streams(&nats_client, config).await?;

    Ok((repository, broker))
}

fn create_weather_client(config: &ServiceConfig) -> anyhow::Result<OpenWeatherClient> {
    // An empty key means no credential was supplied; fetches will fail with
    // MissingCredential rather than hitting the provider with a bad request.
    let api_key = Some(config.weather_api_key.clone()).filter(|k| !k.is_empty());
    OpenWeatherClient::new(OpenWeatherConfig {
        base_url: config.weather_base_url.clone(),
        api_key,
        timeout: Duration::from_secs(config.fetch_timeout_secs),
    })
}

async fn ensure_nats_streams(client: &NatsClient, config: &ServiceConfig) -> anyhow::Result<()> {
    client.ensure_stream(&config.work_stream).await?;
    Ok(())
}
