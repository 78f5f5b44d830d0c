use crate::domain::{DomainError, DomainResult};
use crate::nats::client::NatsClient;
use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::info;

/// Process-wide broker connection manager.
///
/// Owns the single NATS connection for the process: `connect` once at
/// startup (failure there is fatal to the caller, there is no retry loop),
/// `close` once at shutdown (best-effort, never raises). Between those two
/// points `client` hands out the shared handle; outside it, callers get
/// `BrokerNotReady` and must fail their own operation.
pub struct BrokerConnection {
    state: RwLock<Option<Arc<NatsClient>>>,
}

impl Default for BrokerConnection {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerConnection {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(None),
        }
    }

    /// Establish the connection and JetStream context.
    pub async fn connect(&self, url: &str, timeout: Duration) -> Result<Arc<NatsClient>> {
        let client = Arc::new(NatsClient::connect(url, timeout).await?);
        let mut state = self.state.write().await;
        *state = Some(client.clone());
        Ok(client)
    }

    /// Non-blocking accessor for the connected client.
    pub async fn client(&self) -> DomainResult<Arc<NatsClient>> {
        self.state
            .read()
            .await
            .clone()
            .ok_or(DomainError::BrokerNotReady)
    }

    /// Tear down the connection. Drains even while other clones of the
    /// client handle are still held. Close errors are logged, never raised.
    pub async fn close(&self) {
        let client = self.state.write().await.take();
        match client {
            Some(client) => client.close().await,
            None => info!("Broker connection already closed"),
        }
    }
}
