use std::time::Duration;
use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Broker connection not established")]
    BrokerNotReady,

    #[error("Weather API credential is missing")]
    MissingCredential,

    #[error("Failed to fetch weather: {0}")]
    FetchFailed(String),

    #[error("Weather fetch timed out after {0:?}")]
    FetchTimeout(Duration),

    #[error("Malformed message: {0}")]
    MalformedMessage(String),

    #[error("Weather record not found: {0}")]
    RecordNotFound(String),

    #[error("Failed to publish message: {0}")]
    PublishFailed(#[source] anyhow::Error),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    /// Whether redelivering the triggering message can ever succeed.
    /// Permanent failures are discarded by consumers instead of requeued.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            DomainError::MalformedMessage(_) | DomainError::MissingCredential
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permanent_failures() {
        assert!(DomainError::MalformedMessage("bad json".to_string()).is_permanent());
        assert!(DomainError::MissingCredential.is_permanent());
    }

    #[test]
    fn test_retryable_failures() {
        assert!(!DomainError::FetchFailed("rate limited".to_string()).is_permanent());
        assert!(!DomainError::FetchTimeout(Duration::from_secs(10)).is_permanent());
        assert!(!DomainError::RecordNotFound("abc".to_string()).is_permanent());
        assert!(!DomainError::PublishFailed(anyhow::anyhow!("no responders")).is_permanent());
        assert!(!DomainError::RepositoryError(anyhow::anyhow!("pool exhausted")).is_permanent());
    }
}
