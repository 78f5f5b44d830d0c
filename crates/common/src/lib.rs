mod domain;
mod nats;
mod openweather;
mod postgres;
mod telemetry;

pub use domain::*;
pub use nats::*;
pub use openweather::*;
pub use postgres::*;
pub use telemetry::*;

// Re-export mocks when the testing feature is enabled
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNotificationHandler;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockNotificationProducer;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockWeatherFetcher;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockWeatherRecordRepository;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockWorkItemHandler;
#[cfg(any(test, feature = "testing"))]
pub use domain::MockWorkItemProducer;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockCorePublisher;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamConsumer;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockJetStreamPublisher;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockMessageProcessor;
#[cfg(any(test, feature = "testing"))]
pub use nats::MockPullConsumer;
