//! Publisher gateway: delivers a finished snapshot to the message bus.

mod error;
mod mqtt;

pub use error::PublishError;
pub use mqtt::{MqttConfig, MqttPublisher};

/// Delivers topic/value pairs to the message bus.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Publish every pair, retained, in order.
    async fn publish_all(&self, payloads: &[(&'static str, String)]) -> Result<(), PublishError>;
}
