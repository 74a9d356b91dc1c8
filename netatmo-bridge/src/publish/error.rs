//! Publisher error types.

/// Errors that can occur while publishing to the MQTT broker.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Broker refused or dropped the connection
    #[error("failed to connect to MQTT broker {host}:{port}: {source}")]
    Connect {
        host: String,
        port: u16,
        #[source]
        source: rumqttc::ConnectionError,
    },

    /// Broker did not acknowledge the connection in time
    #[error("timed out connecting to MQTT broker {host}:{port}")]
    ConnectTimeout { host: String, port: u16 },

    /// Request could not be handed to the client event loop
    #[error("MQTT client error: {0}")]
    Client(#[from] rumqttc::ClientError),
}
