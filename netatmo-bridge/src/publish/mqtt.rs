//! MQTT publisher.
//!
//! Each `publish_all` call owns one broker connection: connect, start the
//! event loop, publish every topic retained at QoS 0, wait a bounded time
//! for the event loop to flush, then disconnect.

use std::time::Duration;

use rumqttc::{AsyncClient, ConnectionError, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS};
use tokio::time::{sleep, timeout};
use tracing::{debug, info, trace, warn};

use super::Publisher;
use super::error::PublishError;

/// Default broker host.
const DEFAULT_HOST: &str = "localhost";

/// Default broker port.
const DEFAULT_PORT: u16 = 1883;

/// Default MQTT client identifier.
const DEFAULT_CLIENT_ID: &str = "netatmo-publisher";

/// Configuration for the MQTT publisher.
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker host
    pub host: String,
    /// Broker port
    pub port: u16,
    /// Client identifier presented to the broker
    pub client_id: String,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u64,
    /// How long to let the event loop flush after the last publish
    pub flush_wait: Duration,
    /// How long to wait for the broker's CONNACK
    pub connect_timeout: Duration,
}

impl MqttConfig {
    /// Create a config for the given broker.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            client_id: DEFAULT_CLIENT_ID.to_string(),
            keep_alive_secs: 60,
            flush_wait: Duration::from_secs(1),
            connect_timeout: Duration::from_secs(10),
        }
    }

    /// Set the client identifier.
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    /// Set the flush wait after publishing.
    pub fn with_flush_wait(mut self, wait: Duration) -> Self {
        self.flush_wait = wait;
        self
    }

    /// Set the connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Publishes snapshots to an MQTT broker, one connection per call.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    config: MqttConfig,
}

impl MqttPublisher {
    /// Create a new publisher.
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    async fn connect(&self, eventloop: &mut EventLoop) -> Result<(), PublishError> {
        match timeout(self.config.connect_timeout, wait_for_connack(eventloop)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(source)) => Err(PublishError::Connect {
                host: self.config.host.clone(),
                port: self.config.port,
                source,
            }),
            Err(_) => Err(PublishError::ConnectTimeout {
                host: self.config.host.clone(),
                port: self.config.port,
            }),
        }
    }
}

impl Publisher for MqttPublisher {
    async fn publish_all(&self, payloads: &[(&'static str, String)]) -> Result<(), PublishError> {
        let mut options = MqttOptions::new(
            &self.config.client_id,
            &self.config.host,
            self.config.port,
        );
        options.set_keep_alive(Duration::from_secs(self.config.keep_alive_secs));

        let (client, mut eventloop) = AsyncClient::new(options, payloads.len() + 1);
        self.connect(&mut eventloop).await?;
        info!(host = %self.config.host, port = self.config.port, "MQTT connected");

        let mut driver = tokio::spawn(drive(eventloop));

        let mut published = Ok(());
        for (topic, value) in payloads {
            if let Err(e) = client
                .publish(*topic, QoS::AtMostOnce, true, value.clone().into_bytes())
                .await
            {
                published = Err(PublishError::from(e));
                break;
            }
            debug!(topic, value = %value, "MQTT publish");
        }

        sleep(self.config.flush_wait).await;

        if let Err(e) = client.disconnect().await {
            warn!(error = %e, "failed to request MQTT disconnect");
        }

        match timeout(self.config.flush_wait, &mut driver).await {
            Ok(Ok(Ok(()))) => debug!("MQTT disconnected"),
            Ok(Ok(Err(e))) => warn!(error = %e, "MQTT event loop ended with error"),
            Ok(Err(e)) => warn!(error = %e, "MQTT event loop task failed"),
            Err(_) => {
                driver.abort();
                debug!("MQTT event loop did not stop in time, aborted");
            }
        }

        published
    }
}

async fn wait_for_connack(eventloop: &mut EventLoop) -> Result<(), ConnectionError> {
    loop {
        if let Event::Incoming(Packet::ConnAck(ack)) = eventloop.poll().await? {
            debug!(code = ?ack.code, "MQTT CONNACK");
            return Ok(());
        }
    }
}

/// Run the event loop until our own DISCONNECT has gone out.
async fn drive(mut eventloop: EventLoop) -> Result<(), ConnectionError> {
    loop {
        match eventloop.poll().await? {
            Event::Outgoing(Outgoing::Disconnect) => return Ok(()),
            event => trace!(?event, "MQTT event"),
        }
    }
}
