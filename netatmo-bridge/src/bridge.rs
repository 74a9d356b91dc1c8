//! One bridge run: token, then cached or fetched measures, then publish.

use std::time::Duration;

use tracing::{debug, info};

use crate::config::BridgeConfig;
use crate::credentials::CredentialStore;
use crate::error::BridgeError;
use crate::measures::{MeasurementCache, Snapshot};
use crate::netatmo::{ApiConfig, NetatmoClient, NetatmoSession, StationApi};
use crate::publish::{MqttConfig, MqttPublisher, Publisher};
use crate::token::TokenStore;

/// Where a published snapshot came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Cache,
    Upstream,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub source: SnapshotSource,
    pub topics: usize,
}

/// Wires a station session, the measurement cache and a publisher.
pub struct Bridge<A, P> {
    session: NetatmoSession<A>,
    cache: MeasurementCache,
    cache_ttl: Duration,
    publisher: P,
}

impl<A: StationApi, P: Publisher> Bridge<A, P> {
    pub fn new(
        session: NetatmoSession<A>,
        cache: MeasurementCache,
        cache_ttl: Duration,
        publisher: P,
    ) -> Self {
        Self {
            session,
            cache,
            cache_ttl,
            publisher,
        }
    }

    /// Run once. Nothing is published unless a complete snapshot exists.
    pub async fn run(&self) -> Result<RunReport, BridgeError> {
        let token = self.session.get_token().await?;

        let (snapshot, source) = match self.cached() {
            Some(snapshot) => (snapshot, SnapshotSource::Cache),
            None => {
                let snapshot = self
                    .session
                    .fetch_station_measures(&token.access_token)
                    .await?;
                self.cache.save(&snapshot)?;
                (snapshot, SnapshotSource::Upstream)
            }
        };

        let payloads = snapshot.to_payloads();
        self.publisher.publish_all(&payloads).await?;
        info!(source = ?source, topics = payloads.len(), "measurements published");

        Ok(RunReport {
            source,
            topics: payloads.len(),
        })
    }

    fn cached(&self) -> Option<Snapshot> {
        if !self.cache.is_fresh(self.cache_ttl) {
            debug!(ttl_secs = self.cache_ttl.as_secs(), "measurement cache stale or absent");
            return None;
        }
        let snapshot = self.cache.load()?;
        debug!(path = %self.cache.path().display(), "using cached measurements");
        Some(snapshot)
    }
}

/// Run the bridge against the live Netatmo API and an MQTT broker.
pub async fn run(
    config: &BridgeConfig,
    api: ApiConfig,
    mqtt: MqttConfig,
) -> Result<RunReport, BridgeError> {
    let credentials = CredentialStore::new(config.settings_path()).load_or_create()?;
    let session = NetatmoSession::new(
        NetatmoClient::new(api)?,
        credentials,
        TokenStore::new(config.token_path()),
    );

    let bridge = Bridge::new(
        session,
        MeasurementCache::new(config.measures_path()),
        config.cache_ttl,
        MqttPublisher::new(mqtt),
    );
    bridge.run().await
}
