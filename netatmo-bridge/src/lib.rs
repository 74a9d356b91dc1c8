//! Netatmo weather station to MQTT bridge.
//!
//! Each run obtains a Netatmo access token (reusing, refreshing or
//! requesting one as needed), reads station measures from a short-lived
//! disk cache or the Netatmo API, and publishes them as retained MQTT
//! topics under `netatmo/`.

pub mod bridge;
pub mod config;
pub mod credentials;
pub mod error;
pub mod measures;
pub mod netatmo;
pub mod publish;
pub mod store;
pub mod token;
