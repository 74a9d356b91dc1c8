mod args;

use std::process::ExitCode;
use std::time::Duration;

use clap::Parser as _;
use netatmo_bridge::bridge;
use netatmo_bridge::config::BridgeConfig;
use netatmo_bridge::netatmo::ApiConfig;
use netatmo_bridge::publish::MqttConfig;
use tracing::error;
use tracing_subscriber::EnvFilter;

use args::Args;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(args.log_level.directive()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = BridgeConfig::new(&args.data_dir)
        .with_cache_ttl(Duration::from_secs(args.cache_ttl));
    let api = ApiConfig::new().with_insecure(args.insecure);
    let mqtt = MqttConfig::new(&args.mqtt_host, args.mqtt_port).with_client_id(&args.mqtt_client_id);

    match bridge::run(&config, api, mqtt).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!(kind = ?e.kind(), "{e}");
            ExitCode::FAILURE
        }
    }
}
