// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `devola-bridge` service binary.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{SignalKind, signal};

use devola_bridge::protocol::{MqttTransport, wait_for_broker};
use devola_bridge::{BridgeConfig, FrameCodec, TopicRegistry};

#[derive(Parser)]
#[command(name = "devola-bridge")]
#[command(about = "Bridge Devola heaters on Tasmota serial bridges to plain MQTT topics")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, default_value = "devola-bridge.toml")]
    config: PathBuf,

    /// Path to the mapping table, overriding `topics_file`
    #[arg(long)]
    topics: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG controls verbosity, default info.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // journald adds its own timestamps
    if std::env::var_os("JOURNAL_STREAM").is_some() {
        tracing_subscriber::fmt()
            .without_time()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();

    let mut config = BridgeConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(topics) = cli.topics {
        config.topics_file = topics;
    }

    let registry = TopicRegistry::load(&config.topics_file)
        .with_context(|| format!("loading mapping table {}", config.topics_file.display()))?;
    let registry = Arc::new(registry);

    if config.network.wait_for_broker {
        tracing::info!(
            host = %config.mqtt.host,
            port = config.mqtt.port,
            "Waiting for broker"
        );
        wait_for_broker(&config.mqtt.host, config.mqtt.port, config.probe_interval()).await;
    }

    let mut builder = MqttTransport::builder()
        .host(config.mqtt.host.as_str())
        .port(config.mqtt.port)
        .client_id(config.mqtt.client_id.as_str())
        .keep_alive(config.keep_alive())
        .retain(config.mqtt.retain);
    if let Some((username, password)) = config.credentials() {
        builder = builder.credentials(username, password);
    }

    let transport = builder
        .start(registry, FrameCodec::new(config.frame.checksum))
        .await
        .context("connecting to MQTT broker")?;

    let mut sigterm = signal(SignalKind::terminate())?;
    tracing::info!("Bridge running. Send SIGINT/SIGTERM to stop.");
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Received SIGINT, shutting down");
        }
        _ = sigterm.recv() => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }

    transport.shutdown().await;
    Ok(())
}
