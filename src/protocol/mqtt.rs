// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT transport for the bridge.
//!
//! One connection carries everything: subscriptions to every mapped device's
//! status topic and every normalized command topic, and all publishes.
//!
//! Two tasks run behind a [`MqttTransport`]:
//!
//! - the event loop task polls the connection, subscribes again after every
//!   `CONNACK` and forwards inbound publishes to the worker
//! - the worker task hands each message to a [`Bridge`], one at a time
//!
//! # Examples
//!
//! ```no_run
//! use std::sync::Arc;
//! use devola_bridge::codec::FrameCodec;
//! use devola_bridge::protocol::MqttTransport;
//! use devola_bridge::registry::TopicRegistry;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Arc::new(TopicRegistry::load("topics.conf")?);
//! let transport = MqttTransport::builder()
//!     .host("192.168.1.1")
//!     .port(1883)
//!     .start(registry, FrameCodec::default())
//!     .await?;
//!
//! // ... run until asked to stop
//! transport.shutdown().await;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Outgoing, Packet, QoS, SubscribeFilter};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::bridge::Bridge;
use crate::codec::FrameCodec;
use crate::error::ProtocolError;
use crate::registry::TopicRegistry;

use super::{Outbound, Publisher};

/// Pause before polling again after a connection error.
const RECONNECT_DELAY: Duration = Duration::from_secs(1);

/// Capacity of the client request queue.
const REQUEST_CAPACITY: usize = 64;

/// How long shutdown waits for the event loop to send `DISCONNECT`.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

type Inbound = (String, String);

/// Configuration for the MQTT connection.
#[derive(Debug, Clone)]
struct MqttTransportConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    client_id: String,
    keep_alive: Duration,
    connection_timeout: Duration,
    retain: bool,
}

impl Default for MqttTransportConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            client_id: "devola-bridge".to_string(),
            keep_alive: Duration::from_secs(60),
            connection_timeout: Duration::from_secs(10),
            retain: false,
        }
    }
}

/// Publishes translated messages with QoS 1.
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    retain: bool,
}

impl Publisher for MqttPublisher {
    async fn publish(&self, message: &Outbound) -> Result<(), ProtocolError> {
        self.client
            .publish(
                &message.topic,
                QoS::AtLeastOnce,
                self.retain,
                message.payload.as_str(),
            )
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

/// A running MQTT connection bridging device and normalized topics.
pub struct MqttTransport {
    client: AsyncClient,
    config: MqttTransportConfig,
    registry: Arc<TopicRegistry>,
    connected: Arc<AtomicBool>,
    event_task: JoinHandle<()>,
    worker_task: JoinHandle<()>,
}

impl MqttTransport {
    /// Creates a new builder for configuring the connection.
    #[must_use]
    pub fn builder() -> MqttTransportBuilder {
        MqttTransportBuilder::default()
    }

    /// Returns whether the broker connection is currently up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Returns the host address of the broker.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.config.host
    }

    /// Returns the port of the broker.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.config.port
    }

    /// Returns the registry the bridge translates with.
    #[must_use]
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Disconnects from the broker and stops both tasks.
    ///
    /// Messages still queued for the worker are discarded.
    pub async fn shutdown(mut self) {
        tracing::info!(
            host = %self.config.host,
            port = %self.config.port,
            "Disconnecting from MQTT broker"
        );

        if let Err(e) = self.client.disconnect().await {
            tracing::warn!(error = %e, "Failed to request disconnect");
        }
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut self.event_task)
            .await
            .is_err()
        {
            tracing::debug!("Event loop did not stop in time");
            self.event_task.abort();
        }
        self.worker_task.abort();
        self.connected.store(false, Ordering::Release);
    }
}

impl std::fmt::Debug for MqttTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttTransport")
            .field("host", &self.config.host)
            .field("port", &self.config.port)
            .field("client_id", &self.config.client_id)
            .field("connected", &self.is_connected())
            .field("devices", &self.registry.len())
            .finish()
    }
}

/// Builder for an [`MqttTransport`].
#[derive(Debug, Default)]
pub struct MqttTransportBuilder {
    config: MqttTransportConfig,
}

impl MqttTransportBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the client identifier (default: `devola-bridge`).
    #[must_use]
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.config.client_id = client_id.into();
        self
    }

    /// Sets the keep-alive interval (default: 60 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets how long to wait for the first `CONNACK` (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Sets the retain flag on published messages (default: `false`).
    #[must_use]
    pub fn retain(mut self, retain: bool) -> Self {
        self.config.retain = retain;
        self
    }

    /// Connects to the broker and starts bridging.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host or client id is not set
    /// - The first connection is not acknowledged within the timeout
    pub async fn start(
        self,
        registry: Arc<TopicRegistry>,
        codec: FrameCodec,
    ) -> Result<MqttTransport, ProtocolError> {
        if self.config.host.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }
        if self.config.client_id.is_empty() {
            return Err(ProtocolError::InvalidAddress(
                "MQTT client id is required".to_string(),
            ));
        }

        let mut mqtt_options =
            MqttOptions::new(&self.config.client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let subscriptions: Arc<[String]> = registry.subscriptions().into();

        // Unbounded so the event loop never waits on the worker, which may
        // itself be waiting for the event loop to drain the request queue.
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (connack_tx, connack_rx) = oneshot::channel();

        let event_task = tokio::spawn(handle_events(
            event_loop,
            client.clone(),
            subscriptions,
            inbound_tx,
            Arc::clone(&connected),
            connack_tx,
        ));

        let bridge = Bridge::new(
            Arc::clone(&registry),
            codec,
            MqttPublisher {
                client: client.clone(),
                retain: self.config.retain,
            },
        );
        let worker_task = tokio::spawn(run_worker(bridge, inbound_rx));

        let transport = MqttTransport {
            client,
            config: self.config,
            registry,
            connected,
            event_task,
            worker_task,
        };

        let timeout = transport.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %transport.config.host,
                    port = %transport.config.port,
                    devices = transport.registry.len(),
                    "Connected to MQTT broker"
                );
                Ok(transport)
            }
            Ok(Err(_)) => {
                transport.event_task.abort();
                transport.worker_task.abort();
                Err(ProtocolError::ConnectionFailed(
                    "MQTT event loop terminated unexpectedly".to_string(),
                ))
            }
            Err(_) => {
                transport.event_task.abort();
                transport.worker_task.abort();
                Err(ProtocolError::ConnectionFailed(format!(
                    "MQTT connection timeout after {}s",
                    timeout.as_secs()
                )))
            }
        }
    }
}

/// Subscribes to every bridge topic without blocking the event loop.
fn subscribe_all(client: AsyncClient, topics: Arc<[String]>) {
    tokio::spawn(async move {
        let filters: Vec<SubscribeFilter> = topics
            .iter()
            .map(|topic| SubscribeFilter::new(topic.clone(), QoS::AtLeastOnce))
            .collect();
        match client.subscribe_many(filters).await {
            Ok(()) => tracing::info!(topics = topics.len(), "Subscribed to bridge topics"),
            Err(e) => tracing::error!(error = %e, "Failed to subscribe to bridge topics"),
        }
    });
}

/// Drives the MQTT connection.
async fn handle_events(
    mut event_loop: EventLoop,
    client: AsyncClient,
    subscriptions: Arc<[String]>,
    inbound_tx: mpsc::UnboundedSender<Inbound>,
    connected: Arc<AtomicBool>,
    connack_tx: oneshot::Sender<()>,
) {
    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
                subscribe_all(client.clone(), Arc::clone(&subscriptions));
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                let Ok(payload) = String::from_utf8(publish.payload.to_vec()) else {
                    tracing::warn!(topic = %publish.topic, "Dropping non UTF-8 payload");
                    continue;
                };
                tracing::debug!(
                    topic = %publish.topic,
                    payload = %payload,
                    "MQTT message received"
                );
                if inbound_tx.send((publish.topic.clone(), payload)).is_err() {
                    tracing::debug!("Bridge worker stopped");
                    break;
                }
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                connected.store(false, Ordering::Release);
            }
            Ok(Event::Outgoing(Outgoing::Disconnect)) => {
                connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                if connected.swap(false, Ordering::AcqRel) {
                    tracing::error!(error = %e, "MQTT connection lost");
                } else {
                    tracing::debug!(error = %e, "MQTT connection attempt failed");
                }
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Feeds inbound messages to the bridge in arrival order.
async fn run_worker<P: Publisher>(
    bridge: Bridge<P>,
    mut inbound_rx: mpsc::UnboundedReceiver<Inbound>,
) {
    while let Some((topic, payload)) = inbound_rx.recv().await {
        bridge.handle(&topic, &payload).await;
    }
}
