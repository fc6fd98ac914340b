// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT transport using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::sync::Arc;
use std::time::Duration;

use devola_bridge::protocol::{MqttTransport, probe_broker, wait_for_broker};
use devola_bridge::{FrameCodec, ProtocolError, TopicRegistry};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind and accept connections
    sleep(Duration::from_millis(500)).await;
}

fn registry() -> Arc<TopicRegistry> {
    Arc::new(TopicRegistry::from_pairs([("devola1", "heater1"), ("devola2", "heater2")]).unwrap())
}

// ============================================================================
// Transport lifecycle
// ============================================================================

mod transport {
    use super::*;

    #[tokio::test]
    async fn connects_and_shuts_down() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let transport = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("devola-bridge-test")
            .start(registry(), FrameCodec::default())
            .await;

        assert!(transport.is_ok(), "Failed to connect: {:?}", transport.err());
        let transport = transport.unwrap();
        assert!(transport.is_connected());
        assert_eq!(transport.host(), "127.0.0.1");
        assert_eq!(transport.port(), port);
        assert_eq!(transport.registry().len(), 2);

        transport.shutdown().await;
    }

    #[tokio::test]
    async fn connection_timeout_without_broker() {
        let port = get_test_port();

        let result = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(1))
            .start(registry(), FrameCodec::default())
            .await;

        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }
}

// ============================================================================
// Reconnect
// ============================================================================

mod reconnect {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::sync::mpsc;

    const CONNECT: u8 = 0x10;
    const SUBSCRIBE: u8 = 0x82;
    const PINGREQ: u8 = 0xC0;
    const CONNACK: [u8; 4] = [0x20, 0x02, 0x00, 0x00];
    const PINGRESP: [u8; 2] = [0xD0, 0x00];

    /// Reads one MQTT control packet as its first header byte and body.
    async fn read_packet(stream: &mut TcpStream) -> std::io::Result<(u8, Vec<u8>)> {
        let header = stream.read_u8().await?;
        let mut remaining = 0usize;
        for shift in [0, 7, 14, 21] {
            let byte = stream.read_u8().await?;
            remaining |= usize::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                break;
            }
        }
        let mut body = vec![0; remaining];
        stream.read_exact(&mut body).await?;
        Ok((header, body))
    }

    /// Splits a SUBSCRIBE body into its packet id and topic filters.
    fn subscribe_filters(body: &[u8]) -> ([u8; 2], Vec<String>) {
        let packet_id = [body[0], body[1]];
        let mut filters = Vec::new();
        let mut rest = &body[2..];
        while rest.len() > 2 {
            let len = usize::from(u16::from_be_bytes([rest[0], rest[1]]));
            filters.push(String::from_utf8(rest[2..2 + len].to_vec()).unwrap());
            // skip the requested QoS byte
            rest = &rest[2 + len + 1..];
        }
        (packet_id, filters)
    }

    /// Minimal broker session: acknowledges CONNECT, SUBSCRIBE and PINGREQ and
    /// reports every subscribed filter set. With `drop_after_subscribe` the
    /// connection is closed right after the first SUBACK.
    async fn serve(
        mut stream: TcpStream,
        subscribed: mpsc::UnboundedSender<Vec<String>>,
        drop_after_subscribe: bool,
    ) {
        while let Ok((header, body)) = read_packet(&mut stream).await {
            let reply = match header {
                CONNECT => CONNACK.to_vec(),
                SUBSCRIBE => {
                    let (packet_id, filters) = subscribe_filters(&body);
                    let mut suback = vec![
                        0x90,
                        u8::try_from(2 + filters.len()).unwrap(),
                        packet_id[0],
                        packet_id[1],
                    ];
                    suback.extend(std::iter::repeat_n(0x01, filters.len()));
                    let _ = subscribed.send(filters);
                    suback
                }
                PINGREQ => PINGRESP.to_vec(),
                _ => continue,
            };
            if stream.write_all(&reply).await.is_err() {
                return;
            }
            if header == SUBSCRIBE && drop_after_subscribe {
                return;
            }
        }
    }

    #[tokio::test]
    async fn resubscribes_after_reconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (subscribed_tx, mut subscribed_rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut first = true;
            while let Ok((stream, _)) = listener.accept().await {
                tokio::spawn(serve(stream, subscribed_tx.clone(), first));
                first = false;
            }
        });

        let registry = registry();
        let transport = MqttTransport::builder()
            .host("127.0.0.1")
            .port(port)
            .client_id("devola-bridge-reconnect")
            .start(Arc::clone(&registry), FrameCodec::default())
            .await
            .unwrap();

        let expected = registry.subscriptions();
        assert_eq!(expected.len(), 14);
        for session in ["first", "second"] {
            let filters = tokio::time::timeout(Duration::from_secs(10), subscribed_rx.recv())
                .await
                .unwrap_or_else(|_| panic!("no SUBSCRIBE on {session} connection"))
                .unwrap();
            assert_eq!(filters, expected, "{session} connection");
        }
        assert!(transport.is_connected());

        transport.shutdown().await;
    }
}

// ============================================================================
// Broker probe
// ============================================================================

mod probe {
    use super::*;

    #[tokio::test]
    async fn probe_finds_mock_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        probe_broker("127.0.0.1", port, Duration::from_secs(2))
            .await
            .unwrap();
        tokio::time::timeout(
            Duration::from_secs(5),
            wait_for_broker("127.0.0.1", port, Duration::from_millis(100)),
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn probe_fails_without_broker() {
        let port = get_test_port();
        let result = probe_broker("127.0.0.1", port, Duration::from_secs(1)).await;
        assert!(result.is_err());
    }
}

// NOTE: mockforge-mqtt does not forward publishes between clients, so the
// translation paths are exercised in tests/bridge.rs with a recording
// publisher instead of through the broker.
