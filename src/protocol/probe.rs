// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Startup reachability probe.
//!
//! On boot the network may come up after the bridge. Rather than fail the
//! first connection, the bridge can wait until the broker accepts TCP.

use std::time::Duration;

use tokio::net::TcpStream;

use crate::error::ProtocolError;

/// Tries one TCP connection to the broker.
///
/// # Errors
///
/// Returns `ProtocolError::ConnectionFailed` if the connection is refused or
/// does not complete within `timeout`.
pub async fn probe_broker(host: &str, port: u16, timeout: Duration) -> Result<(), ProtocolError> {
    match tokio::time::timeout(timeout, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => Ok(()),
        Ok(Err(e)) => Err(ProtocolError::ConnectionFailed(format!(
            "{host}:{port}: {e}"
        ))),
        Err(_) => Err(ProtocolError::ConnectionFailed(format!(
            "{host}:{port}: timed out after {}s",
            timeout.as_secs()
        ))),
    }
}

/// Waits until the broker accepts TCP connections, probing every `interval`.
///
/// Never gives up.
pub async fn wait_for_broker(host: &str, port: u16, interval: Duration) {
    let mut attempts: u32 = 0;
    loop {
        attempts = attempts.saturating_add(1);
        match probe_broker(host, port, interval).await {
            Ok(()) => {
                tracing::info!(host = %host, port, attempts, "Broker is reachable");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, retry_in = ?interval, "Broker not reachable yet");
            }
        }
        tokio::time::sleep(interval).await;
    }
}
