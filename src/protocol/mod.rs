// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message bus plumbing.
//!
//! The bridge only needs to publish; receiving is driven by the transport,
//! which feeds inbound messages to a [`Bridge`](crate::bridge::Bridge).
//!
//! - [`Publisher`]: the seam between translation and the bus
//! - [`MqttTransport`]: the MQTT connection (requires the `mqtt` feature)
//! - [`wait_for_broker`]: startup reachability probe

#[cfg(feature = "mqtt")]
mod mqtt;
mod probe;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttPublisher, MqttTransport, MqttTransportBuilder};
pub use probe::{probe_broker, wait_for_broker};

use crate::error::ProtocolError;

/// A message to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    /// Destination topic.
    pub topic: String,
    /// Text payload.
    pub payload: String,
}

impl Outbound {
    /// Creates a new outbound message.
    #[must_use]
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

impl std::fmt::Display for Outbound {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.topic, self.payload)
    }
}

/// Something that can put a message on the bus.
pub trait Publisher {
    /// Publishes a single message.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message cannot be handed to the bus.
    fn publish(
        &self,
        message: &Outbound,
    ) -> impl Future<Output = Result<(), ProtocolError>> + Send;
}
