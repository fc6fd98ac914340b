// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Message routing between device topics and normalized topics.
//!
//! ```text
//! tele/<in>/RESULT ──decode──► state ──changes──► stat/<out>/<FIELD>
//! cmnd/<out>/POWER ─────────────────────────────► cmnd/<in>/POWER
//! cmnd/<out>/<CMD> ──gate──encode───────────────► cmnd/<in>/SSERIALSEND5
//! ```
//!
//! [`Translator`] is synchronous and does the work. [`Bridge`] pairs it with
//! a [`Publisher`] and absorbs per-message failures.

mod topic;
mod translator;

pub use topic::Route;
pub use translator::Translator;

use std::sync::Arc;

use crate::codec::FrameCodec;
use crate::error::MessageError;
use crate::protocol::Publisher;
use crate::registry::TopicRegistry;

/// Routes inbound messages and publishes their translations.
#[derive(Debug)]
pub struct Bridge<P> {
    translator: Translator,
    publisher: P,
}

impl<P: Publisher> Bridge<P> {
    /// Creates a bridge.
    #[must_use]
    pub fn new(registry: Arc<TopicRegistry>, codec: FrameCodec, publisher: P) -> Self {
        Self {
            translator: Translator::new(registry, codec),
            publisher,
        }
    }

    /// Returns the translator.
    #[must_use]
    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    /// Returns the publisher.
    #[must_use]
    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    /// Handles one inbound message and returns how many messages were
    /// published.
    ///
    /// Failures are logged and never propagate: a bad message must not stop
    /// the service.
    pub async fn handle(&self, topic: &str, payload: &str) -> usize {
        let messages = match self.translator.translate(topic, payload) {
            Ok(messages) => messages,
            Err(e) => {
                log_dropped(topic, &e);
                return 0;
            }
        };

        let mut published = 0;
        for message in &messages {
            match self.publisher.publish(message).await {
                Ok(()) => {
                    published += 1;
                    tracing::debug!(
                        topic = %message.topic,
                        payload = %message.payload,
                        "Published"
                    );
                }
                Err(e) => {
                    log_dropped(topic, &MessageError::Publish(e));
                }
            }
        }
        published
    }
}

fn log_dropped(topic: &str, error: &MessageError) {
    match error {
        MessageError::PowerGated { .. } => {
            tracing::warn!(topic = %topic, error = %error, "Ignoring command, device is off");
        }
        MessageError::Publish(_) => {
            tracing::error!(topic = %topic, error = %error, "Failed to publish translation");
        }
        _ => {
            tracing::warn!(topic = %topic, error = %error, "Dropping message");
        }
    }
}
