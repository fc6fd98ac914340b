// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Translation of inbound messages into outbound messages.

use std::sync::Arc;

use crate::codec::{FieldCommand, FrameCodec};
use crate::error::MessageError;
use crate::protocol::Outbound;
use crate::registry::TopicRegistry;
use crate::types::CommandKind;

use super::topic::Route;

/// Turns one inbound message into the messages to publish.
///
/// The translator holds no state of its own: device state lives in the
/// registry's mappings and is updated by the status path only.
#[derive(Debug, Clone)]
pub struct Translator {
    registry: Arc<TopicRegistry>,
    codec: FrameCodec,
}

impl Translator {
    /// Creates a translator over a loaded registry.
    #[must_use]
    pub fn new(registry: Arc<TopicRegistry>, codec: FrameCodec) -> Self {
        Self { registry, codec }
    }

    /// Returns the registry.
    #[must_use]
    pub fn registry(&self) -> &Arc<TopicRegistry> {
        &self.registry
    }

    /// Translates an inbound message.
    ///
    /// # Errors
    ///
    /// Returns a `MessageError` describing why the message is dropped. No
    /// state is changed when an error is returned.
    pub fn translate(&self, topic: &str, payload: &str) -> Result<Vec<Outbound>, MessageError> {
        match Route::classify(topic) {
            Some(Route::Status { input }) => self.status(input, payload),
            Some(Route::Command { output, command }) => self.command(output, command, payload),
            None => Err(MessageError::UnrecognizedTopic(topic.to_string())),
        }
    }

    /// Status path: decode the frame, update state, report changes.
    fn status(&self, input: &str, payload: &str) -> Result<Vec<Outbound>, MessageError> {
        let mapping = self.registry.lookup_by_input(input)?;
        let report = self.codec.decode_status(payload)?;

        let (changes, updated_at) = {
            let mut state = mapping.state();
            let changes = state.apply(&report);
            (changes, state.updated_at())
        };
        tracing::debug!(
            device = %mapping.output(),
            power = %report.power,
            changes = changes.len(),
            updated_at = ?updated_at,
            "Applied status report"
        );

        Ok(changes
            .iter()
            .map(|change| Outbound::new(mapping.stat_topic(change.kind()), change.payload()))
            .collect())
    }

    /// Command path: power passes through, other fields become frames.
    fn command(
        &self,
        output: &str,
        command: &str,
        payload: &str,
    ) -> Result<Vec<Outbound>, MessageError> {
        let mapping = self.registry.lookup_by_output(output)?;

        if payload.trim().is_empty() {
            return Err(MessageError::EmptyPayload);
        }

        let kind: CommandKind = command.parse()?;
        if kind == CommandKind::Power {
            return Ok(vec![Outbound::new(mapping.power_topic(), payload)]);
        }

        if !mapping.state().power().is_on() {
            return Err(MessageError::PowerGated {
                command: kind.to_string(),
            });
        }

        let field = FieldCommand::parse(kind, payload)?;
        let frame = self.codec.encode(&field.to_fields());
        tracing::debug!(device = %mapping.input(), command = %kind, frame = %frame, "Encoded command frame");

        Ok(vec![Outbound::new(mapping.serial_send_topic(), frame)])
    }
}
