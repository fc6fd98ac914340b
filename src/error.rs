// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the bridge.
//!
//! Errors fall into two groups:
//!
//! - [`ConfigError`] is raised while loading configuration and the mapping
//!   table. It is fatal: a bridge without a valid mapping table has nothing
//!   to translate.
//! - [`MessageError`] (and the [`FrameError`] it wraps) describes why a single
//!   inbound message could not be translated. These are logged and the
//!   message is dropped; the service keeps running.

use std::path::PathBuf;

use thiserror::Error;

/// The main error type for this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or mapping table could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A device frame could not be encoded or decoded.
    #[error("frame error: {0}")]
    Frame(#[from] FrameError),

    /// A single message could not be translated.
    #[error("message error: {0}")]
    Message(#[from] MessageError),

    /// Communication with the message bus failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Errors raised while loading configuration. Always fatal.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A configuration file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that could not be read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML configuration file is invalid.
    #[error("invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// A mapping table line does not hold exactly two topic identifiers.
    #[error("badly formed mapping on line {line}: {content:?}")]
    MalformedLine {
        /// One-based line number.
        line: usize,
        /// The offending line.
        content: String,
    },

    /// A topic identifier is already used by another mapping.
    #[error("topic identifier {topic:?} on line {line} is already mapped")]
    DuplicateTopic {
        /// The colliding identifier.
        topic: String,
        /// One-based line number of the second occurrence.
        line: usize,
    },

    /// The mapping table holds no mappings.
    #[error("mapping table contains no device mappings")]
    Empty,

    /// A configuration value is out of its allowed domain.
    #[error("invalid value for {key}: {message}")]
    InvalidValue {
        /// The configuration key.
        key: String,
        /// Why the value was rejected.
        message: String,
    },
}

/// Errors produced by the frame codec.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FrameError {
    /// The payload does not match the expected fixed-width frame pattern.
    #[error("malformed frame: {0}")]
    Malformed(String),

    /// The received checksum does not match the recomputed one.
    #[error("checksum mismatch: expected {expected:02X}, received {received:02X}")]
    Checksum {
        /// Checksum computed over the received payload bytes.
        expected: u8,
        /// Checksum carried by the frame.
        received: u8,
    },
}

/// Why a single inbound message was dropped.
#[derive(Debug, Error)]
pub enum MessageError {
    /// No mapping has this device-side identifier.
    #[error("no mapping for input topic {0:?}")]
    UnknownInputTopic(String),

    /// No mapping has this normalized identifier.
    #[error("no mapping for output topic {0:?}")]
    UnknownOutputTopic(String),

    /// The topic matches neither the status nor the command shape.
    #[error("unrecognized topic {0:?}")]
    UnrecognizedTopic(String),

    /// The command name is not one the device accepts.
    #[error("unsupported command {0:?}")]
    UnsupportedCommand(String),

    /// The command message carried no payload.
    #[error("empty payload")]
    EmptyPayload,

    /// A non-power command arrived while the device is not reported on.
    #[error("cannot set {command} while device power is not on")]
    PowerGated {
        /// The rejected command.
        command: String,
    },

    /// The command payload could not be parsed for its command.
    #[error("invalid payload {payload:?} for {command}")]
    InvalidPayload {
        /// The command being set.
        command: String,
        /// The raw payload.
        payload: String,
    },

    /// The status frame could not be decoded.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// The translated message could not be published.
    #[error("publish failed: {0}")]
    Publish(#[from] ProtocolError),
}

/// Errors related to message bus communication.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_line_display() {
        let err = ConfigError::MalformedLine {
            line: 3,
            content: "devola1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "badly formed mapping on line 3: \"devola1\""
        );
    }

    #[test]
    fn checksum_display_is_uppercase_hex() {
        let err = FrameError::Checksum {
            expected: 0x4a,
            received: 0x0b,
        };
        assert_eq!(err.to_string(), "checksum mismatch: expected 4A, received 0B");
    }

    #[test]
    fn frame_error_converts_into_message_error() {
        let err: MessageError = FrameError::Malformed("short".to_string()).into();
        assert!(matches!(err, MessageError::Frame(FrameError::Malformed(_))));
        assert_eq!(err.to_string(), "malformed frame: short");
    }

    #[test]
    fn error_from_config_error() {
        let err: Error = ConfigError::Empty.into();
        assert!(matches!(err, Error::Config(ConfigError::Empty)));
    }

    #[test]
    fn power_gated_display() {
        let err = MessageError::PowerGated {
            command: "SETPOINT".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "cannot set SETPOINT while device power is not on"
        );
    }
}
