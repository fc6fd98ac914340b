// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Codec for the heater's hex serial frames.
//!
//! The heater talks through a Tasmota serial bridge. Frames are hex text:
//!
//! ```text
//! command: F1F1 <payload: 17 bytes> <checksum> 7E   sent via cmnd/<id>/SSERIALSEND5
//! status:  F2F2 <payload: 17 bytes> <checksum> 7E   received in {"SSerialReceived":"..."}
//! ```
//!
//! The checksum is the sum of the payload bytes modulo 256. The payload
//! layout is described by [`LAYOUT`].
//!
//! # Examples
//!
//! ```
//! use devola_bridge::codec::{FieldCommand, FrameCodec};
//!
//! let codec = FrameCodec::default();
//! let frame = codec.encode(&FieldCommand::Setpoint(22).to_fields());
//! assert_eq!(frame, "F1F10210000002001900001600000001000001457E");
//! ```

mod frame;
mod layout;
mod report;

pub use frame::{FRAME_LEN, Header, RawFrame, TRAILER, checksum};
pub use layout::{FrameFields, LAYOUT, PAYLOAD_LEN, Segment, Slot};
pub use report::{FieldCommand, StatusReport, TIMER_MAX};

use serde::Deserialize;

use crate::error::FrameError;

/// How received status checksums are treated.
///
/// The device is not known to send bad checksums, and the bridge has always
/// accepted frames without checking. `Ignore` keeps that behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumPolicy {
    /// Do not verify.
    #[default]
    Ignore,
    /// Verify and log mismatches, but accept the frame.
    Warn,
    /// Reject frames with a mismatching checksum.
    Strict,
}

/// Envelope Tasmota publishes on `tele/<id>/RESULT` for received serial data.
#[derive(Debug, Deserialize)]
struct SerialReceived {
    #[serde(rename = "SSerialReceived")]
    frame: String,
}

/// Encodes command frames and decodes status frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameCodec {
    checksum_policy: ChecksumPolicy,
}

impl FrameCodec {
    /// Creates a codec with the given checksum policy.
    #[must_use]
    pub const fn new(checksum_policy: ChecksumPolicy) -> Self {
        Self { checksum_policy }
    }

    /// Returns the checksum policy.
    #[must_use]
    pub const fn checksum_policy(&self) -> ChecksumPolicy {
        self.checksum_policy
    }

    /// Encodes wire fields into a command frame.
    ///
    /// Never fails; the caller is responsible for value ranges.
    #[must_use]
    pub fn encode(&self, fields: &FrameFields) -> String {
        RawFrame::new(Header::Command, fields).render()
    }

    /// Decodes frame text with the given header into raw wire fields,
    /// applying the checksum policy.
    ///
    /// # Errors
    ///
    /// - `FrameError::Malformed` if the text does not match the frame pattern
    /// - `FrameError::Checksum` on mismatch under [`ChecksumPolicy::Strict`]
    pub fn decode(&self, text: &str, header: Header) -> Result<FrameFields, FrameError> {
        let frame = RawFrame::parse(text, header)?;
        match self.checksum_policy {
            ChecksumPolicy::Ignore => {}
            ChecksumPolicy::Warn => {
                if let Err(e) = frame.verify_checksum() {
                    tracing::warn!(frame = %text, error = %e, "Accepting frame with bad checksum");
                }
            }
            ChecksumPolicy::Strict => frame.verify_checksum()?,
        }
        frame.fields()
    }

    /// Decodes a `tele/<id>/RESULT` payload into a status report.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` if the payload is not a serial receive
    /// envelope holding a valid status frame, and `FrameError::Checksum` as
    /// described for [`FrameCodec::decode`].
    pub fn decode_status(&self, payload: &str) -> Result<StatusReport, FrameError> {
        let envelope: SerialReceived = serde_json::from_str(payload)
            .map_err(|e| FrameError::Malformed(format!("not a serial receive envelope: {e}")))?;
        let fields = self.decode(&envelope.frame, Header::Status)?;
        StatusReport::from_fields(&fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Switch;

    // power=ON childlock=OFF mode=1 setpoint=20 timer(wire)=5 temp=21
    const STATUS: &str = r#"{"SSerialReceived":"F2F20210010202001900011400051501000001617E"}"#;

    fn expected_status() -> StatusReport {
        StatusReport {
            power: Switch::On,
            childlock: Switch::Off,
            mode: 1,
            setpoint: 20,
            timer: 4,
            temp: 21,
        }
    }

    #[test]
    fn decode_status_envelope() {
        let codec = FrameCodec::default();
        assert_eq!(codec.decode_status(STATUS).unwrap(), expected_status());
    }

    #[test]
    fn decode_status_lowercase() {
        let codec = FrameCodec::default();
        let payload = STATUS.replace("F2F2", "f2f2").replace("617E", "617e");
        assert_eq!(codec.decode_status(&payload).unwrap(), expected_status());
    }

    #[test]
    fn decode_status_rejects_other_json() {
        let codec = FrameCodec::default();
        let err = codec.decode_status(r#"{"POWER":"ON"}"#).unwrap_err();
        assert!(matches!(err, FrameError::Malformed(msg) if msg.starts_with("not a serial")));
        assert!(codec.decode_status("F2F2").is_err());
    }

    #[test]
    fn decode_status_rejects_command_header() {
        let codec = FrameCodec::default();
        let payload = STATUS.replace("F2F2", "F1F1");
        assert!(codec.decode_status(&payload).is_err());
    }

    #[test]
    fn ignore_policy_accepts_bad_checksum() {
        let payload = STATUS.replace("617E", "007E");
        let codec = FrameCodec::new(ChecksumPolicy::Ignore);
        assert_eq!(codec.decode_status(&payload).unwrap(), expected_status());
        let codec = FrameCodec::new(ChecksumPolicy::Warn);
        assert_eq!(codec.decode_status(&payload).unwrap(), expected_status());
    }

    #[test]
    fn strict_policy_rejects_bad_checksum() {
        let payload = STATUS.replace("617E", "007E");
        let codec = FrameCodec::new(ChecksumPolicy::Strict);
        assert_eq!(
            codec.decode_status(&payload).unwrap_err(),
            FrameError::Checksum {
                expected: 0x61,
                received: 0x00
            }
        );
        assert!(codec.decode_status(STATUS).is_ok());
    }

    #[test]
    fn round_trip_recovers_status() {
        let codec = FrameCodec::new(ChecksumPolicy::Strict);
        let samples = [
            expected_status(),
            StatusReport {
                power: Switch::Off,
                childlock: Switch::On,
                mode: 0,
                setpoint: 0,
                timer: 0,
                temp: 0,
            },
            StatusReport {
                power: Switch::On,
                childlock: Switch::On,
                mode: 255,
                setpoint: 255,
                timer: TIMER_MAX,
                temp: 255,
            },
        ];
        for report in samples {
            let frame = codec.encode(&report.to_fields());
            let fields = codec.decode(&frame, Header::Command).unwrap();
            assert_eq!(StatusReport::from_fields(&fields).unwrap(), report);
        }
    }

    #[test]
    fn encode_appends_payload_sum() {
        let codec = FrameCodec::default();
        let fields = FieldCommand::Mode(3).to_fields();
        let frame = codec.encode(&fields);
        let sum = checksum(&fields.to_payload());
        assert_eq!(&frame[FRAME_LEN - 4..FRAME_LEN - 2], format!("{sum:02X}"));
        assert_eq!(frame, "F1F10210000002001900030000000001000001327E");
    }

    #[test]
    fn checksum_policy_deserializes_lowercase() {
        #[derive(Deserialize)]
        struct Wrapper {
            checksum: ChecksumPolicy,
        }
        let parsed: Wrapper = toml::from_str("checksum = \"strict\"").unwrap();
        assert_eq!(parsed.checksum, ChecksumPolicy::Strict);
    }
}
