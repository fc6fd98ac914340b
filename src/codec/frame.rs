// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Hex text framing: header, payload, checksum, trailer.

use std::fmt::Write as _;

use crate::error::FrameError;

use super::layout::{FrameFields, PAYLOAD_LEN};

/// Frame trailer.
pub const TRAILER: &str = "7E";

/// Length in characters of a complete frame.
pub const FRAME_LEN: usize = 4 + PAYLOAD_LEN * 2 + 2 + TRAILER.len();

/// Frame direction, identified by its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Frames sent to the device (`F1F1`).
    Command,
    /// Frames reported by the device (`F2F2`).
    Status,
}

impl Header {
    /// Returns the header text.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Command => "F1F1",
            Self::Status => "F2F2",
        }
    }
}

/// Sums the payload bytes modulo 256.
///
/// # Examples
///
/// ```
/// use devola_bridge::codec::checksum;
///
/// assert_eq!(checksum(&[0x02, 0x10, 0xff]), 0x11);
/// ```
#[must_use]
pub fn checksum(payload: &[u8]) -> u8 {
    payload.iter().fold(0u8, |acc, byte| acc.wrapping_add(*byte))
}

/// A frame split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    /// Frame direction.
    pub header: Header,
    /// Payload bytes.
    pub payload: [u8; PAYLOAD_LEN],
    /// Checksum carried by (or computed for) the frame.
    pub checksum: u8,
}

impl RawFrame {
    /// Builds a frame from field values, computing its checksum.
    #[must_use]
    pub fn new(header: Header, fields: &FrameFields) -> Self {
        let payload = fields.to_payload();
        Self {
            header,
            checksum: checksum(&payload),
            payload,
        }
    }

    /// Renders the frame: payload in lowercase hex, checksum in uppercase.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(FRAME_LEN);
        out.push_str(self.header.as_str());
        for byte in &self.payload {
            let _ = write!(out, "{byte:02x}");
        }
        let _ = write!(out, "{:02X}", self.checksum);
        out.push_str(TRAILER);
        out
    }

    /// Parses frame text. Hex digits are accepted in either case.
    ///
    /// The carried checksum is kept as received and not verified here;
    /// see [`RawFrame::verify_checksum`].
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` when the length, header, trailer or
    /// any hex digit does not match the frame pattern.
    pub fn parse(text: &str, header: Header) -> Result<Self, FrameError> {
        let bytes = text.as_bytes();
        if bytes.len() != FRAME_LEN {
            return Err(FrameError::Malformed(format!(
                "expected {FRAME_LEN} characters, got {}",
                bytes.len()
            )));
        }

        let (head, rest) = bytes.split_at(4);
        if !head.eq_ignore_ascii_case(header.as_str().as_bytes()) {
            return Err(FrameError::Malformed(format!(
                "expected header {}",
                header.as_str()
            )));
        }

        let (body, trailer) = rest.split_at(rest.len() - TRAILER.len());
        if !trailer.eq_ignore_ascii_case(TRAILER.as_bytes()) {
            return Err(FrameError::Malformed(format!("expected trailer {TRAILER}")));
        }

        let mut payload = [0u8; PAYLOAD_LEN];
        for (i, byte) in payload.iter_mut().enumerate() {
            *byte = hex_byte(&body[i * 2..i * 2 + 2])?;
        }
        let checksum = hex_byte(&body[PAYLOAD_LEN * 2..])?;

        Ok(Self {
            header,
            payload,
            checksum,
        })
    }

    /// Compares the carried checksum with the one computed from the payload.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Checksum` on mismatch.
    pub fn verify_checksum(&self) -> Result<(), FrameError> {
        let expected = checksum(&self.payload);
        if expected == self.checksum {
            Ok(())
        } else {
            Err(FrameError::Checksum {
                expected,
                received: self.checksum,
            })
        }
    }

    /// Reads the payload slots.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` if a fixed payload byte is wrong.
    pub fn fields(&self) -> Result<FrameFields, FrameError> {
        FrameFields::from_payload(&self.payload)
    }
}

fn hex_byte(pair: &[u8]) -> Result<u8, FrameError> {
    let digit = |c: u8| {
        char::from(c)
            .to_digit(16)
            .ok_or_else(|| FrameError::Malformed(format!("invalid hex digit {:?}", char::from(c))))
    };
    let value = (digit(pair[0])? << 4) | digit(pair[1])?;
    u8::try_from(value).map_err(|_| FrameError::Malformed("hex byte out of range".to_string()))
}
