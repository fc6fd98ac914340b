// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Byte layout of the frame payload.
//!
//! ```text
//! offset  0  1  2   3   4  5  6  7  8    9    10-11  12   13 14 15 16
//!        02 10 PW  CL  02 00 19 00 MODE SETP TIMER  TEMP 01 00 00 01
//! ```
//!
//! `TIMER` is two bytes, most significant first. Every other slot is one byte.

use crate::error::FrameError;

/// Number of payload bytes between header and checksum.
pub const PAYLOAD_LEN: usize = 17;

/// What a payload segment carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// A constant byte the device expects verbatim.
    Fixed(u8),
    /// Power switch byte.
    Power,
    /// Child lock switch byte.
    ChildLock,
    /// Operating mode.
    Mode,
    /// Target temperature.
    Setpoint,
    /// Timer, stored on the wire as value plus one.
    Timer,
    /// Measured temperature.
    Temp,
}

/// A contiguous run of payload bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    /// Byte offset within the payload.
    pub offset: usize,
    /// Width in bytes.
    pub width: usize,
    /// The value carried.
    pub slot: Slot,
}

const fn seg(offset: usize, width: usize, slot: Slot) -> Segment {
    Segment {
        offset,
        width,
        slot,
    }
}

/// The payload layout, ordered by offset.
pub const LAYOUT: [Segment; 16] = [
    seg(0, 1, Slot::Fixed(0x02)),
    seg(1, 1, Slot::Fixed(0x10)),
    seg(2, 1, Slot::Power),
    seg(3, 1, Slot::ChildLock),
    seg(4, 1, Slot::Fixed(0x02)),
    seg(5, 1, Slot::Fixed(0x00)),
    seg(6, 1, Slot::Fixed(0x19)),
    seg(7, 1, Slot::Fixed(0x00)),
    seg(8, 1, Slot::Mode),
    seg(9, 1, Slot::Setpoint),
    seg(10, 2, Slot::Timer),
    seg(12, 1, Slot::Temp),
    seg(13, 1, Slot::Fixed(0x01)),
    seg(14, 1, Slot::Fixed(0x00)),
    seg(15, 1, Slot::Fixed(0x00)),
    seg(16, 1, Slot::Fixed(0x01)),
];

/// Raw wire values of every variable slot.
///
/// Values are exactly what travels in the frame: switches use `1`/`2`,
/// the timer carries the `+1` offset. A zeroed value leaves the slot unset,
/// which is how command frames address a single field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameFields {
    /// Power byte.
    pub power: u8,
    /// Child lock byte.
    pub childlock: u8,
    /// Mode byte.
    pub mode: u8,
    /// Setpoint byte.
    pub setpoint: u8,
    /// Timer word.
    pub timer: u16,
    /// Temperature byte.
    pub temp: u8,
}

impl FrameFields {
    /// Lays the fields out into payload bytes.
    #[must_use]
    pub fn to_payload(&self) -> [u8; PAYLOAD_LEN] {
        let mut payload = [0u8; PAYLOAD_LEN];
        for segment in &LAYOUT {
            let dst = &mut payload[segment.offset..segment.offset + segment.width];
            match segment.slot {
                Slot::Fixed(byte) => dst[0] = byte,
                Slot::Power => dst[0] = self.power,
                Slot::ChildLock => dst[0] = self.childlock,
                Slot::Mode => dst[0] = self.mode,
                Slot::Setpoint => dst[0] = self.setpoint,
                Slot::Timer => dst.copy_from_slice(&self.timer.to_be_bytes()),
                Slot::Temp => dst[0] = self.temp,
            }
        }
        payload
    }

    /// Reads the fields back out of payload bytes.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` if a fixed byte differs from the layout.
    pub fn from_payload(payload: &[u8; PAYLOAD_LEN]) -> Result<Self, FrameError> {
        let mut fields = Self::default();
        for segment in &LAYOUT {
            let src = &payload[segment.offset..segment.offset + segment.width];
            match segment.slot {
                Slot::Fixed(expected) => {
                    if src[0] != expected {
                        return Err(FrameError::Malformed(format!(
                            "byte {} is {:02x}, expected {expected:02x}",
                            segment.offset, src[0]
                        )));
                    }
                }
                Slot::Power => fields.power = src[0],
                Slot::ChildLock => fields.childlock = src[0],
                Slot::Mode => fields.mode = src[0],
                Slot::Setpoint => fields.setpoint = src[0],
                Slot::Timer => fields.timer = u16::from_be_bytes([src[0], src[1]]),
                Slot::Temp => fields.temp = src[0],
            }
        }
        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_contiguous_and_covers_payload() {
        let mut next = 0;
        for segment in &LAYOUT {
            assert_eq!(segment.offset, next, "gap or overlap at {segment:?}");
            assert!(segment.width == 1 || segment.slot == Slot::Timer);
            next += segment.width;
        }
        assert_eq!(next, PAYLOAD_LEN);
    }

    #[test]
    fn zeroed_fields_keep_fixed_bytes() {
        let payload = FrameFields::default().to_payload();
        assert_eq!(
            payload,
            [
                0x02, 0x10, 0, 0, 0x02, 0x00, 0x19, 0x00, 0, 0, 0, 0, 0, 0x01, 0x00, 0x00, 0x01
            ]
        );
    }

    #[test]
    fn timer_is_big_endian() {
        let fields = FrameFields {
            timer: 0x0305,
            ..FrameFields::default()
        };
        let payload = fields.to_payload();
        assert_eq!(&payload[10..12], &[0x03, 0x05]);
    }

    #[test]
    fn from_payload_reads_every_slot() {
        let fields = FrameFields {
            power: 1,
            childlock: 2,
            mode: 3,
            setpoint: 21,
            timer: 9,
            temp: 19,
        };
        assert_eq!(FrameFields::from_payload(&fields.to_payload()).unwrap(), fields);
    }

    #[test]
    fn from_payload_rejects_wrong_fixed_byte() {
        let mut payload = FrameFields::default().to_payload();
        payload[6] = 0x18;
        let err = FrameFields::from_payload(&payload).unwrap_err();
        assert_eq!(
            err,
            FrameError::Malformed("byte 6 is 18, expected 19".to_string())
        );
    }
}
