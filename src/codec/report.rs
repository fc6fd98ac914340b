// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed views of frame contents: decoded status and single-field commands.

use crate::error::{FrameError, MessageError};
use crate::types::{CommandKind, Switch};

use super::layout::FrameFields;

/// Largest timer value that survives the `+1` wire offset within one byte.
pub const TIMER_MAX: u8 = u8::MAX - 1;

/// A decoded heater status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    /// Heater power.
    pub power: Switch,
    /// Child lock.
    pub childlock: Switch,
    /// Operating mode.
    pub mode: u8,
    /// Target temperature.
    pub setpoint: u8,
    /// Timer, with the wire offset removed. At most [`TIMER_MAX`]; larger
    /// values are clamped when encoded.
    pub timer: u8,
    /// Measured temperature.
    pub temp: u8,
}

impl StatusReport {
    /// Interprets raw wire fields.
    ///
    /// Only the low byte of the timer word is significant; the stored timer is
    /// that byte minus one, saturating at zero.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::Malformed` if the power or child lock byte is
    /// neither 1 nor 2.
    pub fn from_fields(fields: &FrameFields) -> Result<Self, FrameError> {
        let switch = |name: &str, byte: u8| {
            Switch::from_wire(byte)
                .ok_or_else(|| FrameError::Malformed(format!("invalid {name} byte {byte:02x}")))
        };
        let [_, timer_low] = fields.timer.to_be_bytes();
        Ok(Self {
            power: switch("power", fields.power)?,
            childlock: switch("childlock", fields.childlock)?,
            mode: fields.mode,
            setpoint: fields.setpoint,
            timer: timer_low.saturating_sub(1),
            temp: fields.temp,
        })
    }

    /// Converts back to raw wire fields, applying the timer offset.
    #[must_use]
    pub fn to_fields(&self) -> FrameFields {
        FrameFields {
            power: self.power.wire(),
            childlock: self.childlock.wire(),
            mode: self.mode,
            setpoint: self.setpoint,
            timer: timer_wire(self.timer),
            temp: self.temp,
        }
    }
}

/// A command that sets one heater field through the serial bridge.
///
/// Power is not represented: it travels over the device's own power topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldCommand {
    /// Set the child lock.
    ChildLock(Switch),
    /// Set the operating mode.
    Mode(u8),
    /// Set the target temperature.
    Setpoint(u8),
    /// Set the timer.
    Timer(u8),
}

impl FieldCommand {
    /// Parses a command payload for the given field.
    ///
    /// # Errors
    ///
    /// - `MessageError::UnsupportedCommand` for `POWER` and read-only `TEMP`
    /// - `MessageError::InvalidPayload` if the payload does not parse or is
    ///   out of range for the field
    pub fn parse(kind: CommandKind, payload: &str) -> Result<Self, MessageError> {
        let invalid = || MessageError::InvalidPayload {
            command: kind.to_string(),
            payload: payload.to_string(),
        };
        let number = || payload.trim().parse::<u8>().map_err(|_| invalid());

        match kind {
            CommandKind::ChildLock => payload
                .parse::<Switch>()
                .map(Self::ChildLock)
                .map_err(|_| invalid()),
            CommandKind::Mode => number().map(Self::Mode),
            CommandKind::Setpoint => number().map(Self::Setpoint),
            CommandKind::Timer => match number()? {
                timer if timer <= TIMER_MAX => Ok(Self::Timer(timer)),
                _ => Err(invalid()),
            },
            CommandKind::Power | CommandKind::Temp => {
                Err(MessageError::UnsupportedCommand(kind.to_string()))
            }
        }
    }

    /// Returns the field this command sets.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::ChildLock(_) => CommandKind::ChildLock,
            Self::Mode(_) => CommandKind::Mode,
            Self::Setpoint(_) => CommandKind::Setpoint,
            Self::Timer(_) => CommandKind::Timer,
        }
    }

    /// Builds wire fields with this slot set and every other slot zeroed.
    #[must_use]
    pub fn to_fields(&self) -> FrameFields {
        let mut fields = FrameFields::default();
        match *self {
            Self::ChildLock(state) => fields.childlock = state.wire(),
            Self::Mode(mode) => fields.mode = mode,
            Self::Setpoint(setpoint) => fields.setpoint = setpoint,
            Self::Timer(timer) => fields.timer = timer_wire(timer),
        }
        fields
    }
}

/// Wire value for a timer, clamped so the offset stays within the low byte.
fn timer_wire(timer: u8) -> u16 {
    u16::from(timer.min(TIMER_MAX)) + 1
}
