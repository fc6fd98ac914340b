// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! On/off types for heater power and child lock.
//!
//! The heater encodes both switches as a single byte: `1` for on and `2` for
//! off. `0` is never sent by the device and is treated as malformed.

use std::fmt;
use std::str::FromStr;

/// An on/off switch as carried in device frames.
///
/// # Examples
///
/// ```
/// use devola_bridge::types::Switch;
///
/// assert_eq!(Switch::On.wire(), 1);
/// assert_eq!(Switch::from_wire(2), Some(Switch::Off));
/// assert_eq!("on".parse::<Switch>().unwrap(), Switch::On);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Switch {
    /// Switched on.
    On,
    /// Switched off.
    Off,
}

impl Switch {
    /// Wire value for [`Switch::On`].
    pub const WIRE_ON: u8 = 1;
    /// Wire value for [`Switch::Off`].
    pub const WIRE_OFF: u8 = 2;

    /// Returns the string published on status topics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }

    /// Returns the byte used in device frames.
    #[must_use]
    pub const fn wire(&self) -> u8 {
        match self {
            Self::On => Self::WIRE_ON,
            Self::Off => Self::WIRE_OFF,
        }
    }

    /// Decodes a frame byte. Returns `None` for bytes other than 1 or 2.
    #[must_use]
    pub const fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            Self::WIRE_ON => Some(Self::On),
            Self::WIRE_OFF => Some(Self::Off),
            _ => None,
        }
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not a recognised on/off value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid switch value: {0:?}")]
pub struct ParseSwitchError(pub String);

impl FromStr for Switch {
    type Err = ParseSwitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ON" | "1" | "TRUE" => Ok(Self::On),
            "OFF" | "0" | "FALSE" => Ok(Self::Off),
            _ => Err(ParseSwitchError(s.to_string())),
        }
    }
}

/// Last known power state of a heater.
///
/// Starts as [`PowerState::Unknown`] until the first status frame arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PowerState {
    /// No status frame has been decoded yet.
    #[default]
    Unknown,
    /// The heater reported power on.
    On,
    /// The heater reported power off.
    Off,
}

impl PowerState {
    /// Returns `true` only for a reported [`PowerState::On`].
    #[must_use]
    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }

    /// Returns the string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::On => "ON",
            Self::Off => "OFF",
        }
    }
}

impl From<Switch> for PowerState {
    fn from(value: Switch) -> Self {
        match value {
            Switch::On => Self::On,
            Switch::Off => Self::Off,
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switch_wire_values() {
        assert_eq!(Switch::On.wire(), 1);
        assert_eq!(Switch::Off.wire(), 2);
        assert_eq!(Switch::from_wire(1), Some(Switch::On));
        assert_eq!(Switch::from_wire(2), Some(Switch::Off));
        assert_eq!(Switch::from_wire(0), None);
        assert_eq!(Switch::from_wire(3), None);
    }

    #[test]
    fn switch_from_str() {
        assert_eq!("ON".parse::<Switch>().unwrap(), Switch::On);
        assert_eq!("off".parse::<Switch>().unwrap(), Switch::Off);
        assert_eq!("1".parse::<Switch>().unwrap(), Switch::On);
        assert_eq!("0".parse::<Switch>().unwrap(), Switch::Off);
        assert_eq!(" true\n".parse::<Switch>().unwrap(), Switch::On);
        assert_eq!("false".parse::<Switch>().unwrap(), Switch::Off);
    }

    #[test]
    fn switch_from_str_invalid() {
        let err = "TOGGLE".parse::<Switch>().unwrap_err();
        assert_eq!(err, ParseSwitchError("TOGGLE".to_string()));
    }

    #[test]
    fn power_state_default_is_unknown() {
        assert_eq!(PowerState::default(), PowerState::Unknown);
        assert!(!PowerState::Unknown.is_on());
        assert!(!PowerState::Off.is_on());
        assert!(PowerState::On.is_on());
    }

    #[test]
    fn power_state_from_switch() {
        assert_eq!(PowerState::from(Switch::On), PowerState::On);
        assert_eq!(PowerState::from(Switch::Off), PowerState::Off);
    }

    #[test]
    fn display() {
        assert_eq!(Switch::Off.to_string(), "OFF");
        assert_eq!(PowerState::Unknown.to_string(), "UNKNOWN");
    }
}
