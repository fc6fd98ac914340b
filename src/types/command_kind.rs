// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Heater fields addressed by command and status topics.

use std::fmt;
use std::str::FromStr;

/// A heater field, named as it appears in the last topic level.
///
/// The same names are used for inbound commands (`cmnd/<output>/<NAME>`)
/// and outbound status reports (`stat/<output>/<NAME>`).
///
/// # Examples
///
/// ```
/// use devola_bridge::types::CommandKind;
///
/// let kind: CommandKind = "SETPOINT".parse().unwrap();
/// assert_eq!(kind, CommandKind::Setpoint);
/// assert!(CommandKind::Setpoint.is_settable());
/// assert!(!CommandKind::Temp.is_settable());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    /// Heater power.
    Power,
    /// Child lock.
    ChildLock,
    /// Operating mode.
    Mode,
    /// Target temperature.
    Setpoint,
    /// Measured temperature. Reported only.
    Temp,
    /// Timer.
    Timer,
}

impl CommandKind {
    /// Every kind, in topic subscription order.
    pub const ALL: [Self; 6] = [
        Self::Power,
        Self::ChildLock,
        Self::Mode,
        Self::Setpoint,
        Self::Temp,
        Self::Timer,
    ];

    /// Returns the topic level name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Power => "POWER",
            Self::ChildLock => "CHILDLOCK",
            Self::Mode => "MODE",
            Self::Setpoint => "SETPOINT",
            Self::Temp => "TEMP",
            Self::Timer => "TIMER",
        }
    }

    /// Returns `false` for read-only fields.
    #[must_use]
    pub const fn is_settable(&self) -> bool {
        !matches!(self, Self::Temp)
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CommandKind {
    type Err = crate::error::MessageError;

    /// Parses a topic level. Matching is exact, as topics are case-sensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| crate::error::MessageError::UnsupportedCommand(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MessageError;

    #[test]
    fn parse_all_names() {
        for kind in CommandKind::ALL {
            assert_eq!(kind.as_str().parse::<CommandKind>().unwrap(), kind);
        }
    }

    #[test]
    fn parse_is_case_sensitive() {
        let err = "setpoint".parse::<CommandKind>().unwrap_err();
        assert!(matches!(err, MessageError::UnsupportedCommand(name) if name == "setpoint"));
    }

    #[test]
    fn parse_unknown() {
        assert!("SSERIALSEND5".parse::<CommandKind>().is_err());
    }

    #[test]
    fn only_temp_is_read_only() {
        let read_only: Vec<_> = CommandKind::ALL
            .into_iter()
            .filter(|kind| !kind.is_settable())
            .collect();
        assert_eq!(read_only, vec![CommandKind::Temp]);
    }
}
