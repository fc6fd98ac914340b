// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Field-level changes produced by applying a status report.
//!
//! Each [`StateChange`] becomes one publish on `stat/<output>/<FIELD>`.
//!
//! # Examples
//!
//! ```
//! use devola_bridge::state::StateChange;
//! use devola_bridge::types::{CommandKind, Switch};
//!
//! let change = StateChange::Setpoint(20);
//! assert_eq!(change.kind(), CommandKind::Setpoint);
//! assert_eq!(change.payload(), "20");
//!
//! assert_eq!(StateChange::Power(Switch::On).payload(), "ON");
//! ```

use crate::types::{CommandKind, Switch};

/// A reported heater field value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// Power state.
    Power(Switch),
    /// Measured temperature.
    Temp(u8),
    /// Child lock state.
    ChildLock(Switch),
    /// Operating mode.
    Mode(u8),
    /// Target temperature.
    Setpoint(u8),
    /// Timer.
    Timer(u8),
}

impl StateChange {
    /// Returns the field this change reports.
    #[must_use]
    pub const fn kind(&self) -> CommandKind {
        match self {
            Self::Power(_) => CommandKind::Power,
            Self::Temp(_) => CommandKind::Temp,
            Self::ChildLock(_) => CommandKind::ChildLock,
            Self::Mode(_) => CommandKind::Mode,
            Self::Setpoint(_) => CommandKind::Setpoint,
            Self::Timer(_) => CommandKind::Timer,
        }
    }

    /// Returns the status payload: `ON`/`OFF` for switches, decimal otherwise.
    #[must_use]
    pub fn payload(&self) -> String {
        match self {
            Self::Power(state) | Self::ChildLock(state) => state.as_str().to_string(),
            Self::Temp(value) | Self::Mode(value) | Self::Setpoint(value) | Self::Timer(value) => {
                value.to_string()
            }
        }
    }
}
