// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device state tracking.

use chrono::{DateTime, Utc};

use crate::codec::StatusReport;
use crate::types::{PowerState, Switch};

use super::StateChange;

/// Last known state of a heater.
///
/// Every field except power is `None` until a status frame reports the
/// heater on, because the device only reports meaningful values while on.
///
/// # Examples
///
/// ```
/// use devola_bridge::codec::StatusReport;
/// use devola_bridge::state::{DeviceState, StateChange};
/// use devola_bridge::types::{PowerState, Switch};
///
/// let mut state = DeviceState::new();
/// assert_eq!(state.power(), PowerState::Unknown);
///
/// let report = StatusReport {
///     power: Switch::Off,
///     childlock: Switch::Off,
///     mode: 0,
///     setpoint: 0,
///     timer: 0,
///     temp: 0,
/// };
/// let changes = state.apply(&report);
/// assert_eq!(changes, vec![StateChange::Power(Switch::Off)]);
///
/// // Same report again: nothing to publish
/// assert!(state.apply(&report).is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceState {
    power: PowerState,
    childlock: Option<Switch>,
    mode: Option<u8>,
    setpoint: Option<u8>,
    timer: Option<u8>,
    temp: Option<u8>,
    /// When the last status frame was applied.
    updated_at: Option<DateTime<Utc>>,
}

impl DeviceState {
    /// Creates a new state with nothing reported yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last reported power state.
    #[must_use]
    pub fn power(&self) -> PowerState {
        self.power
    }

    /// Returns the last reported child lock state.
    #[must_use]
    pub fn childlock(&self) -> Option<Switch> {
        self.childlock
    }

    /// Returns the last reported mode.
    #[must_use]
    pub fn mode(&self) -> Option<u8> {
        self.mode
    }

    /// Returns the last reported setpoint.
    #[must_use]
    pub fn setpoint(&self) -> Option<u8> {
        self.setpoint
    }

    /// Returns the last reported timer.
    #[must_use]
    pub fn timer(&self) -> Option<u8> {
        self.timer
    }

    /// Returns the last reported temperature.
    #[must_use]
    pub fn temp(&self) -> Option<u8> {
        self.temp
    }

    /// Returns when the last status frame was applied.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// Returns `true` once any status frame has been applied.
    #[must_use]
    pub fn is_reported(&self) -> bool {
        self.updated_at.is_some()
    }

    /// Applies a status report and returns the changes to publish.
    ///
    /// Power is reported only when it differs from the stored state. While
    /// the heater is on, every other field is reported on each frame, changed
    /// or not, so consumers always hold a full snapshot. While off, nothing
    /// besides power is reported or stored.
    pub fn apply(&mut self, report: &StatusReport) -> Vec<StateChange> {
        self.apply_at(report, Utc::now())
    }

    /// Same as [`DeviceState::apply`] with an explicit timestamp.
    pub fn apply_at(&mut self, report: &StatusReport, now: DateTime<Utc>) -> Vec<StateChange> {
        let mut changes = Vec::new();
        let power = PowerState::from(report.power);

        if self.power != power {
            self.power = power;
            changes.push(StateChange::Power(report.power));
        }

        if power.is_on() {
            self.temp = Some(report.temp);
            self.childlock = Some(report.childlock);
            self.mode = Some(report.mode);
            self.setpoint = Some(report.setpoint);
            self.timer = Some(report.timer);
            changes.extend([
                StateChange::Temp(report.temp),
                StateChange::ChildLock(report.childlock),
                StateChange::Mode(report.mode),
                StateChange::Setpoint(report.setpoint),
                StateChange::Timer(report.timer),
            ]);
        }

        self.updated_at = Some(now);
        changes
    }
}
