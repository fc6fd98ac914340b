// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! A single heater's topic pair and its state.

use parking_lot::{Mutex, MutexGuard};

use crate::state::DeviceState;
use crate::types::CommandKind;

/// Associates a heater's device-side topic with its normalized topic.
///
/// The pair is fixed once loaded. The mapping owns the heater's
/// [`DeviceState`] behind its own lock, so each device is updated
/// independently of the others.
#[derive(Debug)]
pub struct DeviceMapping {
    input: String,
    output: String,
    state: Mutex<DeviceState>,
}

impl DeviceMapping {
    /// Creates a mapping with an unreported state.
    #[must_use]
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            state: Mutex::new(DeviceState::new()),
        }
    }

    /// Returns the device-side topic identifier (e.g. `devola1`).
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Returns the normalized topic identifier (e.g. `heater1`).
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Locks and returns the device state.
    ///
    /// The guard must not be held across an `.await`.
    pub fn state(&self) -> MutexGuard<'_, DeviceState> {
        self.state.lock()
    }

    /// Returns a copy of the current device state.
    #[must_use]
    pub fn snapshot(&self) -> DeviceState {
        self.state.lock().clone()
    }

    /// Topic the device reports status frames on.
    #[must_use]
    pub fn status_topic(&self) -> String {
        format!("tele/{}/RESULT", self.input)
    }

    /// Topic that sends a frame through the device's serial bridge.
    #[must_use]
    pub fn serial_send_topic(&self) -> String {
        format!("cmnd/{}/SSERIALSEND5", self.input)
    }

    /// Topic that switches the device's power directly.
    #[must_use]
    pub fn power_topic(&self) -> String {
        format!("cmnd/{}/POWER", self.input)
    }

    /// Normalized command topic for a field.
    #[must_use]
    pub fn command_topic(&self, kind: CommandKind) -> String {
        format!("cmnd/{}/{kind}", self.output)
    }

    /// Normalized status topic for a field.
    #[must_use]
    pub fn stat_topic(&self, kind: CommandKind) -> String {
        format!("stat/{}/{kind}", self.output)
    }

    /// Every topic the bridge subscribes to for this device.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        std::iter::once(self.status_topic())
            .chain(CommandKind::ALL.into_iter().map(|kind| self.command_topic(kind)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PowerState;

    #[test]
    fn topics() {
        let mapping = DeviceMapping::new("devola1", "heater1");
        assert_eq!(mapping.status_topic(), "tele/devola1/RESULT");
        assert_eq!(mapping.serial_send_topic(), "cmnd/devola1/SSERIALSEND5");
        assert_eq!(mapping.power_topic(), "cmnd/devola1/POWER");
        assert_eq!(
            mapping.command_topic(CommandKind::Setpoint),
            "cmnd/heater1/SETPOINT"
        );
        assert_eq!(mapping.stat_topic(CommandKind::Temp), "stat/heater1/TEMP");
    }

    #[test]
    fn subscriptions_cover_status_and_every_command() {
        let mapping = DeviceMapping::new("devola1", "heater1");
        assert_eq!(
            mapping.subscriptions(),
            vec![
                "tele/devola1/RESULT",
                "cmnd/heater1/POWER",
                "cmnd/heater1/CHILDLOCK",
                "cmnd/heater1/MODE",
                "cmnd/heater1/SETPOINT",
                "cmnd/heater1/TEMP",
                "cmnd/heater1/TIMER",
            ]
        );
    }

    #[test]
    fn starts_unreported() {
        let mapping = DeviceMapping::new("a", "b");
        assert_eq!(mapping.snapshot().power(), PowerState::Unknown);
        assert!(!mapping.state().is_reported());
    }
}
