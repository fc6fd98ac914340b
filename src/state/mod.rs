// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Per-device state and the changes derived from status reports.
//!
//! [`DeviceState`] holds the last values a heater reported. Applying a
//! decoded [`StatusReport`](crate::codec::StatusReport) updates it and yields
//! the [`StateChange`]s to publish on the normalized status topics.

mod device_state;
mod state_change;

pub use device_state::DeviceState;
pub use state_change::StateChange;
