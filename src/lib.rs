// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Devola Bridge - translate Devola heater serial frames to plain MQTT topics.
//!
//! Devola panel heaters are driven through a Tasmota serial bridge: the
//! heater reports hex status frames on `tele/<id>/RESULT` and accepts hex
//! command frames on `cmnd/<id>/SSERIALSEND5`. This crate translates in both
//! directions so controllers only see one topic per field:
//!
//! | direction | from | to |
//! |---|---|---|
//! | status | `tele/devola1/RESULT` | `stat/heater1/{POWER,TEMP,CHILDLOCK,MODE,SETPOINT,TIMER}` |
//! | command | `cmnd/heater1/POWER` | `cmnd/devola1/POWER` |
//! | command | `cmnd/heater1/{CHILDLOCK,MODE,SETPOINT,TIMER}` | `cmnd/devola1/SSERIALSEND5` |
//!
//! Field commands are only honored while the heater reports power on.
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use devola_bridge::{FrameCodec, TopicRegistry, Translator};
//!
//! let registry = Arc::new(TopicRegistry::from_table("devola1 heater1\n")?);
//! let translator = Translator::new(registry, FrameCodec::default());
//!
//! let status = r#"{"SSerialReceived":"F2F20210010202001900011400051501000001617E"}"#;
//! let published = translator.translate("tele/devola1/RESULT", status)?;
//! assert_eq!(published[0].topic, "stat/heater1/POWER");
//! assert_eq!(published[0].payload, "ON");
//!
//! let command = translator.translate("cmnd/heater1/SETPOINT", "22")?;
//! assert_eq!(command[0].topic, "cmnd/devola1/SSERIALSEND5");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! With the `mqtt` feature (default), [`protocol::MqttTransport`] runs the
//! translation against a broker.

pub mod bridge;
pub mod codec;
pub mod config;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod state;
pub mod types;

pub use bridge::{Bridge, Route, Translator};
pub use codec::{ChecksumPolicy, FrameCodec, StatusReport};
pub use config::BridgeConfig;
pub use error::{ConfigError, Error, FrameError, MessageError, ProtocolError, Result};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttTransport, MqttTransportBuilder};
pub use protocol::{Outbound, Publisher};
pub use registry::{DeviceMapping, TopicRegistry};
pub use state::{DeviceState, StateChange};
pub use types::{CommandKind, PowerState, Switch};
