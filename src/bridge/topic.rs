// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Classification of inbound topics.
//!
//! ```text
//! tele/<input>/RESULT      → Route::Status
//! cmnd/<output>/<COMMAND>  → Route::Command
//! ```

/// Which translation path an inbound topic belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route<'a> {
    /// A status report from a device (`tele/<input>/RESULT`).
    Status {
        /// Device-side identifier.
        input: &'a str,
    },
    /// A command from a controller (`cmnd/<output>/<command>`).
    Command {
        /// Normalized identifier.
        output: &'a str,
        /// Command name, not yet validated.
        command: &'a str,
    },
}

impl<'a> Route<'a> {
    /// Classifies a topic. Both shapes have exactly three non-empty levels.
    #[must_use]
    pub fn classify(topic: &'a str) -> Option<Self> {
        let mut levels = topic.split('/');
        let (Some(prefix), Some(id), Some(last), None) =
            (levels.next(), levels.next(), levels.next(), levels.next())
        else {
            return None;
        };
        if id.is_empty() || last.is_empty() {
            return None;
        }

        match (prefix, last) {
            ("tele", "RESULT") => Some(Self::Status { input: id }),
            ("cmnd", command) => Some(Self::Command { output: id, command }),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_status() {
        assert_eq!(
            Route::classify("tele/devola1/RESULT"),
            Some(Route::Status { input: "devola1" })
        );
    }

    #[test]
    fn classify_command() {
        assert_eq!(
            Route::classify("cmnd/heater1/SETPOINT"),
            Some(Route::Command {
                output: "heater1",
                command: "SETPOINT"
            })
        );
    }

    #[test]
    fn other_tele_topics_are_not_status() {
        assert_eq!(Route::classify("tele/devola1/STATE"), None);
        assert_eq!(Route::classify("tele/devola1/LWT"), None);
    }

    #[test]
    fn wrong_depth_or_empty_levels() {
        assert_eq!(Route::classify("tele/devola1"), None);
        assert_eq!(Route::classify("tele/devola1/RESULT/extra"), None);
        assert_eq!(Route::classify("tele//RESULT"), None);
        assert_eq!(Route::classify("cmnd/heater1/"), None);
        assert_eq!(Route::classify(""), None);
    }

    #[test]
    fn stat_topics_are_ignored() {
        assert_eq!(Route::classify("stat/heater1/POWER"), None);
    }
}
