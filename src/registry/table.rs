// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Mapping table parsing.
//!
//! The table is line oriented:
//!
//! ```text
//! # input    output
//! devola1    heater1
//! devola2    heater2
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Every other line must
//! hold exactly two whitespace-separated identifiers.

use std::path::Path;

use crate::error::ConfigError;

/// One parsed mapping line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingLine {
    /// One-based line number in the source text.
    pub line: usize,
    /// Device-side topic identifier.
    pub input: String,
    /// Normalized topic identifier.
    pub output: String,
}

/// Parses mapping table text.
///
/// Duplicate detection is left to [`TopicRegistry`](super::TopicRegistry).
///
/// # Errors
///
/// Returns `ConfigError::MalformedLine` for a line without exactly two
/// identifiers. An identifier containing a topic separator or wildcard is
/// also malformed.
pub fn parse_mapping_table(text: &str) -> Result<Vec<MappingLine>, ConfigError> {
    let mut lines = Vec::new();
    for (index, raw) in text.lines().enumerate() {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let malformed = || ConfigError::MalformedLine {
            line: index + 1,
            content: raw.to_string(),
        };

        let mut tokens = trimmed.split_whitespace();
        let (Some(input), Some(output), None) = (tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(malformed());
        };
        if !is_topic_level(input) || !is_topic_level(output) {
            return Err(malformed());
        }

        lines.push(MappingLine {
            line: index + 1,
            input: input.to_string(),
            output: output.to_string(),
        });
    }
    Ok(lines)
}

/// Reads and parses a mapping table file.
///
/// # Errors
///
/// Returns `ConfigError::Io` if the file cannot be read, or the errors of
/// [`parse_mapping_table`].
pub fn read_mapping_table(path: impl AsRef<Path>) -> Result<Vec<MappingLine>, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_mapping_table(&text)
}

/// Returns `true` if `id` can stand as one MQTT topic level.
pub(crate) fn is_topic_level(id: &str) -> bool {
    !id.is_empty() && !id.contains(['/', '+', '#']) && !id.contains(char::is_whitespace)
}
