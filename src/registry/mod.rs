// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Registry of heater topic mappings.
//!
//! The [`TopicRegistry`] is built once at startup and never changes. It keeps
//! mappings in load order and indexes them by both identifiers.
//!
//! # Examples
//!
//! ```
//! use devola_bridge::registry::TopicRegistry;
//!
//! let registry = TopicRegistry::from_table("devola1 heater1\n").unwrap();
//! let by_input = registry.lookup_by_input("devola1").unwrap();
//! let by_output = registry.lookup_by_output("heater1").unwrap();
//! assert!(std::ptr::eq(by_input, by_output));
//! ```

mod mapping;
mod table;

pub use mapping::DeviceMapping;
pub use table::{MappingLine, parse_mapping_table, read_mapping_table};

use std::collections::HashMap;
use std::path::Path;

use crate::error::{ConfigError, MessageError};

/// Resolves heaters by device-side or normalized topic identifier.
#[derive(Debug)]
pub struct TopicRegistry {
    /// Mappings in load order.
    mappings: Vec<DeviceMapping>,
    /// Index into `mappings` by input identifier.
    by_input: HashMap<String, usize>,
    /// Index into `mappings` by output identifier.
    by_output: HashMap<String, usize>,
}

impl TopicRegistry {
    /// Builds a registry from `(input, output)` identifier pairs.
    ///
    /// # Errors
    ///
    /// - `ConfigError::MalformedLine` if an identifier is empty, contains
    ///   whitespace, a topic separator or a wildcard
    /// - `ConfigError::DuplicateTopic` if an identifier repeats, either
    ///   among inputs, among outputs, or as an input of one mapping and the
    ///   output of another
    /// - `ConfigError::Empty` if no pairs are given
    pub fn from_pairs<I, S, T>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let lines = pairs
            .into_iter()
            .enumerate()
            .map(|(index, (input, output))| MappingLine {
                line: index + 1,
                input: input.into(),
                output: output.into(),
            })
            .collect();
        Self::from_lines(lines)
    }

    /// Builds a registry from parsed mapping table lines.
    ///
    /// # Errors
    ///
    /// Same as [`TopicRegistry::from_pairs`].
    pub fn from_lines(lines: Vec<MappingLine>) -> Result<Self, ConfigError> {
        if lines.is_empty() {
            return Err(ConfigError::Empty);
        }

        let mut registry = Self {
            mappings: Vec::with_capacity(lines.len()),
            by_input: HashMap::with_capacity(lines.len()),
            by_output: HashMap::with_capacity(lines.len()),
        };

        for MappingLine {
            line,
            input,
            output,
        } in lines
        {
            if !table::is_topic_level(&input) || !table::is_topic_level(&output) {
                return Err(ConfigError::MalformedLine {
                    line,
                    content: format!("{input} {output}"),
                });
            }
            for id in [&input, &output] {
                if registry.by_input.contains_key(id) || registry.by_output.contains_key(id) {
                    return Err(ConfigError::DuplicateTopic {
                        topic: id.clone(),
                        line,
                    });
                }
            }
            if input == output {
                return Err(ConfigError::DuplicateTopic {
                    topic: output,
                    line,
                });
            }

            let index = registry.mappings.len();
            registry.by_input.insert(input.clone(), index);
            registry.by_output.insert(output.clone(), index);
            registry.mappings.push(DeviceMapping::new(input, output));
        }

        tracing::debug!(mappings = registry.len(), "Loaded topic registry");
        Ok(registry)
    }

    /// Builds a registry from mapping table text.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if a line is malformed, an identifier repeats
    /// or the table is empty.
    pub fn from_table(text: &str) -> Result<Self, ConfigError> {
        Self::from_lines(parse_mapping_table(text)?)
    }

    /// Loads a registry from a mapping table file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or its content is
    /// invalid.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let registry = Self::from_lines(read_mapping_table(path)?)?;
        tracing::info!(
            path = %path.display(),
            mappings = registry.len(),
            "Loaded mapping table"
        );
        Ok(registry)
    }

    /// Finds the mapping with the given device-side identifier.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::UnknownInputTopic` if none matches.
    pub fn lookup_by_input(&self, id: &str) -> Result<&DeviceMapping, MessageError> {
        self.by_input
            .get(id)
            .map(|&index| &self.mappings[index])
            .ok_or_else(|| MessageError::UnknownInputTopic(id.to_string()))
    }

    /// Finds the mapping with the given normalized identifier.
    ///
    /// # Errors
    ///
    /// Returns `MessageError::UnknownOutputTopic` if none matches.
    pub fn lookup_by_output(&self, id: &str) -> Result<&DeviceMapping, MessageError> {
        self.by_output
            .get(id)
            .map(|&index| &self.mappings[index])
            .ok_or_else(|| MessageError::UnknownOutputTopic(id.to_string()))
    }

    /// Iterates over mappings in load order.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceMapping> {
        self.mappings.iter()
    }

    /// Returns the number of mappings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    /// Returns `true` if the registry holds no mappings. Never true for a
    /// successfully loaded registry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Every topic filter the bridge subscribes to, in load order.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<String> {
        self.mappings
            .iter()
            .flat_map(DeviceMapping::subscriptions)
            .collect()
    }
}
