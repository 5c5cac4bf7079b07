// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Static configuration of the Logstash layout: tags and custom fields.

use std::borrow::Cow;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;

/// The environment variable holding the comma-separated tag list.
pub const DEFAULT_TAGS_ENV: &str = "LOGSTASH_FORMATTER_TAGS";

/// The environment variable holding the comma-separated `key:value` custom field list.
pub const DEFAULT_FIELDS_ENV: &str = "LOGSTASH_FORMATTER_FIELDS";

/// The tag used when no tags are configured.
pub const DEFAULT_TAG: &str = "UNKNOWN";

/// A static `key: value` pair added to every encoded event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    /// The top-level key.
    pub key: String,
    /// The string value.
    pub value: String,
}

impl CustomField {
    /// Create a new custom field.
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Tags and custom fields of the Logstash layout.
///
/// The configuration is read once and is immutable afterwards; share it by cloning or by
/// sharing the layout built from it.
///
/// # Examples
///
/// ```
/// use logforth_layout_logstash::LogstashConfig;
///
/// let config = LogstashConfig::parse(Some("web,eu"), Some("app:shop,env:prod")).unwrap();
/// assert_eq!(config.tags(), ["web", "eu"]);
/// assert_eq!(config.fields().len(), 2);
///
/// assert!(LogstashConfig::parse(None, Some("foo")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogstashConfig {
    tags: Vec<String>,
    fields: Vec<CustomField>,
}

impl Default for LogstashConfig {
    fn default() -> Self {
        Self {
            tags: vec![DEFAULT_TAG.to_string()],
            fields: vec![],
        }
    }
}

impl LogstashConfig {
    /// Parses the configuration from its two string forms.
    ///
    /// `tags` is a comma-separated list; `None` means the single tag `UNKNOWN`. `fields` is a
    /// comma-separated list of `key:value` pairs; `None` or an empty string means no fields.
    ///
    /// # Errors
    ///
    /// Returns an error if a non-empty field entry has no `:`.
    pub fn parse(tags: Option<&str>, fields: Option<&str>) -> Result<Self, Error> {
        let tags = match tags {
            Some(tags) => parse_tags(tags),
            None => vec![DEFAULT_TAG.to_string()],
        };
        let fields = match fields {
            Some(fields) => parse_fields(fields)?,
            None => vec![],
        };
        Ok(Self { tags, fields })
    }

    /// Reads the configuration from the `LOGSTASH_FORMATTER_TAGS` and
    /// `LOGSTASH_FORMATTER_FIELDS` environment variables.
    ///
    /// # Examples
    ///
    /// ```
    /// use logforth_layout_logstash::LogstashConfig;
    ///
    /// let config = LogstashConfig::from_default_env();
    /// ```
    pub fn from_default_env() -> Result<Self, Error> {
        LogstashConfig::from_env(DEFAULT_TAGS_ENV, DEFAULT_FIELDS_ENV)
    }

    /// Reads the configuration from the given environment variables.
    ///
    /// Unset variables take their defaults, see [`LogstashConfig::parse`].
    pub fn from_env<'a, 'b, T, F>(tags_env: T, fields_env: F) -> Result<Self, Error>
    where
        T: Into<Cow<'a, str>>,
        F: Into<Cow<'b, str>>,
    {
        let tags = read_env(&tags_env.into())?;
        let fields = read_env(&fields_env.into())?;
        LogstashConfig::parse(tags.as_deref(), fields.as_deref())
    }

    /// Appends a tag.
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Replaces the tags.
    pub fn tags_from(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Appends a custom field.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push(CustomField::new(key, value));
        self
    }

    /// The tags, in configured order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// The custom fields, in configured order.
    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }
}

fn read_env(name: &str) -> Result<Option<String>, Error> {
    match std::env::var(name) {
        Ok(value) => Ok(Some(value)),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(err) => Err(Error::new("failed to read environment variable")
            .with_context("name", name)
            .with_source(err)),
    }
}

/// Splits a comma-separated tag list.
///
/// Tags are kept verbatim, empty ones and duplicates included, except that trailing empty tags
/// are dropped. An empty list yields one empty tag.
pub fn parse_tags(tags: &str) -> Vec<String> {
    if tags.is_empty() {
        return vec![String::new()];
    }

    let mut tags: Vec<String> = tags.split(',').map(str::to_string).collect();
    while tags.last().is_some_and(String::is_empty) {
        tags.pop();
    }
    tags
}

/// Splits a comma-separated list of `key:value` pairs.
///
/// Empty entries are skipped. Each entry is split on its first `:`.
///
/// # Errors
///
/// Returns an error if a non-empty entry has no `:`.
pub fn parse_fields(fields: &str) -> Result<Vec<CustomField>, Error> {
    fields
        .split(',')
        .filter(|field| !field.is_empty())
        .map(|field| match field.split_once(':') {
            Some((key, value)) => Ok(CustomField::new(key, value)),
            None => Err(Error::new("malformed custom field, expected `key:value`")
                .with_context("field", field)),
        })
        .collect()
}
