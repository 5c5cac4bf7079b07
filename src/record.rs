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

//! Log record and level.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use crate::format::Arg;
use crate::throwable::Throwable;

/// A log event as handed over by the surrounding logging framework.
///
/// A record is read-only to layouts. Construct one with [`Record::builder`].
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    // the observed time, in milliseconds since the Unix epoch
    millis: i64,

    level: Level,
    logger_name: String,
    thread_name: String,
    source_class_name: Option<String>,
    source_method_name: Option<String>,

    // the payload
    message: String,
    args: Vec<Arg>,

    thrown: Option<Throwable>,

    // diagnostic contexts
    ndc: Option<String>,
    mdc: BTreeMap<String, String>,
}

impl Record {
    /// The observed time, in milliseconds since the Unix epoch.
    pub fn millis(&self) -> i64 {
        self.millis
    }

    /// The level of the message.
    pub fn level(&self) -> &Level {
        &self.level
    }

    /// The name of the logger which emitted the record.
    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    /// The name of the thread which emitted the record.
    pub fn thread_name(&self) -> &str {
        &self.thread_name
    }

    /// The class (or module) the record was emitted from.
    pub fn source_class_name(&self) -> Option<&str> {
        self.source_class_name.as_deref()
    }

    /// The method (or function) the record was emitted from.
    pub fn source_method_name(&self) -> Option<&str> {
        self.source_method_name.as_deref()
    }

    /// The raw message template.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The positional arguments of the message template.
    pub fn args(&self) -> &[Arg] {
        &self.args
    }

    /// The error attached to the record.
    pub fn thrown(&self) -> Option<&Throwable> {
        self.thrown.as_ref()
    }

    /// The nested diagnostic context, flattened to one string.
    pub fn ndc(&self) -> Option<&str> {
        self.ndc.as_deref()
    }

    /// The mapped diagnostic context.
    pub fn mdc(&self) -> &BTreeMap<String, String> {
        &self.mdc
    }

    /// Create a builder initialized with the current record's values.
    pub fn to_builder(&self) -> RecordBuilder {
        RecordBuilder {
            record: self.clone(),
        }
    }

    /// Returns a new builder.
    pub fn builder() -> RecordBuilder {
        RecordBuilder::default()
    }
}

/// Builder for [`Record`].
#[derive(Debug)]
pub struct RecordBuilder {
    record: Record,
}

impl Default for RecordBuilder {
    fn default() -> Self {
        RecordBuilder {
            record: Record {
                millis: jiff::Timestamp::now().as_millisecond(),
                level: Level::INFO,
                logger_name: String::new(),
                thread_name: String::new(),
                source_class_name: None,
                source_method_name: None,
                message: String::new(),
                args: vec![],
                thrown: None,
                ndc: None,
                mdc: BTreeMap::new(),
            },
        }
    }
}

impl RecordBuilder {
    /// Set [`millis`](Record::millis).
    pub fn millis(mut self, millis: i64) -> Self {
        self.record.millis = millis;
        self
    }

    /// Set [`level`](Record::level).
    pub fn level(mut self, level: Level) -> Self {
        self.record.level = level;
        self
    }

    /// Set [`logger_name`](Record::logger_name).
    pub fn logger_name(mut self, name: impl Into<String>) -> Self {
        self.record.logger_name = name.into();
        self
    }

    /// Set [`thread_name`](Record::thread_name).
    pub fn thread_name(mut self, name: impl Into<String>) -> Self {
        self.record.thread_name = name.into();
        self
    }

    /// Set [`source_class_name`](Record::source_class_name).
    pub fn source_class_name(mut self, name: Option<&str>) -> Self {
        self.record.source_class_name = name.map(str::to_owned);
        self
    }

    /// Set [`source_method_name`](Record::source_method_name).
    pub fn source_method_name(mut self, name: Option<&str>) -> Self {
        self.record.source_method_name = name.map(str::to_owned);
        self
    }

    /// Set [`message`](Record::message).
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.record.message = message.into();
        self
    }

    /// Set [`args`](Record::args).
    pub fn args<I, A>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<Arg>,
    {
        self.record.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Set [`thrown`](Record::thrown).
    pub fn thrown(mut self, thrown: Option<Throwable>) -> Self {
        self.record.thrown = thrown;
        self
    }

    /// Set [`ndc`](Record::ndc).
    pub fn ndc(mut self, ndc: Option<&str>) -> Self {
        self.record.ndc = ndc.map(str::to_owned);
        self
    }

    /// Insert one entry into [`mdc`](Record::mdc).
    pub fn mdc_entry(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.record.mdc.insert(key.into(), value.into());
        self
    }

    /// Set [`mdc`](Record::mdc).
    pub fn mdc<I, K, V>(mut self, mdc: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.record.mdc = mdc
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Invoke the builder and return a `Record`.
    pub fn build(self) -> Record {
        self.record
    }
}

/// The level of a log record: a display name and a numeric severity.
///
/// Higher values are more severe, and the numeric value is what log collectors sort and filter
/// on. Levels outside the associated constants can be made with [`Level::new`].
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Level {
    name: Cow<'static, str>,
    value: i32,
}

impl Level {
    /// Designates fatal errors.
    pub const FATAL: Level = Level::new_static("FATAL", 1100);
    /// Designates very serious errors.
    pub const ERROR: Level = Level::new_static("ERROR", 1000);
    /// Designates hazardous situations.
    pub const WARN: Level = Level::new_static("WARN", 900);
    /// Designates useful information.
    pub const INFO: Level = Level::new_static("INFO", 800);
    /// Designates lower priority information.
    pub const DEBUG: Level = Level::new_static("DEBUG", 500);
    /// Designates very low priority, often extremely verbose, information.
    pub const TRACE: Level = Level::new_static("TRACE", 400);

    /// Designates serious failures; same severity as [`Level::ERROR`].
    pub const SEVERE: Level = Level::new_static("SEVERE", 1000);
    /// Designates potential problems; same severity as [`Level::WARN`].
    pub const WARNING: Level = Level::new_static("WARNING", 900);
    /// Designates static configuration messages.
    pub const CONFIG: Level = Level::new_static("CONFIG", 700);
    /// Designates tracing information; same severity as [`Level::DEBUG`].
    pub const FINE: Level = Level::new_static("FINE", 500);
    /// Designates fairly detailed tracing; same severity as [`Level::TRACE`].
    pub const FINER: Level = Level::new_static("FINER", 400);
    /// Designates highly detailed tracing.
    pub const FINEST: Level = Level::new_static("FINEST", 300);
    /// Enables all messages.
    pub const ALL: Level = Level::new_static("ALL", i32::MIN);
    /// Disables all messages.
    pub const OFF: Level = Level::new_static("OFF", i32::MAX);

    const fn new_static(name: &'static str, value: i32) -> Level {
        Level {
            name: Cow::Borrowed(name),
            value,
        }
    }

    /// Create a custom level.
    pub fn new(name: impl Into<Cow<'static, str>>, value: i32) -> Level {
        Level {
            name: name.into(),
            value,
        }
    }

    /// The display name of the level.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The numeric severity of the level.
    pub fn value(&self) -> i32 {
        self.value
    }
}

impl fmt::Debug for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.value)
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}
