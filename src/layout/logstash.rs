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

use std::borrow::Cow;
use std::collections::BTreeMap;

use jiff::Timestamp;
use jiff::tz::TimeZone;
use serde_json::Map;
use serde_json::Value;

use crate::Error;
use crate::config::LogstashConfig;
use crate::diagnostic::Diagnostic;
use crate::diagnostic::Visitor;
use crate::format::format_message;
use crate::host;
use crate::layout::Layout;
use crate::layout::builder::ObjectBuilder;
use crate::record::Record;

/// A layout that encodes each record as one Logstash JSON event.
///
/// Output format:
///
/// ```json
/// {"@timestamp":"2023-11-14T22:13:20.123+0000","level":"INFO","level_value":800,"message":"Hello world","logger_name":"app.Main","thread_name":"main","HOSTNAME":"box","class":"app.Main","method":"run","@tags":["UNKNOWN"]}
/// ```
///
/// Keys are emitted in this order:
///
/// 1. `@timestamp`, `level`, `level_value`, `message`, `logger_name`, `thread_name`,
///    `HOSTNAME`, `class` and `method`; an absent class or method is the string `"null"`.
/// 2. `line_number`, `exception_class`, `exception_message` and `stack_trace` when a throwable
///    is attached. `exception_class` is only written when the record carries a source class
///    name, and `exception_message` only when the throwable has a message.
/// 3. `ndc` when the record carries a non-empty nested context.
/// 4. The configured custom fields.
/// 5. `@tags`, then `@mdc` when the mapped context is non-empty.
///
/// A custom field whose key is already present replaces that value in place.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use logforth_layout_logstash::LogstashConfig;
/// use logforth_layout_logstash::LogstashLayout;
/// use logforth_layout_logstash::Record;
///
/// let layout = LogstashLayout::new(LogstashConfig::default())
///     .host_name("box")
///     .timezone(TimeZone::UTC);
///
/// let record = Record::builder()
///     .millis(1_700_000_000_123)
///     .message("Hello {0}")
///     .args(["world"])
///     .build();
///
/// let line = layout.encode(&record);
/// assert!(line.starts_with(r#"{"@timestamp":"2023-11-14T22:13:20.123+0000""#));
/// assert!(line.ends_with("}\n"));
/// ```
#[derive(Debug, Clone)]
pub struct LogstashLayout {
    config: LogstashConfig,
    host_name: Cow<'static, str>,
    tz: Option<TimeZone>,
}

impl Default for LogstashLayout {
    fn default() -> Self {
        LogstashLayout::new(LogstashConfig::default())
    }
}

impl LogstashLayout {
    /// Create a new layout with the given configuration and the local host name.
    pub fn new(config: LogstashConfig) -> Self {
        Self {
            config,
            host_name: Cow::Borrowed(host::host_name()),
            tz: None,
        }
    }

    /// Create a new layout configured from the `LOGSTASH_FORMATTER_TAGS` and
    /// `LOGSTASH_FORMATTER_FIELDS` environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if the custom fields are malformed.
    pub fn from_default_env() -> Result<Self, Error> {
        LogstashConfig::from_default_env().map(LogstashLayout::new)
    }

    /// Set the host name written to `HOSTNAME` instead of the resolved local host name.
    pub fn host_name(mut self, host_name: impl Into<Cow<'static, str>>) -> Self {
        self.host_name = host_name.into();
        self
    }

    /// Set the timezone for timestamps.
    ///
    /// Defaults to the system time zone.
    ///
    /// # Examples
    ///
    /// ```
    /// use jiff::tz::TimeZone;
    /// use logforth_layout_logstash::LogstashLayout;
    ///
    /// let layout = LogstashLayout::default().timezone(TimeZone::UTC);
    /// ```
    pub fn timezone(mut self, tz: TimeZone) -> Self {
        self.tz = Some(tz);
        self
    }

    /// The configuration of this layout.
    pub fn config(&self) -> &LogstashConfig {
        &self.config
    }

    /// Encodes a record into one JSON object followed by a newline.
    ///
    /// This never fails; message templates that do not format are written verbatim.
    pub fn encode(&self, record: &Record) -> String {
        self.encode_event(record, BTreeMap::new())
    }

    fn encode_event(&self, record: &Record, mut mdc: BTreeMap<String, String>) -> String {
        let mut event = ObjectBuilder::default();

        let tz = self.tz.clone().unwrap_or_else(TimeZone::system);
        event
            .add("@timestamp", format_timestamp(record.millis(), tz))
            .add("level", record.level().name())
            .add("level_value", record.level().value())
            .add("message", format_message(record.message(), record.args()))
            .add("logger_name", record.logger_name())
            .add("thread_name", record.thread_name())
            .add("HOSTNAME", self.host_name.as_ref())
            .add("class", record.source_class_name().unwrap_or("null"))
            .add("method", record.source_method_name().unwrap_or("null"));

        if let Some(thrown) = record.thrown() {
            event.add("line_number", thrown.line_number());
            if record.source_class_name().is_some() {
                event.add("exception_class", thrown.class_name());
            }
            if let Some(message) = thrown.message() {
                event.add("exception_message", message);
            }
            event.add("stack_trace", thrown.stack_trace());
        }

        if let Some(ndc) = record.ndc().filter(|ndc| !ndc.is_empty()) {
            event.add("ndc", ndc);
        }

        for field in self.config.fields() {
            event.add(field.key.as_str(), field.value.as_str());
        }

        event.add("@tags", self.config.tags().to_vec());

        mdc.extend(record.mdc().iter().map(|(k, v)| (k.clone(), v.clone())));
        if !mdc.is_empty() {
            let mdc: Map<String, Value> = mdc.into_iter().map(|(k, v)| (k, v.into())).collect();
            event.add("@mdc", mdc);
        }

        let mut line = event.build().to_string();
        line.push('\n');
        line
    }
}

impl Layout for LogstashLayout {
    fn format(&self, record: &Record, diags: &[Box<dyn Diagnostic>]) -> Result<Vec<u8>, Error> {
        let mut mdc = BTreeMap::new();
        let mut collector = MdcCollector { mdc: &mut mdc };
        for d in diags {
            d.visit(&mut collector)?;
        }
        Ok(self.encode_event(record, mdc).into_bytes())
    }
}

struct MdcCollector<'a> {
    mdc: &'a mut BTreeMap<String, String>,
}

impl Visitor for MdcCollector<'_> {
    fn visit(&mut self, key: Cow<str>, value: Cow<str>) -> Result<(), Error> {
        self.mdc.insert(key.into_owned(), value.into_owned());
        Ok(())
    }
}

/// Formats epoch milliseconds as `yyyy-MM-ddTHH:mm:ss.SSS+hhmm` in the given time zone.
///
/// Timestamps outside the supported range are clamped.
fn format_timestamp(millis: i64, tz: TimeZone) -> String {
    let ts = Timestamp::from_millisecond(millis).unwrap_or(if millis < 0 {
        Timestamp::MIN
    } else {
        Timestamp::MAX
    });
    let zoned = ts.to_zoned(tz);
    format!(
        "{}.{:03}{}",
        zoned.strftime("%Y-%m-%dT%H:%M:%S"),
        zoned.millisecond(),
        zoned.strftime("%z"),
    )
}

#[cfg(test)]
mod tests {
    use jiff::tz::Offset;

    use super::*;
    use crate::diagnostic::StaticDiagnostic;
    use crate::record::Level;
    use crate::throwable::StackFrame;
    use crate::throwable::Throwable;

    fn layout(config: LogstashConfig) -> LogstashLayout {
        LogstashLayout::new(config)
            .host_name("box")
            .timezone(TimeZone::UTC)
    }

    fn record() -> Record {
        Record::builder()
            .millis(1_700_000_000_123)
            .level(Level::INFO)
            .logger_name("app.Main")
            .thread_name("main")
            .source_class_name(Some("app.Main"))
            .source_method_name(Some("run"))
            .message("Hello")
            .build()
    }

    fn keys(line: &str) -> Vec<String> {
        let value: Value = serde_json::from_str(line).unwrap();
        value.as_object().unwrap().keys().cloned().collect()
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(
            format_timestamp(1_700_000_000_123, TimeZone::UTC),
            "2023-11-14T22:13:20.123+0000"
        );
        assert_eq!(format_timestamp(0, TimeZone::UTC), "1970-01-01T00:00:00.000+0000");
        assert_eq!(
            format_timestamp(5, TimeZone::fixed(Offset::constant(2))),
            "1970-01-01T02:00:00.005+0200"
        );
        assert_eq!(
            format_timestamp(-1, TimeZone::UTC),
            "1969-12-31T23:59:59.999+0000"
        );
    }

    #[test]
    fn test_timestamp_out_of_range_is_clamped() {
        assert!(!format_timestamp(i64::MAX, TimeZone::UTC).is_empty());
        assert!(!format_timestamp(i64::MIN, TimeZone::UTC).is_empty());
    }

    #[test]
    fn test_key_order() {
        let config = LogstashConfig::default().field("env", "prod");
        let record = record()
            .to_builder()
            .thrown(Some(Throwable::new("app::Error").with_message("boom")))
            .ndc(Some("outer.inner"))
            .mdc_entry("user", "alice")
            .build();
        let line = layout(config).encode(&record);
        assert_eq!(
            keys(&line),
            [
                "@timestamp",
                "level",
                "level_value",
                "message",
                "logger_name",
                "thread_name",
                "HOSTNAME",
                "class",
                "method",
                "line_number",
                "exception_class",
                "exception_message",
                "stack_trace",
                "ndc",
                "env",
                "@tags",
                "@mdc",
            ]
        );
    }

    #[test]
    fn test_minimal_keys() {
        let line = layout(LogstashConfig::default()).encode(&record());
        assert!(line.ends_with('\n'));
        assert_eq!(line.matches('\n').count(), 1);
        assert_eq!(
            keys(&line),
            [
                "@timestamp",
                "level",
                "level_value",
                "message",
                "logger_name",
                "thread_name",
                "HOSTNAME",
                "class",
                "method",
                "@tags",
            ]
        );
    }

    #[test]
    fn test_empty_ndc_is_omitted() {
        let record = record().to_builder().ndc(Some("")).build();
        let line = layout(LogstashConfig::default()).encode(&record);
        assert!(!keys(&line).contains(&"ndc".to_string()));
    }

    #[test]
    fn test_exception_class_requires_source_class() {
        let thrown = Throwable::new("app::Error")
            .with_frame(StackFrame::new("Test", "methodTest", Some("Test.class"), 42));
        let record = record()
            .to_builder()
            .source_class_name(None)
            .thrown(Some(thrown))
            .build();
        let line = layout(LogstashConfig::default()).encode(&record);
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["class"], "null");
        assert_eq!(value["line_number"], 42);
        assert!(value.get("exception_class").is_none());
        assert!(value.get("exception_message").is_none());
        assert_eq!(
            value["stack_trace"],
            "app::Error\n\tat Test.methodTest(Test.class:42)\n"
        );
    }

    #[test]
    fn test_custom_field_replaces_in_place() {
        let config = LogstashConfig::default().field("level", "custom");
        let line = layout(config).encode(&record());
        assert_eq!(keys(&line)[1], "level");
        let value: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(value["level"], "custom");
    }

    #[test]
    fn test_diagnostics_merge_into_mdc() {
        let mut diagnostic = StaticDiagnostic::default();
        diagnostic.insert("region", "eu");
        diagnostic.insert("user", "from-diagnostic");
        let diags: Vec<Box<dyn Diagnostic>> = vec![diagnostic.into()];

        let record = record().to_builder().mdc_entry("user", "alice").build();
        let bytes = layout(LogstashConfig::default())
            .format(&record, &diags)
            .unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(value["@mdc"]["region"], "eu");
        assert_eq!(value["@mdc"]["user"], "alice");
    }

    #[test]
    fn test_encode_is_pure() {
        let layout = layout(LogstashConfig::default().tag("x"));
        let record = record();
        let before = record.clone();
        assert_eq!(layout.encode(&record), layout.encode(&record));
        assert_eq!(record, before);
    }
}
