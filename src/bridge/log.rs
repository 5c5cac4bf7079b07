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

use std::collections::BTreeMap;

use jiff::Timestamp;

use crate::Error;
use crate::diagnostic::ThreadLocalNdc;
use crate::record::Level;
use crate::record::Record;
use crate::trap::DefaultTrap;
use crate::trap::Trap;

impl From<log::Level> for Level {
    fn from(level: log::Level) -> Self {
        match level {
            log::Level::Error => Level::ERROR,
            log::Level::Warn => Level::WARN,
            log::Level::Info => Level::INFO,
            log::Level::Debug => Level::DEBUG,
            log::Level::Trace => Level::TRACE,
        }
    }
}

/// Captures a `log` crate record.
///
/// The record is stamped with the current time, the current thread name, and the nested
/// context of [`ThreadLocalNdc`]. The target becomes the logger name, the module path becomes
/// the source class name, and the key-values become the mapped context. The message is already
/// formatted, so the captured record carries no arguments.
impl From<&log::Record<'_>> for Record {
    fn from(record: &log::Record<'_>) -> Self {
        let mut kvs = KvCollector {
            mdc: BTreeMap::new(),
        };
        if let Err(err) = record.key_values().visit(&mut kvs) {
            let err = Error::new("failed to collect key-values").with_source(err);
            DefaultTrap::default().trap(&err);
        }

        let thread = std::thread::current();
        let thread_name = match thread.name() {
            Some(name) => name.to_string(),
            None => format!("{:?}", thread.id()),
        };

        let ndc = ThreadLocalNdc::get();

        Record::builder()
            .millis(Timestamp::now().as_millisecond())
            .level(record.level().into())
            .logger_name(record.target())
            .thread_name(thread_name)
            .source_class_name(record.module_path())
            .message(record.args().to_string())
            .ndc(Some(ndc.as_str()).filter(|ndc| !ndc.is_empty()))
            .mdc(kvs.mdc)
            .build()
    }
}

struct KvCollector {
    mdc: BTreeMap<String, String>,
}

impl<'kvs> log::kv::VisitSource<'kvs> for KvCollector {
    fn visit_pair(
        &mut self,
        key: log::kv::Key<'kvs>,
        value: log::kv::Value<'kvs>,
    ) -> Result<(), log::kv::Error> {
        self.mdc.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_values() {
        let values: Vec<i32> = [
            log::Level::Error,
            log::Level::Warn,
            log::Level::Info,
            log::Level::Debug,
            log::Level::Trace,
        ]
        .into_iter()
        .map(|level| Level::from(level).value())
        .collect();
        assert_eq!(values, [1000, 900, 800, 500, 400]);
        assert_eq!(Level::from(log::Level::Warn).name(), "WARN");
    }

    #[test]
    fn test_capture_record() {
        let record = Record::from(
            &log::Record::builder()
                .args(format_args!("hello {}", 42))
                .level(log::Level::Info)
                .target("app::server")
                .module_path(Some("app::server::handler"))
                .key_values(&("user", "alice"))
                .build(),
        );
        assert_eq!(record.message(), "hello 42");
        assert!(record.args().is_empty());
        assert_eq!(record.level(), &Level::INFO);
        assert_eq!(record.logger_name(), "app::server");
        assert_eq!(record.source_class_name(), Some("app::server::handler"));
        assert_eq!(record.source_method_name(), None);
        assert_eq!(record.mdc().get("user").map(String::as_str), Some("alice"));
        assert!(!record.thread_name().is_empty());
    }

    #[test]
    fn test_capture_ndc() {
        ThreadLocalNdc::clear();
        let record = Record::from(&log::Record::builder().args(format_args!("x")).build());
        assert_eq!(record.ndc(), None);

        ThreadLocalNdc::push("outer");
        ThreadLocalNdc::push("inner");
        let record = Record::from(&log::Record::builder().args(format_args!("x")).build());
        assert_eq!(record.ndc(), Some("outer.inner"));
        ThreadLocalNdc::clear();
    }
}
