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

use jiff::tz::TimeZone;
use logforth_layout_logstash::LogstashConfig;
use logforth_layout_logstash::LogstashLayout;
use logforth_layout_logstash::Record;
use logforth_layout_logstash::diagnostic::ThreadLocalNdc;
use serde_json::Value;

#[test]
fn test_encode_log_record() {
    let layout = LogstashLayout::new(LogstashConfig::default().field("service", "shop"))
        .host_name("box")
        .timezone(TimeZone::UTC);

    ThreadLocalNdc::push("checkout");
    let record = Record::from(
        &log::Record::builder()
            .args(format_args!("{} items in cart", 3))
            .level(log::Level::Warn)
            .target("shop::cart")
            .module_path(Some("shop::cart"))
            .key_values(&("user", "alice"))
            .build(),
    );
    ThreadLocalNdc::clear();

    let value: Value = serde_json::from_str(&layout.encode(&record)).unwrap();
    assert_eq!(value["level"], "WARN");
    assert_eq!(value["level_value"], 900);
    assert_eq!(value["message"], "3 items in cart");
    assert_eq!(value["logger_name"], "shop::cart");
    assert_eq!(value["class"], "shop::cart");
    assert_eq!(value["method"], "null");
    assert_eq!(value["ndc"], "checkout");
    assert_eq!(value["service"], "shop");
    assert_eq!(value["@mdc"]["user"], "alice");
}

#[test]
fn test_braces_in_log_message_are_kept() {
    let layout = LogstashLayout::new(LogstashConfig::default()).host_name("box");
    let record = Record::from(
        &log::Record::builder()
            .args(format_args!("{{0}} and %s stay as written"))
            .build(),
    );
    let value: Value = serde_json::from_str(&layout.encode(&record)).unwrap();
    assert_eq!(value["message"], "{0} and %s stay as written");
}
