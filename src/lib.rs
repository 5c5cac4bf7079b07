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

//! A Logstash JSON event layout.
//!
//! # Overview
//!
//! [`LogstashLayout`] turns one log [`Record`] into a single-line JSON document following the
//! Logstash event schema: timestamp, level, rendered message, logger and thread, host name,
//! source location, exception details, nested and mapped diagnostic contexts, plus static
//! tags and custom fields from [`LogstashConfig`].
//!
//! Messages are templates rendered with the record's arguments, either with positional
//! placeholders (`{0}`) or printf-style specifiers (`%s`). See [`format`] for the rules.
//!
//! # Examples
//!
//! ```
//! use jiff::tz::TimeZone;
//! use logforth_layout_logstash::Level;
//! use logforth_layout_logstash::LogstashConfig;
//! use logforth_layout_logstash::LogstashLayout;
//! use logforth_layout_logstash::Record;
//!
//! let config = LogstashConfig::parse(Some("web"), Some("env:prod")).unwrap();
//! let layout = LogstashLayout::new(config)
//!     .host_name("box")
//!     .timezone(TimeZone::UTC);
//!
//! let record = Record::builder()
//!     .millis(1_700_000_000_123)
//!     .level(Level::WARN)
//!     .logger_name("app.Main")
//!     .thread_name("main")
//!     .message("%d items left")
//!     .args([3])
//!     .build();
//!
//! assert_eq!(
//!     layout.encode(&record),
//!     concat!(
//!         r#"{"@timestamp":"2023-11-14T22:13:20.123+0000","level":"WARN","level_value":900,"#,
//!         r#""message":"3 items left","logger_name":"app.Main","thread_name":"main","#,
//!         r#""HOSTNAME":"box","class":"null","method":"null","env":"prod","@tags":["web"]}"#,
//!         "\n",
//!     )
//! );
//! ```

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod config;
pub mod diagnostic;
pub mod format;
pub mod host;
pub mod layout;
pub mod record;
pub mod throwable;
pub mod trap;

mod bridge;
mod error;

pub use self::config::CustomField;
pub use self::config::LogstashConfig;
pub use self::diagnostic::Diagnostic;
pub use self::error::Error;
pub use self::format::Arg;
pub use self::layout::Layout;
pub use self::layout::LogstashLayout;
pub use self::record::Level;
pub use self::record::Record;
pub use self::record::RecordBuilder;
pub use self::throwable::StackFrame;
pub use self::throwable::Throwable;
pub use self::trap::DefaultTrap;
pub use self::trap::Trap;
