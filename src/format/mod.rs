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

//! Message templating.
//!
//! Two template styles are supported, tried in order:
//!
//! 1. [positional] placeholders, `{0}`, `{1}`, ...
//! 2. [printf]-style specifiers, `%s`, `%d`, ...
//!
//! The positional style is only tried when the template contains a `{` followed by a digit.
//! If it is not applicable or fails, the printf style is applied to the original template.
//! If that fails too, the template is returned unchanged.

use std::borrow::Cow;

pub use self::arg::Arg;

mod arg;
mod number;
pub mod positional;
pub mod printf;

/// Renders the message of a record from its template and positional arguments.
///
/// Never fails: malformed templates fall back to the next style, and finally to the template
/// itself.
///
/// # Examples
///
/// ```
/// use logforth_layout_logstash::format::Arg;
/// use logforth_layout_logstash::format::format_message;
///
/// assert_eq!(format_message("{0} %s", &[Arg::from("hi")]), "hi %s");
/// assert_eq!(format_message("{0'}' %s", &[Arg::from("hi")]), "{0'}' hi");
/// assert_eq!(format_message("%0.5s", &[Arg::from("hi")]), "%0.5s");
/// ```
pub fn format_message<'a>(template: &'a str, args: &[Arg]) -> Cow<'a, str> {
    if args.is_empty() {
        return Cow::Borrowed(template);
    }

    if positional::has_placeholder(template) {
        if let Ok(message) = positional::format(template, args) {
            return Cow::Owned(message);
        }
    }

    match printf::format(template, args) {
        Ok(message) => Cow::Owned(message),
        Err(_) => Cow::Borrowed(template),
    }
}
