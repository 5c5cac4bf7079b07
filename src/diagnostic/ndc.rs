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

use std::cell::RefCell;

thread_local! {
    static STACK: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// A Nested Diagnostic Context kept as a thread-local stack of frames.
///
/// The frames are flattened with `.` into the record's NDC string.
///
/// ## Example
///
/// ```
/// use logforth_layout_logstash::diagnostic::ThreadLocalNdc;
///
/// ThreadLocalNdc::push("checkout");
/// ThreadLocalNdc::push("payment");
/// assert_eq!(ThreadLocalNdc::get(), "checkout.payment");
/// ThreadLocalNdc::clear();
/// ```
#[derive(Default, Debug, Clone, Copy)]
#[non_exhaustive]
pub struct ThreadLocalNdc {}

impl ThreadLocalNdc {
    /// Pushes a frame and returns the new depth.
    pub fn push(frame: impl Into<String>) -> usize {
        STACK.with(|stack| {
            let mut stack = stack.borrow_mut();
            stack.push(frame.into());
            stack.len()
        })
    }

    /// Pops the innermost frame.
    pub fn pop() -> Option<String> {
        STACK.with(|stack| stack.borrow_mut().pop())
    }

    /// Truncates the stack to `depth` frames.
    pub fn trim(depth: usize) {
        STACK.with(|stack| stack.borrow_mut().truncate(depth));
    }

    /// Removes every frame.
    pub fn clear() {
        STACK.with(|stack| stack.borrow_mut().clear());
    }

    /// The number of frames.
    pub fn depth() -> usize {
        STACK.with(|stack| stack.borrow().len())
    }

    /// The frames joined with `.`; empty when there is none.
    pub fn get() -> String {
        STACK.with(|stack| stack.borrow().join("."))
    }
}
