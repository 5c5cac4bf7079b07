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

//! Errors attached to log records, and their stack trace text.

use std::fmt;
use std::fmt::Write;

/// Line number marking a frame executing native code.
const NATIVE_METHOD_LINE: i32 = -2;

/// One frame of a stack trace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StackFrame {
    class_name: String,
    method_name: String,
    file_name: Option<String>,
    line_number: i32,
}

impl StackFrame {
    /// Create a new stack frame.
    ///
    /// A negative line number means the line is unknown; `-2` marks a native method.
    pub fn new(
        class_name: impl Into<String>,
        method_name: impl Into<String>,
        file_name: Option<&str>,
        line_number: i32,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            method_name: method_name.into(),
            file_name: file_name.map(str::to_owned),
            line_number,
        }
    }

    /// The class (or module) of the frame.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The method (or function) of the frame.
    pub fn method_name(&self) -> &str {
        &self.method_name
    }

    /// The source file of the frame.
    pub fn file_name(&self) -> Option<&str> {
        self.file_name.as_deref()
    }

    /// The source line of the frame.
    pub fn line_number(&self) -> i32 {
        self.line_number
    }

    /// Whether the frame executes native code.
    pub fn is_native_method(&self) -> bool {
        self.line_number == NATIVE_METHOD_LINE
    }
}

impl fmt::Display for StackFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}(", self.class_name, self.method_name)?;
        if self.is_native_method() {
            f.write_str("Native Method")?;
        } else {
            match self.file_name.as_deref() {
                Some(file) if self.line_number >= 0 => write!(f, "{file}:{}", self.line_number)?,
                Some(file) => f.write_str(file)?,
                None => f.write_str("Unknown Source")?,
            }
        }
        f.write_str(")")
    }
}

/// An error attached to a log record.
///
/// A throwable has a type name, an optional message, its stack frames (a frame may be absent
/// when the producer lost it), and an optional cause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Throwable {
    class_name: String,
    message: Option<String>,
    frames: Vec<Option<StackFrame>>,
    cause: Option<Box<Throwable>>,
}

impl Throwable {
    /// Create a throwable of the given type name, without message, frames, or cause.
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            message: None,
            frames: vec![],
            cause: None,
        }
    }

    /// Capture a Rust error and its chain of sources.
    ///
    /// The outermost error is named after its type. Sources are only known as trait objects
    /// and are named after the trait object type. Rust errors carry no stack frames.
    pub fn from_error<E>(err: &E) -> Self
    where
        E: std::error::Error + ?Sized,
    {
        let mut throwable =
            Throwable::new(std::any::type_name::<E>()).with_message(err.to_string());
        if let Some(source) = err.source() {
            throwable = throwable.with_cause(Throwable::from_error(source));
        }
        throwable
    }

    /// Set the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Append a stack frame.
    pub fn with_frame(mut self, frame: StackFrame) -> Self {
        self.frames.push(Some(frame));
        self
    }

    /// Replace the stack frames.
    pub fn with_frames(mut self, frames: impl IntoIterator<Item = Option<StackFrame>>) -> Self {
        self.frames = frames.into_iter().collect();
        self
    }

    /// Set the cause.
    pub fn with_cause(mut self, cause: Throwable) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    /// The fully-qualified type name.
    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    /// The message.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The stack frames, innermost first.
    pub fn frames(&self) -> &[Option<StackFrame>] {
        &self.frames
    }

    /// The cause.
    pub fn cause(&self) -> Option<&Throwable> {
        self.cause.as_deref()
    }

    /// The line number of the first stack frame, `0` if there is none.
    pub fn line_number(&self) -> i32 {
        line_number_from_stack_trace(&self.frames)
    }

    /// Render the stack trace text, causes included.
    ///
    /// ```text
    /// app::Error: That is an exception
    /// 	at Test.methodTest(Test.class:42)
    /// Caused by: app::Error: This is the cause
    /// 	at Cause.methodCause(Cause.class:69)
    /// ```
    pub fn stack_trace(&self) -> String {
        let mut text = String::new();
        // SAFETY: write to a string always succeeds
        write_stack_trace(&mut text, self).unwrap();
        text
    }
}

impl fmt::Display for Throwable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message.as_deref() {
            Some(message) => write!(f, "{}: {message}", self.class_name),
            None => f.write_str(&self.class_name),
        }
    }
}

/// Returns the line number of the first frame, or `0` when the frames are empty or the first
/// frame is absent.
pub fn line_number_from_stack_trace(frames: &[Option<StackFrame>]) -> i32 {
    match frames.first() {
        Some(Some(frame)) => frame.line_number(),
        _ => 0,
    }
}

fn write_stack_trace(w: &mut impl Write, throwable: &Throwable) -> fmt::Result {
    writeln!(w, "{throwable}")?;
    write_frames(w, &throwable.frames, 0)?;

    let mut enclosing = &throwable.frames;
    let mut cause = throwable.cause();
    while let Some(current) = cause {
        let in_common = frames_in_common(&current.frames, enclosing);
        writeln!(w, "Caused by: {current}")?;
        write_frames(w, &current.frames, in_common)?;
        enclosing = &current.frames;
        cause = current.cause();
    }
    Ok(())
}

fn write_frames(w: &mut impl Write, frames: &[Option<StackFrame>], in_common: usize) -> fmt::Result {
    for frame in &frames[..frames.len() - in_common] {
        match frame {
            Some(frame) => writeln!(w, "\tat {frame}")?,
            None => writeln!(w, "\tat null")?,
        }
    }
    if in_common != 0 {
        writeln!(w, "\t... {in_common} more")?;
    }
    Ok(())
}

// Counts the trailing frames a cause shares with the trace that encloses it.
fn frames_in_common(frames: &[Option<StackFrame>], enclosing: &[Option<StackFrame>]) -> usize {
    frames
        .iter()
        .rev()
        .zip(enclosing.iter().rev())
        .take_while(|(a, b)| a == b)
        .count()
}
