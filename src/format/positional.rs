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

//! Positional placeholder templates: `{0}`, `{1,number}`, `{2,number,#,##0.00}`,
//! `{3,choice,0#none|1#one|1<{3} items}`.
//!
//! Text between single quotes is literal, and `''` is a literal quote. Inside a placeholder a
//! quoted section may contain braces. A placeholder whose index is past the argument list is
//! kept as `{n}`.
//!
//! Type and style keywords are matched case-insensitively. The `number` type accepts the
//! `integer` and `percent` styles, or a decimal pattern made of `#`, `0`, `,` and `.` with an
//! optional `%` suffix. The `date` and `time` types are not supported and fail the template.

use std::fmt::Write;

use crate::Error;
use crate::format::Arg;
use crate::format::number::group_digits_by;
use crate::format::number::round_half_even;

#[derive(Debug, Clone, PartialEq)]
enum Style {
    Default,
    Number(NumberPattern),
    Choice(Vec<(f64, String)>),
}

/// A decimal number pattern: digit counts, grouping size, and an optional percent suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct NumberPattern {
    min_int: usize,
    min_frac: usize,
    max_frac: usize,
    // 0 disables grouping
    grouping: usize,
    percent: bool,
}

impl NumberPattern {
    const NUMBER: NumberPattern = NumberPattern {
        min_int: 1,
        min_frac: 0,
        max_frac: 3,
        grouping: 3,
        percent: false,
    };

    const INTEGER: NumberPattern = NumberPattern {
        max_frac: 0,
        ..NumberPattern::NUMBER
    };

    const PERCENT: NumberPattern = NumberPattern {
        max_frac: 0,
        percent: true,
        ..NumberPattern::NUMBER
    };

    fn parse(pattern: &str) -> Result<NumberPattern, Error> {
        let malformed =
            || Error::new("unsupported number pattern").with_context("pattern", pattern);

        let (body, percent) = match pattern.strip_suffix('%') {
            Some(body) => (body, true),
            None => (pattern, false),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(malformed());
        }
        if !int_part.chars().all(|c| matches!(c, '#' | '0' | ','))
            || !frac_part.chars().all(|c| matches!(c, '#' | '0'))
        {
            return Err(malformed());
        }

        let grouping = match int_part.rfind(',') {
            Some(pos) if pos + 1 == int_part.len() => return Err(malformed()),
            Some(pos) => int_part.len() - pos - 1,
            None => 0,
        };

        Ok(NumberPattern {
            min_int: int_part.matches('0').count(),
            min_frac: frac_part.matches('0').count(),
            max_frac: frac_part.len(),
            grouping,
            percent,
        })
    }

    fn format_int(&self, v: i64) -> String {
        let v = if self.percent {
            i128::from(v) * 100
        } else {
            i128::from(v)
        };
        self.render(v < 0, &v.unsigned_abs().to_string(), "")
    }

    fn format_float(&self, v: f64) -> String {
        let suffix = if self.percent { "%" } else { "" };
        if v.is_nan() {
            return "NaN".to_string();
        }
        if v.is_infinite() {
            let sign = if v < 0.0 { "-" } else { "" };
            return format!("{sign}∞{suffix}");
        }

        let v = if self.percent { v * 100.0 } else { v };
        let rounded = round_half_even(v.abs(), self.max_frac);
        let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
        self.render(v.is_sign_negative(), int_part, frac_part)
    }

    fn render(&self, negative: bool, int_digits: &str, frac_digits: &str) -> String {
        let int_digits = int_digits.trim_start_matches('0');
        let frac_digits = frac_digits.trim_end_matches('0');
        let frac_len = frac_digits.len().max(self.min_frac);

        let mut int_text = "0".repeat(self.min_int.saturating_sub(int_digits.len()));
        int_text.push_str(int_digits);
        if int_text.is_empty() && frac_len == 0 {
            int_text.push('0');
        }

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push_str(&group_digits_by(&int_text, self.grouping));
        if frac_len > 0 {
            text.push('.');
            text.push_str(frac_digits);
            text.extend(std::iter::repeat_n('0', frac_len - frac_digits.len()));
        }
        if self.percent {
            text.push('%');
        }
        text
    }
}

#[derive(Debug)]
struct Placeholder {
    index: usize,
    style: Style,
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Placeholder(Placeholder),
}

/// Whether the template contains something that looks like a positional placeholder.
pub(crate) fn has_placeholder(template: &str) -> bool {
    template
        .as_bytes()
        .windows(2)
        .any(|w| w[0] == b'{' && w[1].is_ascii_digit())
}

/// Substitutes `args` into the positional placeholders of `template`.
pub fn format(template: &str, args: &[Arg]) -> Result<String, Error> {
    let segments = parse(template)?;

    let mut text = String::with_capacity(template.len());
    for segment in segments {
        match segment {
            Segment::Literal(literal) => text.push_str(&literal),
            Segment::Placeholder(placeholder) => match args.get(placeholder.index) {
                Some(arg) => write_arg(&mut text, arg, &placeholder.style, args)?,
                None => {
                    // SAFETY: write to a string always succeeds
                    write!(&mut text, "{{{}}}", placeholder.index).unwrap();
                }
            },
        }
    }
    Ok(text)
}

fn parse(template: &str) -> Result<Vec<Segment>, Error> {
    let mut segments = vec![];
    let mut literal = String::new();
    // index, type, style
    let mut parts: [String; 3] = Default::default();
    let mut part: Option<usize> = None;
    let mut in_quote = false;
    let mut brace_depth = 0usize;

    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        let Some(p) = part else {
            match c {
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    literal.push('\'');
                }
                '\'' => in_quote = !in_quote,
                '{' if !in_quote => {
                    part = Some(0);
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                }
                _ => literal.push(c),
            }
            continue;
        };

        if in_quote {
            parts[p].push(c);
            if c == '\'' {
                in_quote = false;
            }
            continue;
        }

        match c {
            ',' if p < 2 => part = Some(p + 1),
            '{' => {
                brace_depth += 1;
                parts[p].push(c);
            }
            '}' if brace_depth == 0 => {
                let [index, kind, style] = std::mem::take(&mut parts);
                segments.push(Segment::Placeholder(make_placeholder(&index, &kind, &style)?));
                part = None;
            }
            '}' => {
                brace_depth -= 1;
                parts[p].push(c);
            }
            ' ' if p == 1 && parts[1].is_empty() => {}
            '\'' => {
                in_quote = true;
                parts[p].push(c);
            }
            _ => parts[p].push(c),
        }
    }

    if part.is_some() {
        let err = Error::new("unmatched braces in the pattern").with_context("pattern", template);
        return Err(err);
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}

fn make_placeholder(index: &str, kind: &str, style: &str) -> Result<Placeholder, Error> {
    let index = index.parse::<usize>().map_err(|err| {
        Error::new("can't parse argument number")
            .with_context("index", index)
            .with_source(err)
    })?;

    let kind = kind.trim().to_ascii_lowercase();
    let style = match (kind.as_str(), style.trim()) {
        ("", "") => Style::Default,
        ("number", style) => match style.to_ascii_lowercase().as_str() {
            "" => Style::Number(NumberPattern::NUMBER),
            "integer" => Style::Number(NumberPattern::INTEGER),
            "percent" => Style::Number(NumberPattern::PERCENT),
            _ => Style::Number(NumberPattern::parse(style)?),
        },
        ("choice", style) => Style::Choice(parse_choice(style)?),
        (kind, style) => {
            return Err(Error::new("unsupported format type")
                .with_context("type", kind)
                .with_context("style", style));
        }
    };

    Ok(Placeholder { index, style })
}

// `limit#text` selects `text` from `limit` on, `limit<text` from just above `limit`.
fn parse_choice(pattern: &str) -> Result<Vec<(f64, String)>, Error> {
    let malformed = || Error::new("malformed choice pattern").with_context("pattern", pattern);

    let mut choices: Vec<(f64, String)> = vec![];
    let mut limit = String::new();
    let mut text = String::new();
    let mut in_limit = true;
    let mut in_quote = false;

    let mut chars = pattern.chars().peekable();
    loop {
        let c = chars.next();
        let target = if in_limit { &mut limit } else { &mut text };
        match c {
            Some('\'') if chars.peek() == Some(&'\'') => {
                chars.next();
                target.push('\'');
            }
            Some('\'') => in_quote = !in_quote,
            Some(c) if in_quote => target.push(c),
            Some(c @ ('#' | '<' | '≤')) if in_limit => {
                let value = parse_limit(&limit).ok_or_else(malformed)?;
                let value = if c == '<' { next_up(value) } else { value };
                if choices.last().is_some_and(|(last, _)| value <= *last) {
                    return Err(malformed());
                }
                choices.push((value, String::new()));
                limit.clear();
                in_limit = false;
            }
            Some('|') | None if !in_limit => {
                if let Some((_, choice)) = choices.last_mut() {
                    *choice = std::mem::take(&mut text);
                }
                if c.is_none() {
                    break;
                }
                in_limit = true;
            }
            Some(c) => target.push(c),
            None if choices.is_empty() || !limit.trim().is_empty() => return Err(malformed()),
            None => break,
        }
    }
    Ok(choices)
}

fn parse_limit(limit: &str) -> Option<f64> {
    match limit.trim() {
        "∞" => Some(f64::INFINITY),
        "-∞" => Some(f64::NEG_INFINITY),
        limit => limit.parse().ok(),
    }
}

fn next_up(v: f64) -> f64 {
    if v.is_nan() || v == f64::INFINITY {
        return v;
    }
    if v == 0.0 {
        return f64::from_bits(1);
    }
    let bits = v.to_bits();
    f64::from_bits(if v > 0.0 { bits + 1 } else { bits - 1 })
}

fn select_choice(choices: &[(f64, String)], v: f64) -> &str {
    let selected = choices
        .iter()
        .take_while(|(limit, _)| v >= *limit)
        .count()
        .saturating_sub(1);
    choices.get(selected).map_or("", |(_, text)| text.as_str())
}

// A selected choice that contains `{` is itself a template over the same arguments.
fn write_choice(
    text: &mut String,
    choices: &[(f64, String)],
    v: f64,
    args: &[Arg],
) -> Result<(), Error> {
    let choice = select_choice(choices, v);
    if choice.contains('{') {
        text.push_str(&format(choice, args)?);
    } else {
        text.push_str(choice);
    }
    Ok(())
}

fn write_arg(text: &mut String, arg: &Arg, style: &Style, args: &[Arg]) -> Result<(), Error> {
    match (arg, style) {
        (Arg::Null, _) => text.push_str("null"),
        (Arg::Int(v), Style::Default) => text.push_str(&NumberPattern::NUMBER.format_int(*v)),
        (Arg::Float(v), Style::Default) => text.push_str(&NumberPattern::NUMBER.format_float(*v)),
        (Arg::Int(v), Style::Number(pattern)) => text.push_str(&pattern.format_int(*v)),
        (Arg::Float(v), Style::Number(pattern)) => text.push_str(&pattern.format_float(*v)),
        (Arg::Int(v), Style::Choice(choices)) => write_choice(text, choices, *v as f64, args)?,
        (Arg::Float(v), Style::Choice(choices)) => write_choice(text, choices, *v, args)?,
        (arg, Style::Default) => {
            // SAFETY: write to a string always succeeds
            write!(text, "{arg}").unwrap();
        }
        (arg, _) => {
            let err = Error::new("cannot format given argument as a number");
            return Err(err.with_context("arg", arg));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<Arg> {
        values.iter().map(|v| Arg::from(*v)).collect()
    }

    #[test]
    fn test_has_placeholder() {
        assert!(has_placeholder("{0}"));
        assert!(has_placeholder("a {12} b"));
        assert!(!has_placeholder("%s"));
        assert!(!has_placeholder("{}"));
        assert!(!has_placeholder("{name}"));
    }

    #[test]
    fn test_format_strings() {
        assert_eq!(format("{0}", &args(&["hi"])).unwrap(), "hi");
        assert_eq!(format("{0} %s", &args(&["hi"])).unwrap(), "hi %s");
        assert_eq!(format("{1} {0}", &args(&["a", "b"])).unwrap(), "b a");
        assert_eq!(format("{0}{0}", &args(&["x"])).unwrap(), "xx");
        assert_eq!(format("{0, number }", &[Arg::Int(7)]).unwrap(), "7");
    }

    #[test]
    fn test_format_quoting() {
        assert_eq!(format("it''s {0}", &args(&["me"])).unwrap(), "it's me");
        assert_eq!(format("'{0}' is {0}", &args(&["x"])).unwrap(), "{0} is x");
        assert_eq!(format("'quoted' {0}", &args(&["x"])).unwrap(), "quoted x");
    }

    #[test]
    fn test_format_missing_argument_kept() {
        assert_eq!(format("{0} {1}", &args(&["a"])).unwrap(), "a {1}");
    }

    #[test]
    fn test_format_numbers() {
        let values = vec![Arg::Int(1234567), Arg::Float(3.14159), Arg::Float(0.5), Arg::Null];
        assert_eq!(format("{0}", &values).unwrap(), "1,234,567");
        assert_eq!(format("{1}", &values).unwrap(), "3.142");
        assert_eq!(format("{1,number,integer}", &values).unwrap(), "3");
        assert_eq!(format("{2,number,percent}", &values).unwrap(), "50%");
        assert_eq!(format("{0,number,percent}", &values).unwrap(), "123,456,700%");
        assert_eq!(format("{3,number}", &values).unwrap(), "null");
        assert_eq!(format("{0}", &[Arg::Float(-2.0)]).unwrap(), "-2");
        assert_eq!(format("{0}", &[Arg::Float(-0.0)]).unwrap(), "-0");
        assert_eq!(format("{0}", &[Arg::Float(-0.0001)]).unwrap(), "-0");
    }

    #[test]
    fn test_format_keywords_ignore_case() {
        assert_eq!(format("{0,NUMBER}", &[Arg::Int(5)]).unwrap(), "5");
        assert_eq!(format("{0, Number , Integer }", &[Arg::Float(2.5)]).unwrap(), "2");
        assert_eq!(format("{0,number,PERCENT}", &[Arg::Float(0.25)]).unwrap(), "25%");
    }

    #[test]
    fn test_format_number_patterns() {
        let pi = [Arg::Float(3.14159)];
        assert_eq!(format("{0,number,#.##}", &pi).unwrap(), "3.14");
        assert_eq!(format("{0,number,0.0000}", &pi).unwrap(), "3.1416");
        assert_eq!(format("{0,number,#,##0.00}", &[Arg::Float(1234.5)]).unwrap(), "1,234.50");
        assert_eq!(format("{0,number,#.##}", &[Arg::Float(0.5)]).unwrap(), ".5");
        assert_eq!(format("{0,number,#.##}", &[Arg::Int(42)]).unwrap(), "42");
        assert_eq!(format("{0,number,000}", &[Arg::Int(7)]).unwrap(), "007");
        assert_eq!(format("{0,number,#.#%}", &[Arg::Float(0.1234)]).unwrap(), "12.3%");
        assert_eq!(format("{0,number,#,####}", &[Arg::Int(1234567)]).unwrap(), "123,4567");
        assert!(format("{0,number,#.#x}", &pi).is_err());
        assert!(format("{0,number,#,}", &pi).is_err());
    }

    #[test]
    fn test_format_choice() {
        let template = "{0,choice,0#no files|1#one file|1<{0} files}";
        let render = |arg: Arg| format(template, &[arg]).unwrap();
        assert_eq!(render(Arg::Int(0)), "no files");
        assert_eq!(render(Arg::Int(1)), "one file");
        assert_eq!(render(Arg::Int(5)), "5 files");
        assert_eq!(render(Arg::Int(1234)), "1,234 files");
        assert_eq!(render(Arg::Float(1.5)), "1.5 files");
        assert_eq!(render(Arg::Int(-1)), "no files");
        assert_eq!(render(Arg::Null), "null");

        assert_eq!(
            format("{0,choice,0#'|'none|1#some}", &[Arg::Int(0)]).unwrap(),
            "|none"
        );
        assert!(format("{0,choice,0#a}", &args(&["hi"])).is_err());
        assert!(format("{0,choice,a#x}", &[Arg::Int(0)]).is_err());
        assert!(format("{0,choice,1#a|0#b}", &[Arg::Int(0)]).is_err());
        assert!(format("{0,choice,}", &[Arg::Int(0)]).is_err());
    }

    #[test]
    fn test_format_errors() {
        assert!(format("{0'}' %s", &args(&["hi"])).is_err());
        assert!(format("{0", &args(&["hi"])).is_err());
        assert!(format("{x}", &args(&["hi"])).is_err());
        assert!(format("{ 0 }", &args(&["hi"])).is_err());
        assert!(format("{0,date}", &args(&["hi"])).is_err());
        assert!(format("{0,TIME,short}", &[Arg::Int(0)]).is_err());
        assert!(format("{0,number}", &args(&["hi"])).is_err());
    }
}
