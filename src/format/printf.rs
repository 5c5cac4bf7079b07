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

//! printf-style templates: `%[index$][flags][width][.precision]conversion`.
//!
//! Supported conversions are `s S b B c C d o x X e E f g G % n`. Flags are `-#+ 0,(<`.
//! Any malformed specifier, flag that does not apply to its conversion, missing argument, or
//! argument of the wrong type fails the whole template.

use crate::Error;
use crate::format::Arg;
use crate::format::number::group_digits;
use crate::format::number::round_half_up;
use crate::format::number::round_significant;

const DEFAULT_PRECISION: usize = 6;

#[derive(Debug, Default, Clone, Copy)]
struct Flags {
    left_justify: bool,
    alternate: bool,
    plus: bool,
    leading_space: bool,
    zero_pad: bool,
    group: bool,
    parentheses: bool,
    previous: bool,
}

impl Flags {
    fn set(&mut self, c: char) -> Option<Result<(), Error>> {
        let flag = match c {
            '-' => &mut self.left_justify,
            '#' => &mut self.alternate,
            '+' => &mut self.plus,
            ' ' => &mut self.leading_space,
            '0' => &mut self.zero_pad,
            ',' => &mut self.group,
            '(' => &mut self.parentheses,
            '<' => &mut self.previous,
            _ => return None,
        };
        if *flag {
            return Some(Err(Error::new("duplicate format flag").with_context("flag", c)));
        }
        *flag = true;
        Some(Ok(()))
    }
}

#[derive(Debug)]
struct Spec {
    explicit_index: Option<usize>,
    flags: Flags,
    width: Option<usize>,
    precision: Option<usize>,
    conversion: char,
}

/// Substitutes `args` into the printf-style specifiers of `template`.
pub fn format(template: &str, args: &[Arg]) -> Result<String, Error> {
    let mut text = String::with_capacity(template.len());
    let mut ordinary = 0usize;
    let mut last: Option<usize> = None;

    let mut rest = template;
    while let Some(pos) = rest.find('%') {
        text.push_str(&rest[..pos]);
        let (spec, remaining) = parse_spec(&rest[pos + 1..])?;
        rest = remaining;

        match spec.conversion {
            '%' => {
                check_percent(&spec)?;
                justify(&mut text, "%", &spec);
                continue;
            }
            'n' => {
                check_line_separator(&spec)?;
                text.push('\n');
                continue;
            }
            _ => {}
        }

        check_flags(&spec)?;
        let index = if spec.flags.previous {
            last.ok_or_else(|| missing_argument(&spec))?
        } else if let Some(explicit) = spec.explicit_index {
            explicit
        } else {
            ordinary += 1;
            ordinary - 1
        };
        let arg = args.get(index).ok_or_else(|| missing_argument(&spec))?;
        last = Some(index);

        let rendered = render(arg, &spec)?;
        justify(&mut text, &rendered, &spec);
    }
    text.push_str(rest);
    Ok(text)
}

fn parse_spec(s: &str) -> Result<(Spec, &str), Error> {
    let bytes = s.as_bytes();
    let mut pos = 0;

    let digits_at = |from: usize| {
        bytes[from..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut explicit_index = None;
    let n = digits_at(pos);
    if n > 0 && bytes.get(pos + n) == Some(&b'$') {
        let index = parse_number(&s[pos..pos + n])?;
        if index == 0 {
            return Err(Error::new("illegal format argument index").with_context("index", index));
        }
        explicit_index = Some(index - 1);
        pos += n + 1;
    }

    let mut flags = Flags::default();
    while let Some(&b) = bytes.get(pos) {
        match flags.set(char::from(b)) {
            Some(result) => result?,
            None => break,
        }
        pos += 1;
    }

    let mut width = None;
    let n = digits_at(pos);
    if n > 0 {
        width = Some(parse_number(&s[pos..pos + n])?);
        pos += n;
    }

    let mut precision = None;
    if bytes.get(pos) == Some(&b'.') {
        let n = digits_at(pos + 1);
        if n == 0 {
            return Err(unknown_conversion("."));
        }
        precision = Some(parse_number(&s[pos + 1..pos + 1 + n])?);
        pos += n + 1;
    }

    let conversion = match s[pos..].chars().next() {
        Some(c @ ('t' | 'T')) => {
            return Err(Error::new("unsupported date/time conversion").with_context("conversion", c));
        }
        Some(c) if c.is_ascii_alphabetic() || c == '%' => c,
        Some(c) => return Err(unknown_conversion(c)),
        None => return Err(unknown_conversion('%')),
    };

    let spec = Spec {
        explicit_index,
        flags,
        width,
        precision,
        conversion,
    };
    Ok((spec, &s[pos + 1..]))
}

fn parse_number(digits: &str) -> Result<usize, Error> {
    digits.parse().map_err(|err| {
        Error::new("illegal format number")
            .with_context("digits", digits)
            .with_source(err)
    })
}

fn unknown_conversion(c: impl ToString) -> Error {
    Error::new("unknown format conversion").with_context("conversion", c)
}

fn missing_argument(spec: &Spec) -> Error {
    Error::new("missing format argument").with_context("conversion", spec.conversion)
}

fn mismatch(spec: &Spec, flag: char) -> Error {
    Error::new("format flag does not apply to conversion")
        .with_context("conversion", spec.conversion)
        .with_context("flag", flag)
}

fn reject_flags(spec: &Spec, rejected: &[char]) -> Result<(), Error> {
    let f = spec.flags;
    for &flag in rejected {
        let set = match flag {
            '-' => f.left_justify,
            '#' => f.alternate,
            '+' => f.plus,
            ' ' => f.leading_space,
            '0' => f.zero_pad,
            ',' => f.group,
            '(' => f.parentheses,
            _ => false,
        };
        if set {
            return Err(mismatch(spec, flag));
        }
    }
    Ok(())
}

fn reject_precision(spec: &Spec) -> Result<(), Error> {
    match spec.precision {
        Some(precision) => Err(Error::new("illegal format precision")
            .with_context("conversion", spec.conversion)
            .with_context("precision", precision)),
        None => Ok(()),
    }
}

fn require_width(spec: &Spec) -> Result<(), Error> {
    if spec.width.is_none() && (spec.flags.left_justify || spec.flags.zero_pad) {
        return Err(Error::new("missing format width").with_context("conversion", spec.conversion));
    }
    Ok(())
}

fn check_numeric(spec: &Spec) -> Result<(), Error> {
    require_width(spec)?;
    let f = spec.flags;
    if (f.plus && f.leading_space) || (f.left_justify && f.zero_pad) {
        return Err(Error::new("illegal format flags").with_context("conversion", spec.conversion));
    }
    Ok(())
}

fn check_percent(spec: &Spec) -> Result<(), Error> {
    reject_precision(spec)?;
    reject_flags(spec, &['#', '+', ' ', '0', ',', '('])?;
    if spec.flags.previous {
        return Err(mismatch(spec, '<'));
    }
    require_width(spec)
}

fn check_line_separator(spec: &Spec) -> Result<(), Error> {
    reject_precision(spec)?;
    if spec.width.is_some() {
        return Err(Error::new("illegal format width").with_context("conversion", 'n'));
    }
    reject_flags(spec, &['-', '#', '+', ' ', '0', ',', '('])?;
    if spec.flags.previous {
        return Err(mismatch(spec, '<'));
    }
    Ok(())
}

fn check_flags(spec: &Spec) -> Result<(), Error> {
    match spec.conversion {
        's' | 'S' | 'b' | 'B' => {
            require_width(spec)?;
            reject_flags(spec, &['#', '+', ' ', '0', ',', '('])
        }
        'c' | 'C' => {
            reject_precision(spec)?;
            require_width(spec)?;
            reject_flags(spec, &['#', '+', ' ', '0', ',', '('])
        }
        'd' => {
            reject_precision(spec)?;
            check_numeric(spec)?;
            reject_flags(spec, &['#'])
        }
        'o' | 'x' | 'X' => {
            reject_precision(spec)?;
            check_numeric(spec)?;
            reject_flags(spec, &['+', ' ', ',', '('])
        }
        'e' | 'E' => {
            check_numeric(spec)?;
            reject_flags(spec, &[','])
        }
        'f' => check_numeric(spec),
        'g' | 'G' => {
            check_numeric(spec)?;
            reject_flags(spec, &['#'])
        }
        c => Err(unknown_conversion(c)),
    }
}

fn illegal_conversion(spec: &Spec, arg: &Arg) -> Error {
    Error::new("illegal format conversion")
        .with_context("conversion", spec.conversion)
        .with_context("arg", format!("{arg:?}"))
}

fn render(arg: &Arg, spec: &Spec) -> Result<String, Error> {
    let uppercase = spec.conversion.is_ascii_uppercase();
    let rendered = match (spec.conversion.to_ascii_lowercase(), arg) {
        ('b', Arg::Null) => "false".to_string(),
        ('b', Arg::Bool(v)) => v.to_string(),
        ('b', _) => "true".to_string(),
        (_, Arg::Null) => "null".to_string(),
        ('s', arg) => arg.to_string(),
        ('c', Arg::Char(v)) => v.to_string(),
        ('c', Arg::Int(v)) => u32::try_from(*v)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| illegal_conversion(spec, arg))?
            .to_string(),
        ('d', Arg::Int(v)) => render_decimal(*v, spec),
        ('o' | 'x', Arg::Int(v)) => render_radix(*v, spec),
        ('e' | 'f' | 'g', Arg::Float(v)) => render_float(*v, spec),
        _ => return Err(illegal_conversion(spec, arg)),
    };

    let rendered = match (spec.conversion.to_ascii_lowercase(), spec.precision) {
        ('s' | 'b', Some(precision)) => rendered.chars().take(precision).collect(),
        _ => rendered,
    };
    Ok(if uppercase {
        rendered.to_uppercase()
    } else {
        rendered
    })
}

fn render_decimal(v: i64, spec: &Spec) -> String {
    let digits = v.unsigned_abs().to_string();
    let digits = if spec.flags.group {
        group_digits(&digits)
    } else {
        digits
    };
    signed(v < 0, digits, spec)
}

fn render_radix(v: i64, spec: &Spec) -> String {
    // negative values are rendered as their two's complement
    let v = v as u64;
    let (prefix, digits) = match spec.conversion {
        'o' => ("0", format!("{v:o}")),
        _ => ("0x", format!("{v:x}")),
    };
    let prefix = if spec.flags.alternate { prefix } else { "" };
    zero_padded(prefix, &digits, "", spec)
}

fn render_float(v: f64, spec: &Spec) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        let f = spec.flags;
        return match (v < 0.0, f.parentheses, f.plus, f.leading_space) {
            (true, true, _, _) => "(Infinity)".to_string(),
            (true, false, _, _) => "-Infinity".to_string(),
            (false, _, true, _) => "+Infinity".to_string(),
            (false, _, false, true) => " Infinity".to_string(),
            (false, _, false, false) => "Infinity".to_string(),
        };
    }

    let precision = spec.precision.unwrap_or(DEFAULT_PRECISION);
    let abs = v.abs();
    let digits = match spec.conversion.to_ascii_lowercase() {
        'e' => scientific(abs, precision),
        'f' => fixed(abs, precision, spec),
        _ => general(abs, precision, spec),
    };
    signed(v.is_sign_negative(), digits, spec)
}

fn fixed(abs: f64, precision: usize, spec: &Spec) -> String {
    let rounded = round_half_up(abs, precision);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let mut digits = if spec.flags.group {
        group_digits(int_part)
    } else {
        int_part.to_string()
    };
    if !frac_part.is_empty() || spec.flags.alternate {
        digits.push('.');
        digits.push_str(frac_part);
    }
    digits
}

fn scientific(abs: f64, precision: usize) -> String {
    let (digits, exponent) = round_significant(abs, precision + 1);
    let mut mantissa = String::from(char::from(digits[0]));
    if precision > 0 {
        mantissa.push('.');
        mantissa.extend(digits[1..].iter().map(|&d| char::from(d)));
    }
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{mantissa}e{sign}{:02}", exponent.unsigned_abs())
}

fn general(abs: f64, precision: usize, spec: &Spec) -> String {
    let precision = precision.max(1);
    if abs == 0.0 {
        return fixed(abs, precision - 1, spec);
    }

    let (_, exponent) = round_significant(abs, precision);
    let exponent = i64::from(exponent);
    if (-4..precision as i64).contains(&exponent) {
        let fraction = (precision as i64 - 1 - exponent).max(0) as usize;
        fixed(abs, fraction, spec)
    } else {
        scientific(abs, precision - 1)
    }
}

fn signed(negative: bool, digits: String, spec: &Spec) -> String {
    let f = spec.flags;
    let (prefix, suffix) = match (negative, f.parentheses, f.plus, f.leading_space) {
        (true, true, _, _) => ("(", ")"),
        (true, false, _, _) => ("-", ""),
        (false, _, true, _) => ("+", ""),
        (false, _, false, true) => (" ", ""),
        (false, _, false, false) => ("", ""),
    };
    zero_padded(prefix, &digits, suffix, spec)
}

fn zero_padded(prefix: &str, digits: &str, suffix: &str, spec: &Spec) -> String {
    let len = prefix.len() + digits.chars().count() + suffix.len();
    let zeros = match spec.width {
        Some(width) if spec.flags.zero_pad && width > len => width - len,
        _ => 0,
    };

    let mut text = String::with_capacity(len + zeros);
    text.push_str(prefix);
    text.extend(std::iter::repeat_n('0', zeros));
    text.push_str(digits);
    text.push_str(suffix);
    text
}

fn justify(text: &mut String, rendered: &str, spec: &Spec) {
    let len = rendered.chars().count();
    let padding = match spec.width {
        Some(width) if width > len => width - len,
        _ => 0,
    };

    if spec.flags.left_justify {
        text.push_str(rendered);
        text.extend(std::iter::repeat_n(' ', padding));
    } else {
        text.extend(std::iter::repeat_n(' ', padding));
        text.push_str(rendered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(template: &str, args: &[Arg]) -> String {
        format(template, args).unwrap()
    }

    #[test]
    fn test_strings() {
        let hi = [Arg::from("hi")];
        assert_eq!(fmt("%s", &hi), "hi");
        assert_eq!(fmt("{0'}' %s", &hi), "{0'}' hi");
        assert_eq!(fmt("[%5s]", &hi), "[   hi]");
        assert_eq!(fmt("[%-5s]", &hi), "[hi   ]");
        assert_eq!(fmt("%.1s", &hi), "h");
        assert_eq!(fmt("%S", &hi), "HI");
        assert_eq!(fmt("%s %s", &[Arg::Null, Arg::from(1.0)]), "null 1.0");
        assert_eq!(fmt("no conversions", &hi), "no conversions");
        assert_eq!(fmt("100%% %s", &hi), "100% hi");
        assert_eq!(fmt("a%nb", &hi), "a\nb");
    }

    #[test]
    fn test_argument_indexes() {
        let args = [Arg::from("a"), Arg::from("b")];
        assert_eq!(fmt("%2$s %1$s", &args), "b a");
        assert_eq!(fmt("%s %<s %s", &args), "a a b");
        assert_eq!(fmt("%2$s %s", &args), "b a");
        assert_eq!(fmt("%s", &args), "a");
    }

    #[test]
    fn test_booleans_and_chars() {
        assert_eq!(fmt("%b", &[Arg::Null]), "false");
        assert_eq!(fmt("%b", &[Arg::from(false)]), "false");
        assert_eq!(fmt("%B", &[Arg::from("x")]), "TRUE");
        assert_eq!(fmt("%c", &[Arg::from('x')]), "x");
        assert_eq!(fmt("%c", &[Arg::from(65)]), "A");
        assert_eq!(fmt("%C", &[Arg::from('x')]), "X");
    }

    #[test]
    fn test_integers() {
        let v = [Arg::from(1234567)];
        assert_eq!(fmt("%d", &v), "1234567");
        assert_eq!(fmt("%,d", &v), "1,234,567");
        assert_eq!(fmt("%+d", &v), "+1234567");
        assert_eq!(fmt("%010d", &[Arg::from(-42)]), "-000000042");
        assert_eq!(fmt("%(d", &[Arg::from(-42)]), "(42)");
        assert_eq!(fmt("% d", &[Arg::from(42)]), " 42");
        assert_eq!(fmt("[%-5d]", &[Arg::from(42)]), "[42   ]");
        assert_eq!(fmt("%x", &[Arg::from(255)]), "ff");
        assert_eq!(fmt("%#X", &[Arg::from(255)]), "0XFF");
        assert_eq!(fmt("%#o", &[Arg::from(8)]), "010");
        assert_eq!(fmt("%x", &[Arg::from(-1)]), "ffffffffffffffff");
        assert_eq!(fmt("%08x", &[Arg::from(255)]), "000000ff");
        assert_eq!(fmt("%d", &[Arg::Null]), "null");
    }

    #[test]
    fn test_floats() {
        assert_eq!(fmt("%f", &[Arg::from(3.14159)]), "3.141590");
        assert_eq!(fmt("%.2f", &[Arg::from(0.125)]), "0.13");
        assert_eq!(fmt("%.0f", &[Arg::from(2.5)]), "3");
        assert_eq!(fmt("%,.1f", &[Arg::from(-1234.56)]), "-1,234.6");
        assert_eq!(fmt("%08.2f", &[Arg::from(3.14159)]), "00003.14");
        assert_eq!(fmt("%e", &[Arg::from(12345.678)]), "1.234568e+04");
        assert_eq!(fmt("%.2E", &[Arg::from(0.000123)]), "1.23E-04");
        assert_eq!(fmt("%g", &[Arg::from(12345.678)]), "12345.7");
        assert_eq!(fmt("%g", &[Arg::from(0.00001234)]), "1.23400e-05");
        assert_eq!(fmt("%f", &[Arg::from(f64::NAN)]), "NaN");
        assert_eq!(fmt("%+f", &[Arg::from(f64::INFINITY)]), "+Infinity");
    }

    #[test]
    fn test_scientific_rounds_half_up() {
        assert_eq!(fmt("%.2e", &[Arg::from(1.125)]), "1.13e+00");
        assert_eq!(fmt("%.0e", &[Arg::from(2.5)]), "3e+00");
        assert_eq!(fmt("%.0e", &[Arg::from(0.15)]), "2e-01");
        assert_eq!(fmt("%.1e", &[Arg::from(9.96)]), "1.0e+01");
        assert_eq!(fmt("%e", &[Arg::from(0.0)]), "0.000000e+00");
        assert_eq!(fmt("%.3e", &[Arg::from(-1.0)]), "-1.000e+00");
        assert_eq!(fmt("%.2g", &[Arg::from(0.000099996)]), "0.00010");
        assert_eq!(fmt("%.3g", &[Arg::from(999.5)]), "1.00e+03");
    }

    #[test]
    fn test_failures() {
        let hi = [Arg::from("hi")];
        for template in [
            "%0.5s", "%-s", "%05s", "%#s", "%+s", "%q", "%", "abc %", "%.s", "%d", "%f", "%c",
            "%s %s", "%3$s", "%0$s", "%<s", "%.2d", "%--5s", "%tY", "%-05d", "%+ d", "%5n",
        ] {
            assert!(format(template, &hi).is_err(), "{template} should fail");
        }
        assert!(format("%d", &[Arg::from(1.5)]).is_err());
        assert!(format("%f", &[Arg::from(1)]).is_err());
        assert!(format("%c", &[Arg::from(-1)]).is_err());
    }
}
