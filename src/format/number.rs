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

//! Decimal helpers shared by both template styles.

/// Inserts `,` between groups of three integer digits. A leading `-` is kept in front.
pub(crate) fn group_digits(digits: &str) -> String {
    group_digits_by(digits, 3)
}

/// Inserts `,` between groups of `size` integer digits; a `size` of 0 leaves them ungrouped.
pub(crate) fn group_digits_by(digits: &str, size: usize) -> String {
    let (sign, digits) = match digits.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", digits),
    };
    if size == 0 {
        return format!("{sign}{digits}");
    }

    let mut text = String::with_capacity(sign.len() + digits.len() + digits.len() / size);
    text.push_str(sign);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % size == 0 {
            text.push(',');
        }
        text.push(c);
    }
    text
}

/// Renders a non-negative finite `v` with exactly `precision` fraction digits, ties to even on
/// the exact binary value.
pub(crate) fn round_half_even(v: f64, precision: usize) -> String {
    format!("{v:.precision$}")
}

/// Renders a non-negative finite `v` with exactly `precision` fraction digits, rounding half up
/// on the shortest decimal representation of `v`.
pub(crate) fn round_half_up(v: f64, precision: usize) -> String {
    let shortest = v.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    if frac_part.len() <= precision {
        let mut text = String::from(int_part);
        if precision > 0 {
            text.push('.');
            text.push_str(frac_part);
            text.extend(std::iter::repeat_n('0', precision - frac_part.len()));
        }
        return text;
    }

    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().take(precision))
        .collect();
    if frac_part.as_bytes()[precision] >= b'5' && increment(&mut digits) {
        digits.insert(0, b'1');
    }

    let int_len = digits.len() - precision;
    let mut text = String::with_capacity(digits.len() + 1);
    text.extend(digits[..int_len].iter().map(|&b| char::from(b)));
    if precision > 0 {
        text.push('.');
        text.extend(digits[int_len..].iter().map(|&b| char::from(b)));
    }
    text
}

/// Rounds a non-negative finite `v` to `count` significant digits, rounding half up on the
/// shortest decimal representation of `v`.
///
/// Returns the digits and the decimal exponent of the first digit.
pub(crate) fn round_significant(v: f64, count: usize) -> (Vec<u8>, i32) {
    let shortest = format!("{v:e}");
    let (mantissa, exponent) = shortest.split_once('e').unwrap_or((shortest.as_str(), "0"));
    let mut exponent: i32 = exponent.parse().unwrap_or_default();

    let mut digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let round_up = digits.get(count).is_some_and(|&d| d >= b'5');
    digits.resize(count, b'0');
    if round_up && increment(&mut digits) {
        digits.insert(0, b'1');
        digits.truncate(count);
        exponent += 1;
    }
    (digits, exponent)
}

// Adds one to the last ASCII digit. Returns whether the carry ran past the first digit.
fn increment(digits: &mut [u8]) -> bool {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits("0"), "0");
        assert_eq!(group_digits("123"), "123");
        assert_eq!(group_digits("1234"), "1,234");
        assert_eq!(group_digits("1234567"), "1,234,567");
        assert_eq!(group_digits("-123456"), "-123,456");
        assert_eq!(group_digits_by("1234567", 4), "123,4567");
        assert_eq!(group_digits_by("1234567", 0), "1234567");
    }

    #[test]
    fn test_round_half_even() {
        assert_eq!(round_half_even(2.5, 0), "2");
        assert_eq!(round_half_even(3.14159, 3), "3.142");
        assert_eq!(round_half_even(1.0, 2), "1.00");
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5, 0), "3");
        assert_eq!(round_half_up(0.125, 2), "0.13");
        assert_eq!(round_half_up(1.005, 2), "1.01");
        assert_eq!(round_half_up(9.995, 2), "10.00");
        assert_eq!(round_half_up(99.5, 0), "100");
        assert_eq!(round_half_up(3.14159, 6), "3.141590");
        assert_eq!(round_half_up(42.0, 0), "42");
        assert_eq!(round_half_up(0.0, 1), "0.0");
    }

    #[test]
    fn test_round_significant() {
        assert_eq!(round_significant(1.125, 3), (b"113".to_vec(), 0));
        assert_eq!(round_significant(2.5, 1), (b"3".to_vec(), 0));
        assert_eq!(round_significant(0.15, 1), (b"2".to_vec(), -1));
        assert_eq!(round_significant(9.96, 2), (b"10".to_vec(), 1));
        assert_eq!(round_significant(12.0, 4), (b"1200".to_vec(), 1));
        assert_eq!(round_significant(0.0, 2), (b"00".to_vec(), 0));
    }
}
