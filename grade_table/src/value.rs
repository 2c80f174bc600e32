//! Cell values as they appear in the host page's `data-value` attributes.

use serde::{Deserialize, Serialize};

pub const MISSING: &str = "Missing";
pub const UNGRADED: &str = "Ungraded";
/// Attribute text for a not-yet-due item. The page shows it as `Not due`.
pub const NOT_DUE: &str = "Not";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq)]
pub enum GradeValue {
    Percent(f64),
    Missing,
    Ungraded,
    NotDue,
}

impl GradeValue {
    /// Parse a `data-value` attribute. Anything that is not a sentinel is read
    /// with `parseFloat` rules, so garbage becomes `Percent(NaN)`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            MISSING => GradeValue::Missing,
            UNGRADED => GradeValue::Ungraded,
            NOT_DUE => GradeValue::NotDue,
            other => GradeValue::Percent(parse_float(other)),
        }
    }

    /// `Ungraded` and `NotDue` cells are the ones hypothesis mode lets the user fill in.
    pub fn is_hypothesizable(&self) -> bool {
        matches!(self, GradeValue::Ungraded | GradeValue::NotDue)
    }

    /// Text shown in the cell outside hypothesis mode for sentinel values.
    pub fn sentinel_label(&self) -> Option<&'static str> {
        match self {
            GradeValue::Missing => Some("Missing"),
            GradeValue::Ungraded => Some("Ungraded"),
            GradeValue::NotDue => Some("Not due"),
            GradeValue::Percent(_) => None,
        }
    }

    pub fn attribute(&self) -> String {
        match self {
            GradeValue::Missing => MISSING.to_string(),
            GradeValue::Ungraded => UNGRADED.to_string(),
            GradeValue::NotDue => NOT_DUE.to_string(),
            GradeValue::Percent(v) => format_js_number(*v),
        }
    }
}

/// Length of the longest prefix of `s` that forms a decimal literal
/// (optional sign, digits with an optional fraction, optional exponent).
fn decimal_prefix_len(s: &[u8]) -> usize {
    let mut i = 0;
    if i < s.len() && (s[i] == b'+' || s[i] == b'-') {
        i += 1;
    }
    let int_start = i;
    while i < s.len() && s[i].is_ascii_digit() {
        i += 1;
    }
    let mut digits = i - int_start;
    if i < s.len() && s[i] == b'.' {
        let frac_start = i + 1;
        let mut j = frac_start;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }
        digits += j - frac_start;
        if digits > 0 {
            i = j;
        }
    }
    if digits == 0 {
        return 0;
    }
    if i < s.len() && (s[i] == b'e' || s[i] == b'E') {
        let mut j = i + 1;
        if j < s.len() && (s[j] == b'+' || s[j] == b'-') {
            j += 1;
        }
        let exp_start = j;
        while j < s.len() && s[j].is_ascii_digit() {
            j += 1;
        }
        if j > exp_start {
            i = j;
        }
    }
    i
}

fn infinity_prefix(s: &str) -> Option<(f64, usize)> {
    let (sign, rest, skip) = match s.as_bytes().first() {
        Some(b'-') => (-1.0, &s[1..], 1),
        Some(b'+') => (1.0, &s[1..], 1),
        _ => (1.0, s, 0),
    };
    rest.starts_with("Infinity")
        .then(|| (sign * f64::INFINITY, skip + "Infinity".len()))
}

/// JavaScript `parseFloat`: leading whitespace is skipped and the longest
/// numeric prefix is used. No prefix means NaN.
pub fn parse_float(raw: &str) -> f64 {
    let s = raw.trim_start();
    if let Some((v, _)) = infinity_prefix(s) {
        return v;
    }
    let len = decimal_prefix_len(s.as_bytes());
    if len == 0 {
        return f64::NAN;
    }
    s[..len].parse::<f64>().unwrap_or(f64::NAN)
}

/// JavaScript `Number(string)`: the whole trimmed string must be numeric,
/// the empty string is zero.
pub fn parse_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    if let Some((v, len)) = infinity_prefix(s) {
        return if len == s.len() { v } else { f64::NAN };
    }
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u64::from_str_radix(hex, 16)
            .map(|v| v as f64)
            .unwrap_or(f64::NAN);
    }
    let len = decimal_prefix_len(s.as_bytes());
    if len != s.len() {
        return f64::NAN;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

/// Format a number the way it reads back out of an attribute: integers
/// without a trailing `.0`.
pub fn format_js_number(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Fractional digits that hold the exact decimal expansion of any `f64`.
const EXACT_DIGITS: usize = 1100;

/// Add one unit in the last place to a string of ASCII digits.
fn increment_digits(digits: &mut Vec<u8>) {
    for d in digits.iter_mut().rev() {
        if *d == b'9' {
            *d = b'0';
        } else {
            *d += 1;
            return;
        }
    }
    digits.insert(0, b'1');
}

/// `Number.prototype.toFixed` for the values a grade can take: the exact
/// value is rounded to `decimals` places with ties going away from zero.
pub fn to_fixed(v: f64, decimals: usize) -> String {
    if v.is_nan() {
        return "NaN".to_string();
    }
    if v.is_infinite() {
        return if v > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }

    let exact = format!("{:.*}", EXACT_DIGITS, v.abs());
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let frac = frac_part.as_bytes();

    let mut digits: Vec<u8> = int_part.bytes().collect();
    digits.extend((0..decimals).map(|i| frac.get(i).copied().unwrap_or(b'0')));
    if frac.get(decimals).is_some_and(|&d| d >= b'5') {
        increment_digits(&mut digits);
    }

    let split = digits.len() - decimals;
    let mut out = String::with_capacity(digits.len() + 2);
    if v < 0.0 {
        out.push('-');
    }
    out.extend(digits[..split].iter().map(|&d| d as char));
    if decimals > 0 {
        out.push('.');
        out.extend(digits[split..].iter().map(|&d| d as char));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinels() {
        assert_eq!(GradeValue::parse("Missing"), GradeValue::Missing);
        assert_eq!(GradeValue::parse("Ungraded"), GradeValue::Ungraded);
        assert_eq!(GradeValue::parse("Not"), GradeValue::NotDue);
        assert_eq!(GradeValue::parse("92.5"), GradeValue::Percent(92.5));
        assert!(GradeValue::NotDue.is_hypothesizable());
        assert!(!GradeValue::Missing.is_hypothesizable());
        assert_eq!(GradeValue::NotDue.sentinel_label(), Some("Not due"));
    }

    #[test]
    fn test_parse_float_prefix() {
        assert_eq!(parse_float("  42abc"), 42.0);
        assert_eq!(parse_float("-3.5e2x"), -350.0);
        assert_eq!(parse_float(".5"), 0.5);
        assert_eq!(parse_float("7."), 7.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_float("abc").is_nan());
        assert!(parse_float("").is_nan());
        assert!(parse_float(".").is_nan());
        assert!(matches!(GradeValue::parse("Pending"), GradeValue::Percent(v) if v.is_nan()));
    }

    #[test]
    fn test_parse_number_whole_string() {
        assert_eq!(parse_number(" 80 "), 80.0);
        assert_eq!(parse_number(""), 0.0);
        assert_eq!(parse_number("0x10"), 16.0);
        assert!(parse_number("80abc").is_nan());
        assert!(parse_number("e5").is_nan());
    }

    #[test]
    fn test_formatting() {
        assert_eq!(format_js_number(80.0), "80");
        assert_eq!(format_js_number(92.5), "92.5");
        assert_eq!(to_fixed(83.33333, 1), "83.3");
        assert_eq!(to_fixed(f64::NAN, 1), "NaN");
    }

    #[test]
    fn test_to_fixed_ties_round_up() {
        assert_eq!(to_fixed(81.25, 1), "81.3");
        assert_eq!(to_fixed(0.125, 2), "0.13");
        assert_eq!(to_fixed(2.5, 0), "3");
        assert_eq!(to_fixed(-2.5, 0), "-3");
        assert_eq!(to_fixed(99.95, 1), "100.0");
        // 1.005 is stored just below the tie
        assert_eq!(to_fixed(1.005, 2), "1.00");
        assert_eq!(to_fixed(-0.0, 1), "0.0");
        assert_eq!(to_fixed(7.0, 3), "7.000");
    }
}
