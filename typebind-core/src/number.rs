//! Numbers whose representation is chosen late.

use core::fmt;
use core::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use lexical_parse_float::FromLexical as _;
use lexical_parse_integer::FromLexical as _;
use rust_decimal::Decimal;

/// Numeric text could not be converted to the requested representation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumberFormatError {
    /// The offending text.
    pub text: String,
    /// The representation that was requested.
    pub target: &'static str,
}

impl NumberFormatError {
    pub(crate) fn new(text: &str, target: &'static str) -> Self {
        Self {
            text: text.to_owned(),
            target,
        }
    }
}

impl fmt::Display for NumberFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot convert {:?} to {}", self.text, self.target)
    }
}

impl core::error::Error for NumberFormatError {}

/// An exact decimal in canonical form: `digits × 10^exponent`, with no
/// leading or trailing zeros in `digits`. Zero has empty digits and is
/// never negative.
///
/// Two numerals denote the same value exactly when their canonical forms
/// are equal, so `1`, `1.0`, `1e0` and `10E-1` all compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExactDecimal {
    negative: bool,
    digits: Box<str>,
    exponent: i64,
}

/// Above this many zeros, [`ExactDecimal`]'s `Display` switches to
/// scientific notation.
const MAX_PLAIN_ZEROS: i64 = 1024;

impl ExactDecimal {
    /// Parse a decimal numeral: optional sign, digits with an optional
    /// fraction, and an optional exponent.
    pub fn parse(text: &str) -> Result<Self, NumberFormatError> {
        let err = || NumberFormatError::new(text, "exact decimal");
        let bytes = text.as_bytes();
        let mut i = 0;

        let negative = match bytes.first() {
            Some(b'-') => {
                i += 1;
                true
            }
            Some(b'+') => {
                i += 1;
                false
            }
            _ => false,
        };

        let mut digits = String::new();
        let int_start = i;
        while let Some(b @ b'0'..=b'9') = bytes.get(i) {
            digits.push(*b as char);
            i += 1;
        }
        let mut seen_digit = i > int_start;

        let mut fraction_len: i64 = 0;
        if bytes.get(i) == Some(&b'.') {
            i += 1;
            while let Some(b @ b'0'..=b'9') = bytes.get(i) {
                digits.push(*b as char);
                fraction_len += 1;
                i += 1;
            }
            seen_digit |= fraction_len > 0;
        }
        if !seen_digit {
            return Err(err());
        }

        let mut exponent: i64 = 0;
        if matches!(bytes.get(i), Some(b'e' | b'E')) {
            i += 1;
            let rest = text.get(i..).ok_or_else(err)?;
            let (exp_negative, exp_digits) = match rest.as_bytes().first() {
                Some(b'-') => (true, &rest[1..]),
                Some(b'+') => (false, &rest[1..]),
                _ => (false, rest),
            };
            if exp_digits.is_empty() || !exp_digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(err());
            }
            let magnitude = i64::from_lexical(exp_digits.as_bytes()).map_err(|_| err())?;
            exponent = if exp_negative { -magnitude } else { magnitude };
            i = bytes.len();
        }
        if i != bytes.len() {
            return Err(err());
        }

        let exponent = exponent.checked_sub(fraction_len).ok_or_else(err)?;
        Self::normalize(negative, &digits, exponent).ok_or_else(err)
    }

    fn normalize(negative: bool, digits: &str, exponent: i64) -> Option<Self> {
        let digits = digits.trim_start_matches('0');
        let trimmed = digits.trim_end_matches('0');
        if trimmed.is_empty() {
            return Some(Self {
                negative: false,
                digits: "".into(),
                exponent: 0,
            });
        }
        let dropped = i64::try_from(digits.len() - trimmed.len()).ok()?;
        Some(Self {
            negative,
            digits: trimmed.into(),
            exponent: exponent.checked_add(dropped)?,
        })
    }

    /// Whether this is zero.
    pub fn is_zero(&self) -> bool {
        self.digits.is_empty()
    }

    /// Whether this is a whole number.
    pub fn is_integer(&self) -> bool {
        self.exponent >= 0
    }

    /// The value as an `i128`, if it is whole and in range.
    pub fn to_i128(&self) -> Option<i128> {
        if self.is_zero() {
            return Some(0);
        }
        let magnitude = self.magnitude()?;
        if self.negative {
            // i128::MIN has no positive counterpart
            0i128.checked_sub_unsigned(magnitude)
        } else {
            i128::try_from(magnitude).ok()
        }
    }

    /// The value as a `u128`, if it is whole, non-negative and in range.
    pub fn to_u128(&self) -> Option<u128> {
        if self.is_zero() {
            return Some(0);
        }
        if self.negative {
            return None;
        }
        self.magnitude()
    }

    fn magnitude(&self) -> Option<u128> {
        if !self.is_integer() {
            return None;
        }
        let base = u128::from_lexical(self.digits.as_bytes()).ok()?;
        let scale = 10u128.checked_pow(u32::try_from(self.exponent).ok()?)?;
        base.checked_mul(scale)
    }
}

impl fmt::Display for ExactDecimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("0");
        }
        if self.negative {
            f.write_str("-")?;
        }
        let len = self.digits.len() as i64;
        if self.exponent > MAX_PLAIN_ZEROS || -self.exponent - len > MAX_PLAIN_ZEROS {
            let (first, rest) = self.digits.split_at(1);
            f.write_str(first)?;
            if !rest.is_empty() {
                write!(f, ".{rest}")?;
            }
            return write!(f, "E{}", self.exponent + len - 1);
        }
        if self.exponent >= 0 {
            f.write_str(&self.digits)?;
            for _ in 0..self.exponent {
                f.write_str("0")?;
            }
            Ok(())
        } else if -self.exponent < len {
            let split = (len + self.exponent) as usize;
            let (int, frac) = self.digits.split_at(split);
            write!(f, "{int}.{frac}")
        } else {
            f.write_str("0.")?;
            for _ in 0..(-self.exponent - len) {
                f.write_str("0")?;
            }
            f.write_str(&self.digits)
        }
    }
}

/// Numeric text that is kept as-is until a representation is requested.
///
/// Decoding with a deferred number never loses precision: writing it back
/// emits exactly the text that was read. Equality and hashing follow the
/// exact numeric value when the text is a decimal numeral, and fall back to
/// comparing text otherwise.
#[derive(Clone)]
pub struct DeferredNumber {
    text: Arc<str>,
    canonical: OnceLock<Option<ExactDecimal>>,
}

impl DeferredNumber {
    /// Wrap numeric text. The text is not validated.
    pub fn new(text: impl Into<Arc<str>>) -> Self {
        Self {
            text: text.into(),
            canonical: OnceLock::new(),
        }
    }

    /// The original text.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The exact value, if the text is a decimal numeral. Computed once.
    pub fn exact(&self) -> Option<&ExactDecimal> {
        self.canonical
            .get_or_init(|| ExactDecimal::parse(&self.text).ok())
            .as_ref()
    }

    /// Nearest `f64`.
    pub fn to_f64(&self) -> Result<f64, NumberFormatError> {
        f64::from_lexical(self.text.as_bytes())
            .map_err(|_| NumberFormatError::new(&self.text, "f64"))
    }

    /// As an `i64`. Whole numbers in any notation are accepted.
    pub fn to_i64(&self) -> Result<i64, NumberFormatError> {
        if let Ok(value) = i64::from_lexical(self.text.as_bytes()) {
            return Ok(value);
        }
        self.exact()
            .and_then(ExactDecimal::to_i128)
            .and_then(|value| i64::try_from(value).ok())
            .ok_or_else(|| NumberFormatError::new(&self.text, "i64"))
    }

    /// As an `i128`. Whole numbers in any notation are accepted.
    pub fn to_i128(&self) -> Result<i128, NumberFormatError> {
        self.exact()
            .and_then(ExactDecimal::to_i128)
            .ok_or_else(|| NumberFormatError::new(&self.text, "i128"))
    }

    /// As a `u128`. Whole non-negative numbers in any notation are accepted.
    pub fn to_u128(&self) -> Result<u128, NumberFormatError> {
        self.exact()
            .and_then(ExactDecimal::to_u128)
            .ok_or_else(|| NumberFormatError::new(&self.text, "u128"))
    }

    /// As a fixed-precision [`Decimal`].
    pub fn to_decimal(&self) -> Result<Decimal, NumberFormatError> {
        parse_decimal(&self.text)
    }
}

pub(crate) fn parse_decimal(text: &str) -> Result<Decimal, NumberFormatError> {
    let parsed = if text.contains(['e', 'E']) {
        Decimal::from_scientific(text)
    } else {
        Decimal::from_str_exact(text)
    };
    parsed.map_err(|_| NumberFormatError::new(text, "decimal"))
}

impl Default for DeferredNumber {
    fn default() -> Self {
        Self::new("0")
    }
}

impl PartialEq for DeferredNumber {
    fn eq(&self, other: &Self) -> bool {
        if self.text == other.text {
            return true;
        }
        match (self.exact(), other.exact()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for DeferredNumber {}

impl Hash for DeferredNumber {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self.exact() {
            Some(exact) => {
                0u8.hash(state);
                exact.hash(state);
            }
            None => {
                1u8.hash(state);
                self.text.hash(state);
            }
        }
    }
}

impl fmt::Display for DeferredNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for DeferredNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeferredNumber({})", self.text)
    }
}

impl From<&str> for DeferredNumber {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for DeferredNumber {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

/// A decoded number in whichever representation the active number policy
/// produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Number {
    /// Nearest double.
    Float(f64),
    /// A whole number that fit in 64 bits.
    Int(i64),
    /// Fixed-precision decimal.
    Decimal(Decimal),
    /// Original text, parsed on demand.
    Deferred(DeferredNumber),
}

impl Number {
    /// Nearest `f64`.
    pub fn to_f64(&self) -> Result<f64, NumberFormatError> {
        use rust_decimal::prelude::ToPrimitive as _;
        match self {
            Number::Float(value) => Ok(*value),
            Number::Int(value) => Ok(*value as f64),
            Number::Decimal(value) => value
                .to_f64()
                .ok_or_else(|| NumberFormatError::new(&value.to_string(), "f64")),
            Number::Deferred(value) => value.to_f64(),
        }
    }

    /// As an `i64`, if whole and in range.
    pub fn to_i64(&self) -> Result<i64, NumberFormatError> {
        match self {
            Number::Int(value) => Ok(*value),
            Number::Float(value) if value.fract() == 0.0 && value.abs() < 9.2e18 => {
                Ok(*value as i64)
            }
            Number::Deferred(value) => value.to_i64(),
            other => DeferredNumber::new(other.to_string()).to_i64(),
        }
    }
}

impl Default for Number {
    fn default() -> Self {
        Number::Int(0)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Float(value) if value.is_finite() => {
                f.write_str(ryu_js::Buffer::new().format_finite(*value))
            }
            Number::Float(value) => write!(f, "{value}"),
            Number::Int(value) => f.write_str(itoa::Buffer::new().format(*value)),
            Number::Decimal(value) => fmt::Display::fmt(value, f),
            Number::Deferred(value) => f.write_str(value.as_str()),
        }
    }
}

impl From<f64> for Number {
    fn from(value: f64) -> Self {
        Number::Float(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Number::Int(value)
    }
}

impl From<Decimal> for Number {
    fn from(value: Decimal) -> Self {
        Number::Decimal(value)
    }
}

impl From<DeferredNumber> for Number {
    fn from(value: DeferredNumber) -> Self {
        Number::Deferred(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebind_testhelpers::test;

    #[test]
    fn canonical_forms() {
        let canon = |text| ExactDecimal::parse(text).unwrap().to_string();
        assert_eq!(canon("1"), "1");
        assert_eq!(canon("1.0"), "1");
        assert_eq!(canon("10E-1"), "1");
        assert_eq!(canon("-0.000"), "0");
        assert_eq!(canon("1.25e2"), "125");
        assert_eq!(canon("0.0012"), "0.0012");
        assert_eq!(canon("-12.5"), "-12.5");
        assert_eq!(canon("1e3"), "1000");
    }

    #[test]
    fn rejects_non_numerals() {
        for text in ["", "-", "abc", "1e", "1.2.3", "1e5x", "."] {
            assert!(ExactDecimal::parse(text).is_err(), "{text}");
        }
    }

    #[test]
    fn huge_exponents_stay_small() {
        let exact = ExactDecimal::parse("1e999999").unwrap();
        assert_eq!(exact.to_string(), "1E999999");
        assert_eq!(exact.to_i128(), None);
    }

    #[test]
    fn integer_conversions() {
        let exact = ExactDecimal::parse("-1.5e1").unwrap();
        assert_eq!(exact.to_i128(), Some(-15));
        assert_eq!(exact.to_u128(), None);
        assert_eq!(ExactDecimal::parse("2.5").unwrap().to_i128(), None);
    }

    #[test]
    fn number_display_uses_shortest_form() {
        assert_eq!(Number::Float(1.0).to_string(), "1");
        assert_eq!(Number::Float(2.5).to_string(), "2.5");
        assert_eq!(Number::Int(-3).to_string(), "-3");
        assert_eq!(Number::Deferred("1e22".into()).to_string(), "1e22");
    }
}
