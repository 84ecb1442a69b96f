//! How numeric tokens become [`Number`]s.

use lexical_parse_float::FromLexical as _;
use lexical_parse_integer::FromLexical as _;
use typebind_core::{DeferredNumber, Number};
use typebind_format::{SyntaxError, TokenKind, TokenReader};

use crate::{Error, Result};

/// Converts the next numeric token into a [`Number`].
///
/// One strategy is active per engine and every adapter that produces
/// [`Number`]s goes through it, including the top-type codec.
pub trait ToNumberStrategy: Send + Sync + 'static {
    /// Read a number. `null` is consumed and yields `None`; a number or a
    /// string is converted; any other token is a syntax error.
    fn read_number(&self, reader: &mut dyn TokenReader) -> Result<Option<Number>>;
}

/// The text of the next number or string token, or `None` after consuming
/// a `null`.
pub fn next_number_text(reader: &mut dyn TokenReader) -> Result<Option<String>> {
    match reader.peek()? {
        TokenKind::Null => {
            reader.next_null()?;
            Ok(None)
        }
        TokenKind::Number | TokenKind::String => Ok(Some(reader.next_string()?)),
        found => Err(SyntaxError::new("a number", found, reader.path()).into()),
    }
}

/// The built-in number strategies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum NumberPolicy {
    /// Parse to the nearest `f64` right away. Large integers and long
    /// decimals lose precision.
    #[default]
    Double,
    /// Keep the text in a [`DeferredNumber`] and parse only on demand.
    /// Writing it back reproduces the input exactly.
    Deferred,
    /// Integers that fit become `i64`, everything else `f64`.
    LongOrDouble,
    /// Exact fixed-precision decimals; fails for values out of range.
    Decimal,
}

impl NumberPolicy {
    fn parse(self, text: &str) -> Option<Number> {
        let double = || {
            f64::from_lexical(text.as_bytes())
                .ok()
                .filter(|value| value.is_finite())
        };
        match self {
            NumberPolicy::Double => double().map(Number::Float),
            NumberPolicy::Deferred => Some(Number::Deferred(DeferredNumber::new(text))),
            NumberPolicy::LongOrDouble => i64::from_lexical(text.as_bytes())
                .ok()
                .map(Number::Int)
                .or_else(|| double().map(Number::Float)),
            NumberPolicy::Decimal => DeferredNumber::new(text)
                .to_decimal()
                .ok()
                .map(Number::Decimal),
        }
    }

    fn target(self) -> &'static str {
        match self {
            NumberPolicy::Double => "f64",
            NumberPolicy::Deferred => "deferred number",
            NumberPolicy::LongOrDouble => "i64 or f64",
            NumberPolicy::Decimal => "decimal",
        }
    }
}

impl ToNumberStrategy for NumberPolicy {
    fn read_number(&self, reader: &mut dyn TokenReader) -> Result<Option<Number>> {
        let Some(text) = next_number_text(reader)? else {
            return Ok(None);
        };
        match self.parse(&text) {
            Some(number) => Ok(Some(number)),
            None => Err(Error::conversion(text, self.target(), reader.path())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typebind_json::JsonReader;
    use typebind_testhelpers::test;

    fn read(policy: NumberPolicy, json: &str) -> Result<Option<Number>> {
        let mut reader = JsonReader::new(json);
        policy.read_number(&mut reader)
    }

    #[test]
    fn double_is_the_default() {
        assert_eq!(NumberPolicy::default(), NumberPolicy::Double);
        assert_eq!(read(NumberPolicy::Double, "2.5").unwrap(), Some(Number::Float(2.5)));
    }

    #[test]
    fn strings_holding_numbers_are_accepted() {
        assert_eq!(read(NumberPolicy::Double, r#""12""#).unwrap(), Some(Number::Float(12.0)));
    }

    #[test]
    fn null_reads_as_none() {
        assert_eq!(read(NumberPolicy::Deferred, "null").unwrap(), None);
    }

    #[test]
    fn long_or_double() {
        assert_eq!(read(NumberPolicy::LongOrDouble, "42").unwrap(), Some(Number::Int(42)));
        assert_eq!(
            read(NumberPolicy::LongOrDouble, "4.5").unwrap(),
            Some(Number::Float(4.5))
        );
        assert_eq!(
            read(NumberPolicy::LongOrDouble, "9223372036854775808").unwrap(),
            Some(Number::Float(9223372036854775808.0))
        );
    }

    #[test]
    fn decimal_is_exact() {
        let number = read(NumberPolicy::Decimal, "0.1").unwrap().unwrap();
        assert_eq!(number.to_string(), "0.1");
        assert!(read(NumberPolicy::Decimal, "1e400").is_err());
    }

    #[test]
    fn structural_token_is_a_syntax_error() {
        let err = read(NumberPolicy::Double, "[1]").unwrap_err();
        assert_eq!(err.code(), "typebind::syntax");
        insta::assert_snapshot!(err, @"Expected a number but was BEGIN_ARRAY at path $");
    }

    #[test]
    fn non_numeric_string_fails_to_convert() {
        let err = read(NumberPolicy::LongOrDouble, r#""abc""#).unwrap_err();
        insta::assert_snapshot!(err, @r#"cannot convert "abc" to i64 or f64 at path $"#);
    }
}
