#![doc = r#"
Parameter values and their textual form

Every parameter on a line is one of three things: an integer, a decimal or a
string. Numbers are written in their shortest form. Strings pick a quoting
strategy from their content alone, see [`quote_style`].
"#]

mod quote;
pub use quote::*;

use core::fmt;

#[doc = r#"
A single parameter of a [`Node`](crate::Node).

Integers and decimals compare by value, so `Int(1) == Decimal(1.0)`. A
decimal with a zero fraction is written without one, and reads back as an
integer.

# Example
```rust
# use rppx::prelude::*;
assert_eq!(ParamValue::from(0.25).to_string(), "0.25");
assert_eq!(ParamValue::from(0.0).to_string(), "0");
assert_eq!(ParamValue::from("ok !").to_string(), "\"ok !\"");
assert_eq!(ParamValue::Int(1), ParamValue::Decimal(1.0));
```
"#]
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ParamValue {
    /// An integer
    Int(i64),
    /// A decimal. `NaN` and infinities have no `.RPP` form, see [`ParamValue::decimal`]
    Decimal(f64),
    /// A string, stored without its quotes
    String(String),
}

impl ParamValue {
    /// Classify an unquoted token.
    ///
    /// Tokens that look like an integer or decimal become numbers, everything
    /// else is a string. An integer literal too large for an `i64` reads as a decimal.
    pub fn from_bare(token: &str) -> Self {
        match numeric_kind(token) {
            Some(NumericKind::Int) => match token.parse::<i64>() {
                Ok(v) => Self::Int(v),
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!("Integer literal {token} does not fit in 64 bits, reading it as a decimal");
                    token.parse::<f64>().map_or_else(|_| Self::String(token.to_owned()), Self::Decimal)
                }
            },
            Some(NumericKind::Decimal) => match token.parse::<f64>() {
                Ok(v) => Self::Decimal(v),
                Err(_) => Self::String(token.to_owned()),
            },
            None => Self::String(token.to_owned()),
        }
    }

    /// A decimal parameter, or `None` if `value` is `NaN` or infinite.
    ///
    /// Non-finite decimals are written as `NaN` or `inf` and read back as
    /// strings.
    pub fn decimal(value: f64) -> Option<Self> {
        value.is_finite().then_some(Self::Decimal(value))
    }

    /// Returns the string if this is a string parameter
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if this is an integer parameter
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the numeric value of an integer or decimal parameter
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Decimal(v) => Some(*v),
            Self::String(_) => None,
        }
    }

    /// True for string parameters
    pub const fn is_string(&self) -> bool {
        matches!(self, Self::String(_))
    }

    /// The style this parameter is written with. Numbers are always bare.
    pub fn quote_style(&self) -> QuoteStyle {
        match self {
            Self::String(s) => quote_style(s),
            _ => QuoteStyle::Bare,
        }
    }
}

impl PartialEq for ParamValue {
    fn eq(&self, other: &Self) -> bool {
        use ParamValue::*;
        match (self, other) {
            (Int(a), Int(b)) => a == b,
            (Decimal(a), Decimal(b)) => a == b,
            (Int(a), Decimal(b)) | (Decimal(b), Int(a)) => *a as f64 == *b,
            (String(a), String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => f.write_str(&format_int(*v)),
            Self::Decimal(v) => f.write_str(&format_decimal(*v)),
            Self::String(s) => f.write_str(&quote_string(s)),
        }
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ParamValue {
                fn from(value: $ty) -> Self {
                    Self::Int(value as i64)
                }
            }
        )*
    };
}
impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        Self::Decimal(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        Self::Decimal(value as f64)
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// Writes an integer parameter
pub fn format_int(value: i64) -> String {
    value.to_string()
}

/// Writes a decimal parameter.
///
/// This is the shortest text that reads back to the same value. A zero
/// fraction is dropped entirely, and no exponent is ever used.
///
/// ```rust
/// # use rppx::param::format_decimal;
/// assert_eq!(format_decimal(0.0), "0");
/// assert_eq!(format_decimal(101.555), "101.555");
/// assert_eq!(format_decimal(-10.1234), "-10.1234");
/// ```
pub fn format_decimal(value: f64) -> String {
    #[cfg(feature = "tracing")]
    if !value.is_finite() {
        tracing::warn!("Writing non-finite decimal {value}, it will read back as a string");
    }
    value.to_string()
}

/// The lexical class of a bare token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericKind {
    /// `-?[0-9]+`
    Int,
    /// `-?[0-9]+.[0-9]*` or `-?.[0-9]+`
    Decimal,
}

/// Returns the numeric class of `token`, or `None` if it reads as a string
pub fn numeric_kind(token: &str) -> Option<NumericKind> {
    let digits = token.strip_prefix('-').unwrap_or(token);
    let (whole, fraction) = match digits.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (digits, None),
    };
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(whole) {
        return None;
    }
    match fraction {
        None if !whole.is_empty() => Some(NumericKind::Int),
        Some(fraction) if all_digits(fraction) && !(whole.is_empty() && fraction.is_empty()) => {
            Some(NumericKind::Decimal)
        }
        _ => None,
    }
}

#[test]
fn classify_numbers() {
    assert_eq!(numeric_kind("0"), Some(NumericKind::Int));
    assert_eq!(numeric_kind("-10"), Some(NumericKind::Int));
    assert_eq!(numeric_kind("0.5"), Some(NumericKind::Decimal));
    assert_eq!(numeric_kind("-10.1234"), Some(NumericKind::Decimal));
    assert_eq!(numeric_kind("5."), Some(NumericKind::Decimal));
    assert_eq!(numeric_kind(".5"), Some(NumericKind::Decimal));
    assert_eq!(numeric_kind("1234{}"), None);
    assert_eq!(numeric_kind("-"), None);
    assert_eq!(numeric_kind("."), None);
    assert_eq!(numeric_kind("-."), None);
    assert_eq!(numeric_kind(""), None);
    assert_eq!(numeric_kind("1.2.3"), None);
    assert_eq!(numeric_kind("3c"), None);
    assert_eq!(numeric_kind("+5"), None);
}

#[test]
fn bare_tokens() {
    assert_eq!(ParamValue::from_bare("100"), ParamValue::Int(100));
    assert_eq!(ParamValue::from_bare("0.0"), ParamValue::Decimal(0.0));
    assert_eq!(ParamValue::from_bare("1234{}"), ParamValue::from("1234{}"));
    assert_eq!(
        ParamValue::from_bare("99999999999999999999"),
        ParamValue::Decimal(99999999999999999999.0)
    );
}

#[test]
fn format_numbers() {
    assert_eq!(format_int(0), "0");
    assert_eq!(format_int(-10), "-10");
    assert_eq!(format_decimal(0.5), "0.5");
    assert_eq!(format_decimal(0.125), "0.125");
    assert_eq!(format_decimal(-0.25), "-0.25");
    assert_eq!(format_decimal(3.0), "3");
}

#[test]
fn decimal_format_is_idempotent() {
    for x in [0.0, 0.5, 101.555, -10.1234, 1.0e-7, 123456789.125, 1.0 / 3.0] {
        let once = format_decimal(x);
        let reparsed: f64 = once.parse().unwrap();
        assert_eq!(format_decimal(reparsed), once);
    }
}

#[test]
fn non_finite_decimals() {
    assert_eq!(ParamValue::decimal(0.5), Some(ParamValue::Decimal(0.5)));
    assert_eq!(ParamValue::decimal(f64::NAN), None);
    assert_eq!(ParamValue::decimal(f64::NEG_INFINITY), None);
    assert_eq!(
        ParamValue::from_bare(&format_decimal(f64::INFINITY)),
        ParamValue::from("inf")
    );
}

#[test]
fn numeric_equality() {
    assert_eq!(ParamValue::Int(0), ParamValue::Decimal(-0.0));
    assert_ne!(ParamValue::Int(1), ParamValue::from("1"));
    assert_ne!(ParamValue::Decimal(0.5), ParamValue::Int(0));
}
