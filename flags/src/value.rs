use std::fmt;

/// Typed value held by a registered flag.
///
/// The variant chosen at registration fixes the flag's type: every later
/// assignment is parsed into the same variant.
///
/// # Examples
///
/// ```
/// use shellkit_flags::FlagValue;
///
/// let top = FlagValue::Int(12);
/// assert_eq!(top.type_name(), "int");
/// assert_eq!(top.parse_same("19"), Ok(FlagValue::Int(19)));
/// assert!(top.parse_same("nineteen").is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum FlagValue {
    /// Boolean switch.
    Bool(bool),
    /// Signed integer.
    Int(i64),
    /// Unsigned integer.
    Uint(u64),
    /// Floating point number.
    Float(f64),
    /// Free-form text.
    Str(String),
}

impl FlagValue {
    /// Type hint printed after the flag name in help text. Booleans have
    /// none.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
        }
    }

    /// Returns `true` for the zero value of the variant (`false`, `0`, `""`).
    pub fn is_zero(&self) -> bool {
        match self {
            Self::Bool(b) => !b,
            Self::Int(n) => *n == 0,
            Self::Uint(n) => *n == 0,
            Self::Float(n) => *n == 0.0,
            Self::Str(s) => s.is_empty(),
        }
    }

    /// Returns `true` if this is a [`FlagValue::Bool`].
    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool(_))
    }

    /// Parses `text` into the same variant as `self`.
    ///
    /// # Errors
    ///
    /// Returns a short reason when the text does not convert.
    pub fn parse_same(&self, text: &str) -> Result<Self, String> {
        match self {
            Self::Bool(_) => parse_bool(text).map(Self::Bool),
            Self::Int(_) => parse_int(text).map(Self::Int),
            Self::Uint(_) => parse_uint(text).map(Self::Uint),
            Self::Float(_) => text
                .parse::<f64>()
                .map(Self::Float)
                .map_err(|e| e.to_string()),
            Self::Str(_) => Ok(Self::Str(text.to_string())),
        }
    }

    /// Returns the boolean, if this is a [`FlagValue::Bool`].
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the signed integer, if this is a [`FlagValue::Int`].
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the unsigned integer, if this is a [`FlagValue::Uint`].
    pub fn as_uint(&self) -> Option<u64> {
        match self {
            Self::Uint(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the float, if this is a [`FlagValue::Float`].
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the text, if this is a [`FlagValue::Str`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FlagValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Uint(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

fn parse_bool(text: &str) -> Result<bool, String> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err("parse error".to_string()),
    }
}

/// Signed integer with an optional sign and `0x`, `0o`, `0b` or leading
/// `0` (octal) prefix.
fn parse_int(text: &str) -> Result<i64, String> {
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = i128::from(parse_uint(body)?);
    let value = if negative { -magnitude } else { magnitude };
    i64::try_from(value).map_err(|_| "value out of range".to_string())
}

/// Unsigned integer with the same prefixes as [`parse_int`] and no sign.
fn parse_uint(text: &str) -> Result<u64, String> {
    let (digits, radix) = match text.get(..2).map(str::to_ascii_lowercase).as_deref() {
        Some("0x") => (&text[2..], 16),
        Some("0o") => (&text[2..], 8),
        Some("0b") => (&text[2..], 2),
        _ if text.len() > 1 && text.starts_with('0') => (&text[1..], 8),
        _ => (text, 10),
    };
    if digits.starts_with(['+', '-']) {
        return Err("invalid digit found in string".to_string());
    }
    u64::from_str_radix(digits, radix).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_spellings() {
        let flag = FlagValue::Bool(false);
        for text in ["1", "t", "T", "TRUE", "true", "True"] {
            assert_eq!(flag.parse_same(text), Ok(FlagValue::Bool(true)), "{text}");
        }
        for text in ["0", "f", "F", "FALSE", "false", "False"] {
            assert_eq!(flag.parse_same(text), Ok(FlagValue::Bool(false)), "{text}");
        }
        assert!(flag.parse_same("yes").is_err());
    }

    #[test]
    fn test_zero_values() {
        assert!(FlagValue::Bool(false).is_zero());
        assert!(FlagValue::Int(0).is_zero());
        assert!(FlagValue::Str(String::new()).is_zero());
        assert!(!FlagValue::Float(0.5).is_zero());
        assert!(!FlagValue::Uint(3).is_zero());
    }

    #[test]
    fn test_integer_base_prefixes() {
        let int = FlagValue::Int(0);
        assert_eq!(int.parse_same("0x10"), Ok(FlagValue::Int(16)));
        assert_eq!(int.parse_same("0X1f"), Ok(FlagValue::Int(31)));
        assert_eq!(int.parse_same("0o17"), Ok(FlagValue::Int(15)));
        assert_eq!(int.parse_same("017"), Ok(FlagValue::Int(15)));
        assert_eq!(int.parse_same("0b101"), Ok(FlagValue::Int(5)));
        assert_eq!(int.parse_same("-0x10"), Ok(FlagValue::Int(-16)));
        assert_eq!(int.parse_same("+7"), Ok(FlagValue::Int(7)));
        assert_eq!(int.parse_same("0"), Ok(FlagValue::Int(0)));
        assert_eq!(
            int.parse_same("-9223372036854775808"),
            Ok(FlagValue::Int(i64::MIN))
        );
        assert!(int.parse_same("9223372036854775808").is_err());
        assert!(int.parse_same("0x").is_err());
        assert!(int.parse_same("08").is_err());
        assert!(int.parse_same("--1").is_err());

        let uint = FlagValue::Uint(0);
        assert_eq!(uint.parse_same("0xff"), Ok(FlagValue::Uint(255)));
        assert!(uint.parse_same("+1").is_err());
        assert!(uint.parse_same("0x-1").is_err());
    }

    #[test]
    fn test_parse_keeps_variant() {
        assert_eq!(FlagValue::Uint(1).parse_same("7"), Ok(FlagValue::Uint(7)));
        assert!(FlagValue::Uint(1).parse_same("-7").is_err());
        assert_eq!(
            FlagValue::Float(0.0).parse_same("2.5"),
            Ok(FlagValue::Float(2.5))
        );
        assert_eq!(
            FlagValue::Str(String::new()).parse_same("-x"),
            Ok(FlagValue::Str("-x".into()))
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(FlagValue::Float(2.0).to_string(), "2");
        assert_eq!(FlagValue::Bool(true).to_string(), "true");
        assert_eq!(FlagValue::Str("a b".into()).to_string(), "a b");
    }
}
