//! Typed conversion of raw option values
//!
//! Every supported type tag maps to one statically defined conversion
//! function. Nothing is synthesized from the tag text at runtime; a tag that
//! is not in the registry simply fails to cast.

use crate::error::{ArgError, Result};
use std::fmt;
use std::str::FromStr;

/// A converted option value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// `bool`
    Bool(bool),
    /// `chr`, a single character
    Chr(char),
    /// `int`
    Int(i64),
    /// `float`
    Float(f64),
    /// `str`
    Str(String),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Value::Chr(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Floats accept integer values too
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }
}

/// Closed set of type tags an option may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Bool,
    Chr,
    Int,
    Float,
    Str,
}

type Caster = fn(&str) -> Option<Value>;

impl TypeTag {
    /// Tag name as written in option declarations
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Bool => "bool",
            TypeTag::Chr => "chr",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Str => "str",
        }
    }

    fn caster(&self) -> Caster {
        match self {
            TypeTag::Bool => cast_bool,
            TypeTag::Chr => cast_chr,
            TypeTag::Int => cast_int,
            TypeTag::Float => cast_float,
            TypeTag::Str => cast_str,
        }
    }

    /// Convert `raw` according to this tag
    pub fn cast(&self, raw: &str) -> Result<Value> {
        (self.caster())(raw).ok_or_else(|| ArgError::type_cast(raw, self.as_str()))
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "bool" => Ok(TypeTag::Bool),
            "chr" => Ok(TypeTag::Chr),
            "int" => Ok(TypeTag::Int),
            "float" => Ok(TypeTag::Float),
            "str" => Ok(TypeTag::Str),
            _ => Err(()),
        }
    }
}

/// Cast a raw value given the textual name of its type tag
///
/// Fails with [`ArgError::TypeCast`] when the tag is unknown or the value
/// does not convert.
pub fn cast(raw_value: &str, type_tag: &str) -> Result<Value> {
    let tag = type_tag
        .parse::<TypeTag>()
        .map_err(|_| ArgError::type_cast(raw_value, type_tag))?;
    tag.cast(raw_value)
}

fn cast_bool(raw: &str) -> Option<Value> {
    match raw {
        "True" | "" => Some(Value::Bool(true)),
        "False" => Some(Value::Bool(false)),
        _ => None,
    }
}

fn cast_chr(raw: &str) -> Option<Value> {
    unescape(raw)?.chars().next().map(Value::Chr)
}

fn cast_int(raw: &str) -> Option<Value> {
    let trimmed = raw.trim();
    let (sign, digits) = match trimmed.as_bytes().first()? {
        b'+' | b'-' => trimmed.split_at(1),
        _ => ("", trimmed),
    };
    // underscores only between digits
    if digits.is_empty()
        || digits.starts_with('_')
        || digits.ends_with('_')
        || digits.contains("__")
        || !digits.bytes().all(|b| b.is_ascii_digit() || b == b'_')
    {
        return None;
    }
    let cleaned: String = sign.chars().chain(digits.chars().filter(|&c| c != '_')).collect();
    cleaned.parse::<i64>().ok().map(Value::Int)
}

fn cast_float(raw: &str) -> Option<Value> {
    raw.trim().parse::<f64>().ok().map(Value::Float)
}

fn cast_str(raw: &str) -> Option<Value> {
    Some(Value::Str(raw.to_string()))
}

/// Interpret `raw` as the body of a quoted string literal
///
/// Returns `None` for a dangling backslash or a malformed numeric escape.
/// Unrecognised escapes are kept verbatim, backslash included.
pub fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let escape = chars.next()?;
        match escape {
            '\n' => {}
            '\\' => out.push('\\'),
            '\'' => out.push('\''),
            '"' => out.push('"'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'v' => out.push('\x0b'),
            '0'..='7' => {
                let mut code = escape.to_digit(8)?;
                for _ in 0..2 {
                    match chars.peek().and_then(|d| d.to_digit(8)) {
                        Some(d) => {
                            code = code * 8 + d;
                            chars.next();
                        }
                        None => break,
                    }
                }
                out.push(char::from_u32(code)?);
            }
            'x' => out.push(hex_escape(&mut chars, 2)?),
            'u' => out.push(hex_escape(&mut chars, 4)?),
            'U' => out.push(hex_escape(&mut chars, 8)?),
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }

    Some(out)
}

fn hex_escape(chars: &mut impl Iterator<Item = char>, width: usize) -> Option<char> {
    let mut code = 0u32;
    for _ in 0..width {
        code = code * 16 + chars.next()?.to_digit(16)?;
    }
    char::from_u32(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_casts() {
        assert_eq!(cast("True", "bool").unwrap(), Value::Bool(true));
        assert_eq!(cast("", "bool").unwrap(), Value::Bool(true));
        assert_eq!(cast("False", "bool").unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_bool_rejects_other_spellings() {
        for raw in ["x", "true", "false", "1", "0", "TRUE"] {
            let err = cast(raw, "bool").unwrap_err();
            assert_eq!(
                err,
                ArgError::TypeCast {
                    value: raw.to_string(),
                    type_tag: "bool".to_string(),
                }
            );
        }
    }

    #[test]
    fn test_int_casts() {
        assert_eq!(cast("5", "int").unwrap(), Value::Int(5));
        assert_eq!(cast("-12", "int").unwrap(), Value::Int(-12));
        assert_eq!(cast(" +7 ", "int").unwrap(), Value::Int(7));
        assert_eq!(cast("1_000", "int").unwrap(), Value::Int(1000));
    }

    #[test]
    fn test_int_rejects_garbage() {
        for raw in ["", "abc", "1.5", "_1", "1_", "1__0", "--1", "=100"] {
            assert!(cast(raw, "int").is_err(), "{raw:?} should not cast");
        }
    }

    #[test]
    fn test_float_casts() {
        assert_eq!(cast("0.5", "float").unwrap(), Value::Float(0.5));
        assert_eq!(cast("1e3", "float").unwrap(), Value::Float(1000.0));
        assert_eq!(cast("3", "float").unwrap(), Value::Float(3.0));
        assert!(cast("fast", "float").is_err());
    }

    #[test]
    fn test_str_is_identity() {
        assert_eq!(
            cast("hello world", "str").unwrap(),
            Value::Str("hello world".to_string())
        );
        assert_eq!(cast("", "str").unwrap(), Value::Str(String::new()));
    }

    #[test]
    fn test_chr_escapes() {
        assert_eq!(cast("\\n", "chr").unwrap(), Value::Chr('\n'));
        assert_eq!(cast("\\0", "chr").unwrap(), Value::Chr('\0'));
        assert_eq!(cast("\\t", "chr").unwrap(), Value::Chr('\t'));
        assert_eq!(cast("\\x41", "chr").unwrap(), Value::Chr('A'));
        assert_eq!(cast("\\u00e9", "chr").unwrap(), Value::Chr('é'));
        assert_eq!(cast("\\101", "chr").unwrap(), Value::Chr('A'));
        assert_eq!(cast(",", "chr").unwrap(), Value::Chr(','));
    }

    #[test]
    fn test_chr_takes_first_character() {
        assert_eq!(cast("ab", "chr").unwrap(), Value::Chr('a'));
        assert_eq!(cast("\\r\\n", "chr").unwrap(), Value::Chr('\r'));
    }

    #[test]
    fn test_chr_failures() {
        assert!(cast("", "chr").is_err());
        assert!(cast("\\", "chr").is_err());
        assert!(cast("\\xZZ", "chr").is_err());
        assert!(cast("\\x4", "chr").is_err());
    }

    #[test]
    fn test_unknown_tag_is_a_cast_error() {
        let err = cast("1", "complex").unwrap_err();
        assert_eq!(err.to_string(), "1 : complex");
    }

    #[test]
    fn test_unescape_keeps_unknown_escapes() {
        assert_eq!(unescape("a\\qb").unwrap(), "a\\qb");
        assert_eq!(unescape("\\\\").unwrap(), "\\");
        assert_eq!(unescape("line\\\ncont").unwrap(), "linecont");
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Int(4).as_float(), Some(4.0));
        assert_eq!(Value::Float(0.5).as_int(), None);
        assert_eq!(Value::Str("it".into()).as_str(), Some("it"));
        assert_eq!(Value::Chr('\n').as_char(), Some('\n'));
        assert_eq!(Value::Bool(false).as_bool(), Some(false));
    }

    #[test]
    fn test_type_tag_round_trips_names() {
        for tag in [
            TypeTag::Bool,
            TypeTag::Chr,
            TypeTag::Int,
            TypeTag::Float,
            TypeTag::Str,
        ] {
            assert_eq!(tag.as_str().parse::<TypeTag>(), Ok(tag));
        }
    }
}
