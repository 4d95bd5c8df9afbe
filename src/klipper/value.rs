//! Typed configuration values.
//!
//! Klipper stores every parameter as text. Values are inferred from that text
//! so that consumers can distinguish flags, numbers and comma-separated lists
//! without re-parsing.

use std::fmt;

use serde::Serialize;

/// A parameter value inferred from its raw text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// `true` / `false`, matched case-insensitively.
    Bool(bool),
    /// A finite decimal number.
    Number(f64),
    /// Anything else, including the empty string.
    String(String),
    /// A comma-separated list. Elements are inferred independently.
    List(Vec<Value>),
}

impl Value {
    /// Infers a value from raw parameter text.
    ///
    /// The text is trimmed first. Any comma makes the value a list; each
    /// segment is trimmed and inferred on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use klipper_mcp::klipper::Value;
    ///
    /// assert_eq!(Value::infer("0.4"), Value::Number(0.4));
    /// assert_eq!(Value::infer("True"), Value::Bool(true));
    /// assert_eq!(
    ///     Value::infer("1, fan"),
    ///     Value::List(vec![Value::Number(1.0), Value::String("fan".to_string())])
    /// );
    /// ```
    #[must_use]
    pub fn infer(raw: &str) -> Self {
        let text = raw.trim();

        if text.contains(',') {
            return Self::List(text.split(',').map(Self::infer_scalar).collect());
        }

        Self::infer_scalar(text)
    }

    fn infer_scalar(raw: &str) -> Self {
        let text = raw.trim();

        if text.eq_ignore_ascii_case("true") {
            return Self::Bool(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Self::Bool(false);
        }
        if let Some(number) = parse_number(text) {
            return Self::Number(number);
        }

        Self::String(text.to_string())
    }

    /// Returns the numeric value, if this is a number.
    #[must_use]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the string value, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the list elements, if this is a list.
    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Short name of the variant, used in tool output.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
            Self::List(_) => "list",
        }
    }
}

/// Parses text that is wholly a finite decimal number.
///
/// `f64::from_str` also accepts `inf` and `NaN`; those are rejected so that
/// they stay strings.
pub(crate) fn parse_number(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    text.parse::<f64>().ok().filter(|n| n.is_finite())
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}
