//! Typed scalar values for leaf features and output records.
//!
//! Provides [AnnotationValue], which holds a parsed value as `i64`, `f64`, or
//! `String`. Values parsed from text are tried as integer first, then as
//! float, and fall back to a string.

use std::fmt;

// =#========================================================================#=
// ANNOTATION VALUE
// =#========================================================================#=
/// Enum to encapsulate a parsed annotation value.
#[derive(Debug, Clone)]
pub enum AnnotationValue {
    /// For floating point values
    Float(f64),
    /// For integer values
    Int(i64),
    /// For strings
    String(String),
}

impl AnnotationValue {
    /// Parses a raw text value into the narrowest matching variant.
    ///
    /// # Examples
    /// ```
    /// # use cladenorm::model::AnnotationValue;
    /// assert_eq!(AnnotationValue::parse("42"), AnnotationValue::Int(42));
    /// assert_eq!(AnnotationValue::parse("0.5"), AnnotationValue::Float(0.5));
    /// assert_eq!(AnnotationValue::parse(" Vertebrate "), AnnotationValue::from("Vertebrate"));
    /// ```
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            AnnotationValue::Int(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            AnnotationValue::Float(f)
        } else {
            AnnotationValue::String(trimmed.to_string())
        }
    }

    /// Returns the string content if this is a string value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AnnotationValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AnnotationValue::Float(f) => Some(*f),
            AnnotationValue::Int(i) => Some(*i as f64),
            AnnotationValue::String(_) => None,
        }
    }
}

/// Floats compare by bit pattern so that a uniform `NaN` column still counts
/// as a single value.
impl PartialEq for AnnotationValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AnnotationValue::Float(a), AnnotationValue::Float(b)) => a.to_bits() == b.to_bits(),
            (AnnotationValue::Int(a), AnnotationValue::Int(b)) => a == b,
            (AnnotationValue::String(a), AnnotationValue::String(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for AnnotationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationValue::Float(v) => write!(f, "{v}"),
            AnnotationValue::Int(v) => write!(f, "{v}"),
            AnnotationValue::String(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for AnnotationValue {
    fn from(v: f64) -> Self {
        AnnotationValue::Float(v)
    }
}

impl From<i64> for AnnotationValue {
    fn from(v: i64) -> Self {
        AnnotationValue::Int(v)
    }
}

impl From<usize> for AnnotationValue {
    fn from(v: usize) -> Self {
        AnnotationValue::Int(v as i64)
    }
}

impl From<String> for AnnotationValue {
    fn from(v: String) -> Self {
        AnnotationValue::String(v)
    }
}

impl From<&str> for AnnotationValue {
    fn from(v: &str) -> Self {
        AnnotationValue::String(v.to_string())
    }
}
