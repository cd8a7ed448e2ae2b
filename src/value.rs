use std::fmt;

use crate::data_type::DataType;
use crate::error::{DbError, DbResult};

/// Represents a single data value stored in a table.
///
/// Equality is tag-sensitive: an `Int` never equals a `Str` holding the same
/// digits, and `Null` only equals `Null`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A 64-bit signed integer value.
    Int(i64),
    /// An owned UTF-8 string value.
    Str(String),
    /// A boolean value.
    Bool(bool),
    /// Represents an empty or missing value.
    Null,
}

impl Value {
    /// Returns the [DataType] tag of this value.
    pub fn kind(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Str(_) => DataType::Str,
            Self::Bool(_) => DataType::Bool,
            Self::Null => DataType::Null,
        }
    }

    /// Returns `true` if the value is [Value::Null].
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the inner integer.
    ///
    /// # Errors
    /// Returns [DbError::TypeMismatch] if this is not a [Value::Int].
    pub fn as_int(&self) -> DbResult<i64> {
        match self {
            Self::Int(i) => Ok(*i),
            _ => Err(self.not_a(DataType::Int)),
        }
    }

    /// Returns the inner string slice.
    ///
    /// # Errors
    /// Returns [DbError::TypeMismatch] if this is not a [Value::Str].
    pub fn as_str(&self) -> DbResult<&str> {
        match self {
            Self::Str(s) => Ok(s),
            _ => Err(self.not_a(DataType::Str)),
        }
    }

    /// Returns the inner boolean.
    ///
    /// # Errors
    /// Returns [DbError::TypeMismatch] if this is not a [Value::Bool].
    pub fn as_bool(&self) -> DbResult<bool> {
        match self {
            Self::Bool(b) => Ok(*b),
            _ => Err(self.not_a(DataType::Bool)),
        }
    }

    /// Same-tag equality. Equivalent to `==`.
    pub fn equals(&self, other: &Value) -> bool {
        self == other
    }

    fn not_a(&self, expected: DataType) -> DbError {
        DbError::TypeMismatch(format!(
            "not {} (value is {})",
            expected.with_article(),
            self.kind()
        ))
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Int(i64::from(v))
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::Str(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Str(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Null => f.write_str("NULL"),
        }
    }
}
