//! SQL values and parameter handling.
//!
//! [`Value`] mirrors SQLite's five storage classes. Values reach the
//! database either as bound parameters (`?`) or, when a statement is
//! serialized in literal mode, as escaped inline text.

use crate::error::{Error, Result};

/// A value that can be bound to a prepared statement or read from a row.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// NULL value.
    Null,
    /// 64-bit signed integer.
    Integer(i64),
    /// 64-bit IEEE floating point number.
    Real(f64),
    /// UTF-8 text.
    Text(String),
    /// Binary blob.
    Blob(Vec<u8>),
}

impl Value {
    /// Returns the SQL representation for inline use (escaped).
    ///
    /// **Warning**: Prefer using parameterized queries instead.
    #[must_use]
    pub fn to_sql_inline(&self) -> String {
        match self {
            Self::Null => String::from("NULL"),
            Self::Integer(n) => format!("{n}"),
            Self::Real(f) if f.is_nan() => String::from("NULL"),
            Self::Real(f) if f.is_infinite() => {
                String::from(if f.is_sign_positive() { "9e999" } else { "-9e999" })
            }
            Self::Real(f) => {
                let text = format!("{f}");
                if !text.contains(['.', 'e', 'E']) {
                    format!("{text}.0")
                } else {
                    text
                }
            }
            Self::Text(s) => quote_text(s),
            Self::Blob(b) => {
                let hex: String = b.iter().map(|byte| format!("{byte:02X}")).collect();
                format!("X'{hex}'")
            }
        }
    }

    /// Returns the storage class name as reported by `typeof()`.
    #[must_use]
    pub const fn storage_class(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
        }
    }

    /// Returns `true` for [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Wraps `text` in single quotes, doubling embedded quotes.
#[must_use]
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Trait for types that can be converted to SQL values.
pub trait ToValue {
    /// Converts the value to a [`Value`].
    fn to_value(&self) -> Value;
}

/// Trait for types that can be extracted from SQL values.
pub trait FromValue: Sized {
    /// Converts a stored [`Value`] back into the Rust type.
    fn from_value(value: Value) -> Result<Self>;
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl FromValue for Value {
    fn from_value(value: Value) -> Result<Self> {
        Ok(value)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Integer(i64::from(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Integer(n) => Ok(n != 0),
            other => Err(conversion_error::<Self>(&other)),
        }
    }
}

macro_rules! impl_integer_value {
    ($($ty:ty),+) => {
        $(
            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::Integer(i64::from(*self))
                }
            }

            impl FromValue for $ty {
                fn from_value(value: Value) -> Result<Self> {
                    match value {
                        Value::Integer(n) => {
                            <$ty>::try_from(n).map_err(|_| Error::ValueConversion {
                                expected: stringify!($ty),
                                found: "out of range integer",
                            })
                        }
                        other => Err(conversion_error::<Self>(&other)),
                    }
                }
            }
        )+
    };
}

impl_integer_value!(i8, i16, i32, i64, u8, u16, u32);

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FromValue for f64 {
    #[allow(clippy::cast_precision_loss)]
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Real(f) => Ok(f),
            Value::Integer(n) => Ok(n as Self),
            other => Err(conversion_error::<Self>(&other)),
        }
    }
}

impl ToValue for f32 {
    fn to_value(&self) -> Value {
        Value::Real(f64::from(*self))
    }
}

impl FromValue for f32 {
    #[allow(clippy::cast_possible_truncation)]
    fn from_value(value: Value) -> Result<Self> {
        f64::from_value(value).map(|f| f as Self)
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(conversion_error::<Self>(&other)),
        }
    }
}

impl ToValue for &str {
    fn to_value(&self) -> Value {
        Value::Text(String::from(*self))
    }
}

impl ToValue for char {
    fn to_value(&self) -> Value {
        Value::Text(self.to_string())
    }
}

impl FromValue for char {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Text(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(Error::ValueConversion {
                        expected: "char",
                        found: "text of length other than one",
                    }),
                }
            }
            other => Err(conversion_error::<Self>(&other)),
        }
    }
}

impl ToValue for Vec<u8> {
    fn to_value(&self) -> Value {
        Value::Blob(self.clone())
    }
}

impl FromValue for Vec<u8> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Blob(b) => Ok(b),
            other => Err(conversion_error::<Self>(&other)),
        }
    }
}

impl ToValue for &[u8] {
    fn to_value(&self) -> Value {
        Value::Blob(self.to_vec())
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(v) => v.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(feature = "chrono")]
mod temporal {
    use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

    use super::{FromValue, ToValue, Value, conversion_error};
    use crate::error::{Error, Result};

    const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

    impl ToValue for NaiveDate {
        fn to_value(&self) -> Value {
            Value::Text(self.format("%Y-%m-%d").to_string())
        }
    }

    impl FromValue for NaiveDate {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => Self::parse_from_str(&s, "%Y-%m-%d").map_err(|_| {
                    Error::ValueConversion {
                        expected: "NaiveDate",
                        found: "malformed date text",
                    }
                }),
                other => Err(conversion_error::<Self>(&other)),
            }
        }
    }

    impl ToValue for NaiveDateTime {
        fn to_value(&self) -> Value {
            Value::Text(self.format(DATETIME_FORMAT).to_string())
        }
    }

    impl FromValue for NaiveDateTime {
        fn from_value(value: Value) -> Result<Self> {
            match value {
                Value::Text(s) => Self::parse_from_str(&s, DATETIME_FORMAT).map_err(|_| {
                    Error::ValueConversion {
                        expected: "NaiveDateTime",
                        found: "malformed datetime text",
                    }
                }),
                other => Err(conversion_error::<Self>(&other)),
            }
        }
    }

    impl ToValue for DateTime<Utc> {
        fn to_value(&self) -> Value {
            self.naive_utc().to_value()
        }
    }

    impl FromValue for DateTime<Utc> {
        fn from_value(value: Value) -> Result<Self> {
            NaiveDateTime::from_value(value).map(|dt| dt.and_utc())
        }
    }
}

fn conversion_error<T>(found: &Value) -> Error {
    Error::ValueConversion {
        expected: std::any::type_name::<T>(),
        found: found.storage_class(),
    }
}
