//! Declared column types and the mapping from Rust field types.

use std::fmt;

/// SQL type keyword printed in a column definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DataType {
    /// `INTEGER`
    Integer,
    /// `REAL`
    Real,
    /// `TEXT`
    Text,
    /// `BLOB`
    Blob,
    /// `NUMERIC`
    Numeric,
}

impl DataType {
    /// Returns the SQL keyword for this type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Integer => "INTEGER",
            Self::Real => "REAL",
            Self::Text => "TEXT",
            Self::Blob => "BLOB",
            Self::Numeric => "NUMERIC",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rust types that can back a mapped column.
///
/// `NULLABLE` drives the derived `NOT NULL` flag: only `Option<T>` is
/// nullable, every other field type produces a `NOT NULL` column.
pub trait FieldType {
    /// Declared SQL type of the column.
    const SQL_TYPE: DataType;
    /// Whether the column accepts NULL.
    const NULLABLE: bool = false;
}

macro_rules! impl_field_type {
    ($data_type:expr => $($ty:ty),+) => {
        $(
            impl FieldType for $ty {
                const SQL_TYPE: DataType = $data_type;
            }
        )+
    };
}

impl_field_type!(DataType::Integer => bool, i8, i16, i32, i64, u8, u16, u32);
impl_field_type!(DataType::Real => f32, f64);
impl_field_type!(DataType::Text => String, char);
impl_field_type!(DataType::Blob => Vec<u8>);

#[cfg(feature = "chrono")]
impl_field_type!(
    DataType::Text => chrono::NaiveDate, chrono::NaiveDateTime, chrono::DateTime<chrono::Utc>
);

impl<T: FieldType> FieldType for Option<T> {
    const SQL_TYPE: DataType = T::SQL_TYPE;
    const NULLABLE: bool = true;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_printer() {
        assert_eq!(<i64 as FieldType>::SQL_TYPE.as_str(), "INTEGER");
        assert_eq!(<bool as FieldType>::SQL_TYPE.as_str(), "INTEGER");
        assert_eq!(<f64 as FieldType>::SQL_TYPE.as_str(), "REAL");
        assert_eq!(<String as FieldType>::SQL_TYPE.as_str(), "TEXT");
        assert_eq!(<Vec<u8> as FieldType>::SQL_TYPE.as_str(), "BLOB");
    }

    #[test]
    fn test_option_is_nullable() {
        assert!(!<i32 as FieldType>::NULLABLE);
        assert!(<Option<i32> as FieldType>::NULLABLE);
        assert_eq!(<Option<String> as FieldType>::SQL_TYPE, DataType::Text);
    }
}
