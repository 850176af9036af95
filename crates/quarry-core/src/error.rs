//! Error types for schema construction and statement serialization.

/// Errors raised while declaring a schema or serializing a statement.
///
/// Serialization never produces a partial SQL string: any failure deep in
/// the expression tree surfaces here, unchanged, at the top-level call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A field reference did not resolve to any registered column.
    #[error("column not found: `{member}` of `{table_type}` is not mapped by any table")]
    ColumnNotFound {
        /// Rust type owning the field.
        table_type: &'static str,
        /// Member symbol of the field.
        member: &'static str,
    },

    /// A Rust type was used where a mapped table is required but no table
    /// maps it.
    #[error("table not found: type `{0}` is not mapped by any table")]
    TableNotFound(&'static str),

    /// A collation name that is not a valid identifier.
    #[error("invalid collate argument: `{0}`")]
    InvalidCollateArgument(String),

    /// A column reference into a common table expression whose moniker is
    /// not in scope.
    #[error("common table expression `{0}` is not in scope")]
    CteNotFound(String),

    /// A column reference into a common table expression that exposes no
    /// such column.
    #[error("column `{column}` not found in common table expression `{cte}`")]
    CteColumnNotFound {
        /// Moniker of the CTE.
        cte: String,
        /// Column name or member symbol that failed to resolve.
        column: String,
    },

    /// An index referenced by name is not registered.
    #[error("index not found: `{0}`")]
    IndexNotFound(String),

    /// An expression was used where its kind is not allowed.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// The schema declaration is malformed.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// A stored value could not be converted into the requested Rust type.
    #[error("cannot convert {found} value into {expected}")]
    ValueConversion {
        /// Requested Rust type.
        expected: &'static str,
        /// Storage class that was found.
        found: &'static str,
    },
}

/// Result type for schema and serialization operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_not_found_message() {
        let err = Error::ColumnNotFound {
            table_type: "User",
            member: "nickname",
        };
        assert_eq!(
            err.to_string(),
            "column not found: `nickname` of `User` is not mapped by any table"
        );
    }

    #[test]
    fn test_errors_are_distinguishable() {
        assert_ne!(
            Error::TableNotFound("User"),
            Error::InvalidCollateArgument(String::from("User"))
        );
    }
}
