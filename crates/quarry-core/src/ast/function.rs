//! Scalar and aggregate function calls.

use crate::ast::expression::Expr;

/// Built-in SQLite functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionKind {
    // Scalar
    Length,
    Abs,
    Upper,
    Lower,
    Trim,
    LTrim,
    RTrim,
    Replace,
    Substr,
    Instr,
    Coalesce,
    IfNull,
    NullIf,
    Round,
    Hex,
    Quote,
    TypeOf,
    Unicode,
    Char,
    ZeroBlob,
    Random,
    RandomBlob,
    Changes,
    TotalChanges,
    LastInsertRowid,
    Date,
    Time,
    DateTime,
    JulianDay,
    StrFTime,

    // Aggregate
    Count,
    CountAll,
    Avg,
    Sum,
    Total,
    Max,
    Min,
    GroupConcat,
    GroupConcatSeparator,
}

impl FunctionKind {
    /// Returns the function name.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Length => "LENGTH",
            Self::Abs => "ABS",
            Self::Upper => "UPPER",
            Self::Lower => "LOWER",
            Self::Trim => "TRIM",
            Self::LTrim => "LTRIM",
            Self::RTrim => "RTRIM",
            Self::Replace => "REPLACE",
            Self::Substr => "SUBSTR",
            Self::Instr => "INSTR",
            Self::Coalesce => "COALESCE",
            Self::IfNull => "IFNULL",
            Self::NullIf => "NULLIF",
            Self::Round => "ROUND",
            Self::Hex => "HEX",
            Self::Quote => "QUOTE",
            Self::TypeOf => "TYPEOF",
            Self::Unicode => "UNICODE",
            Self::Char => "CHAR",
            Self::ZeroBlob => "ZEROBLOB",
            Self::Random => "RANDOM",
            Self::RandomBlob => "RANDOMBLOB",
            Self::Changes => "CHANGES",
            Self::TotalChanges => "TOTAL_CHANGES",
            Self::LastInsertRowid => "LAST_INSERT_ROWID",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::DateTime => "DATETIME",
            Self::JulianDay => "JULIANDAY",
            Self::StrFTime => "STRFTIME",
            Self::Count => "COUNT",
            Self::CountAll => Self::Count.keyword(),
            Self::Avg => "AVG",
            Self::Sum => "SUM",
            Self::Total => "TOTAL",
            Self::Max => "MAX",
            Self::Min => "MIN",
            Self::GroupConcat => "GROUP_CONCAT",
            Self::GroupConcatSeparator => Self::GroupConcat.keyword(),
        }
    }

    /// Returns `true` for aggregate functions.
    ///
    /// `MAX` and `MIN` are aggregates only with a single argument; see
    /// [`Function::is_aggregate`].
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        match self {
            Self::Count
            | Self::CountAll
            | Self::Avg
            | Self::Sum
            | Self::Total
            | Self::Max
            | Self::Min
            | Self::GroupConcat
            | Self::GroupConcatSeparator => true,
            Self::Length
            | Self::Abs
            | Self::Upper
            | Self::Lower
            | Self::Trim
            | Self::LTrim
            | Self::RTrim
            | Self::Replace
            | Self::Substr
            | Self::Instr
            | Self::Coalesce
            | Self::IfNull
            | Self::NullIf
            | Self::Round
            | Self::Hex
            | Self::Quote
            | Self::TypeOf
            | Self::Unicode
            | Self::Char
            | Self::ZeroBlob
            | Self::Random
            | Self::RandomBlob
            | Self::Changes
            | Self::TotalChanges
            | Self::LastInsertRowid
            | Self::Date
            | Self::Time
            | Self::DateTime
            | Self::JulianDay
            | Self::StrFTime => false,
        }
    }
}

/// A function call.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    /// Which function.
    pub kind: FunctionKind,
    /// Arguments in order.
    pub args: Vec<Expr>,
    /// `DISTINCT` before the arguments (aggregates only).
    pub distinct: bool,
}

impl Function {
    /// Creates a call of `kind` with `args`.
    #[must_use]
    pub const fn new(kind: FunctionKind, args: Vec<Expr>) -> Self {
        Self {
            kind,
            args,
            distinct: false,
        }
    }

    /// Returns `true` if this call aggregates over rows.
    #[must_use]
    pub fn is_aggregate(&self) -> bool {
        match self.kind {
            FunctionKind::Max | FunctionKind::Min => self.args.len() == 1,
            kind => kind.is_aggregate(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_group_concat_keyword_delegates() {
        assert_eq!(
            FunctionKind::GroupConcatSeparator.keyword(),
            FunctionKind::GroupConcat.keyword()
        );
        assert_eq!(FunctionKind::CountAll.keyword(), "COUNT");
    }

    #[test]
    fn test_max_arity_decides_aggregate() {
        let one = Function::new(FunctionKind::Max, vec![Expr::Literal(Value::Integer(1))]);
        let two = Function::new(
            FunctionKind::Max,
            vec![
                Expr::Literal(Value::Integer(1)),
                Expr::Literal(Value::Integer(2)),
            ],
        );
        assert!(one.is_aggregate());
        assert!(!two.is_aggregate());
    }
}
