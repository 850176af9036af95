//! Function call constructors.
//!
//! Each constructor is a thin wrapper that fixes the [`FunctionKind`] and
//! the arity; the call renders as `KEYWORD(args)`.

use crate::ast::{Function, FunctionKind};
use crate::builder::expr::IntoExpr;
use crate::builder::select::ExprList;

fn call0(kind: FunctionKind) -> Function {
    Function::new(kind, Vec::new())
}

fn call1(kind: FunctionKind, arg: impl IntoExpr) -> Function {
    Function::new(kind, vec![arg.into_expr()])
}

fn call2(kind: FunctionKind, first: impl IntoExpr, second: impl IntoExpr) -> Function {
    Function::new(kind, vec![first.into_expr(), second.into_expr()])
}

impl Function {
    /// Adds `DISTINCT` before the arguments, as in `COUNT(DISTINCT x)`.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }
}

// Scalar functions

/// `LENGTH(x)`
pub fn length(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Length, x)
}

/// `ABS(x)`
pub fn abs(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Abs, x)
}

/// `UPPER(x)`
pub fn upper(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Upper, x)
}

/// `LOWER(x)`
pub fn lower(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Lower, x)
}

/// `TRIM(x)`
pub fn trim(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Trim, x)
}

/// `TRIM(x, chars)`
pub fn trim_chars(x: impl IntoExpr, chars: impl IntoExpr) -> Function {
    call2(FunctionKind::Trim, x, chars)
}

/// `LTRIM(x)`
pub fn ltrim(x: impl IntoExpr) -> Function {
    call1(FunctionKind::LTrim, x)
}

/// `LTRIM(x, chars)`
pub fn ltrim_chars(x: impl IntoExpr, chars: impl IntoExpr) -> Function {
    call2(FunctionKind::LTrim, x, chars)
}

/// `RTRIM(x)`
pub fn rtrim(x: impl IntoExpr) -> Function {
    call1(FunctionKind::RTrim, x)
}

/// `RTRIM(x, chars)`
pub fn rtrim_chars(x: impl IntoExpr, chars: impl IntoExpr) -> Function {
    call2(FunctionKind::RTrim, x, chars)
}

/// `REPLACE(x, from, to)`
pub fn replace(x: impl IntoExpr, from: impl IntoExpr, to: impl IntoExpr) -> Function {
    Function::new(
        FunctionKind::Replace,
        vec![x.into_expr(), from.into_expr(), to.into_expr()],
    )
}

/// `SUBSTR(x, start)`
pub fn substr(x: impl IntoExpr, start: impl IntoExpr) -> Function {
    call2(FunctionKind::Substr, x, start)
}

/// `SUBSTR(x, start, len)`
pub fn substr_len(x: impl IntoExpr, start: impl IntoExpr, len: impl IntoExpr) -> Function {
    Function::new(
        FunctionKind::Substr,
        vec![x.into_expr(), start.into_expr(), len.into_expr()],
    )
}

/// `INSTR(haystack, needle)`
pub fn instr(haystack: impl IntoExpr, needle: impl IntoExpr) -> Function {
    call2(FunctionKind::Instr, haystack, needle)
}

/// `COALESCE(args...)`
pub fn coalesce(args: impl ExprList) -> Function {
    Function::new(FunctionKind::Coalesce, args.into_exprs())
}

/// `IFNULL(x, fallback)`
pub fn ifnull(x: impl IntoExpr, fallback: impl IntoExpr) -> Function {
    call2(FunctionKind::IfNull, x, fallback)
}

/// `NULLIF(x, y)`
pub fn nullif(x: impl IntoExpr, y: impl IntoExpr) -> Function {
    call2(FunctionKind::NullIf, x, y)
}

/// `ROUND(x)`
pub fn round(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Round, x)
}

/// `ROUND(x, digits)`
pub fn round_digits(x: impl IntoExpr, digits: impl IntoExpr) -> Function {
    call2(FunctionKind::Round, x, digits)
}

/// `HEX(x)`
pub fn hex(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Hex, x)
}

/// `QUOTE(x)`
pub fn quote(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Quote, x)
}

/// `TYPEOF(x)`
pub fn typeof_(x: impl IntoExpr) -> Function {
    call1(FunctionKind::TypeOf, x)
}

/// `UNICODE(x)`
pub fn unicode(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Unicode, x)
}

/// `CHAR(codes...)`
pub fn char_(codes: impl ExprList) -> Function {
    Function::new(FunctionKind::Char, codes.into_exprs())
}

/// `ZEROBLOB(n)`
pub fn zeroblob(n: impl IntoExpr) -> Function {
    call1(FunctionKind::ZeroBlob, n)
}

/// `RANDOM()`
#[must_use]
pub fn random() -> Function {
    call0(FunctionKind::Random)
}

/// `RANDOMBLOB(n)`
pub fn randomblob(n: impl IntoExpr) -> Function {
    call1(FunctionKind::RandomBlob, n)
}

/// `CHANGES()`
#[must_use]
pub fn changes() -> Function {
    call0(FunctionKind::Changes)
}

/// `TOTAL_CHANGES()`
#[must_use]
pub fn total_changes() -> Function {
    call0(FunctionKind::TotalChanges)
}

/// `LAST_INSERT_ROWID()`
#[must_use]
pub fn last_insert_rowid() -> Function {
    call0(FunctionKind::LastInsertRowid)
}

/// `DATE(timestring, modifiers...)`
pub fn date(args: impl ExprList) -> Function {
    Function::new(FunctionKind::Date, args.into_exprs())
}

/// `TIME(timestring, modifiers...)`
pub fn time(args: impl ExprList) -> Function {
    Function::new(FunctionKind::Time, args.into_exprs())
}

/// `DATETIME(timestring, modifiers...)`
pub fn datetime(args: impl ExprList) -> Function {
    Function::new(FunctionKind::DateTime, args.into_exprs())
}

/// `JULIANDAY(timestring, modifiers...)`
pub fn julianday(args: impl ExprList) -> Function {
    Function::new(FunctionKind::JulianDay, args.into_exprs())
}

/// `STRFTIME(format, timestring, modifiers...)`
pub fn strftime(args: impl ExprList) -> Function {
    Function::new(FunctionKind::StrFTime, args.into_exprs())
}

/// `MAX(a, b, ...)`, the scalar form.
pub fn max_of(args: impl ExprList) -> Function {
    Function::new(FunctionKind::Max, args.into_exprs())
}

/// `MIN(a, b, ...)`, the scalar form.
pub fn min_of(args: impl ExprList) -> Function {
    Function::new(FunctionKind::Min, args.into_exprs())
}

// Aggregate functions

/// `COUNT(x)`
pub fn count(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Count, x)
}

/// `COUNT(DISTINCT x)`
pub fn count_distinct(x: impl IntoExpr) -> Function {
    count(x).distinct()
}

/// `COUNT(*)`
#[must_use]
pub fn count_all() -> Function {
    call0(FunctionKind::CountAll)
}

/// `AVG(x)`
pub fn avg(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Avg, x)
}

/// `SUM(x)`
pub fn sum(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Sum, x)
}

/// `TOTAL(x)`
pub fn total(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Total, x)
}

/// `MAX(x)`
pub fn max(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Max, x)
}

/// `MIN(x)`
pub fn min(x: impl IntoExpr) -> Function {
    call1(FunctionKind::Min, x)
}

/// `GROUP_CONCAT(x)`
pub fn group_concat(x: impl IntoExpr) -> Function {
    call1(FunctionKind::GroupConcat, x)
}

/// `GROUP_CONCAT(x, separator)`
pub fn group_concat_sep(x: impl IntoExpr, separator: impl IntoExpr) -> Function {
    call2(FunctionKind::GroupConcatSeparator, x, separator)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arity_is_fixed_by_constructor() {
        assert_eq!(trim(1).args.len(), 1);
        assert_eq!(trim_chars(1, "x").args.len(), 2);
        assert_eq!(substr_len("abc", 1, 2).args.len(), 3);
        assert!(random().args.is_empty());
    }

    #[test]
    fn test_variadic_arguments() {
        assert_eq!(date(("now", "start of month", "+1 day")).args.len(), 3);
        assert_eq!(char_((72, 105)).args.len(), 2);
        assert!(!max_of((1, 2)).is_aggregate());
        assert!(max(1).is_aggregate());
    }

    #[test]
    fn test_count_distinct() {
        let call = count_distinct(1);
        assert!(call.distinct);
        assert_eq!(call.kind, FunctionKind::Count);
    }
}
