//! Expression building: operands, conditions and column references.

use std::ops::{BitAnd, BitOr, Not};

use crate::ast::{
    ArithmeticOp, Collation, ComparisonOp, CteColumnRef, Expr, Function, InList, LogicalOp, Query,
    TableRef, classify,
};
use crate::builder::select::IntoQuery;
use crate::error::{Error, Result};
use crate::schema::{Field, FieldId};
use crate::value::ToValue;

// ================================================================
// Conversions into expressions
// ================================================================

/// Values usable as an expression operand.
///
/// Every [`ToValue`] type becomes a bindable literal; fields become column
/// references.
pub trait IntoExpr {
    /// Converts into an expression node.
    fn into_expr(self) -> Expr;
}

impl<V: ToValue> IntoExpr for V {
    fn into_expr(self) -> Expr {
        Expr::Literal(self.to_value())
    }
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl<O, T> IntoExpr for Field<O, T> {
    fn into_expr(self) -> Expr {
        Expr::Column(self.id())
    }
}

impl IntoExpr for FieldId {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for Function {
    fn into_expr(self) -> Expr {
        Expr::Function(self)
    }
}

impl IntoExpr for Condition {
    fn into_expr(self) -> Expr {
        self.0
    }
}

impl IntoExpr for Query {
    fn into_expr(self) -> Expr {
        Expr::Subquery(Box::new(self))
    }
}

/// Wraps a value as a literal expression.
pub fn val<V: ToValue>(value: V) -> Expr {
    Expr::Literal(value.to_value())
}

/// Column reference for `field`.
pub fn c<O, T>(field: Field<O, T>) -> Expr {
    Expr::Column(field.id())
}

/// A table mapping `O`, for FROM and JOIN.
#[must_use]
pub fn table<O: 'static>() -> TableRef {
    TableRef::of::<O>()
}

/// The table mapping `O` under an alias.
///
/// Qualify columns through the alias with [`TableRef::column`].
#[must_use]
pub fn alias<O: 'static>(name: &'static str) -> TableRef {
    TableRef::aliased::<O>(name)
}

/// `*`.
#[must_use]
pub const fn star() -> Expr {
    Expr::Asterisk {
        table: None,
        defined_order: false,
    }
}

/// `"table".*` for the table mapping `O`.
#[must_use]
pub fn asterisk<O: 'static>() -> Expr {
    Expr::Asterisk {
        table: Some(TableRef::of::<O>()),
        defined_order: false,
    }
}

/// Every column of the table mapping `O`, listed in declaration order.
#[must_use]
pub fn asterisk_defined<O: 'static>() -> Expr {
    Expr::Asterisk {
        table: Some(TableRef::of::<O>()),
        defined_order: true,
    }
}

/// Reference to a result-column alias.
pub fn alias_ref(name: impl Into<String>) -> Expr {
    Expr::AliasRef(name.into())
}

/// Column `name` of the common table expression `cte`.
pub fn cte_column(cte: impl Into<String>, name: impl Into<String>) -> Expr {
    Expr::CteColumn {
        cte: cte.into(),
        column: CteColumnRef::Name(name.into()),
    }
}

/// The column of `cte` that is fed by `field`.
pub fn cte_field(cte: impl Into<String>, field: impl Into<FieldId>) -> Expr {
    Expr::CteColumn {
        cte: cte.into(),
        column: CteColumnRef::Field(field.into()),
    }
}

impl<O, T> From<Field<O, T>> for CteColumnRef {
    fn from(field: Field<O, T>) -> Self {
        Self::Field(field.id())
    }
}

impl From<&str> for CteColumnRef {
    fn from(name: &str) -> Self {
        Self::Name(String::from(name))
    }
}

impl From<String> for CteColumnRef {
    fn from(name: String) -> Self {
        Self::Name(name)
    }
}

// ================================================================
// Conditions
// ================================================================

/// A boolean condition.
///
/// Only conditions combine with `&`, `|` and `!`; arbitrary values cannot
/// be ANDed by accident.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition(Expr);

impl Condition {
    /// The wrapped expression.
    #[must_use]
    pub const fn expr(&self) -> &Expr {
        &self.0
    }

    /// Unwraps the expression.
    #[must_use]
    pub fn into_inner(self) -> Expr {
        self.0
    }

    /// Applies `COLLATE BINARY`.
    #[must_use]
    pub fn collate_binary(self) -> Self {
        self.collate(Collation::Binary)
    }

    /// Applies `COLLATE NOCASE`.
    #[must_use]
    pub fn collate_nocase(self) -> Self {
        self.collate(Collation::NoCase)
    }

    /// Applies `COLLATE RTRIM`.
    #[must_use]
    pub fn collate_rtrim(self) -> Self {
        self.collate(Collation::RTrim)
    }

    /// Applies a collation to the condition.
    #[must_use]
    pub fn collate(self, collation: Collation) -> Self {
        Self(self.0.collate(collation))
    }

    /// `self AND other`.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        logical(LogicalOp::And, self, other)
    }

    /// `self OR other`.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        logical(LogicalOp::Or, self, other)
    }
}

impl TryFrom<Expr> for Condition {
    type Error = Error;

    fn try_from(expr: Expr) -> Result<Self> {
        if classify::is_condition(&expr) {
            Ok(Self(expr))
        } else {
            Err(Error::InvalidExpression(format!(
                "{:?} expression is not a condition",
                expr.node_kind()
            )))
        }
    }
}

impl From<Condition> for Expr {
    fn from(condition: Condition) -> Self {
        condition.0
    }
}

fn logical(op: LogicalOp, left: Condition, right: Condition) -> Condition {
    Condition(Expr::Logical {
        op,
        left: Box::new(left.0),
        right: Box::new(right.0),
    })
}

impl BitAnd for Condition {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(rhs)
    }
}

impl BitOr for Condition {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(rhs)
    }
}

impl Not for Condition {
    type Output = Self;

    fn not(self) -> Self {
        Self(Expr::Not(Box::new(self.0)))
    }
}

// ================================================================
// Operand methods
// ================================================================

fn compare(op: ComparisonOp, left: Expr, right: Expr) -> Condition {
    Condition(Expr::Comparison {
        op,
        left: Box::new(left),
        right: Box::new(right),
    })
}

fn arithmetic(op: ArithmeticOp, left: Expr, right: Expr) -> Expr {
    Expr::Arithmetic {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

/// Comparison, pattern and arithmetic methods shared by every operand.
pub trait Operand: IntoExpr + Sized {
    /// `self = value`
    fn eq(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::Eq, self.into_expr(), value.into_expr())
    }

    /// `self != value`
    fn not_eq(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::NotEq, self.into_expr(), value.into_expr())
    }

    /// `self < value`
    fn lt(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::Lt, self.into_expr(), value.into_expr())
    }

    /// `self <= value`
    fn lt_eq(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::LtEq, self.into_expr(), value.into_expr())
    }

    /// `self > value`
    fn gt(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::Gt, self.into_expr(), value.into_expr())
    }

    /// `self >= value`
    fn gt_eq(self, value: impl IntoExpr) -> Condition {
        compare(ComparisonOp::GtEq, self.into_expr(), value.into_expr())
    }

    /// `self LIKE pattern`
    fn like(self, pattern: impl IntoExpr) -> Condition {
        like(self, pattern)
    }

    /// `self GLOB pattern`
    fn glob(self, pattern: impl IntoExpr) -> Condition {
        glob(self, pattern)
    }

    /// `self BETWEEN low AND high`
    fn between<B: IntoExpr>(self, low: B, high: B) -> Condition {
        between(self, low, high)
    }

    /// `self IN (values)`
    fn in_list<V: IntoExpr>(self, values: impl IntoIterator<Item = V>) -> Condition {
        in_(self, values)
    }

    /// `self NOT IN (values)`
    fn not_in_list<V: IntoExpr>(self, values: impl IntoIterator<Item = V>) -> Condition {
        not_in(self, values)
    }

    /// `self IN (subquery)`
    fn in_query(self, query: impl IntoQuery) -> Condition {
        in_query(self, query)
    }

    /// `self IS NULL`
    fn is_null(self) -> Condition {
        is_null(self)
    }

    /// `self IS NOT NULL`
    fn is_not_null(self) -> Condition {
        is_not_null(self)
    }

    /// `self + value`
    fn add(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Add, self.into_expr(), value.into_expr())
    }

    /// `self - value`
    fn sub(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Sub, self.into_expr(), value.into_expr())
    }

    /// `self * value`
    fn mul(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Mul, self.into_expr(), value.into_expr())
    }

    /// `self / value`
    fn div(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Div, self.into_expr(), value.into_expr())
    }

    /// `self % value`
    fn rem(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Mod, self.into_expr(), value.into_expr())
    }

    /// `self || value`
    fn concat(self, value: impl IntoExpr) -> Expr {
        arithmetic(ArithmeticOp::Concat, self.into_expr(), value.into_expr())
    }

    /// `self AS "name"`
    fn as_(self, name: impl Into<String>) -> Expr {
        Expr::Alias {
            expr: Box::new(self.into_expr()),
            alias: name.into(),
        }
    }

    /// `self COLLATE collation`
    fn collate(self, collation: Collation) -> Expr {
        self.into_expr().collate(collation)
    }
}

impl<O, T> Operand for Field<O, T> {}
impl Operand for Expr {}
impl Operand for Function {}

// ================================================================
// Free functions
// ================================================================

/// `left = right`
pub fn is_equal(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::Eq, left.into_expr(), right.into_expr())
}

/// `left != right`
pub fn is_not_equal(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::NotEq, left.into_expr(), right.into_expr())
}

/// `left < right`
pub fn lesser_than(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::Lt, left.into_expr(), right.into_expr())
}

/// `left <= right`
pub fn lesser_or_equal(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::LtEq, left.into_expr(), right.into_expr())
}

/// `left > right`
pub fn greater_than(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::Gt, left.into_expr(), right.into_expr())
}

/// `left >= right`
pub fn greater_or_equal(left: impl IntoExpr, right: impl IntoExpr) -> Condition {
    compare(ComparisonOp::GtEq, left.into_expr(), right.into_expr())
}

/// `expr LIKE pattern`
pub fn like(expr: impl IntoExpr, pattern: impl IntoExpr) -> Condition {
    Condition(Expr::Like {
        expr: Box::new(expr.into_expr()),
        pattern: Box::new(pattern.into_expr()),
        escape: None,
    })
}

/// `expr LIKE pattern ESCAPE escape`
pub fn like_escape(
    expr: impl IntoExpr,
    pattern: impl IntoExpr,
    escape: impl IntoExpr,
) -> Condition {
    Condition(Expr::Like {
        expr: Box::new(expr.into_expr()),
        pattern: Box::new(pattern.into_expr()),
        escape: Some(Box::new(escape.into_expr())),
    })
}

/// `expr GLOB pattern`
pub fn glob(expr: impl IntoExpr, pattern: impl IntoExpr) -> Condition {
    Condition(Expr::Glob {
        expr: Box::new(expr.into_expr()),
        pattern: Box::new(pattern.into_expr()),
    })
}

/// `expr BETWEEN low AND high`; both bounds share one type.
pub fn between<B: IntoExpr>(expr: impl IntoExpr, low: B, high: B) -> Condition {
    Condition(Expr::Between {
        expr: Box::new(expr.into_expr()),
        low: Box::new(low.into_expr()),
        high: Box::new(high.into_expr()),
    })
}

fn membership<V: IntoExpr>(
    expr: impl IntoExpr,
    values: impl IntoIterator<Item = V>,
    negative: bool,
) -> Condition {
    Condition(Expr::In {
        expr: Box::new(expr.into_expr()),
        list: InList::Values(values.into_iter().map(IntoExpr::into_expr).collect()),
        negative,
    })
}

/// `expr IN (values)`
pub fn in_<V: IntoExpr>(expr: impl IntoExpr, values: impl IntoIterator<Item = V>) -> Condition {
    membership(expr, values, false)
}

/// `expr NOT IN (values)`
pub fn not_in<V: IntoExpr>(expr: impl IntoExpr, values: impl IntoIterator<Item = V>) -> Condition {
    membership(expr, values, true)
}

/// `expr IN (subquery)`
pub fn in_query(expr: impl IntoExpr, query: impl IntoQuery) -> Condition {
    Condition(Expr::In {
        expr: Box::new(expr.into_expr()),
        list: InList::Subquery(Box::new(query.into_query())),
        negative: false,
    })
}

/// `expr NOT IN (subquery)`
pub fn not_in_query(expr: impl IntoExpr, query: impl IntoQuery) -> Condition {
    Condition(Expr::In {
        expr: Box::new(expr.into_expr()),
        list: InList::Subquery(Box::new(query.into_query())),
        negative: true,
    })
}

/// `expr IS NULL`
pub fn is_null(expr: impl IntoExpr) -> Condition {
    Condition(Expr::IsNull {
        expr: Box::new(expr.into_expr()),
        negative: false,
    })
}

/// `expr IS NOT NULL`
pub fn is_not_null(expr: impl IntoExpr) -> Condition {
    Condition(Expr::IsNull {
        expr: Box::new(expr.into_expr()),
        negative: true,
    })
}

/// `EXISTS (subquery)`
pub fn exists(query: impl IntoQuery) -> Condition {
    Condition(Expr::Exists(Box::new(query.into_query())))
}

/// `NOT (condition)`
#[must_use]
pub fn not(condition: Condition) -> Condition {
    !condition
}

/// `left AND right`
#[must_use]
pub fn and(left: Condition, right: Condition) -> Condition {
    left.and(right)
}

/// `left OR right`
#[must_use]
pub fn or(left: Condition, right: Condition) -> Condition {
    left.or(right)
}

/// A WHERE clause on its own.
#[derive(Debug, Clone, PartialEq)]
pub struct WhereClause(pub Condition);

/// `WHERE condition`.
#[must_use]
pub const fn where_(condition: Condition) -> WhereClause {
    WhereClause(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_condition_rejects_plain_values() {
        assert!(Condition::try_from(val(3)).is_err());
        assert!(Condition::try_from(is_equal(1, 2).into_inner()).is_ok());
    }

    #[test]
    fn test_operators_build_logical_nodes() {
        let both = is_equal(1, 2) & !is_null(3);
        match both.expr() {
            Expr::Logical { op, right, .. } => {
                assert_eq!(*op, LogicalOp::And);
                assert!(matches!(right.as_ref(), Expr::Not(_)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_collate_wraps_condition() {
        let collated = is_equal("a", "A").collate_nocase();
        assert!(matches!(
            collated.expr(),
            Expr::Collate {
                collation: Collation::NoCase,
                ..
            }
        ));
    }

    #[test]
    fn test_in_list_collects_values() {
        let cond = in_(val(1), [1, 2, 3]);
        match cond.into_inner() {
            Expr::In {
                list: InList::Values(values),
                negative,
                ..
            } => {
                assert!(!negative);
                assert_eq!(values[2], Expr::Literal(Value::Integer(3)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
