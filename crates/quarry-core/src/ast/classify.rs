//! Classification of AST nodes.
//!
//! Every expression node maps to exactly one [`NodeKind`], and every
//! predicate below is an exhaustive match over the kinds. Adding a node kind
//! without classifying it is a compile error, not a runtime surprise.

use crate::ast::expression::{Expr, Source};
use crate::ast::query::{CompoundOp, Query};
use crate::schema::{ColumnConstraint, ConstraintKind};

/// Kind of an expression node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Literal,
    Column,
    AliasedColumn,
    CteColumn,
    Asterisk,
    AliasRef,
    Alias,
    Comparison,
    Logical,
    Not,
    In,
    Like,
    Glob,
    Between,
    IsNull,
    Collate,
    Arithmetic,
    ScalarFunction,
    AggregateFunction,
    Case,
    Subquery,
    Exists,
}

impl NodeKind {
    /// A value sent as a bound parameter.
    #[must_use]
    pub const fn is_bindable(&self) -> bool {
        match self {
            Self::Literal => true,
            Self::Column
            | Self::AliasedColumn
            | Self::CteColumn
            | Self::Asterisk
            | Self::AliasRef
            | Self::Alias
            | Self::Comparison
            | Self::Logical
            | Self::Not
            | Self::In
            | Self::Like
            | Self::Glob
            | Self::Between
            | Self::IsNull
            | Self::Collate
            | Self::Arithmetic
            | Self::ScalarFunction
            | Self::AggregateFunction
            | Self::Case
            | Self::Subquery
            | Self::Exists => false,
        }
    }

    /// A reference to a column of a table, alias or CTE.
    #[must_use]
    pub const fn is_column_reference(&self) -> bool {
        match self {
            Self::Column | Self::AliasedColumn | Self::CteColumn => true,
            Self::Literal
            | Self::Asterisk
            | Self::AliasRef
            | Self::Alias
            | Self::Comparison
            | Self::Logical
            | Self::Not
            | Self::In
            | Self::Like
            | Self::Glob
            | Self::Between
            | Self::IsNull
            | Self::Collate
            | Self::Arithmetic
            | Self::ScalarFunction
            | Self::AggregateFunction
            | Self::Case
            | Self::Subquery
            | Self::Exists => false,
        }
    }

    /// A boolean condition that may be combined with AND/OR and negated.
    ///
    /// `Collate` is not listed: a collated comparison is classified through
    /// [`is_condition`], which looks at the collated child.
    #[must_use]
    pub const fn is_condition(&self) -> bool {
        match self {
            Self::Comparison
            | Self::Logical
            | Self::Not
            | Self::In
            | Self::Like
            | Self::Glob
            | Self::Between
            | Self::IsNull
            | Self::Exists => true,
            Self::Literal
            | Self::Column
            | Self::AliasedColumn
            | Self::CteColumn
            | Self::Asterisk
            | Self::AliasRef
            | Self::Alias
            | Self::Collate
            | Self::Arithmetic
            | Self::ScalarFunction
            | Self::AggregateFunction
            | Self::Case
            | Self::Subquery => false,
        }
    }

    /// A function call of either kind.
    #[must_use]
    pub const fn is_function(&self) -> bool {
        match self {
            Self::ScalarFunction | Self::AggregateFunction => true,
            Self::Literal
            | Self::Column
            | Self::AliasedColumn
            | Self::CteColumn
            | Self::Asterisk
            | Self::AliasRef
            | Self::Alias
            | Self::Comparison
            | Self::Logical
            | Self::Not
            | Self::In
            | Self::Like
            | Self::Glob
            | Self::Between
            | Self::IsNull
            | Self::Collate
            | Self::Arithmetic
            | Self::Case
            | Self::Subquery
            | Self::Exists => false,
        }
    }

    /// An aggregate function call.
    #[must_use]
    pub const fn is_aggregate(&self) -> bool {
        matches!(self, Self::AggregateFunction)
    }
}

impl Expr {
    /// Classifies the node.
    #[must_use]
    pub fn node_kind(&self) -> NodeKind {
        match self {
            Self::Literal(_) => NodeKind::Literal,
            Self::Column(_) => NodeKind::Column,
            Self::AliasedColumn { .. } => NodeKind::AliasedColumn,
            Self::CteColumn { .. } => NodeKind::CteColumn,
            Self::Asterisk { .. } => NodeKind::Asterisk,
            Self::AliasRef(_) => NodeKind::AliasRef,
            Self::Alias { .. } => NodeKind::Alias,
            Self::Comparison { .. } => NodeKind::Comparison,
            Self::Logical { .. } => NodeKind::Logical,
            Self::Not(_) => NodeKind::Not,
            Self::In { .. } => NodeKind::In,
            Self::Like { .. } => NodeKind::Like,
            Self::Glob { .. } => NodeKind::Glob,
            Self::Between { .. } => NodeKind::Between,
            Self::IsNull { .. } => NodeKind::IsNull,
            Self::Collate { .. } => NodeKind::Collate,
            Self::Arithmetic { .. } => NodeKind::Arithmetic,
            Self::Function(function) if function.is_aggregate() => NodeKind::AggregateFunction,
            Self::Function(_) => NodeKind::ScalarFunction,
            Self::Case(_) => NodeKind::Case,
            Self::Subquery(_) => NodeKind::Subquery,
            Self::Exists(_) => NodeKind::Exists,
        }
    }
}

/// Returns `true` if `expr` is a condition, looking through `COLLATE`.
#[must_use]
pub fn is_condition(expr: &Expr) -> bool {
    match expr {
        Expr::Collate { expr, .. } => is_condition(expr),
        other => other.node_kind().is_condition(),
    }
}

/// Returns `true` if `expr` or any nested expression is an aggregate call.
///
/// Subqueries aggregate over their own rows and are not descended into.
#[must_use]
pub fn contains_aggregate(expr: &Expr) -> bool {
    expr.node_kind().is_aggregate() || expr.children().into_iter().any(contains_aggregate)
}

/// Returns `true` if `constraints` holds a constraint of `kind`.
#[must_use]
pub fn has_constraint(constraints: &[ColumnConstraint], kind: ConstraintKind) -> bool {
    constraints.iter().any(|c| c.kind() == kind)
}

/// Position of the first constraint of `kind`.
#[must_use]
pub fn position_of(constraints: &[ColumnConstraint], kind: ConstraintKind) -> Option<usize> {
    constraints.iter().position(|c| c.kind() == kind)
}

/// Returns `true` for a source that names a table through an alias.
#[must_use]
pub const fn is_table_alias(source: &Source) -> bool {
    match source {
        Source::Table(table) => table.alias.is_some(),
        Source::Cte(_) => false,
    }
}

/// Returns `true` for a source that names a CTE moniker.
#[must_use]
pub const fn is_cte_moniker(source: &Source) -> bool {
    match source {
        Source::Cte(_) => true,
        Source::Table(_) => false,
    }
}

/// Returns `true` for a compound query.
#[must_use]
pub const fn is_compound(query: &Query) -> bool {
    match query {
        Query::Compound { .. } => true,
        Query::Select(_) | Query::With(_) => false,
    }
}

/// Returns `true` for a UNION of either flavor.
#[must_use]
pub const fn is_union(op: &CompoundOp) -> bool {
    match op {
        CompoundOp::Union { .. } => true,
        CompoundOp::Except | CompoundOp::Intersect => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expression::{Collation, ComparisonOp};
    use crate::ast::function::{Function, FunctionKind};
    use crate::value::Value;

    fn literal(n: i64) -> Expr {
        Expr::Literal(Value::Integer(n))
    }

    fn equals() -> Expr {
        Expr::Comparison {
            op: ComparisonOp::Eq,
            left: Box::new(literal(1)),
            right: Box::new(literal(2)),
        }
    }

    #[test]
    fn test_literal_is_bindable() {
        assert!(literal(1).node_kind().is_bindable());
        assert!(!equals().node_kind().is_bindable());
    }

    #[test]
    fn test_collated_comparison_is_condition() {
        let collated = equals().collate(Collation::NoCase);
        assert!(is_condition(&collated));
        assert!(!is_condition(&literal(1).collate(Collation::NoCase)));
    }

    #[test]
    fn test_aggregate_detection_is_nested() {
        let count = Expr::Function(Function::new(FunctionKind::Count, vec![literal(1)]));
        let abs = Expr::Function(Function::new(FunctionKind::Abs, vec![count.clone()]));
        assert_eq!(count.node_kind(), NodeKind::AggregateFunction);
        assert_eq!(abs.node_kind(), NodeKind::ScalarFunction);
        assert!(contains_aggregate(&abs));
        assert!(!contains_aggregate(&literal(3)));
    }

    #[test]
    fn test_constraint_queries() {
        use crate::schema::{autoincrement, primary_key, unique};
        let pack = [unique(), autoincrement(), primary_key()];
        assert!(has_constraint(&pack, ConstraintKind::Autoincrement));
        assert_eq!(position_of(&pack, ConstraintKind::PrimaryKey), Some(2));
        assert_eq!(position_of(&pack, ConstraintKind::Check), None);
    }
}
