//! SELECT, compound and WITH query nodes.

use crate::ast::expression::{Collation, CteColumnRef, Expr, SortOrder, Source};
use crate::schema::FieldId;

/// Join operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    /// `JOIN`
    Plain,
    /// `INNER JOIN`
    Inner,
    /// `LEFT JOIN`
    Left,
    /// `LEFT OUTER JOIN`
    LeftOuter,
    /// `CROSS JOIN`
    Cross,
    /// `NATURAL JOIN`
    Natural,
}

impl JoinKind {
    /// Returns the keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Plain => "JOIN",
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::LeftOuter => "LEFT OUTER JOIN",
            Self::Cross => "CROSS JOIN",
            Self::Natural => "NATURAL JOIN",
        }
    }

    /// Returns `true` if the join takes an ON or USING constraint.
    #[must_use]
    pub const fn takes_constraint(&self) -> bool {
        !matches!(self, Self::Cross | Self::Natural)
    }
}

/// `ON` / `USING` constraint of a join.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinConstraint {
    /// `ON condition`
    On(Expr),
    /// `USING (columns)`
    Using(Vec<FieldId>),
}

/// One JOIN clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    /// Operator.
    pub kind: JoinKind,
    /// Joined source.
    pub source: Source,
    /// Constraint, absent for CROSS and NATURAL joins.
    pub constraint: Option<JoinConstraint>,
}

/// `expr [COLLATE c] [ASC|DESC]`.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderingTerm {
    /// Sort key.
    pub expr: Expr,
    /// Direction.
    pub order: SortOrder,
    /// Collation.
    pub collation: Option<Collation>,
}

/// An ordering term resolved to SQL text when it was pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicOrderEntry {
    /// Serialized sort key.
    pub name: String,
    /// Direction.
    pub order: SortOrder,
    /// Collation.
    pub collation: Option<Collation>,
}

/// ORDER BY clause.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderBy {
    /// Terms kept as expression trees.
    Terms(Vec<OrderingTerm>),
    /// Terms appended at runtime and resolved eagerly.
    Dynamic(Vec<DynamicOrderEntry>),
}

impl OrderBy {
    /// Returns `true` if there is nothing to order by.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Terms(terms) => terms.is_empty(),
            Self::Dynamic(entries) => entries.is_empty(),
        }
    }
}

/// LIMIT clause.
///
/// The three SQL forms are `LIMIT lim`, `LIMIT lim OFFSET off` and
/// `LIMIT off, lim`; `offset_implicit` selects the comma form.
#[derive(Debug, Clone, PartialEq)]
pub struct Limit {
    /// Row limit.
    pub limit: Expr,
    /// Row offset.
    pub offset: Option<Expr>,
    /// Print the offset first, comma separated.
    pub offset_implicit: bool,
}

impl Limit {
    /// Returns `true` if an offset is present.
    #[must_use]
    pub const fn has_offset(&self) -> bool {
        self.offset.is_some()
    }
}

/// A single SELECT.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectStmt {
    /// `SELECT DISTINCT`.
    pub distinct: bool,
    /// Result columns.
    pub columns: Vec<Expr>,
    /// Explicit FROM sources; deduced from the columns when empty.
    pub from: Vec<Source>,
    /// JOIN clauses in order.
    pub joins: Vec<Join>,
    /// WHERE condition.
    pub where_clause: Option<Expr>,
    /// GROUP BY expressions.
    pub group_by: Vec<Expr>,
    /// HAVING condition.
    pub having: Option<Expr>,
    /// ORDER BY clause.
    pub order_by: Option<OrderBy>,
    /// LIMIT clause.
    pub limit: Option<Limit>,
}

/// Compound select operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompoundOp {
    /// `UNION` or `UNION ALL`.
    Union {
        /// Keep duplicates.
        all: bool,
    },
    /// `EXCEPT`
    Except,
    /// `INTERSECT`
    Intersect,
}

impl CompoundOp {
    /// Returns the keyword.
    #[must_use]
    pub const fn keyword(&self) -> &'static str {
        match self {
            Self::Union { all: false } => "UNION",
            Self::Union { all: true } => "UNION ALL",
            Self::Except => "EXCEPT",
            Self::Intersect => "INTERSECT",
        }
    }
}

/// A common table expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Cte {
    /// Moniker.
    pub name: String,
    /// Explicit column list.
    pub columns: Vec<CteColumnRef>,
    /// Defining query.
    pub query: Box<Query>,
}

/// `WITH [RECURSIVE] ctes body`.
#[derive(Debug, Clone, PartialEq)]
pub struct With {
    /// `WITH RECURSIVE`.
    pub recursive: bool,
    /// CTEs in declaration order.
    pub ctes: Vec<Cte>,
    /// Final query.
    pub body: Box<Query>,
}

/// A query: something that yields rows.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A single SELECT.
    Select(Box<SelectStmt>),
    /// `left op right`.
    Compound {
        /// Operator.
        op: CompoundOp,
        /// Left operand.
        left: Box<Query>,
        /// Right operand.
        right: Box<Query>,
    },
    /// A WITH clause and its body.
    With(With),
}

impl Query {
    /// Result columns of the leftmost SELECT.
    #[must_use]
    pub fn result_columns(&self) -> &[Expr] {
        match self {
            Self::Select(select) => &select.columns,
            Self::Compound { left, .. } => left.result_columns(),
            Self::With(with) => with.body.result_columns(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_keywords() {
        assert_eq!(JoinKind::LeftOuter.keyword(), "LEFT OUTER JOIN");
        assert!(!JoinKind::Cross.takes_constraint());
        assert!(JoinKind::Inner.takes_constraint());
    }

    #[test]
    fn test_compound_keywords() {
        assert_eq!(CompoundOp::Union { all: true }.keyword(), "UNION ALL");
        assert_eq!(CompoundOp::Intersect.keyword(), "INTERSECT");
    }
}
