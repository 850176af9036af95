//! SELECT statement builder using the typestate pattern.
//!
//! Clauses must be added in SQL order: FROM, JOIN, WHERE, GROUP BY,
//! HAVING, ORDER BY, LIMIT. Each clause method only exists on the stages
//! that precede it, so a second WHERE or LIMIT does not compile:
//!
//! ```compile_fail
//! use quarry_core::builder::{is_equal, select, val};
//!
//! let _ = select(val(1)).where_(is_equal(1, 1)).where_(is_equal(2, 2));
//! ```

use std::marker::PhantomData;

use crate::ast::{
    Collation, CompoundOp, DynamicOrderEntry, Expr, Function, Join, JoinConstraint, JoinKind,
    Limit, OrderBy, OrderingTerm, Query, SelectStmt, SortOrder, Source, TableRef,
};
use crate::builder::expr::{Condition, IntoExpr};
use crate::error::Result;
use crate::schema::{Field, FieldList};
use crate::serializer::{Context, serialize};

// ================================================================
// Expression lists
// ================================================================

/// A list of expressions: result columns, GROUP BY terms, function
/// arguments.
pub trait ExprList {
    /// Returns the expressions in order.
    fn into_exprs(self) -> Vec<Expr>;
}

impl ExprList for Expr {
    fn into_exprs(self) -> Vec<Expr> {
        vec![self]
    }
}

impl<O, T> ExprList for Field<O, T> {
    fn into_exprs(self) -> Vec<Expr> {
        vec![self.into_expr()]
    }
}

impl ExprList for Function {
    fn into_exprs(self) -> Vec<Expr> {
        vec![Expr::Function(self)]
    }
}

impl ExprList for Condition {
    fn into_exprs(self) -> Vec<Expr> {
        vec![self.into_inner()]
    }
}

impl ExprList for Vec<Expr> {
    fn into_exprs(self) -> Vec<Expr> {
        self
    }
}

impl<V: IntoExpr, const N: usize> ExprList for [V; N] {
    fn into_exprs(self) -> Vec<Expr> {
        self.into_iter().map(IntoExpr::into_expr).collect()
    }
}

macro_rules! impl_expr_list_tuple {
    ($($name:ident),+) => {
        impl<$($name: IntoExpr),+> ExprList for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_exprs(self) -> Vec<Expr> {
                let ($($name,)+) = self;
                vec![$($name.into_expr()),+]
            }
        }
    };
}

impl_expr_list_tuple!(A);
impl_expr_list_tuple!(A, B);
impl_expr_list_tuple!(A, B, C);
impl_expr_list_tuple!(A, B, C, D);
impl_expr_list_tuple!(A, B, C, D, E);
impl_expr_list_tuple!(A, B, C, D, E, F);
impl_expr_list_tuple!(A, B, C, D, E, F, G);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J, K);
impl_expr_list_tuple!(A, B, C, D, E, F, G, H, I, J, K, L);

// ================================================================
// Sources
// ================================================================

impl From<TableRef> for Source {
    fn from(table: TableRef) -> Self {
        Self::Table(table)
    }
}

/// A common table expression used as a source.
pub fn cte_table(name: impl Into<String>) -> Source {
    Source::Cte(name.into())
}

/// One or more FROM sources.
pub trait SourceList {
    /// Returns the sources in order.
    fn into_sources(self) -> Vec<Source>;
}

impl SourceList for TableRef {
    fn into_sources(self) -> Vec<Source> {
        vec![Source::Table(self)]
    }
}

impl SourceList for Source {
    fn into_sources(self) -> Vec<Source> {
        vec![self]
    }
}

impl SourceList for Vec<Source> {
    fn into_sources(self) -> Vec<Source> {
        self
    }
}

macro_rules! impl_source_list_tuple {
    ($($name:ident),+) => {
        impl<$($name: Into<Source>),+> SourceList for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_sources(self) -> Vec<Source> {
                let ($($name,)+) = self;
                vec![$($name.into()),+]
            }
        }
    };
}

impl_source_list_tuple!(A, B);
impl_source_list_tuple!(A, B, C);
impl_source_list_tuple!(A, B, C, D);

/// `ON condition`.
#[must_use]
pub fn on(condition: Condition) -> JoinConstraint {
    JoinConstraint::On(condition.into_inner())
}

/// `USING (columns)`.
pub fn using(columns: impl FieldList) -> JoinConstraint {
    JoinConstraint::Using(columns.field_ids())
}

// ================================================================
// Ordering and limits
// ================================================================

/// An ordering term for `expr`, without direction.
pub fn order_by(expr: impl IntoExpr) -> OrderingTerm {
    OrderingTerm {
        expr: expr.into_expr(),
        order: SortOrder::Unspecified,
        collation: None,
    }
}

/// Several ordering terms, kept in the given order.
pub fn multi_order_by(terms: impl IntoIterator<Item = OrderingTerm>) -> OrderBy {
    OrderBy::Terms(terms.into_iter().collect())
}

impl OrderingTerm {
    /// `ASC`
    #[must_use]
    pub fn asc(mut self) -> Self {
        self.order = SortOrder::Asc;
        self
    }

    /// `DESC`
    #[must_use]
    pub fn desc(mut self) -> Self {
        self.order = SortOrder::Desc;
        self
    }

    /// `COLLATE name`
    #[must_use]
    pub fn collate(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }

    /// `COLLATE BINARY`
    #[must_use]
    pub fn collate_binary(self) -> Self {
        self.collate(Collation::Binary)
    }

    /// `COLLATE NOCASE`
    #[must_use]
    pub fn collate_nocase(self) -> Self {
        self.collate(Collation::NoCase)
    }

    /// `COLLATE RTRIM`
    #[must_use]
    pub fn collate_rtrim(self) -> Self {
        self.collate(Collation::RTrim)
    }
}

/// An ORDER BY list built at runtime.
///
/// Each pushed term is serialized right away and kept as text, so terms of
/// unrelated expression types can share one list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicOrderBy {
    entries: Vec<DynamicOrderEntry>,
}

impl DynamicOrderBy {
    /// Creates an empty list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves `term` against `ctx` and appends it.
    ///
    /// Literals inside the term are inlined, since the entry keeps no
    /// parameters.
    pub fn push(&mut self, ctx: &Context<'_>, term: OrderingTerm) -> Result<()> {
        let name = serialize(&term.expr, &ctx.with_replace_bindable_with_question(false))?;
        self.entries.push(DynamicOrderEntry {
            name,
            order: term.order,
            collation: term.collation,
        });
        Ok(())
    }

    /// Resolved entries.
    #[must_use]
    pub fn entries(&self) -> &[DynamicOrderEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Anything accepted by `ORDER BY`.
pub trait IntoOrderBy {
    /// Converts into an ORDER BY clause.
    fn into_order_by(self) -> OrderBy;
}

impl IntoOrderBy for OrderBy {
    fn into_order_by(self) -> OrderBy {
        self
    }
}

impl IntoOrderBy for OrderingTerm {
    fn into_order_by(self) -> OrderBy {
        OrderBy::Terms(vec![self])
    }
}

impl IntoOrderBy for Vec<OrderingTerm> {
    fn into_order_by(self) -> OrderBy {
        OrderBy::Terms(self)
    }
}

impl IntoOrderBy for DynamicOrderBy {
    fn into_order_by(self) -> OrderBy {
        OrderBy::Dynamic(self.entries)
    }
}

impl IntoOrderBy for Expr {
    fn into_order_by(self) -> OrderBy {
        order_by(self).into_order_by()
    }
}

impl<O, T> IntoOrderBy for Field<O, T> {
    fn into_order_by(self) -> OrderBy {
        order_by(self).into_order_by()
    }
}

/// `LIMIT n`.
pub fn limit(n: impl IntoExpr) -> Limit {
    Limit {
        limit: n.into_expr(),
        offset: None,
        offset_implicit: false,
    }
}

/// `LIMIT offset, n`: offset first, comma separated.
pub fn offset_limit(offset: impl IntoExpr, n: impl IntoExpr) -> Limit {
    Limit {
        limit: n.into_expr(),
        offset: Some(offset.into_expr()),
        offset_implicit: true,
    }
}

impl Limit {
    /// `LIMIT n OFFSET offset`.
    #[must_use]
    pub fn offset(mut self, offset: impl IntoExpr) -> Self {
        self.offset = Some(offset.into_expr());
        self.offset_implicit = false;
        self
    }
}

/// Anything accepted by `LIMIT`.
pub trait IntoLimit {
    /// Converts into a LIMIT clause.
    fn into_limit(self) -> Limit;
}

impl IntoLimit for Limit {
    fn into_limit(self) -> Limit {
        self
    }
}

impl IntoLimit for i64 {
    fn into_limit(self) -> Limit {
        limit(self)
    }
}

impl IntoLimit for i32 {
    fn into_limit(self) -> Limit {
        limit(self)
    }
}

impl IntoLimit for u32 {
    fn into_limit(self) -> Limit {
        limit(self)
    }
}

// ================================================================
// Typestate
// ================================================================

mod sealed {
    pub trait Sealed {}
}

/// Stage: result columns only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Projection;
/// Stage: FROM or JOIN added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sourced;
/// Stage: WHERE added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Filtered;
/// Stage: GROUP BY added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grouped;
/// Stage: HAVING added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Having;
/// Stage: ORDER BY added.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ordered;
/// Stage: LIMIT added; the query is complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limited;

impl sealed::Sealed for Projection {}
impl sealed::Sealed for Sourced {}
impl sealed::Sealed for Filtered {}
impl sealed::Sealed for Grouped {}
impl sealed::Sealed for Having {}
impl sealed::Sealed for Ordered {}
impl sealed::Sealed for Limited {}

/// Stages that accept JOIN.
pub trait AcceptsJoin: sealed::Sealed {}
/// Stages that accept WHERE.
pub trait AcceptsWhere: sealed::Sealed {}
/// Stages that accept GROUP BY.
pub trait AcceptsGroupBy: sealed::Sealed {}
/// Stages that accept ORDER BY.
pub trait AcceptsOrderBy: sealed::Sealed {}
/// Stages that accept LIMIT.
pub trait AcceptsLimit: sealed::Sealed {}

impl AcceptsJoin for Projection {}
impl AcceptsJoin for Sourced {}

impl AcceptsWhere for Projection {}
impl AcceptsWhere for Sourced {}

impl AcceptsGroupBy for Projection {}
impl AcceptsGroupBy for Sourced {}
impl AcceptsGroupBy for Filtered {}

impl AcceptsOrderBy for Projection {}
impl AcceptsOrderBy for Sourced {}
impl AcceptsOrderBy for Filtered {}
impl AcceptsOrderBy for Grouped {}
impl AcceptsOrderBy for Having {}

impl AcceptsLimit for Projection {}
impl AcceptsLimit for Sourced {}
impl AcceptsLimit for Filtered {}
impl AcceptsLimit for Grouped {}
impl AcceptsLimit for Having {}
impl AcceptsLimit for Ordered {}

/// A SELECT under construction.
///
/// When no FROM is given, the serializer lists the tables referenced by the
/// query's clauses.
#[derive(Debug, Clone, PartialEq)]
pub struct Select<S = Projection> {
    stmt: SelectStmt,
    _state: PhantomData<S>,
}

/// `SELECT columns`.
pub fn select(columns: impl ExprList) -> Select<Projection> {
    Select {
        stmt: SelectStmt {
            columns: columns.into_exprs(),
            ..SelectStmt::default()
        },
        _state: PhantomData,
    }
}

/// `SELECT DISTINCT columns`.
pub fn select_distinct(columns: impl ExprList) -> Select<Projection> {
    select(columns).distinct()
}

impl<S> Select<S> {
    fn advance<N>(self) -> Select<N> {
        Select {
            stmt: self.stmt,
            _state: PhantomData,
        }
    }

    /// The statement built so far.
    #[must_use]
    pub const fn stmt(&self) -> &SelectStmt {
        &self.stmt
    }

    /// Unwraps the statement.
    #[must_use]
    pub fn into_stmt(self) -> SelectStmt {
        self.stmt
    }

    fn push_join(mut self, kind: JoinKind, source: Source, constraint: Option<JoinConstraint>) -> Self {
        self.stmt.joins.push(Join {
            kind,
            source,
            constraint,
        });
        self
    }
}

impl Select<Projection> {
    /// `SELECT DISTINCT`.
    #[must_use]
    pub fn distinct(mut self) -> Self {
        self.stmt.distinct = true;
        self
    }

    /// `FROM sources`.
    #[must_use]
    pub fn from(mut self, sources: impl SourceList) -> Select<Sourced> {
        self.stmt.from = sources.into_sources();
        self.advance()
    }
}

impl<S: AcceptsJoin> Select<S> {
    /// `JOIN source constraint`.
    #[must_use]
    pub fn join(self, source: impl Into<Source>, constraint: JoinConstraint) -> Select<Sourced> {
        self.push_join(JoinKind::Plain, source.into(), Some(constraint))
            .advance()
    }

    /// `INNER JOIN source constraint`.
    #[must_use]
    pub fn inner_join(self, source: impl Into<Source>, constraint: JoinConstraint) -> Select<Sourced> {
        self.push_join(JoinKind::Inner, source.into(), Some(constraint))
            .advance()
    }

    /// `LEFT JOIN source constraint`.
    #[must_use]
    pub fn left_join(self, source: impl Into<Source>, constraint: JoinConstraint) -> Select<Sourced> {
        self.push_join(JoinKind::Left, source.into(), Some(constraint))
            .advance()
    }

    /// `LEFT OUTER JOIN source constraint`.
    #[must_use]
    pub fn left_outer_join(
        self,
        source: impl Into<Source>,
        constraint: JoinConstraint,
    ) -> Select<Sourced> {
        self.push_join(JoinKind::LeftOuter, source.into(), Some(constraint))
            .advance()
    }

    /// `CROSS JOIN source`.
    #[must_use]
    pub fn cross_join(self, source: impl Into<Source>) -> Select<Sourced> {
        self.push_join(JoinKind::Cross, source.into(), None).advance()
    }

    /// `NATURAL JOIN source`.
    #[must_use]
    pub fn natural_join(self, source: impl Into<Source>) -> Select<Sourced> {
        self.push_join(JoinKind::Natural, source.into(), None)
            .advance()
    }
}

impl<S: AcceptsWhere> Select<S> {
    /// `WHERE condition`.
    #[must_use]
    pub fn where_(mut self, condition: Condition) -> Select<Filtered> {
        self.stmt.where_clause = Some(condition.into_inner());
        self.advance()
    }
}

impl<S: AcceptsGroupBy> Select<S> {
    /// `GROUP BY exprs`.
    #[must_use]
    pub fn group_by(mut self, exprs: impl ExprList) -> Select<Grouped> {
        self.stmt.group_by = exprs.into_exprs();
        self.advance()
    }
}

impl Select<Grouped> {
    /// `HAVING condition`.
    #[must_use]
    pub fn having(mut self, condition: Condition) -> Select<Having> {
        self.stmt.having = Some(condition.into_inner());
        self.advance()
    }
}

impl<S: AcceptsOrderBy> Select<S> {
    /// `ORDER BY terms`.
    #[must_use]
    pub fn order_by(mut self, terms: impl IntoOrderBy) -> Select<Ordered> {
        self.stmt.order_by = Some(terms.into_order_by());
        self.advance()
    }
}

impl<S: AcceptsLimit> Select<S> {
    /// `LIMIT ...`, in any of its three forms.
    #[must_use]
    pub fn limit(mut self, limit: impl IntoLimit) -> Select<Limited> {
        self.stmt.limit = Some(limit.into_limit());
        self.advance()
    }
}

// ================================================================
// Queries
// ================================================================

/// Anything that can stand as a query.
pub trait IntoQuery {
    /// Converts into a query node.
    fn into_query(self) -> Query;
}

impl IntoQuery for Query {
    fn into_query(self) -> Query {
        self
    }
}

impl IntoQuery for SelectStmt {
    fn into_query(self) -> Query {
        Query::Select(Box::new(self))
    }
}

impl<S> IntoQuery for Select<S> {
    fn into_query(self) -> Query {
        self.stmt.into_query()
    }
}

impl<S> IntoExpr for Select<S> {
    fn into_expr(self) -> Expr {
        Expr::Subquery(Box::new(self.into_query()))
    }
}

fn compound(op: CompoundOp, left: impl IntoQuery, right: impl IntoQuery) -> Query {
    Query::Compound {
        op,
        left: Box::new(left.into_query()),
        right: Box::new(right.into_query()),
    }
}

/// `left UNION right`
pub fn union(left: impl IntoQuery, right: impl IntoQuery) -> Query {
    compound(CompoundOp::Union { all: false }, left, right)
}

/// `left UNION ALL right`
pub fn union_all(left: impl IntoQuery, right: impl IntoQuery) -> Query {
    compound(CompoundOp::Union { all: true }, left, right)
}

/// `left EXCEPT right`
pub fn except(left: impl IntoQuery, right: impl IntoQuery) -> Query {
    compound(CompoundOp::Except, left, right)
}

/// `left INTERSECT right`
pub fn intersect(left: impl IntoQuery, right: impl IntoQuery) -> Query {
    compound(CompoundOp::Intersect, left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::expr::{is_equal, val};

    #[test]
    fn test_clauses_land_in_statement() {
        let query = select((val(1), val(2)))
            .where_(is_equal(1, 1))
            .group_by(val(1))
            .having(is_equal(2, 2))
            .order_by(order_by(val(1)).desc())
            .limit(limit(5).offset(10));
        let stmt = query.stmt();
        assert_eq!(stmt.columns.len(), 2);
        assert!(stmt.where_clause.is_some());
        assert!(stmt.having.is_some());
        let limit = stmt.limit.as_ref().unwrap();
        assert!(limit.has_offset());
        assert!(!limit.offset_implicit);
    }

    #[test]
    fn test_offset_limit_is_implicit_form() {
        let form = offset_limit(10, 5);
        assert!(form.offset_implicit);
        assert_eq!(form.limit, val(5));
    }

    #[test]
    fn test_compound_shapes() {
        let query = union_all(select(val(1)), select(val(2)));
        assert!(matches!(
            query,
            Query::Compound {
                op: CompoundOp::Union { all: true },
                ..
            }
        ));
    }

    #[test]
    fn test_integer_limit_sugar() {
        let query = select(val(1)).limit(3);
        assert_eq!(query.stmt().limit.as_ref().unwrap().limit, val(3));
    }
}
