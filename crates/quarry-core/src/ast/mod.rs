//! Abstract syntax tree types.
//!
//! Nodes are plain data: they expose their children and their canonical
//! keyword, and the [`serializer`](crate::serializer) turns them into SQL.

pub mod classify;
mod expression;
mod function;
mod query;
mod statement;

pub use classify::NodeKind;
pub use expression::{
    ArithmeticOp, Case, Collation, ComparisonOp, CteColumnRef, Expr, InList, LogicalOp, SortOrder,
    Source, TableRef,
};
pub use function::{Function, FunctionKind};
pub use query::{
    CompoundOp, Cte, DynamicOrderEntry, Join, JoinConstraint, JoinKind, Limit, OrderBy,
    OrderingTerm, Query, SelectStmt, With,
};
pub use statement::{ConflictAction, Delete, Insert, InsertSource, Statement, Update};
