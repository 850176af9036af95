//! Statement builders.
//!
//! Builders only assemble [`ast`](crate::ast) nodes; nothing is resolved
//! against a schema until the tree is handed to the
//! [`serializer`](crate::serializer).
//!
//! ```rust
//! use quarry_core::builder::{Operand, limit, order_by, select, val};
//!
//! let query = select((val(1), val("a")))
//!     .where_(val(1).eq(1))
//!     .order_by(order_by(val(1)).desc())
//!     .limit(limit(5));
//! assert_eq!(query.stmt().columns.len(), 2);
//! ```

mod case;
mod crud;
mod cte;
mod ddl;
mod expr;
mod function;
mod select;

pub use case::{CaseBuilder, HasWhen, NoWhen, PendingWhen, case, case_on};
pub use crud::{insert_into, remove_all, replace_into, update_all};
pub use cte::{CteBuilder, IntoCtes, cte, with, with_recursive};
pub use ddl::{
    create_index, create_table, create_table_if_not_exists, drop_index, drop_index_if_exists,
    drop_table, drop_table_if_exists,
};
pub use expr::{
    Condition, IntoExpr, Operand, WhereClause, alias, alias_ref, and, asterisk, asterisk_defined,
    between, c, cte_column, cte_field, exists, glob, greater_or_equal, greater_than, in_,
    in_query, is_equal, is_not_equal, is_not_null, is_null, lesser_or_equal, lesser_than, like,
    like_escape, not, not_in, not_in_query, or, star, table, val, where_,
};
pub use function::{
    abs, avg, char_, changes, coalesce, count, count_all, count_distinct, date, datetime, group_concat,
    group_concat_sep, hex, ifnull, instr, julianday, last_insert_rowid, length, lower, ltrim,
    ltrim_chars, max, max_of, min, min_of, nullif, quote, random, randomblob, replace, round,
    round_digits, rtrim, rtrim_chars, strftime, substr, substr_len, sum, time, total,
    total_changes, trim, trim_chars, typeof_, unicode, upper, zeroblob,
};
pub use select::{
    AcceptsGroupBy, AcceptsJoin, AcceptsLimit, AcceptsOrderBy, AcceptsWhere, DynamicOrderBy,
    ExprList, Filtered, Grouped, Having, IntoLimit, IntoOrderBy, IntoQuery, Limited, Ordered,
    Projection, Select, SourceList, Sourced, cte_table, except, intersect, limit, multi_order_by,
    offset_limit, on, order_by, select, select_distinct, union, union_all, using,
};
