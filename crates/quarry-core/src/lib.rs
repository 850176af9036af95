//! # quarry-core
//!
//! A typed SQL statement builder and serializer for SQLite.
//!
//! This crate provides:
//! - A schema model mapping Rust structs to tables through typed [`Field`] handles
//! - Statement builders that check clause order with the typestate pattern
//! - A serializer that resolves field handles to quoted names and collects
//!   bound parameters in placeholder order
//! - Table descriptors and diffing against a live database
//!
//! Nothing here performs I/O; `quarry-sqlite` executes what this crate
//! renders.
//!
//! ## Building a query
//!
//! ```rust
//! use quarry_core::builder::{Operand, select};
//! use quarry_core::schema::Schema;
//! use quarry_core::serializer::prepare;
//! use quarry_core::Value;
//! use quarry_derive::Mapped;
//!
//! #[derive(Debug, Default, Clone, Mapped)]
//! #[table(name = "users")]
//! struct User {
//!     #[column(primary_key, autoincrement)]
//!     id: i64,
//!     name: String,
//! }
//!
//! let schema = Schema::builder().table(User::table()).build()?;
//! let query = select((User::id(), User::name())).where_(User::id().eq(5));
//! let prepared = prepare(&query, &schema.context())?;
//! assert_eq!(
//!     prepared.sql,
//!     "SELECT \"users\".\"id\", \"users\".\"name\" FROM \"users\" WHERE (\"users\".\"id\" = ?)"
//! );
//! assert_eq!(prepared.params, vec![Value::Integer(5)]);
//! # Ok::<(), quarry_core::Error>(())
//! ```
//!
//! ## Clause order
//!
//! Each clause moves the builder to a new state, and a clause is only
//! available from the states that precede it:
//!
//! ```compile_fail
//! use quarry_core::builder::{Operand, limit, select, val};
//!
//! // LIMIT before WHERE does not compile.
//! let query = select(val(1)).limit(limit(1)).where_(val(1).eq(1));
//! ```

pub mod ast;
pub mod builder;
pub mod error;
pub mod introspect;
pub mod schema;
pub mod serializer;
pub mod value;

pub use error::{Error, Result};
pub use introspect::{ColumnInfo, Introspect, SyncStatus, TableDiff};
pub use schema::{Field, Schema, Table};
pub use serializer::{Context, Prepared, prepare, serialize};
pub use value::{FromValue, ToValue, Value};
