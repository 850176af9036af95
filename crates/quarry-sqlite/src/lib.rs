//! # quarry-sqlite
//!
//! SQLite storage for `quarry-core`, built on sqlx.
//!
//! `quarry-core` renders statements; this crate executes them:
//!
//! - Parameters are bound in placeholder order from the collected
//!   [`Value`](quarry_core::Value)s.
//! - Rows are read back by storage class and written into mapped objects
//!   column by column.
//! - `PRAGMA table_info` feeds [`Introspect`](quarry_core::Introspect), so a
//!   declared schema can be compared with the live database.
//!
//! ## Example
//!
//! ```rust
//! use quarry_core::schema::Schema;
//! use quarry_derive::Mapped;
//! use quarry_sqlite::{Storage, StorageOptions};
//!
//! #[derive(Debug, Default, Clone, PartialEq, Mapped)]
//! #[table(name = "users")]
//! struct User {
//!     #[column(primary_key, autoincrement)]
//!     id: i64,
//!     name: String,
//! }
//!
//! # tokio_test_block();
//! # fn tokio_test_block() {
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let schema = Schema::builder().table(User::table()).build()?;
//! let storage = Storage::connect(schema, &StorageOptions::in_memory()).await?;
//! storage.create_tables().await?;
//!
//! let id = storage
//!     .insert(&User { id: 0, name: "ann".into() })
//!     .await?;
//! let users: Vec<User> = storage.get_all().await?;
//! assert_eq!(users, vec![User { id, name: "ann".into() }]);
//! # Ok::<(), quarry_sqlite::Error>(())
//! # }).unwrap();
//! # }
//! ```

mod error;
mod options;
mod row;
mod storage;

pub use error::{Error, Result};
pub use options::StorageOptions;
pub use storage::Storage;
