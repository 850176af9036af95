//! Async storage over a SQLite pool.
//!
//! [`Storage`] renders statements with the schema it was opened with and
//! executes them through sqlx. Mapped objects are read back column by column
//! in declaration order.

use std::sync::Arc;

use quarry_core::ast::{Statement, TableRef};
use quarry_core::introspect::{ColumnInfo, Introspect, SyncStatus, sync_status};
use quarry_core::schema::{Schema, TableDef};
use quarry_core::serializer::{Serialize, prepare, quote_ident};
use quarry_core::{FromValue, Prepared, Value};
use sqlx::sqlite::{SqlitePool, SqliteQueryResult};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::options::StorageOptions;
use crate::row::{bind_all, read_row};

/// A schema bound to a connection pool.
#[derive(Debug, Clone)]
pub struct Storage {
    pool: SqlitePool,
    schema: Arc<Schema>,
}

impl Storage {
    /// Opens a pool with `options`.
    pub async fn connect(schema: impl Into<Arc<Schema>>, options: &StorageOptions) -> Result<Self> {
        let pool = options
            .pool_options()
            .connect_with(options.connect_options()?)
            .await?;
        info!(url = %options.url(), "Opened SQLite storage");
        Ok(Self::from_pool(pool, schema))
    }

    /// Wraps an existing pool.
    pub fn from_pool(pool: SqlitePool, schema: impl Into<Arc<Schema>>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    /// The schema statements are resolved against.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Executes a statement, returning the number of affected rows.
    pub async fn execute<N: Serialize + ?Sized>(&self, node: &N) -> Result<u64> {
        Ok(self.run(node).await?.rows_affected())
    }

    /// Runs a query, returning every row as values.
    pub async fn fetch_values<N: Serialize + ?Sized>(&self, node: &N) -> Result<Vec<Vec<Value>>> {
        let prepared = self.prepare_logged(node)?;
        let rows = bind_all(sqlx::query(&prepared.sql), prepared.params)
            .fetch_all(&self.pool)
            .await?;
        rows.iter().map(read_row).collect()
    }

    /// Runs a single-column query, converting each value to `T`.
    pub async fn fetch_column<T: FromValue, N: Serialize + ?Sized>(&self, node: &N) -> Result<Vec<T>> {
        let rows = self.fetch_values(node).await?;
        rows.into_iter()
            .map(|row| {
                let value = row.into_iter().next().unwrap_or(Value::Null);
                T::from_value(value).map_err(Error::from)
            })
            .collect()
    }

    /// Creates every declared table and index that does not exist yet.
    pub async fn create_tables(&self) -> Result<()> {
        for statement in self.schema.create_statements(true) {
            self.execute(&statement).await?;
        }
        Ok(())
    }

    /// Compares every declared table with the database.
    ///
    /// Missing tables and indexes are created. Tables that exist but differ
    /// from their declaration are reported and left untouched.
    pub async fn sync_schema(&self) -> Result<Vec<(String, SyncStatus)>> {
        let mut report = Vec::new();
        for table in self.schema.tables() {
            let expected = self.schema.table_info(table)?;
            let live = Introspect::table_info(self, table.name()).await?;
            let status = sync_status(&expected, live.as_deref());
            match status {
                SyncStatus::AlreadyInSync => {}
                SyncStatus::NewTable => {
                    self.execute(&Statement::CreateTable {
                        table: table_ref(table),
                        if_not_exists: true,
                    })
                    .await?;
                }
                drift => {
                    warn!(table = %table.name(), status = ?drift, "Table differs from its declaration");
                }
            }
            report.push((table.name().to_string(), status));
        }
        for index in self.schema.indexes() {
            self.execute(&Statement::CreateIndex {
                name: index.name.clone(),
                if_not_exists: true,
            })
            .await?;
        }
        Ok(report)
    }

    /// Inserts `obj`, returning its rowid.
    ///
    /// A rowid alias column is left out so SQLite assigns it.
    pub async fn insert<O: 'static>(&self, obj: &O) -> Result<i64> {
        let insert = self.schema.table::<O>()?.insert(obj);
        Ok(self.run(&insert).await?.last_insert_rowid())
    }

    /// Inserts or replaces `obj`, key columns included.
    pub async fn replace<O: 'static>(&self, obj: &O) -> Result<()> {
        let replace = self.schema.table::<O>()?.replace(obj);
        self.execute(&replace).await?;
        Ok(())
    }

    /// Writes every non-key column of `obj` to the row with its key.
    pub async fn update<O: 'static>(&self, obj: &O) -> Result<()> {
        let update = self.schema.table::<O>()?.update(obj)?;
        self.execute(&update).await?;
        Ok(())
    }

    /// Deletes the row of `O` with the given primary key.
    pub async fn remove<O: 'static>(&self, key: Vec<Value>) -> Result<()> {
        let delete = self.schema.table::<O>()?.remove_by_key(key)?;
        self.execute(&delete).await?;
        Ok(())
    }

    /// Loads the row of `O` with the given primary key.
    pub async fn get<O: Default + 'static>(&self, key: Vec<Value>) -> Result<O> {
        self.get_optional(key.clone()).await?.ok_or_else(|| {
            let table = self
                .schema
                .find_table_name::<O>()
                .map_or_else(|_| String::new(), String::from);
            Error::NotFound {
                table,
                key: key
                    .iter()
                    .map(Value::to_sql_inline)
                    .collect::<Vec<_>>()
                    .join(", "),
            }
        })
    }

    /// Loads the row of `O` with the given primary key, if any.
    pub async fn get_optional<O: Default + 'static>(&self, key: Vec<Value>) -> Result<Option<O>> {
        let table = self.schema.table::<O>()?;
        let query = table.get_by_key(key)?;
        let row = self.fetch_values(&query).await?.into_iter().next();
        row.map(|values| {
            let mut obj = O::default();
            table.populate(&mut obj, values)?;
            Ok(obj)
        })
        .transpose()
    }

    /// Loads every row of `O`.
    pub async fn get_all<O: Default + 'static>(&self) -> Result<Vec<O>> {
        let table = self.schema.table::<O>()?;
        let rows = self.fetch_values(&table.get_all()).await?;
        rows.into_iter()
            .map(|values| {
                let mut obj = O::default();
                table.populate(&mut obj, values)?;
                Ok(obj)
            })
            .collect()
    }

    fn prepare_logged<N: Serialize + ?Sized>(&self, node: &N) -> Result<Prepared> {
        let prepared = prepare(node, &self.schema.context())?;
        debug!(sql = %prepared.sql, params = prepared.params.len(), "Executing SQL");
        Ok(prepared)
    }

    async fn run<N: Serialize + ?Sized>(&self, node: &N) -> Result<SqliteQueryResult> {
        let prepared = self.prepare_logged(node)?;
        bind_all(sqlx::query(&prepared.sql), prepared.params)
            .execute(&self.pool)
            .await
            .map_err(Error::from)
    }
}

impl Introspect for Storage {
    type Error = Error;

    async fn table_info(&self, table: &str) -> Result<Option<Vec<ColumnInfo>>> {
        let sql = format!("PRAGMA table_info({})", quote_ident(table));
        debug!(sql = %sql, params = 0, "Executing SQL");
        let rows: Vec<(i64, String, String, i64, Option<String>, i64)> =
            sqlx::query_as(&sql).fetch_all(&self.pool).await?;
        if rows.is_empty() {
            return Ok(None);
        }
        Ok(Some(
            rows.into_iter()
                .map(|(cid, name, data_type, not_null, default_value, pk)| ColumnInfo {
                    cid,
                    name,
                    data_type,
                    not_null: not_null != 0,
                    default_value,
                    pk,
                })
                .collect(),
        ))
    }
}

fn table_ref(table: &TableDef) -> TableRef {
    TableRef {
        type_id: table.type_id(),
        type_name: table.type_name(),
        alias: None,
    }
}
