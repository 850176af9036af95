//! CREATE and DROP statements for registered tables and indexes.

use crate::ast::{Statement, TableRef};
use crate::schema::Schema;

/// `CREATE TABLE` for the table mapping `O`.
#[must_use]
pub fn create_table<O: 'static>() -> Statement {
    Statement::CreateTable {
        table: TableRef::of::<O>(),
        if_not_exists: false,
    }
}

/// `CREATE TABLE IF NOT EXISTS` for the table mapping `O`.
#[must_use]
pub fn create_table_if_not_exists<O: 'static>() -> Statement {
    Statement::CreateTable {
        table: TableRef::of::<O>(),
        if_not_exists: true,
    }
}

/// `CREATE INDEX` for the registered index `name`.
pub fn create_index(name: impl Into<String>) -> Statement {
    Statement::CreateIndex {
        name: name.into(),
        if_not_exists: false,
    }
}

/// `DROP TABLE name`.
pub fn drop_table(name: impl Into<String>) -> Statement {
    Statement::DropTable {
        name: name.into(),
        if_exists: false,
    }
}

/// `DROP TABLE IF EXISTS name`.
pub fn drop_table_if_exists(name: impl Into<String>) -> Statement {
    Statement::DropTable {
        name: name.into(),
        if_exists: true,
    }
}

/// `DROP INDEX name`.
pub fn drop_index(name: impl Into<String>) -> Statement {
    Statement::DropIndex {
        name: name.into(),
        if_exists: false,
    }
}

/// `DROP INDEX IF EXISTS name`.
pub fn drop_index_if_exists(name: impl Into<String>) -> Statement {
    Statement::DropIndex {
        name: name.into(),
        if_exists: true,
    }
}

impl Schema {
    /// CREATE statements for every table, then every index, in
    /// registration order.
    #[must_use]
    pub fn create_statements(&self, if_not_exists: bool) -> Vec<Statement> {
        let tables = self.tables().map(|def| Statement::CreateTable {
            table: TableRef {
                type_id: def.type_id(),
                type_name: def.type_name(),
                alias: None,
            },
            if_not_exists,
        });
        let indexes = self.indexes().iter().map(|index| Statement::CreateIndex {
            name: index.name.clone(),
            if_not_exists,
        });
        tables.chain(indexes).collect()
    }
}
