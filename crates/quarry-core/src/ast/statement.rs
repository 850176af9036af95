//! Statement AST types: DML and DDL.

use crate::ast::expression::{Expr, TableRef};
use crate::ast::query::Query;
use crate::schema::FieldId;

/// Conflict resolution for `INSERT OR ...`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictAction {
    Abort,
    Fail,
    Ignore,
    Replace,
    Rollback,
}

impl ConflictAction {
    /// Returns the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Abort => "ABORT",
            Self::Fail => "FAIL",
            Self::Ignore => "IGNORE",
            Self::Replace => "REPLACE",
            Self::Rollback => "ROLLBACK",
        }
    }
}

/// Rows fed to an INSERT.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertSource {
    /// `VALUES (..), (..)`
    Values(Vec<Vec<Expr>>),
    /// `SELECT ...`
    Query(Box<Query>),
    /// `DEFAULT VALUES`
    DefaultValues,
}

/// INSERT or REPLACE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    /// `REPLACE INTO` instead of `INSERT INTO`.
    pub replace: bool,
    /// `INSERT OR action`.
    pub or_action: Option<ConflictAction>,
    /// Target table.
    pub table: TableRef,
    /// Explicit column list.
    pub columns: Vec<FieldId>,
    /// Rows.
    pub source: InsertSource,
}

/// UPDATE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    /// Target table.
    pub table: TableRef,
    /// `SET column = value` pairs.
    pub assignments: Vec<(FieldId, Expr)>,
    /// WHERE condition.
    pub where_clause: Option<Expr>,
}

/// DELETE statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Delete {
    /// Target table.
    pub table: TableRef,
    /// WHERE condition.
    pub where_clause: Option<Expr>,
}

/// A statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// A query.
    Query(Query),
    /// INSERT / REPLACE.
    Insert(Insert),
    /// UPDATE.
    Update(Update),
    /// DELETE.
    Delete(Delete),
    /// CREATE TABLE for a registered table.
    CreateTable {
        /// Table to create.
        table: TableRef,
        /// `IF NOT EXISTS`.
        if_not_exists: bool,
    },
    /// CREATE INDEX for a registered index.
    CreateIndex {
        /// Index name.
        name: String,
        /// `IF NOT EXISTS`.
        if_not_exists: bool,
    },
    /// DROP TABLE.
    DropTable {
        /// Table name.
        name: String,
        /// `IF EXISTS`.
        if_exists: bool,
    },
    /// DROP INDEX.
    DropIndex {
        /// Index name.
        name: String,
        /// `IF EXISTS`.
        if_exists: bool,
    },
}

impl From<Query> for Statement {
    fn from(query: Query) -> Self {
        Self::Query(query)
    }
}

impl From<Insert> for Statement {
    fn from(insert: Insert) -> Self {
        Self::Insert(insert)
    }
}

impl From<Update> for Statement {
    fn from(update: Update) -> Self {
        Self::Update(update)
    }
}

impl From<Delete> for Statement {
    fn from(delete: Delete) -> Self {
        Self::Delete(delete)
    }
}
