//! INSERT, UPDATE and DELETE builders, plus object-driven statements
//! generated from a table mapping.

use crate::ast::{
    ConflictAction, Delete, Expr, Insert, InsertSource, Query, SelectStmt, TableRef, Update,
};
use crate::builder::expr::{Condition, IntoExpr, asterisk_defined, is_equal};
use crate::builder::select::{ExprList, IntoQuery, select};
use crate::error::{Error, Result};
use crate::schema::{ColumnDef, FieldId, FieldList, Table, TableDef};
use crate::value::Value;

// ================================================================
// Free builders
// ================================================================

/// `INSERT INTO` the table mapping `O`.
///
/// Add rows with [`Insert::values`], or switch the source with
/// [`Insert::select`] or [`Insert::default_values`].
#[must_use]
pub fn insert_into<O: 'static>() -> Insert {
    Insert {
        replace: false,
        or_action: None,
        table: TableRef::of::<O>(),
        columns: Vec::new(),
        source: InsertSource::Values(Vec::new()),
    }
}

/// `REPLACE INTO` the table mapping `O`.
#[must_use]
pub fn replace_into<O: 'static>() -> Insert {
    Insert {
        replace: true,
        ..insert_into::<O>()
    }
}

impl Insert {
    /// `INSERT OR action`.
    #[must_use]
    pub fn or(mut self, action: ConflictAction) -> Self {
        self.or_action = Some(action);
        self
    }

    /// Explicit column list.
    #[must_use]
    pub fn columns(mut self, columns: impl FieldList) -> Self {
        self.columns = columns.field_ids();
        self
    }

    /// Appends one row of values.
    #[must_use]
    pub fn values(mut self, row: impl ExprList) -> Self {
        let row = row.into_exprs();
        match &mut self.source {
            InsertSource::Values(rows) => rows.push(row),
            other => *other = InsertSource::Values(vec![row]),
        }
        self
    }

    /// `INSERT ... SELECT ...`.
    #[must_use]
    pub fn select(mut self, query: impl IntoQuery) -> Self {
        self.source = InsertSource::Query(Box::new(query.into_query()));
        self
    }

    /// `DEFAULT VALUES`.
    #[must_use]
    pub fn default_values(mut self) -> Self {
        self.source = InsertSource::DefaultValues;
        self
    }
}

/// `UPDATE` the table mapping `O`.
#[must_use]
pub fn update_all<O: 'static>() -> Update {
    Update {
        table: TableRef::of::<O>(),
        assignments: Vec::new(),
        where_clause: None,
    }
}

impl Update {
    /// `SET field = value`.
    #[must_use]
    pub fn set(mut self, field: impl Into<FieldId>, value: impl IntoExpr) -> Self {
        self.assignments.push((field.into(), value.into_expr()));
        self
    }

    /// `WHERE condition`.
    #[must_use]
    pub fn where_(mut self, condition: Condition) -> Self {
        self.where_clause = Some(condition.into_inner());
        self
    }
}

/// `DELETE FROM` the table mapping `O`.
#[must_use]
pub fn remove_all<O: 'static>() -> Delete {
    Delete {
        table: TableRef::of::<O>(),
        where_clause: None,
    }
}

impl Delete {
    /// `WHERE condition`.
    #[must_use]
    pub fn where_(mut self, condition: Condition) -> Self {
        self.where_clause = Some(condition.into_inner());
        self
    }
}

// ================================================================
// Object-driven statements
// ================================================================

fn table_ref(def: &TableDef) -> TableRef {
    TableRef {
        type_id: def.type_id(),
        type_name: def.type_name(),
        alias: None,
    }
}

fn key_columns(def: &TableDef) -> Result<Vec<&ColumnDef>> {
    let keys: Vec<&ColumnDef> = def
        .primary_key_columns()
        .into_iter()
        .filter_map(|name| def.column_by_name(name))
        .collect();
    if keys.is_empty() {
        return Err(Error::InvalidSchema(format!(
            "table `{}` has no primary key",
            def.name()
        )));
    }
    Ok(keys)
}

fn key_condition(def: &TableDef, key: Vec<Value>) -> Result<Condition> {
    let columns = key_columns(def)?;
    if columns.len() != key.len() {
        return Err(Error::InvalidExpression(format!(
            "table `{}` has a {}-column primary key, got {} values",
            def.name(),
            columns.len(),
            key.len()
        )));
    }
    let mut terms = columns
        .into_iter()
        .zip(key)
        .map(|(column, value)| is_equal(column.field(), Expr::Literal(value)));
    // The length check above guarantees at least one term.
    let first = terms.next().ok_or_else(|| {
        Error::InvalidSchema(format!("table `{}` has no primary key", def.name()))
    })?;
    Ok(terms.fold(first, Condition::and))
}

impl<O: 'static> Table<O> {
    fn object_insert(&self, obj: &O, replace: bool) -> Insert {
        let def = self.def();
        let rowid = def.rowid_alias().map(ColumnDef::name);
        let mut columns = Vec::new();
        let mut row = Vec::new();
        for (idx, column) in def.columns().iter().enumerate() {
            if column.is_generated() || (!replace && Some(column.name()) == rowid) {
                continue;
            }
            if let Some(value) = self.value_at(idx, obj) {
                columns.push(column.field());
                row.push(Expr::Literal(value));
            }
        }
        let source = if columns.is_empty() {
            InsertSource::DefaultValues
        } else {
            InsertSource::Values(vec![row])
        };
        Insert {
            replace,
            or_action: None,
            table: table_ref(def),
            columns,
            source,
        }
    }

    /// INSERT of every stored column of `obj`.
    ///
    /// A rowid alias column is left out so that SQLite assigns the key.
    pub fn insert(&self, obj: &O) -> Insert {
        self.object_insert(obj, false)
    }

    /// REPLACE of every stored column of `obj`, key included.
    pub fn replace(&self, obj: &O) -> Insert {
        self.object_insert(obj, true)
    }

    /// UPDATE of every non-key stored column of `obj`, matched by key.
    pub fn update(&self, obj: &O) -> Result<Update> {
        let def = self.def();
        let keys = def.primary_key_columns();
        let mut assignments = Vec::new();
        let mut key = Vec::with_capacity(keys.len());
        for (idx, column) in def.columns().iter().enumerate() {
            let Some(value) = self.value_at(idx, obj) else {
                continue;
            };
            if keys.contains(&column.name()) {
                key.push((keys.iter().position(|k| *k == column.name()), value));
            } else if !column.is_generated() {
                assignments.push((column.field(), Expr::Literal(value)));
            }
        }
        key.sort_by_key(|(position, _)| *position);
        let condition = key_condition(def, key.into_iter().map(|(_, v)| v).collect())?;
        Ok(Update {
            table: table_ref(def),
            assignments,
            where_clause: Some(condition.into_inner()),
        })
    }

    /// DELETE of the row whose primary key equals `key`, in key order.
    pub fn remove_by_key(&self, key: Vec<Value>) -> Result<Delete> {
        let def = self.def();
        Ok(Delete {
            table: table_ref(def),
            where_clause: Some(key_condition(def, key)?.into_inner()),
        })
    }

    /// SELECT of the row whose primary key equals `key`.
    pub fn get_by_key(&self, key: Vec<Value>) -> Result<Query> {
        let condition = key_condition(self.def(), key)?;
        Ok(select(asterisk_defined::<O>()).where_(condition).into_query())
    }

    /// SELECT of every row, columns in declaration order.
    #[must_use]
    pub fn get_all(&self) -> Query {
        SelectStmt {
            columns: vec![asterisk_defined::<O>()],
            ..SelectStmt::default()
        }
        .into_query()
    }
}
