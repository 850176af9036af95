//! Schema model: columns, tables, indexes and the registry that resolves
//! field references back to their declarations.
//!
//! ```rust
//! use quarry_core::schema::{Field, Schema, make_column, make_table, primary_key};
//!
//! #[derive(Default)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! fn id(u: &User) -> &i64 { &u.id }
//! fn id_mut(u: &mut User) -> &mut i64 { &mut u.id }
//! fn name(u: &User) -> &String { &u.name }
//! fn name_mut(u: &mut User) -> &mut String { &mut u.name }
//!
//! let user_id = Field::member("id", id, id_mut);
//! let user_name = Field::member("name", name, name_mut);
//!
//! let schema = Schema::builder()
//!     .table(make_table(
//!         "users",
//!         vec![
//!             make_column("id", user_id, [primary_key()]),
//!             make_column("name", user_name, []),
//!         ],
//!     ))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(schema.find_column_name(&user_name.id()).unwrap(), "name");
//! assert_eq!(schema.find_table_name::<User>().unwrap(), "users");
//! ```

mod column;
mod constraint;
mod field;
mod index;
mod table;
mod types;

use std::any::TypeId;
use std::sync::Arc;

use tracing::debug;

pub use column::{Column, ColumnDef, make_column};
pub use constraint::{
    ColumnConstraint, ConstraintKind, DefaultValue, ForeignKeyAction, ForeignKeyBuilder,
    ForeignKeyClause, GeneratedStorage, TableConstraint, autoincrement, check, check_table,
    collate, default_expr, default_value, foreign_key, generated_always_as, primary_key,
    primary_key_columns, references, unique, unique_columns,
};
pub use field::{Accessor, Field, FieldId, FieldList, short_type_name};
pub use index::{
    Index, IndexColumns, IndexedColumn, indexed_column, make_index, make_unique_index,
};
pub use table::{AnyTable, Table, TableDef, make_table};
pub use types::{DataType, FieldType};

use crate::error::{Error, Result};

/// The immutable registry of every table and index known to one mapping.
///
/// Built once through [`Schema::builder`]; afterwards it is only read, so it
/// can be shared across threads behind an `Arc`.
#[derive(Clone)]
pub struct Schema {
    tables: Vec<Arc<dyn AnyTable>>,
    indexes: Vec<Index>,
}

impl std::fmt::Debug for Schema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Schema")
            .field("tables", &self.tables().map(TableDef::name).collect::<Vec<_>>())
            .field("indexes", &self.indexes)
            .finish()
    }
}

/// Collects tables and indexes before validation.
#[derive(Default)]
pub struct SchemaBuilder {
    tables: Vec<Arc<dyn AnyTable>>,
    indexes: Vec<Index>,
}

impl SchemaBuilder {
    /// Registers a table.
    #[must_use]
    pub fn table<O: 'static>(mut self, table: Table<O>) -> Self {
        self.tables.push(Arc::new(table));
        self
    }

    /// Registers an index.
    #[must_use]
    pub fn index(mut self, index: Index) -> Self {
        self.indexes.push(index);
        self
    }

    /// Validates the declarations and freezes the schema.
    pub fn build(self) -> Result<Schema> {
        let schema = Schema {
            tables: self.tables,
            indexes: self.indexes,
        };
        schema.validate()?;
        debug!(
            tables = schema.tables.len(),
            indexes = schema.indexes.len(),
            "Schema registered"
        );
        Ok(schema)
    }
}

impl Schema {
    /// Starts declaring a schema.
    #[must_use]
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    fn validate(&self) -> Result<()> {
        for (idx, table) in self.tables().enumerate() {
            table.validate()?;
            let earlier = &self.tables[..idx];
            if earlier.iter().any(|t| t.def().name() == table.name()) {
                return Err(Error::InvalidSchema(format!(
                    "table `{}` is declared twice",
                    table.name()
                )));
            }
            if earlier.iter().any(|t| t.def().type_id() == table.type_id()) {
                return Err(Error::InvalidSchema(format!(
                    "type `{}` is mapped by more than one table",
                    table.type_name()
                )));
            }
            self.validate_foreign_keys(table)?;
        }
        for (idx, index) in self.indexes.iter().enumerate() {
            if self.indexes[..idx].iter().any(|i| i.name == index.name) {
                return Err(Error::InvalidSchema(format!(
                    "index `{}` is declared twice",
                    index.name
                )));
            }
            let table = self.index_table(index)?;
            for column in &index.columns {
                if table.column_by_field(&column.field).is_none() {
                    return Err(Error::InvalidSchema(format!(
                        "index `{}` mixes columns of several tables",
                        index.name
                    )));
                }
            }
        }
        Ok(())
    }

    fn validate_foreign_keys(&self, table: &TableDef) -> Result<()> {
        let column_clauses = table.columns().iter().flat_map(|c| {
            c.constraints().iter().filter_map(move |k| match k {
                ColumnConstraint::References(clause) => Some((1, clause)),
                _ => None,
            })
        });
        let table_clauses = table.constraints().iter().filter_map(|k| match k {
            TableConstraint::ForeignKey { columns, clause } => Some((columns.len(), clause)),
            _ => None,
        });
        for (arity, clause) in column_clauses.chain(table_clauses) {
            if clause.references.len() != arity {
                return Err(Error::InvalidSchema(format!(
                    "foreign key on `{}` references {} columns for {} local columns",
                    table.name(),
                    clause.references.len(),
                    arity
                )));
            }
            for field in &clause.references {
                self.find_column_name(field)?;
            }
        }
        Ok(())
    }

    /// Table descriptions in registration order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> + '_ {
        self.tables.iter().map(|t| t.def())
    }

    /// Indexes in registration order.
    #[must_use]
    pub fn indexes(&self) -> &[Index] {
        &self.indexes
    }

    /// Looks up an index by name.
    pub fn index(&self, name: &str) -> Result<&Index> {
        self.indexes
            .iter()
            .find(|i| i.name == name)
            .ok_or_else(|| Error::IndexNotFound(String::from(name)))
    }

    /// Table an index is declared on, derived from its first column.
    pub fn index_table(&self, index: &Index) -> Result<&TableDef> {
        let first = index.columns.first().ok_or_else(|| {
            Error::InvalidSchema(format!("index `{}` has no columns", index.name))
        })?;
        self.table_def(first.field.owner)
            .ok_or(Error::TableNotFound(first.field.owner_name))
    }

    /// Table mapping the type with `type_id`, if registered.
    #[must_use]
    pub fn table_def(&self, type_id: TypeId) -> Option<&TableDef> {
        self.tables().find(|t| t.type_id() == type_id)
    }

    /// Table with the given name, if registered.
    #[must_use]
    pub fn table_def_by_name(&self, name: &str) -> Option<&TableDef> {
        self.tables().find(|t| t.name() == name)
    }

    /// Typed table mapping `O`.
    pub fn table<O: 'static>(&self) -> Result<&Table<O>> {
        self.tables
            .iter()
            .find_map(|t| t.as_any().downcast_ref::<Table<O>>())
            .ok_or(Error::TableNotFound(short_type_name::<O>()))
    }

    /// Name of the table mapping `O`.
    pub fn find_table_name<O: 'static>(&self) -> Result<&str> {
        self.find_table_name_by_id(TypeId::of::<O>(), short_type_name::<O>())
    }

    /// Name of the table mapping the type with `type_id`.
    ///
    /// `type_name` only feeds the error message.
    pub fn find_table_name_by_id(&self, type_id: TypeId, type_name: &'static str) -> Result<&str> {
        self.table_def(type_id)
            .map(TableDef::name)
            .ok_or(Error::TableNotFound(type_name))
    }

    /// Owning table and column of a field reference.
    pub fn column(&self, field: &FieldId) -> Result<(&TableDef, &ColumnDef)> {
        self.table_def(field.owner)
            .and_then(|t| t.column_by_field(field).map(|c| (t, c)))
            .ok_or(Error::ColumnNotFound {
                table_type: field.owner_name,
                member: field.member,
            })
    }

    /// Name of the column a field reference resolves to.
    pub fn find_column_name(&self, field: &FieldId) -> Result<&str> {
        self.column(field).map(|(_, c)| c.name())
    }
}
