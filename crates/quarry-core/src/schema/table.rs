//! Table declarations.

use std::any::{Any, TypeId};
use std::fmt;

use crate::error::{Error, Result};
use crate::schema::column::{Column, ColumnDef, ReadFn, WriteFn};
use crate::schema::constraint::{ColumnConstraint, ConstraintKind, TableConstraint};
use crate::schema::field::{FieldId, short_type_name};
use crate::schema::types::DataType;
use crate::value::Value;

/// Type-erased description of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    name: String,
    type_id: TypeId,
    type_name: &'static str,
    columns: Vec<ColumnDef>,
    constraints: Vec<TableConstraint>,
    without_rowid: bool,
}

impl TableDef {
    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Mapped Rust type.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Short name of the mapped Rust type.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Columns in declaration order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    /// Table-level constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[TableConstraint] {
        &self.constraints
    }

    /// Whether the table is declared `WITHOUT ROWID`.
    #[must_use]
    pub const fn without_rowid(&self) -> bool {
        self.without_rowid
    }

    /// Finds the column answering to `field`.
    #[must_use]
    pub fn column_by_field(&self, field: &FieldId) -> Option<&ColumnDef> {
        if field.owner != self.type_id {
            return None;
        }
        self.columns.iter().find(|c| c.answers_to(field))
    }

    /// Finds the name of the column answering to `field`.
    #[must_use]
    pub fn find_column_name(&self, field: &FieldId) -> Option<&str> {
        self.column_by_field(field).map(ColumnDef::name)
    }

    /// Finds a column by name.
    #[must_use]
    pub fn column_by_name(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name() == name)
    }

    /// Names of the primary key columns, in key order.
    ///
    /// Comes from per-column `PRIMARY KEY` constraints or from the single
    /// composite table constraint; a valid table never has both.
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        let composite = self.constraints.iter().find_map(|c| match c {
            TableConstraint::PrimaryKey(fields) => Some(fields),
            _ => None,
        });
        match composite {
            Some(fields) => fields
                .iter()
                .filter_map(|f| self.find_column_name(f))
                .collect(),
            None => self
                .columns
                .iter()
                .filter(|c| c.is_primary_key())
                .map(ColumnDef::name)
                .collect(),
        }
    }

    /// Returns the column that aliases the rowid, if any.
    ///
    /// That is a sole `INTEGER PRIMARY KEY` column not declared `DESC` in a
    /// rowid table.
    #[must_use]
    pub fn rowid_alias(&self) -> Option<&ColumnDef> {
        if self.without_rowid {
            return None;
        }
        let keys = self.primary_key_columns();
        let [key] = keys.as_slice() else {
            return None;
        };
        let column = self.column_by_name(key)?;
        let descending = column.constraints().iter().any(|c| {
            matches!(
                c,
                ColumnConstraint::PrimaryKey {
                    order: crate::ast::SortOrder::Desc
                }
            )
        });
        (column.data_type() == DataType::Integer && !descending).then_some(column)
    }

    /// Checks the declaration for internal consistency.
    pub fn validate(&self) -> Result<()> {
        let per_column = self.columns.iter().filter(|c| c.is_primary_key()).count();
        let composite = self
            .constraints
            .iter()
            .filter(|c| matches!(c, TableConstraint::PrimaryKey(_)))
            .count();
        if composite > 1 || (composite == 1 && per_column > 0) || per_column > 1 {
            return Err(Error::InvalidSchema(format!(
                "table `{}` declares its primary key more than once",
                self.name
            )));
        }
        for (idx, column) in self.columns.iter().enumerate() {
            if self.columns[..idx].iter().any(|c| c.name() == column.name()) {
                return Err(Error::InvalidSchema(format!(
                    "table `{}` declares column `{}` twice",
                    self.name,
                    column.name()
                )));
            }
            if column.has(ConstraintKind::Autoincrement) && !column.is_primary_key() {
                return Err(Error::InvalidSchema(format!(
                    "column `{}`.`{}` is AUTOINCREMENT without PRIMARY KEY",
                    self.name,
                    column.name()
                )));
            }
            if column.has(ConstraintKind::Autoincrement) && column.data_type() != DataType::Integer
            {
                return Err(Error::InvalidSchema(format!(
                    "column `{}`.`{}` is AUTOINCREMENT but not INTEGER",
                    self.name,
                    column.name()
                )));
            }
        }
        for constraint in &self.constraints {
            let fields = match constraint {
                TableConstraint::PrimaryKey(fields) | TableConstraint::Unique(fields) => fields,
                TableConstraint::ForeignKey { columns, .. } => columns,
                TableConstraint::Check(_) => continue,
            };
            if fields.is_empty() {
                return Err(Error::InvalidSchema(format!(
                    "table `{}` has a constraint with an empty column list",
                    self.name
                )));
            }
            if let Some(missing) = fields.iter().find(|f| self.column_by_field(f).is_none()) {
                return Err(Error::ColumnNotFound {
                    table_type: missing.owner_name,
                    member: missing.member,
                });
            }
        }
        Ok(())
    }
}

/// A table mapping the Rust type `O`.
pub struct Table<O> {
    def: TableDef,
    readers: Vec<ReadFn<O>>,
    writers: Vec<WriteFn<O>>,
}

impl<O> fmt::Debug for Table<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table").field("def", &self.def).finish()
    }
}

impl<O: 'static> Table<O> {
    /// Adds a table-level constraint.
    #[must_use]
    pub fn constraint(mut self, constraint: TableConstraint) -> Self {
        self.def.constraints.push(constraint);
        self
    }

    /// Declares the table `WITHOUT ROWID`.
    #[must_use]
    pub fn without_rowid(mut self) -> Self {
        self.def.without_rowid = true;
        self
    }
}

impl<O> Table<O> {
    /// Type-erased description.
    #[must_use]
    pub const fn def(&self) -> &TableDef {
        &self.def
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Reads every column of `obj`, in declaration order.
    pub fn values(&self, obj: &O) -> Vec<Value> {
        self.readers.iter().map(|read| read(obj)).collect()
    }

    /// Reads the column at `index` of `obj`.
    pub fn value_at(&self, index: usize, obj: &O) -> Option<Value> {
        self.readers.get(index).map(|read| read(obj))
    }

    /// Writes the column named `name` into `obj`.
    pub fn set_by_name(&self, obj: &mut O, name: &str, value: Value) -> Result<()> {
        let index = self
            .def
            .columns
            .iter()
            .position(|c| c.name() == name)
            .ok_or_else(|| Error::InvalidSchema(format!("no column `{name}` in `{}`", self.def.name)))?;
        (self.writers[index])(obj, value)
    }

    /// Writes one value per column, in declaration order.
    pub fn populate(&self, obj: &mut O, values: Vec<Value>) -> Result<()> {
        if values.len() != self.writers.len() {
            return Err(Error::InvalidSchema(format!(
                "table `{}` has {} columns, got {} values",
                self.def.name,
                self.writers.len(),
                values.len()
            )));
        }
        for (write, value) in self.writers.iter().zip(values) {
            write(obj, value)?;
        }
        Ok(())
    }
}

/// Declares a table named `name` mapping `O`.
pub fn make_table<O: 'static>(name: impl Into<String>, columns: Vec<Column<O>>) -> Table<O> {
    let mut defs = Vec::with_capacity(columns.len());
    let mut readers = Vec::with_capacity(columns.len());
    let mut writers = Vec::with_capacity(columns.len());
    for column in columns {
        let (def, read, write) = column.into_parts();
        defs.push(def);
        readers.push(read);
        writers.push(write);
    }
    Table {
        def: TableDef {
            name: name.into(),
            type_id: TypeId::of::<O>(),
            type_name: short_type_name::<O>(),
            columns: defs,
            constraints: Vec::new(),
            without_rowid: false,
        },
        readers,
        writers,
    }
}

/// Object-safe view of a `Table<O>` stored in a schema.
pub trait AnyTable: Send + Sync {
    /// Type-erased description.
    fn def(&self) -> &TableDef;
    /// Upcast for downcasting to `Table<O>`.
    fn as_any(&self) -> &dyn Any;
}

impl<O: 'static> AnyTable for Table<O> {
    fn def(&self) -> &TableDef {
        &self.def
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::column::make_column;
    use crate::schema::constraint::{autoincrement, primary_key, primary_key_columns};
    use crate::schema::field::Field;

    #[derive(Debug, Default, PartialEq)]
    struct Pair {
        left: i64,
        right: String,
    }

    fn left() -> Field<Pair, i64> {
        fn get(p: &Pair) -> &i64 {
            &p.left
        }
        fn get_mut(p: &mut Pair) -> &mut i64 {
            &mut p.left
        }
        Field::member("left", get, get_mut)
    }

    fn right() -> Field<Pair, String> {
        fn get(p: &Pair) -> &String {
            &p.right
        }
        fn get_mut(p: &mut Pair) -> &mut String {
            &mut p.right
        }
        Field::member("right", get, get_mut)
    }

    #[test]
    fn test_find_column_name() {
        let table = make_table(
            "pairs",
            vec![make_column("l", left(), []), make_column("r", right(), [])],
        );
        assert_eq!(table.def().find_column_name(&right().id()), Some("r"));
        assert_eq!(table.def().find_column_name(&FieldId::of::<Pair>("other")), None);
    }

    #[test]
    fn test_primary_key_from_column_or_table() {
        let single = make_table("pairs", vec![make_column("l", left(), [primary_key()])]);
        assert_eq!(single.def().primary_key_columns(), vec!["l"]);
        assert_eq!(single.def().rowid_alias().map(ColumnDef::name), Some("l"));

        let composite = make_table(
            "pairs",
            vec![make_column("l", left(), []), make_column("r", right(), [])],
        )
        .constraint(primary_key_columns((right(), left())));
        assert_eq!(composite.def().primary_key_columns(), vec!["r", "l"]);
        assert!(composite.def().rowid_alias().is_none());
    }

    #[test]
    fn test_validate_rejects_double_primary_key() {
        let table = make_table("pairs", vec![make_column("l", left(), [primary_key()])])
            .constraint(primary_key_columns(left()));
        assert!(matches!(table.def().validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_validate_rejects_autoincrement_without_key() {
        let table = make_table("pairs", vec![make_column("l", left(), [autoincrement()])]);
        assert!(matches!(table.def().validate(), Err(Error::InvalidSchema(_))));
    }

    #[test]
    fn test_populate_in_declaration_order() {
        let table = make_table(
            "pairs",
            vec![make_column("l", left(), []), make_column("r", right(), [])],
        );
        let mut pair = Pair::default();
        table
            .populate(&mut pair, vec![Value::Integer(1), Value::Text(String::from("a"))])
            .unwrap();
        assert_eq!(
            pair,
            Pair {
                left: 1,
                right: String::from("a")
            }
        );
        assert_eq!(table.values(&pair)[0], Value::Integer(1));
    }
}
