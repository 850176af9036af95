//! Column declarations.

use std::fmt;
use std::sync::Arc;

use crate::ast::classify::has_constraint;
use crate::error::Result;
use crate::schema::constraint::{ColumnConstraint, ConstraintKind, DefaultValue};
use crate::schema::field::{Field, FieldId};
use crate::schema::types::{DataType, FieldType};
use crate::value::{FromValue, ToValue, Value};

/// Type-erased description of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    name: String,
    field: FieldId,
    symbols: Vec<&'static str>,
    data_type: DataType,
    nullable: bool,
    constraints: Vec<ColumnConstraint>,
}

impl ColumnDef {
    /// Declared column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Identity of the backing field.
    #[must_use]
    pub const fn field(&self) -> FieldId {
        self.field
    }

    /// Declared SQL type.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Whether the field type accepts NULL.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Constraints in declaration order.
    #[must_use]
    pub fn constraints(&self) -> &[ColumnConstraint] {
        &self.constraints
    }

    /// Returns `true` if a constraint of `kind` is attached.
    #[must_use]
    pub fn has(&self, kind: ConstraintKind) -> bool {
        has_constraint(&self.constraints, kind)
    }

    /// Returns `true` if the column carries a `PRIMARY KEY` constraint.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.has(ConstraintKind::PrimaryKey)
    }

    /// Returns `true` for a generated column.
    #[must_use]
    pub fn is_generated(&self) -> bool {
        self.has(ConstraintKind::Generated)
    }

    /// Returns the `DEFAULT` value, if any.
    #[must_use]
    pub fn default_value(&self) -> Option<&DefaultValue> {
        self.constraints.iter().find_map(|c| match c {
            ColumnConstraint::Default(value) => Some(value),
            _ => None,
        })
    }

    /// Returns `true` if `id` names this column's field through any of its
    /// member symbols.
    #[must_use]
    pub fn answers_to(&self, id: &FieldId) -> bool {
        self.field.owner == id.owner && self.symbols.contains(&id.member)
    }
}

pub(crate) type ReadFn<O> = Arc<dyn Fn(&O) -> Value + Send + Sync>;
pub(crate) type WriteFn<O> = Arc<dyn Fn(&mut O, Value) -> Result<()> + Send + Sync>;

/// A column of a table mapping `O`.
pub struct Column<O> {
    def: ColumnDef,
    read: ReadFn<O>,
    write: WriteFn<O>,
}

impl<O> Clone for Column<O> {
    fn clone(&self) -> Self {
        Self {
            def: self.def.clone(),
            read: Arc::clone(&self.read),
            write: Arc::clone(&self.write),
        }
    }
}

impl<O> fmt::Debug for Column<O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("def", &self.def).finish()
    }
}

impl<O> Column<O> {
    /// Type-erased description.
    #[must_use]
    pub const fn def(&self) -> &ColumnDef {
        &self.def
    }

    /// Reads the column value from `obj`.
    pub fn read(&self, obj: &O) -> Value {
        (self.read)(obj)
    }

    /// Writes a stored value into `obj`.
    pub fn write(&self, obj: &mut O, value: Value) -> Result<()> {
        (self.write)(obj, value)
    }

    pub(crate) fn into_parts(self) -> (ColumnDef, ReadFn<O>, WriteFn<O>) {
        (self.def, self.read, self.write)
    }
}

/// Declares a column named `name` backed by `field`.
///
/// Nullability comes from the field type: `Option<T>` fields are nullable,
/// all others are `NOT NULL`.
pub fn make_column<O, T>(
    name: impl Into<String>,
    field: Field<O, T>,
    constraints: impl IntoIterator<Item = ColumnConstraint>,
) -> Column<O>
where
    O: 'static,
    T: FieldType + ToValue + FromValue + Clone + 'static,
{
    let def = ColumnDef {
        name: name.into(),
        field: field.id(),
        symbols: field.symbols(),
        data_type: T::SQL_TYPE,
        nullable: T::NULLABLE,
        constraints: constraints.into_iter().collect(),
    };
    Column {
        def,
        read: Arc::new(move |obj: &O| field.get(obj).to_value()),
        write: Arc::new(move |obj: &mut O, value: Value| {
            field.set(obj, T::from_value(value)?);
            Ok(())
        }),
    }
}
