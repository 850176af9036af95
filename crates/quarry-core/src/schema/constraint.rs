//! Column and table constraints.
//!
//! Constraints are plain values attached to a column or table. Modifiers
//! such as [`ColumnConstraint::desc`] return a new value and leave the
//! receiver untouched.

use crate::ast::{Collation, Expr, SortOrder};
use crate::builder::IntoExpr;
use crate::schema::field::{FieldId, FieldList};
use crate::value::{ToValue, Value};

/// Kind of a column constraint, used for capability queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `PRIMARY KEY`
    PrimaryKey,
    /// `AUTOINCREMENT`
    Autoincrement,
    /// `UNIQUE`
    Unique,
    /// `DEFAULT`
    Default,
    /// `REFERENCES`
    References,
    /// `COLLATE`
    Collate,
    /// `CHECK`
    Check,
    /// `GENERATED ALWAYS AS`
    Generated,
}

/// Action taken by a foreign key when the referenced row changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ForeignKeyAction {
    /// `NO ACTION`
    NoAction,
    /// `RESTRICT`
    Restrict,
    /// `SET NULL`
    SetNull,
    /// `SET DEFAULT`
    SetDefault,
    /// `CASCADE`
    Cascade,
}

impl ForeignKeyAction {
    /// Returns the SQL keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Cascade => "CASCADE",
        }
    }
}

/// `REFERENCES` clause shared by column and table foreign keys.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKeyClause {
    /// Referenced columns, all owned by the same mapped type.
    pub references: Vec<FieldId>,
    /// `ON DELETE` action.
    pub on_delete: Option<ForeignKeyAction>,
    /// `ON UPDATE` action.
    pub on_update: Option<ForeignKeyAction>,
}

/// Storage of a generated column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeneratedStorage {
    /// No keyword; SQLite defaults to virtual.
    Unspecified,
    /// `VIRTUAL`
    Virtual,
    /// `STORED`
    Stored,
}

/// Value of a `DEFAULT` constraint.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    /// A literal, printed inline.
    Value(Value),
    /// An expression, printed in parentheses.
    Expr(Expr),
}

/// A constraint attached to one column.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnConstraint {
    /// `PRIMARY KEY [ASC|DESC]`
    PrimaryKey {
        /// Key order.
        order: SortOrder,
    },
    /// `AUTOINCREMENT`; requires `PRIMARY KEY` on the same column.
    Autoincrement,
    /// `UNIQUE`
    Unique,
    /// `DEFAULT value`
    Default(DefaultValue),
    /// `REFERENCES table(columns) [ON DELETE ..] [ON UPDATE ..]`
    References(ForeignKeyClause),
    /// `COLLATE name`
    Collate(Collation),
    /// `CHECK (expr)`
    Check(Expr),
    /// `GENERATED ALWAYS AS (expr) [VIRTUAL|STORED]`
    Generated {
        /// Generating expression.
        expr: Expr,
        /// Storage keyword.
        storage: GeneratedStorage,
    },
}

impl ColumnConstraint {
    /// Returns the constraint kind.
    #[must_use]
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            Self::PrimaryKey { .. } => ConstraintKind::PrimaryKey,
            Self::Autoincrement => ConstraintKind::Autoincrement,
            Self::Unique => ConstraintKind::Unique,
            Self::Default(_) => ConstraintKind::Default,
            Self::References(_) => ConstraintKind::References,
            Self::Collate(_) => ConstraintKind::Collate,
            Self::Check(_) => ConstraintKind::Check,
            Self::Generated { .. } => ConstraintKind::Generated,
        }
    }

    /// Ascending primary key. No effect on other constraints.
    #[must_use]
    pub fn asc(self) -> Self {
        self.with_order(SortOrder::Asc)
    }

    /// Descending primary key. No effect on other constraints.
    #[must_use]
    pub fn desc(self) -> Self {
        self.with_order(SortOrder::Desc)
    }

    fn with_order(self, order: SortOrder) -> Self {
        match self {
            Self::PrimaryKey { .. } => Self::PrimaryKey { order },
            other => other,
        }
    }

    /// Sets `ON DELETE` on a `REFERENCES` constraint.
    #[must_use]
    pub fn on_delete(self, action: ForeignKeyAction) -> Self {
        match self {
            Self::References(clause) => Self::References(ForeignKeyClause {
                on_delete: Some(action),
                ..clause
            }),
            other => other,
        }
    }

    /// Sets `ON UPDATE` on a `REFERENCES` constraint.
    #[must_use]
    pub fn on_update(self, action: ForeignKeyAction) -> Self {
        match self {
            Self::References(clause) => Self::References(ForeignKeyClause {
                on_update: Some(action),
                ..clause
            }),
            other => other,
        }
    }

    /// Marks a generated column `VIRTUAL`.
    #[must_use]
    pub fn virtual_(self) -> Self {
        self.with_storage(GeneratedStorage::Virtual)
    }

    /// Marks a generated column `STORED`.
    #[must_use]
    pub fn stored(self) -> Self {
        self.with_storage(GeneratedStorage::Stored)
    }

    fn with_storage(self, storage: GeneratedStorage) -> Self {
        match self {
            Self::Generated { expr, .. } => Self::Generated { expr, storage },
            other => other,
        }
    }
}

/// A constraint declared at table level.
#[derive(Debug, Clone, PartialEq)]
pub enum TableConstraint {
    /// Composite `PRIMARY KEY(a, b)`.
    PrimaryKey(Vec<FieldId>),
    /// `UNIQUE(a, b)`.
    Unique(Vec<FieldId>),
    /// `FOREIGN KEY(a) REFERENCES t(b)`.
    ForeignKey {
        /// Referencing columns of this table.
        columns: Vec<FieldId>,
        /// Target and actions.
        clause: ForeignKeyClause,
    },
    /// `CHECK (expr)`.
    Check(Expr),
}

impl TableConstraint {
    /// Sets `ON DELETE` on a foreign key. No effect on other constraints.
    #[must_use]
    pub fn on_delete(self, action: ForeignKeyAction) -> Self {
        match self {
            Self::ForeignKey { columns, clause } => Self::ForeignKey {
                columns,
                clause: ForeignKeyClause {
                    on_delete: Some(action),
                    ..clause
                },
            },
            other => other,
        }
    }

    /// Sets `ON UPDATE` on a foreign key. No effect on other constraints.
    #[must_use]
    pub fn on_update(self, action: ForeignKeyAction) -> Self {
        match self {
            Self::ForeignKey { columns, clause } => Self::ForeignKey {
                columns,
                clause: ForeignKeyClause {
                    on_update: Some(action),
                    ..clause
                },
            },
            other => other,
        }
    }
}

/// `PRIMARY KEY` column constraint.
#[must_use]
pub const fn primary_key() -> ColumnConstraint {
    ColumnConstraint::PrimaryKey {
        order: SortOrder::Unspecified,
    }
}

/// `AUTOINCREMENT` column constraint.
#[must_use]
pub const fn autoincrement() -> ColumnConstraint {
    ColumnConstraint::Autoincrement
}

/// `UNIQUE` column constraint.
#[must_use]
pub const fn unique() -> ColumnConstraint {
    ColumnConstraint::Unique
}

/// `DEFAULT` with a literal value.
pub fn default_value<V: ToValue>(value: V) -> ColumnConstraint {
    ColumnConstraint::Default(DefaultValue::Value(value.to_value()))
}

/// `DEFAULT (expr)`.
pub fn default_expr(expr: impl IntoExpr) -> ColumnConstraint {
    ColumnConstraint::Default(DefaultValue::Expr(expr.into_expr()))
}

/// Column-level `REFERENCES`.
pub fn references(columns: impl FieldList) -> ColumnConstraint {
    ColumnConstraint::References(ForeignKeyClause {
        references: columns.field_ids(),
        on_delete: None,
        on_update: None,
    })
}

/// `COLLATE` column constraint.
#[must_use]
pub const fn collate(collation: Collation) -> ColumnConstraint {
    ColumnConstraint::Collate(collation)
}

/// `CHECK` column constraint.
pub fn check(condition: impl IntoExpr) -> ColumnConstraint {
    ColumnConstraint::Check(condition.into_expr())
}

/// `GENERATED ALWAYS AS (expr)`.
pub fn generated_always_as(expr: impl IntoExpr) -> ColumnConstraint {
    ColumnConstraint::Generated {
        expr: expr.into_expr(),
        storage: GeneratedStorage::Unspecified,
    }
}

/// Table-level composite `PRIMARY KEY`.
pub fn primary_key_columns(columns: impl FieldList) -> TableConstraint {
    TableConstraint::PrimaryKey(columns.field_ids())
}

/// Table-level `UNIQUE`.
pub fn unique_columns(columns: impl FieldList) -> TableConstraint {
    TableConstraint::Unique(columns.field_ids())
}

/// Table-level `CHECK`.
pub fn check_table(condition: impl IntoExpr) -> TableConstraint {
    TableConstraint::Check(condition.into_expr())
}

/// Starts a table-level `FOREIGN KEY`.
pub fn foreign_key(columns: impl FieldList) -> ForeignKeyBuilder {
    ForeignKeyBuilder {
        columns: columns.field_ids(),
    }
}

/// Referencing half of a table-level foreign key.
#[derive(Debug, Clone)]
pub struct ForeignKeyBuilder {
    columns: Vec<FieldId>,
}

impl ForeignKeyBuilder {
    /// Completes the foreign key with its referenced columns.
    pub fn references(self, columns: impl FieldList) -> TableConstraint {
        TableConstraint::ForeignKey {
            columns: self.columns,
            clause: ForeignKeyClause {
                references: columns.field_ids(),
                on_delete: None,
                on_update: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_return_new_values() {
        let pk = primary_key();
        let desc = pk.clone().desc();
        assert_eq!(
            pk,
            ColumnConstraint::PrimaryKey {
                order: SortOrder::Unspecified
            }
        );
        assert_eq!(
            desc,
            ColumnConstraint::PrimaryKey {
                order: SortOrder::Desc
            }
        );
    }

    #[test]
    fn test_modifier_ignores_other_kinds() {
        assert_eq!(unique().desc(), ColumnConstraint::Unique);
        assert_eq!(
            autoincrement().on_delete(ForeignKeyAction::Cascade),
            ColumnConstraint::Autoincrement
        );
    }

    #[test]
    fn test_constraint_kinds() {
        assert_eq!(primary_key().kind(), ConstraintKind::PrimaryKey);
        assert_eq!(default_value(3).kind(), ConstraintKind::Default);
        assert_eq!(collate(Collation::NoCase).kind(), ConstraintKind::Collate);
    }

    #[test]
    fn test_action_keywords() {
        assert_eq!(ForeignKeyAction::SetNull.as_str(), "SET NULL");
        assert_eq!(ForeignKeyAction::NoAction.as_str(), "NO ACTION");
    }
}
