//! Index declarations.

use crate::ast::{Collation, Expr, SortOrder};
use crate::builder::IntoExpr;
use crate::schema::field::{Field, FieldId};

/// One column of an index, with optional collation and order.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedColumn {
    /// Indexed field.
    pub field: FieldId,
    /// `COLLATE` clause.
    pub collation: Option<Collation>,
    /// `ASC` / `DESC`.
    pub order: SortOrder,
}

impl IndexedColumn {
    /// Adds a collation.
    #[must_use]
    pub fn collate(mut self, collation: Collation) -> Self {
        self.collation = Some(collation);
        self
    }

    /// Indexes in ascending order.
    #[must_use]
    pub const fn asc(mut self) -> Self {
        self.order = SortOrder::Asc;
        self
    }

    /// Indexes in descending order.
    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.order = SortOrder::Desc;
        self
    }
}

/// Wraps a field as an index column.
pub fn indexed_column(field: impl Into<FieldId>) -> IndexedColumn {
    IndexedColumn {
        field: field.into(),
        collation: None,
        order: SortOrder::Unspecified,
    }
}

/// Values that expand to index columns.
pub trait IndexColumns {
    /// Returns the index columns in order.
    fn into_indexed(self) -> Vec<IndexedColumn>;
}

impl IndexColumns for IndexedColumn {
    fn into_indexed(self) -> Vec<IndexedColumn> {
        vec![self]
    }
}

impl<O, T> IndexColumns for Field<O, T> {
    fn into_indexed(self) -> Vec<IndexedColumn> {
        vec![indexed_column(self)]
    }
}

impl IndexColumns for Vec<IndexedColumn> {
    fn into_indexed(self) -> Vec<IndexedColumn> {
        self
    }
}

macro_rules! impl_index_columns_tuple {
    ($($name:ident),+) => {
        impl<$($name: IndexColumns),+> IndexColumns for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_indexed(self) -> Vec<IndexedColumn> {
                let ($($name,)+) = self;
                let mut columns = Vec::new();
                $(columns.extend($name.into_indexed());)+
                columns
            }
        }
    };
}

impl_index_columns_tuple!(A);
impl_index_columns_tuple!(A, B);
impl_index_columns_tuple!(A, B, C);
impl_index_columns_tuple!(A, B, C, D);
impl_index_columns_tuple!(A, B, C, D, E);

/// An index over columns of one mapped table.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    /// Index name.
    pub name: String,
    /// `UNIQUE` index.
    pub unique: bool,
    /// Indexed columns.
    pub columns: Vec<IndexedColumn>,
    /// Partial index condition.
    pub where_clause: Option<Expr>,
}

impl Index {
    /// Makes the index `UNIQUE`.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Makes the index partial.
    #[must_use]
    pub fn where_(mut self, condition: impl IntoExpr) -> Self {
        self.where_clause = Some(condition.into_expr());
        self
    }
}

/// Declares an index named `name`.
pub fn make_index(name: impl Into<String>, columns: impl IndexColumns) -> Index {
    Index {
        name: name.into(),
        unique: false,
        columns: columns.into_indexed(),
        where_clause: None,
    }
}

/// Declares a `UNIQUE` index named `name`.
pub fn make_unique_index(name: impl Into<String>, columns: impl IndexColumns) -> Index {
    make_index(name, columns).unique()
}
