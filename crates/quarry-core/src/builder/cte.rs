//! Common table expressions and WITH queries.

use crate::ast::{Cte, CteColumnRef, Query, With};
use crate::builder::select::IntoQuery;

/// A CTE whose defining query is still missing.
#[derive(Debug, Clone, PartialEq)]
pub struct CteBuilder {
    name: String,
    columns: Vec<CteColumnRef>,
}

/// Starts a CTE named `name`.
pub fn cte(name: impl Into<String>) -> CteBuilder {
    CteBuilder {
        name: name.into(),
        columns: Vec::new(),
    }
}

impl CteBuilder {
    /// Explicit column list, by name or by the field that feeds the column.
    #[must_use]
    pub fn columns<C: Into<CteColumnRef>>(mut self, columns: impl IntoIterator<Item = C>) -> Self {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// `name AS (query)`.
    pub fn as_(self, query: impl IntoQuery) -> Cte {
        Cte {
            name: self.name,
            columns: self.columns,
            query: Box::new(query.into_query()),
        }
    }
}

/// One or more CTEs.
pub trait IntoCtes {
    /// Returns the CTEs in declaration order.
    fn into_ctes(self) -> Vec<Cte>;
}

impl IntoCtes for Cte {
    fn into_ctes(self) -> Vec<Cte> {
        vec![self]
    }
}

impl IntoCtes for Vec<Cte> {
    fn into_ctes(self) -> Vec<Cte> {
        self
    }
}

impl<const N: usize> IntoCtes for [Cte; N] {
    fn into_ctes(self) -> Vec<Cte> {
        self.into()
    }
}

/// `WITH ctes body`.
pub fn with(ctes: impl IntoCtes, body: impl IntoQuery) -> Query {
    Query::With(With {
        recursive: false,
        ctes: ctes.into_ctes(),
        body: Box::new(body.into_query()),
    })
}

/// `WITH RECURSIVE ctes body`.
pub fn with_recursive(ctes: impl IntoCtes, body: impl IntoQuery) -> Query {
    Query::With(With {
        recursive: true,
        ctes: ctes.into_ctes(),
        body: Box::new(body.into_query()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::select::select;
    use crate::builder::expr::val;

    #[test]
    fn test_with_collects_ctes() {
        let first = cte("a").columns(["x"]).as_(select(val(1)));
        let second = cte("b").as_(select(val(2)));
        let query = with_recursive([first, second], select(val(3)));
        match query {
            Query::With(with) => {
                assert!(with.recursive);
                assert_eq!(with.ctes.len(), 2);
                assert_eq!(with.ctes[0].columns, vec![CteColumnRef::Name("x".into())]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
