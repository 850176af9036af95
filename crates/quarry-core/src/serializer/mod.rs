//! SQL serialization.
//!
//! Every node kind has exactly one [`Serialize`] implementation, reached by
//! exhaustive `match`. Serialization either returns complete SQL or the
//! first error found anywhere in the tree; no fragment is ever emitted for
//! a node that failed to resolve.
//!
//! ```rust
//! use quarry_core::builder::{is_equal, val};
//! use quarry_core::schema::Schema;
//! use quarry_core::serializer::serialize;
//!
//! let schema = Schema::builder().build().unwrap();
//! let ctx = schema.context();
//! let cond = is_equal(val(1), val(2));
//! assert_eq!(serialize(&cond, &ctx).unwrap(), "(? = ?)");
//! assert_eq!(
//!     serialize(&cond, &ctx.with_replace_bindable_with_question(false)).unwrap(),
//!     "(1 = 2)"
//! );
//! ```

mod expr;
#[cfg(test)]
pub(crate) mod fixtures;
mod query;
mod schema;
mod statement;

pub(crate) use schema::default_text;

use tracing::trace;

use crate::ast::CteColumnRef;
use crate::error::{Error, Result};
use crate::schema::{FieldId, Schema};
use crate::value::Value;

/// Column layout of a common table expression in scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CteScope {
    /// CTE moniker.
    pub name: String,
    /// Result columns: name, plus the field feeding the column when known.
    pub columns: Vec<(String, Option<FieldId>)>,
}

impl CteScope {
    /// Resolves a column reference to the column's name.
    pub fn resolve(&self, column: &CteColumnRef) -> Result<&str> {
        let found = match column {
            CteColumnRef::Name(name) => self.columns.iter().find(|(n, _)| n == name),
            CteColumnRef::Field(field) => self
                .columns
                .iter()
                .find(|(_, f)| f.as_ref() == Some(field)),
        };
        found.map(|(name, _)| name.as_str()).ok_or_else(|| {
            Error::CteColumnNotFound {
                cte: self.name.clone(),
                column: match column {
                    CteColumnRef::Name(name) => name.clone(),
                    CteColumnRef::Field(field) => field.member.to_string(),
                },
            }
        })
    }
}

/// Serialization settings, bound to one schema.
///
/// A context is `Copy`: nested scopes take a modified copy, so flipping a
/// flag for one branch never affects its siblings.
#[derive(Debug, Clone, Copy)]
pub struct Context<'a> {
    schema: &'a Schema,
    ctes: &'a [CteScope],
    replace_bindable_with_question: bool,
    skip_table_name: bool,
    use_parentheses: bool,
    highest_level: bool,
}

impl Schema {
    /// A serialization context bound to this schema.
    ///
    /// Literals become `?` placeholders, columns are table-qualified and
    /// the statement is treated as top level.
    #[must_use]
    pub const fn context(&self) -> Context<'_> {
        Context {
            schema: self,
            ctes: &[],
            replace_bindable_with_question: true,
            skip_table_name: false,
            use_parentheses: false,
            highest_level: true,
        }
    }
}

impl<'a> Context<'a> {
    /// The schema used for name resolution.
    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.schema
    }

    /// Common table expressions in scope, innermost last.
    #[must_use]
    pub const fn ctes(&self) -> &'a [CteScope] {
        self.ctes
    }

    /// Emit `?` for literals instead of inline text.
    #[must_use]
    pub const fn replace_bindable_with_question(&self) -> bool {
        self.replace_bindable_with_question
    }

    /// Omit the table qualifier on columns.
    #[must_use]
    pub const fn skip_table_name(&self) -> bool {
        self.skip_table_name
    }

    /// Wrap the emitted expression in parentheses.
    #[must_use]
    pub const fn use_parentheses(&self) -> bool {
        self.use_parentheses
    }

    /// The node is the outermost statement.
    #[must_use]
    pub const fn highest_level(&self) -> bool {
        self.highest_level
    }

    /// Copy with `replace_bindable_with_question` set.
    #[must_use]
    pub const fn with_replace_bindable_with_question(mut self, value: bool) -> Self {
        self.replace_bindable_with_question = value;
        self
    }

    /// Copy with `skip_table_name` set.
    #[must_use]
    pub const fn with_skip_table_name(mut self, value: bool) -> Self {
        self.skip_table_name = value;
        self
    }

    /// Copy with `use_parentheses` set.
    #[must_use]
    pub const fn with_use_parentheses(mut self, value: bool) -> Self {
        self.use_parentheses = value;
        self
    }

    /// Copy with `highest_level` set.
    #[must_use]
    pub const fn with_highest_level(mut self, value: bool) -> Self {
        self.highest_level = value;
        self
    }

    /// Copy with a different set of CTEs in scope.
    #[must_use]
    pub const fn with_ctes<'b>(&self, ctes: &'b [CteScope]) -> Context<'b>
    where
        'a: 'b,
    {
        Context {
            schema: self.schema,
            ctes,
            replace_bindable_with_question: self.replace_bindable_with_question,
            skip_table_name: self.skip_table_name,
            use_parentheses: self.use_parentheses,
            highest_level: self.highest_level,
        }
    }

    /// Finds the innermost CTE named `name`.
    pub fn cte(&self, name: &str) -> Result<&'a CteScope> {
        self.ctes
            .iter()
            .rev()
            .find(|scope| scope.name == name)
            .ok_or_else(|| Error::CteNotFound(name.to_string()))
    }
}

/// Parameters collected while serializing, in placeholder order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bindings(Vec<Value>);

impl Bindings {
    /// An empty list.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a parameter.
    pub fn push(&mut self, value: Value) {
        self.0.push(value);
    }

    /// Number of parameters.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if nothing was bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parameters in placeholder order.
    #[must_use]
    pub fn into_inner(self) -> Vec<Value> {
        self.0
    }
}

/// A node that renders to SQL.
pub trait Serialize {
    /// Renders the node, pushing one parameter per emitted `?`.
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String>;
}

/// A statement ready for execution.
#[derive(Debug, Clone, PartialEq)]
pub struct Prepared {
    /// SQL text with `?` placeholders.
    pub sql: String,
    /// Parameters, one per placeholder, in order.
    pub params: Vec<Value>,
}

/// Renders `node` to SQL text.
///
/// Parameters are discarded; use [`prepare`] when the statement will be
/// executed with placeholders.
pub fn serialize<N: Serialize + ?Sized>(node: &N, ctx: &Context<'_>) -> Result<String> {
    let mut binds = Bindings::new();
    node.serialize(ctx, &mut binds)
}

/// Renders `node` to SQL text plus its parameters.
pub fn prepare<N: Serialize + ?Sized>(node: &N, ctx: &Context<'_>) -> Result<Prepared> {
    let mut binds = Bindings::new();
    let sql = node.serialize(ctx, &mut binds)?;
    trace!(sql = %sql, params = binds.len(), "Prepared statement");
    Ok(Prepared {
        sql,
        params: binds.into_inner(),
    })
}

/// Double-quotes an identifier, doubling embedded quotes.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Serializes each item and joins them with `", "`.
fn comma_list<'n, N, I>(items: I, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String>
where
    N: Serialize + 'n,
    I: IntoIterator<Item = &'n N>,
{
    let parts = items
        .into_iter()
        .map(|item| item.serialize(ctx, binds))
        .collect::<Result<Vec<_>>>()?;
    Ok(parts.join(", "))
}
