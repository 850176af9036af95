//! Expression AST types.

use std::any::TypeId;
use std::str::FromStr;

use crate::ast::function::Function;
use crate::ast::query::Query;
use crate::error::{Error, Result};
use crate::schema::{FieldId, short_type_name};
use crate::value::Value;

/// Sort direction of an ordering term, index column or primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortOrder {
    /// No keyword.
    #[default]
    Unspecified,
    /// `ASC`
    Asc,
    /// `DESC`
    Desc,
}

impl SortOrder {
    /// Returns the keyword, if any.
    #[must_use]
    pub const fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Unspecified => None,
            Self::Asc => Some("ASC"),
            Self::Desc => Some("DESC"),
        }
    }
}

/// A collating sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Collation {
    /// `BINARY`
    Binary,
    /// `NOCASE`
    NoCase,
    /// `RTRIM`
    RTrim,
    /// An application-defined collation.
    Custom(String),
}

impl Collation {
    /// Returns the collation name.
    ///
    /// Fails with [`Error::InvalidCollateArgument`] when a custom name is
    /// not a plain identifier.
    pub fn name(&self) -> Result<&str> {
        match self {
            Self::Binary => Ok("BINARY"),
            Self::NoCase => Ok("NOCASE"),
            Self::RTrim => Ok("RTRIM"),
            Self::Custom(name) => {
                let mut chars = name.chars();
                let valid_start = chars
                    .next()
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
                if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
                    Ok(name.as_str())
                } else {
                    Err(Error::InvalidCollateArgument(name.clone()))
                }
            }
        }
    }
}

impl FromStr for Collation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let collation = match s.to_ascii_uppercase().as_str() {
            "BINARY" => Self::Binary,
            "NOCASE" => Self::NoCase,
            "RTRIM" => Self::RTrim,
            _ => Self::Custom(String::from(s)),
        };
        collation.name()?;
        Ok(collation)
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComparisonOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl ComparisonOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::NotEq => "!=",
            Self::Lt => "<",
            Self::LtEq => "<=",
            Self::Gt => ">",
            Self::GtEq => ">=",
        }
    }
}

/// Boolean connectives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogicalOp {
    And,
    Or,
}

impl LogicalOp {
    /// Returns the keyword.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
        }
    }
}

/// Arithmetic and string operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

impl ArithmeticOp {
    /// Returns the SQL representation of the operator.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => "||",
        }
    }
}

/// A mapped table used as a query source, optionally under an alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRef {
    /// Mapped Rust type.
    pub type_id: TypeId,
    /// Short name of the mapped type.
    pub type_name: &'static str,
    /// Table alias.
    pub alias: Option<&'static str>,
}

impl TableRef {
    /// The table mapping `O`.
    #[must_use]
    pub fn of<O: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<O>(),
            type_name: short_type_name::<O>(),
            alias: None,
        }
    }

    /// The table mapping `O` under `alias`.
    #[must_use]
    pub fn aliased<O: 'static>(alias: &'static str) -> Self {
        Self {
            alias: Some(alias),
            ..Self::of::<O>()
        }
    }

    /// A column of this table, qualified by the alias when there is one.
    pub fn column(&self, field: impl Into<FieldId>) -> Expr {
        let field = field.into();
        match self.alias {
            Some(alias) => Expr::AliasedColumn { alias, field },
            None => Expr::Column(field),
        }
    }
}

/// A FROM or JOIN source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    /// A mapped table.
    Table(TableRef),
    /// A common table expression in scope, by moniker.
    Cte(String),
}

/// Reference to a column exposed by a common table expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CteColumnRef {
    /// The column fed by this field in the CTE's select.
    Field(FieldId),
    /// The column with this name.
    Name(String),
}

/// Right-hand side of `IN`.
#[derive(Debug, Clone, PartialEq)]
pub enum InList {
    /// A list of operands.
    Values(Vec<Expr>),
    /// A subselect.
    Subquery(Box<Query>),
}

/// `CASE [operand] WHEN .. THEN .. [ELSE ..] END`.
#[derive(Debug, Clone, PartialEq)]
pub struct Case {
    /// Optional case operand.
    pub operand: Option<Box<Expr>>,
    /// `(WHEN, THEN)` pairs in order.
    pub branches: Vec<(Expr, Expr)>,
    /// Optional `ELSE` branch.
    pub else_branch: Option<Box<Expr>>,
}

/// An expression node.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Bindable literal.
    Literal(Value),
    /// Column of a mapped table.
    Column(FieldId),
    /// Column qualified by a table alias.
    AliasedColumn {
        /// Table alias.
        alias: &'static str,
        /// Column field.
        field: FieldId,
    },
    /// Column of a common table expression.
    CteColumn {
        /// CTE moniker.
        cte: String,
        /// Column reference.
        column: CteColumnRef,
    },
    /// `*` or `table.*`.
    Asterisk {
        /// Restrict to one table.
        table: Option<TableRef>,
        /// Expand into the table's declared column list.
        defined_order: bool,
    },
    /// Reference to a result-column alias.
    AliasRef(String),
    /// `expr AS "alias"`.
    Alias {
        /// Aliased expression.
        expr: Box<Expr>,
        /// Alias name.
        alias: String,
    },
    /// Binary comparison.
    Comparison {
        /// Operator.
        op: ComparisonOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// AND / OR.
    Logical {
        /// Connective.
        op: LogicalOp,
        /// Left condition.
        left: Box<Expr>,
        /// Right condition.
        right: Box<Expr>,
    },
    /// NOT.
    Not(Box<Expr>),
    /// `IN` / `NOT IN`.
    In {
        /// Tested expression.
        expr: Box<Expr>,
        /// Candidates.
        list: InList,
        /// `NOT IN` when set.
        negative: bool,
    },
    /// `LIKE` with optional `ESCAPE`.
    Like {
        /// Tested expression.
        expr: Box<Expr>,
        /// Pattern.
        pattern: Box<Expr>,
        /// Escape character.
        escape: Option<Box<Expr>>,
    },
    /// `GLOB`.
    Glob {
        /// Tested expression.
        expr: Box<Expr>,
        /// Pattern.
        pattern: Box<Expr>,
    },
    /// `BETWEEN`.
    Between {
        /// Tested expression.
        expr: Box<Expr>,
        /// Lower bound.
        low: Box<Expr>,
        /// Upper bound.
        high: Box<Expr>,
    },
    /// `IS NULL` / `IS NOT NULL`.
    IsNull {
        /// Tested expression.
        expr: Box<Expr>,
        /// `IS NOT NULL` when set.
        negative: bool,
    },
    /// `expr COLLATE name`.
    Collate {
        /// Collated expression.
        expr: Box<Expr>,
        /// Collating sequence.
        collation: Collation,
    },
    /// Arithmetic or concatenation.
    Arithmetic {
        /// Operator.
        op: ArithmeticOp,
        /// Left operand.
        left: Box<Expr>,
        /// Right operand.
        right: Box<Expr>,
    },
    /// Scalar or aggregate function call.
    Function(Function),
    /// CASE expression.
    Case(Case),
    /// Scalar subselect.
    Subquery(Box<Query>),
    /// `EXISTS (subselect)`.
    Exists(Box<Query>),
}

impl Expr {
    /// Canonical keyword of the node, for node kinds that have one.
    #[must_use]
    pub fn keyword(&self) -> Option<&'static str> {
        match self {
            Self::Comparison { op, .. } => Some(op.as_str()),
            Self::Logical { op, .. } => Some(op.as_str()),
            Self::Arithmetic { op, .. } => Some(op.as_str()),
            Self::Not(_) => Some("NOT"),
            Self::In { negative, .. } => Some(if *negative { "NOT IN" } else { "IN" }),
            Self::Like { .. } => Some("LIKE"),
            Self::Glob { .. } => Some("GLOB"),
            Self::Between { .. } => Some("BETWEEN"),
            Self::IsNull { negative, .. } => {
                Some(if *negative { "IS NOT NULL" } else { "IS NULL" })
            }
            Self::Collate { .. } => Some("COLLATE"),
            Self::Function(function) => Some(function.kind.keyword()),
            Self::Case(_) => Some("CASE"),
            Self::Exists(_) => Some("EXISTS"),
            Self::Alias { .. } => Some("AS"),
            Self::Literal(_)
            | Self::Column(_)
            | Self::AliasedColumn { .. }
            | Self::CteColumn { .. }
            | Self::Asterisk { .. }
            | Self::AliasRef(_)
            | Self::Subquery(_) => None,
        }
    }

    /// Wraps the expression in `COLLATE`.
    #[must_use]
    pub fn collate(self, collation: Collation) -> Self {
        Self::Collate {
            expr: Box::new(self),
            collation,
        }
    }

    /// Direct child expressions, in textual order.
    ///
    /// Subqueries are not descended into.
    #[must_use]
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Self::Literal(_)
            | Self::Column(_)
            | Self::AliasedColumn { .. }
            | Self::CteColumn { .. }
            | Self::Asterisk { .. }
            | Self::AliasRef(_)
            | Self::Subquery(_)
            | Self::Exists(_) => Vec::new(),
            Self::Alias { expr, .. }
            | Self::Not(expr)
            | Self::IsNull { expr, .. }
            | Self::Collate { expr, .. } => vec![expr.as_ref()],
            Self::Comparison { left, right, .. }
            | Self::Logical { left, right, .. }
            | Self::Arithmetic { left, right, .. } => vec![left.as_ref(), right.as_ref()],
            Self::In { expr, list, .. } => {
                let mut children = vec![expr.as_ref()];
                if let InList::Values(values) = list {
                    children.extend(values);
                }
                children
            }
            Self::Like {
                expr,
                pattern,
                escape,
            } => {
                let mut children = vec![expr.as_ref(), pattern.as_ref()];
                children.extend(escape.as_deref());
                children
            }
            Self::Glob { expr, pattern } => vec![expr.as_ref(), pattern.as_ref()],
            Self::Between { expr, low, high } => vec![expr.as_ref(), low.as_ref(), high.as_ref()],
            Self::Function(function) => function.args.iter().collect(),
            Self::Case(case) => {
                let mut children: Vec<&Expr> = case.operand.as_deref().into_iter().collect();
                for (when, then) in &case.branches {
                    children.push(when);
                    children.push(then);
                }
                children.extend(case.else_branch.as_deref());
                children
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collation_names() {
        assert_eq!(Collation::NoCase.name().unwrap(), "NOCASE");
        assert_eq!(Collation::Custom(String::from("my_order")).name().unwrap(), "my_order");
    }

    #[test]
    fn test_invalid_collation_is_rejected() {
        assert_eq!(
            Collation::Custom(String::from("x; DROP")).name(),
            Err(Error::InvalidCollateArgument(String::from("x; DROP")))
        );
        assert!("1abc".parse::<Collation>().is_err());
        assert_eq!("nocase".parse::<Collation>().unwrap(), Collation::NoCase);
    }

    #[test]
    fn test_keywords() {
        let column = Expr::Literal(Value::Integer(1));
        let not_in = Expr::In {
            expr: Box::new(column.clone()),
            list: InList::Values(vec![]),
            negative: true,
        };
        assert_eq!(not_in.keyword(), Some("NOT IN"));
        assert_eq!(column.keyword(), None);
    }

    #[test]
    fn test_children_in_textual_order() {
        let between = Expr::Between {
            expr: Box::new(Expr::Literal(Value::Integer(0))),
            low: Box::new(Expr::Literal(Value::Integer(1))),
            high: Box::new(Expr::Literal(Value::Integer(2))),
        };
        let values: Vec<_> = between
            .children()
            .into_iter()
            .map(|e| match e {
                Expr::Literal(Value::Integer(n)) => *n,
                _ => -1,
            })
            .collect();
        assert_eq!(values, vec![0, 1, 2]);
    }
}
