//! SELECT, compound and WITH serialization.

use crate::ast::{
    Cte, CteColumnRef, Expr, Join, JoinConstraint, Limit, OrderBy, OrderingTerm, Query,
    SelectStmt, Source, TableRef, With,
};
use crate::builder::{DynamicOrderBy, Select};
use crate::error::{Error, Result};
use crate::schema::FieldId;
use crate::serializer::expr::{collation_suffix, table_def};
use crate::serializer::{Bindings, Context, CteScope, Serialize, comma_list, quote_ident};

// ================================================================
// Sources and joins
// ================================================================

fn source(source: &Source, ctx: &Context<'_>) -> Result<String> {
    match source {
        Source::Table(table) => {
            let name = quote_ident(table_def(table, ctx)?.name());
            Ok(match table.alias {
                Some(alias) => format!("{name} {}", quote_ident(alias)),
                None => name,
            })
        }
        Source::Cte(name) => {
            ctx.cte(name)?;
            Ok(quote_ident(name))
        }
    }
}

fn push_unique(found: &mut Vec<Source>, source: Source) {
    if !found.contains(&source) {
        found.push(source);
    }
}

fn collect_sources(expr: &Expr, found: &mut Vec<Source>) {
    match expr {
        Expr::Column(field) => push_unique(found, Source::Table(owner(field, None))),
        Expr::AliasedColumn { alias, field } => {
            push_unique(found, Source::Table(owner(field, Some(*alias))));
        }
        Expr::CteColumn { cte, .. } => push_unique(found, Source::Cte(cte.clone())),
        Expr::Asterisk {
            table: Some(table), ..
        } => push_unique(found, Source::Table(*table)),
        _ => {}
    }
    for child in expr.children() {
        collect_sources(child, found);
    }
}

const fn owner(field: &FieldId, alias: Option<&'static str>) -> TableRef {
    TableRef {
        type_id: field.owner,
        type_name: field.owner_name,
        alias,
    }
}

/// Sources referenced by the statement's clauses, in first-appearance
/// order, minus those already joined.
fn implicit_sources(stmt: &SelectStmt) -> Vec<Source> {
    let mut found = Vec::new();
    let ordering: Vec<&Expr> = match &stmt.order_by {
        Some(OrderBy::Terms(terms)) => terms.iter().map(|t| &t.expr).collect(),
        Some(OrderBy::Dynamic(_)) | None => Vec::new(),
    };
    let exprs = stmt
        .columns
        .iter()
        .chain(stmt.where_clause.iter())
        .chain(stmt.group_by.iter())
        .chain(stmt.having.iter())
        .chain(ordering);
    for expr in exprs {
        collect_sources(expr, &mut found);
    }
    found.retain(|s| !stmt.joins.iter().any(|j| &j.source == s));
    found
}

impl Serialize for Join {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let mut sql = format!("{} {}", self.kind.keyword(), source(&self.source, ctx)?);
        match &self.constraint {
            Some(JoinConstraint::On(condition)) => {
                sql.push_str(" ON ");
                sql.push_str(&condition.serialize(ctx, binds)?);
            }
            Some(JoinConstraint::Using(fields)) => {
                let names = fields
                    .iter()
                    .map(|f| ctx.schema().find_column_name(f).map(quote_ident))
                    .collect::<Result<Vec<_>>>()?;
                sql.push_str(" USING (");
                sql.push_str(&names.join(", "));
                sql.push(')');
            }
            None => {}
        }
        Ok(sql)
    }
}

// ================================================================
// ORDER BY and LIMIT
// ================================================================

impl Serialize for OrderingTerm {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let mut sql = self.expr.serialize(ctx, binds)?;
        if let Some(collation) = &self.collation {
            sql.push_str(&collation_suffix(collation)?);
        }
        if let Some(keyword) = self.order.keyword() {
            sql.push(' ');
            sql.push_str(keyword);
        }
        Ok(sql)
    }
}

impl Serialize for OrderBy {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        if self.is_empty() {
            return Err(Error::InvalidExpression(String::from(
                "ORDER BY without terms",
            )));
        }
        let terms = match self {
            Self::Terms(terms) => comma_list(terms, ctx, binds)?,
            Self::Dynamic(entries) => {
                let mut rendered = Vec::with_capacity(entries.len());
                for entry in entries {
                    let mut sql = entry.name.clone();
                    if let Some(collation) = &entry.collation {
                        sql.push_str(&collation_suffix(collation)?);
                    }
                    if let Some(keyword) = entry.order.keyword() {
                        sql.push(' ');
                        sql.push_str(keyword);
                    }
                    rendered.push(sql);
                }
                rendered.join(", ")
            }
        };
        Ok(format!("ORDER BY {terms}"))
    }
}

impl Serialize for DynamicOrderBy {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        OrderBy::Dynamic(self.entries().to_vec()).serialize(ctx, binds)
    }
}

impl Serialize for Limit {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        match &self.offset {
            Some(offset) if self.offset_implicit => Ok(format!(
                "LIMIT {}, {}",
                offset.serialize(ctx, binds)?,
                self.limit.serialize(ctx, binds)?
            )),
            Some(offset) => Ok(format!(
                "LIMIT {} OFFSET {}",
                self.limit.serialize(ctx, binds)?,
                offset.serialize(ctx, binds)?
            )),
            None => Ok(format!("LIMIT {}", self.limit.serialize(ctx, binds)?)),
        }
    }
}

// ================================================================
// SELECT
// ================================================================

impl Serialize for SelectStmt {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        if self.columns.is_empty() {
            return Err(Error::InvalidExpression(String::from(
                "SELECT without result columns",
            )));
        }
        let inner = ctx.with_highest_level(false).with_use_parentheses(false);
        let mut sql = String::from("SELECT ");
        if self.distinct {
            sql.push_str("DISTINCT ");
        }
        sql.push_str(&comma_list(&self.columns, &inner, binds)?);

        let implicit;
        let sources = if self.from.is_empty() {
            implicit = implicit_sources(self);
            &implicit
        } else {
            &self.from
        };
        if !sources.is_empty() {
            let rendered = sources
                .iter()
                .map(|s| source(s, &inner))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" FROM ");
            sql.push_str(&rendered.join(", "));
        }
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.serialize(&inner, binds)?);
        }
        if let Some(condition) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&condition.serialize(&inner, binds)?);
        }
        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&comma_list(&self.group_by, &inner, binds)?);
        }
        if let Some(condition) = &self.having {
            sql.push_str(" HAVING ");
            sql.push_str(&condition.serialize(&inner, binds)?);
        }
        // A dynamic ordering may end up empty at runtime and is then omitted;
        // an empty static term list is rejected by `OrderBy::serialize`.
        let ordering = self
            .order_by
            .as_ref()
            .filter(|o| !matches!(o, OrderBy::Dynamic(entries) if entries.is_empty()));
        if let Some(order_by) = ordering {
            sql.push(' ');
            sql.push_str(&order_by.serialize(&inner, binds)?);
        }
        if let Some(limit) = &self.limit {
            sql.push(' ');
            sql.push_str(&limit.serialize(&inner, binds)?);
        }

        if ctx.highest_level() {
            Ok(sql)
        } else {
            Ok(format!("({sql})"))
        }
    }
}

impl<S> Serialize for Select<S> {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        self.stmt().serialize(ctx, binds)
    }
}

// ================================================================
// Compound queries and WITH
// ================================================================

/// Name and feeding field of each result column of `expr`.
fn result_columns(
    expr: &Expr,
    ctx: &Context<'_>,
) -> Result<Vec<(String, Option<FieldId>)>> {
    let column = match expr {
        Expr::Column(field) | Expr::AliasedColumn { field, .. } => (
            ctx.schema().find_column_name(field)?.to_string(),
            Some(*field),
        ),
        Expr::Alias { expr, alias } => {
            let field = match expr.as_ref() {
                Expr::Column(field) | Expr::AliasedColumn { field, .. } => Some(*field),
                _ => None,
            };
            (alias.clone(), field)
        }
        Expr::CteColumn { cte, column } => match ctx.cte(cte).and_then(|s| s.resolve(column)) {
            Ok(name) => (name.to_string(), None),
            Err(_) => match column {
                CteColumnRef::Name(name) => (name.clone(), None),
                CteColumnRef::Field(field) => (
                    ctx.schema().find_column_name(field)?.to_string(),
                    Some(*field),
                ),
            },
        },
        Expr::Asterisk {
            table: Some(table), ..
        } => {
            return Ok(table_def(table, ctx)?
                .columns()
                .iter()
                .map(|c| (c.name().to_string(), Some(c.field())))
                .collect());
        }
        Expr::Asterisk { table: None, .. } => return Ok(Vec::new()),
        other => {
            let text_ctx = ctx
                .with_replace_bindable_with_question(false)
                .with_skip_table_name(true);
            (crate::serializer::serialize(other, &text_ctx)?, None)
        }
    };
    Ok(vec![column])
}

/// Column layout exposed by `cte`.
///
/// Names come from the explicit column list when there is one; the field
/// feeding each position comes from the defining query's result columns.
fn cte_scope(cte: &Cte, ctx: &Context<'_>) -> Result<CteScope> {
    let mut derived = Vec::new();
    for expr in cte.query.result_columns() {
        derived.extend(result_columns(expr, ctx)?);
    }
    let columns = if cte.columns.is_empty() {
        derived
    } else {
        cte.columns
            .iter()
            .enumerate()
            .map(|(idx, column)| match column {
                CteColumnRef::Name(name) => Ok((
                    name.clone(),
                    derived.get(idx).and_then(|(_, field)| *field),
                )),
                CteColumnRef::Field(field) => Ok((
                    ctx.schema().find_column_name(field)?.to_string(),
                    Some(*field),
                )),
            })
            .collect::<Result<Vec<_>>>()?
    };
    Ok(CteScope {
        name: cte.name.clone(),
        columns,
    })
}

fn with(with: &With, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
    let mut scopes = ctx.ctes().to_vec();
    for cte in &with.ctes {
        let scope = cte_scope(cte, &ctx.with_ctes(&scopes))?;
        scopes.push(scope);
    }
    let scoped = ctx.with_ctes(&scopes).with_use_parentheses(false);

    let mut sql = String::from("WITH ");
    if with.recursive {
        sql.push_str("RECURSIVE ");
    }
    let mut rendered = Vec::with_capacity(with.ctes.len());
    for cte in &with.ctes {
        let mut part = quote_ident(&cte.name);
        if !cte.columns.is_empty() {
            let scope = scoped.cte(&cte.name)?;
            let names: Vec<String> = scope
                .columns
                .iter()
                .map(|(name, _)| quote_ident(name))
                .collect();
            part.push('(');
            part.push_str(&names.join(", "));
            part.push(')');
        }
        part.push_str(" AS ");
        part.push_str(&cte.query.serialize(&scoped.with_highest_level(false), binds)?);
        rendered.push(part);
    }
    sql.push_str(&rendered.join(", "));
    sql.push(' ');
    sql.push_str(&with.body.serialize(&scoped.with_highest_level(true), binds)?);

    if ctx.highest_level() {
        Ok(sql)
    } else {
        Ok(format!("({sql})"))
    }
}

impl Serialize for Query {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        match self {
            Self::Select(select) => select.serialize(ctx, binds),
            Self::Compound { op, left, right } => {
                let operand = ctx.with_highest_level(true).with_use_parentheses(false);
                let sql = format!(
                    "{} {} {}",
                    left.serialize(&operand, binds)?,
                    op.keyword(),
                    right.serialize(&operand, binds)?
                );
                if ctx.highest_level() {
                    Ok(sql)
                } else {
                    Ok(format!("({sql})"))
                }
            }
            Self::With(clause) => with(clause, ctx, binds),
        }
    }
}
