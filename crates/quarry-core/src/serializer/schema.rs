//! CREATE TABLE and CREATE INDEX serialization.
//!
//! DDL never binds parameters: literals and expressions are printed inline
//! and columns are written without a table qualifier.

use crate::ast::Expr;
use crate::error::{Error, Result};
use crate::schema::{
    ColumnConstraint, ColumnDef, DefaultValue, FieldId, ForeignKeyClause, GeneratedStorage, Index,
    TableConstraint, TableDef,
};
use crate::serializer::expr::{collation_suffix, literal};
use crate::serializer::{Bindings, Context, Serialize, quote_ident};

fn ddl_context<'a>(ctx: &Context<'a>) -> Context<'a> {
    ctx.with_replace_bindable_with_question(false)
        .with_skip_table_name(true)
        .with_highest_level(false)
        .with_use_parentheses(false)
}

fn inline(expr: &Expr, ctx: &Context<'_>) -> Result<String> {
    expr.serialize(&ddl_context(ctx), &mut Bindings::new())
}

/// `"a", "b"` for columns that must belong to `table`.
fn own_columns(table: &TableDef, fields: &[FieldId]) -> Result<String> {
    let names = fields
        .iter()
        .map(|field| {
            table
                .find_column_name(field)
                .map(quote_ident)
                .ok_or(Error::ColumnNotFound {
                    table_type: field.owner_name,
                    member: field.member,
                })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(names.join(", "))
}

/// `REFERENCES "t"("c") [ON DELETE ..] [ON UPDATE ..]`
fn references(clause: &ForeignKeyClause, ctx: &Context<'_>) -> Result<String> {
    let first = clause
        .references
        .first()
        .ok_or_else(|| Error::InvalidSchema(String::from("foreign key without referenced columns")))?;
    let (target, _) = ctx.schema().column(first)?;
    let mut sql = format!(
        "REFERENCES {}({})",
        quote_ident(target.name()),
        own_columns(target, &clause.references)?
    );
    if let Some(action) = clause.on_delete {
        sql.push_str(" ON DELETE ");
        sql.push_str(action.as_str());
    }
    if let Some(action) = clause.on_update {
        sql.push_str(" ON UPDATE ");
        sql.push_str(action.as_str());
    }
    Ok(sql)
}

/// Text of a `DEFAULT` clause: an inline literal or a parenthesized
/// expression.
pub(crate) fn default_text(default: &DefaultValue, ctx: &Context<'_>) -> Result<String> {
    match default {
        DefaultValue::Value(value) => Ok(literal(value, &ddl_context(ctx), &mut Bindings::new())),
        DefaultValue::Expr(expr) => Ok(format!("({})", inline(expr, ctx)?)),
    }
}

fn column_constraint(constraint: &ColumnConstraint, ctx: &Context<'_>) -> Result<String> {
    Ok(match constraint {
        ColumnConstraint::PrimaryKey { order } => match order.keyword() {
            Some(keyword) => format!("PRIMARY KEY {keyword}"),
            None => String::from("PRIMARY KEY"),
        },
        ColumnConstraint::Autoincrement => String::from("AUTOINCREMENT"),
        ColumnConstraint::Unique => String::from("UNIQUE"),
        ColumnConstraint::Default(default) => format!("DEFAULT {}", default_text(default, ctx)?),
        ColumnConstraint::References(clause) => references(clause, ctx)?,
        ColumnConstraint::Collate(collation) => collation_suffix(collation)?.trim_start().to_string(),
        ColumnConstraint::Check(expr) => format!("CHECK ({})", inline(expr, ctx)?),
        ColumnConstraint::Generated { expr, storage } => {
            let mut sql = format!("GENERATED ALWAYS AS ({})", inline(expr, ctx)?);
            match storage {
                GeneratedStorage::Unspecified => {}
                GeneratedStorage::Virtual => sql.push_str(" VIRTUAL"),
                GeneratedStorage::Stored => sql.push_str(" STORED"),
            }
            sql
        }
    })
}

/// `"name" TYPE constraints [NOT NULL]`
///
/// AUTOINCREMENT is always printed right after PRIMARY KEY, whatever the
/// declaration order; SQLite rejects any other placement.
pub(crate) fn column_definition(column: &ColumnDef, ctx: &Context<'_>) -> Result<String> {
    let mut fragments = Vec::with_capacity(column.constraints().len());
    let mut primary_key_at = None;
    let mut autoincrement = false;
    for constraint in column.constraints() {
        match constraint {
            ColumnConstraint::Autoincrement => autoincrement = true,
            ColumnConstraint::PrimaryKey { .. } => {
                primary_key_at = Some(fragments.len());
                fragments.push(column_constraint(constraint, ctx)?);
            }
            _ => fragments.push(column_constraint(constraint, ctx)?),
        }
    }
    if autoincrement {
        let at = primary_key_at.map_or(fragments.len(), |pk| pk + 1);
        fragments.insert(at, String::from("AUTOINCREMENT"));
    }

    let mut sql = format!(
        "{} {}",
        quote_ident(column.name()),
        column.data_type().as_str()
    );
    for fragment in fragments {
        sql.push(' ');
        sql.push_str(&fragment);
    }
    if !column.is_nullable() {
        sql.push_str(" NOT NULL");
    }
    Ok(sql)
}

fn table_constraint(
    table: &TableDef,
    constraint: &TableConstraint,
    ctx: &Context<'_>,
) -> Result<String> {
    Ok(match constraint {
        TableConstraint::PrimaryKey(fields) => {
            format!("PRIMARY KEY({})", own_columns(table, fields)?)
        }
        TableConstraint::Unique(fields) => format!("UNIQUE({})", own_columns(table, fields)?),
        TableConstraint::ForeignKey { columns, clause } => format!(
            "FOREIGN KEY({}) {}",
            own_columns(table, columns)?,
            references(clause, ctx)?
        ),
        TableConstraint::Check(expr) => format!("CHECK ({})", inline(expr, ctx)?),
    })
}

/// `CREATE TABLE [IF NOT EXISTS] "t" (...) [WITHOUT ROWID]`
pub(crate) fn create_table(
    table: &TableDef,
    if_not_exists: bool,
    ctx: &Context<'_>,
) -> Result<String> {
    let mut parts = Vec::with_capacity(table.columns().len() + table.constraints().len());
    for column in table.columns() {
        parts.push(column_definition(column, ctx)?);
    }
    for constraint in table.constraints() {
        parts.push(table_constraint(table, constraint, ctx)?);
    }

    let mut sql = String::from("CREATE TABLE ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&quote_ident(table.name()));
    sql.push_str(" (");
    sql.push_str(&parts.join(", "));
    sql.push(')');
    if table.without_rowid() {
        sql.push_str(" WITHOUT ROWID");
    }
    Ok(sql)
}

/// `CREATE [UNIQUE] INDEX [IF NOT EXISTS] "i" ON "t" (...) [WHERE ...]`
pub(crate) fn create_index(index: &Index, if_not_exists: bool, ctx: &Context<'_>) -> Result<String> {
    let table = ctx.schema().index_table(index)?;
    let mut columns = Vec::with_capacity(index.columns.len());
    for indexed in &index.columns {
        let mut column = own_columns(table, std::slice::from_ref(&indexed.field))?;
        if let Some(collation) = &indexed.collation {
            column.push_str(&collation_suffix(collation)?);
        }
        if let Some(keyword) = indexed.order.keyword() {
            column.push(' ');
            column.push_str(keyword);
        }
        columns.push(column);
    }

    let mut sql = String::from("CREATE ");
    if index.unique {
        sql.push_str("UNIQUE ");
    }
    sql.push_str("INDEX ");
    if if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&quote_ident(&index.name));
    sql.push_str(" ON ");
    sql.push_str(&quote_ident(table.name()));
    sql.push_str(" (");
    sql.push_str(&columns.join(", "));
    sql.push(')');
    if let Some(condition) = &index.where_clause {
        sql.push_str(" WHERE ");
        sql.push_str(&inline(condition, ctx)?);
    }
    Ok(sql)
}
