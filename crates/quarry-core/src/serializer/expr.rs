//! Expression serialization.

use crate::ast::{Case, Collation, Expr, Function, FunctionKind, InList, TableRef};
use crate::builder::{Condition, WhereClause};
use crate::error::{Error, Result};
use crate::schema::{Field, FieldId, TableDef};
use crate::serializer::{Bindings, Context, Serialize, comma_list, quote_ident};
use crate::value::Value;

/// `?` plus a parameter, or the inline literal.
pub(crate) fn literal(value: &Value, ctx: &Context<'_>, binds: &mut Bindings) -> String {
    if ctx.replace_bindable_with_question() {
        binds.push(value.clone());
        String::from("?")
    } else {
        value.to_sql_inline()
    }
}

/// Qualifies `column` with `qualifier` unless table names are skipped.
pub(crate) fn qualify(qualifier: &str, column: &str, ctx: &Context<'_>) -> String {
    if ctx.skip_table_name() {
        quote_ident(column)
    } else {
        format!("{}.{}", quote_ident(qualifier), quote_ident(column))
    }
}

/// A mapped column, resolved through the schema.
pub(crate) fn column(field: &FieldId, ctx: &Context<'_>) -> Result<String> {
    let (table, column) = ctx.schema().column(field)?;
    Ok(qualify(table.name(), column.name(), ctx))
}

/// The registered table behind `table`.
pub(crate) fn table_def<'s>(table: &TableRef, ctx: &Context<'s>) -> Result<&'s TableDef> {
    ctx.schema()
        .table_def(table.type_id)
        .ok_or(Error::TableNotFound(table.type_name))
}

fn asterisk(table: Option<&TableRef>, defined_order: bool, ctx: &Context<'_>) -> Result<String> {
    let Some(table) = table else {
        return Ok(String::from("*"));
    };
    let def = table_def(table, ctx)?;
    let qualifier = match table.alias {
        Some(alias) => alias,
        None => def.name(),
    };
    if !defined_order {
        return Ok(if ctx.skip_table_name() {
            String::from("*")
        } else {
            format!("{}.*", quote_ident(qualifier))
        });
    }
    let columns: Vec<String> = def
        .columns()
        .iter()
        .map(|c| qualify(qualifier, c.name(), ctx))
        .collect();
    Ok(columns.join(", "))
}

pub(crate) fn collation_suffix(collation: &Collation) -> Result<String> {
    Ok(format!(" COLLATE {}", collation.name()?))
}

fn case(case: &Case, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
    let mut sql = String::from("CASE");
    if let Some(operand) = &case.operand {
        sql.push(' ');
        sql.push_str(&operand.serialize(ctx, binds)?);
    }
    for (when, then) in &case.branches {
        sql.push_str(" WHEN ");
        sql.push_str(&when.serialize(ctx, binds)?);
        sql.push_str(" THEN ");
        sql.push_str(&then.serialize(ctx, binds)?);
    }
    if let Some(otherwise) = &case.else_branch {
        sql.push_str(" ELSE ");
        sql.push_str(&otherwise.serialize(ctx, binds)?);
    }
    sql.push_str(" END");
    Ok(sql)
}

impl Serialize for Expr {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let inner = ctx.with_highest_level(false).with_use_parentheses(false);
        let sql = match self {
            Self::Literal(value) => literal(value, ctx, binds),
            Self::Column(field) => column(field, ctx)?,
            Self::AliasedColumn { alias, field } => {
                qualify(alias, ctx.schema().find_column_name(field)?, ctx)
            }
            Self::CteColumn { cte, column } => {
                let scope = ctx.cte(cte)?;
                qualify(cte, scope.resolve(column)?, ctx)
            }
            Self::Asterisk {
                table,
                defined_order,
            } => asterisk(table.as_ref(), *defined_order, ctx)?,
            Self::AliasRef(name) => quote_ident(name),
            Self::Alias { expr, alias } => {
                format!("{} AS {}", expr.serialize(&inner, binds)?, quote_ident(alias))
            }
            Self::Comparison { op, left, right } => format!(
                "({} {} {})",
                operand(left, &inner, binds)?,
                op.as_str(),
                operand(right, &inner, binds)?
            ),
            Self::Logical { op, left, right } => {
                let left = logical_operand(left, &inner, binds)?;
                let right = logical_operand(right, &inner, binds)?;
                format!("{left} {} {right}", op.as_str())
            }
            Self::Not(expr) => format!("NOT ({})", expr.serialize(&inner, binds)?),
            Self::In {
                expr,
                list,
                negative,
            } => {
                let mut sql = operand(expr, &inner, binds)?;
                sql.push_str(if *negative { " NOT IN " } else { " IN " });
                match list {
                    InList::Values(values) => {
                        sql.push('(');
                        sql.push_str(&comma_list(values, &inner, binds)?);
                        sql.push(')');
                    }
                    InList::Subquery(query) => sql.push_str(&query.serialize(&inner, binds)?),
                }
                sql
            }
            Self::Like {
                expr,
                pattern,
                escape,
            } => {
                let mut sql = format!(
                    "{} LIKE {}",
                    operand(expr, &inner, binds)?,
                    operand(pattern, &inner, binds)?
                );
                if let Some(escape) = escape {
                    sql.push_str(" ESCAPE ");
                    sql.push_str(&escape.serialize(&inner, binds)?);
                }
                sql
            }
            Self::Glob { expr, pattern } => format!(
                "{} GLOB {}",
                operand(expr, &inner, binds)?,
                operand(pattern, &inner, binds)?
            ),
            Self::Between { expr, low, high } => format!(
                "{} BETWEEN {} AND {}",
                operand(expr, &inner, binds)?,
                operand(low, &inner, binds)?,
                operand(high, &inner, binds)?
            ),
            Self::IsNull { expr, negative } => format!(
                "{} {}",
                operand(expr, &inner, binds)?,
                if *negative { "IS NOT NULL" } else { "IS NULL" }
            ),
            Self::Collate { expr, collation } => match expr.as_ref() {
                // Inside the comparison's parentheses, after the right operand.
                Self::Comparison { op, left, right } => format!(
                    "({} {} {}{})",
                    operand(left, &inner, binds)?,
                    op.as_str(),
                    operand(right, &inner, binds)?,
                    collation_suffix(collation)?
                ),
                other => format!(
                    "{}{}",
                    operand(other, &inner, binds)?,
                    collation_suffix(collation)?
                ),
            },
            Self::Arithmetic { op, left, right } => format!(
                "({} {} {})",
                operand(left, &inner, binds)?,
                op.as_str(),
                operand(right, &inner, binds)?
            ),
            Self::Function(function) => function.serialize(&inner, binds)?,
            Self::Case(branches) => case(branches, &inner, binds)?,
            Self::Subquery(query) => query.serialize(&inner, binds)?,
            Self::Exists(query) => format!("EXISTS {}", query.serialize(&inner, binds)?),
        };
        let wrapped = matches!(
            self,
            Self::Comparison { .. } | Self::Arithmetic { .. } | Self::Subquery(_)
        );
        if ctx.use_parentheses() && !wrapped {
            Ok(format!("({sql})"))
        } else {
            Ok(sql)
        }
    }
}

/// An operand of a comparison, arithmetic or postfix operator.
///
/// Conditions that print without their own parentheses are wrapped, so a
/// lower-precedence child never regroups with its parent's operator.
/// `COLLATE` binds tighter than every operator and is left bare; its own
/// child goes through here instead.
fn operand(expr: &Expr, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
    let unbracketed = matches!(
        expr,
        Expr::Logical { .. }
            | Expr::Not(_)
            | Expr::In { .. }
            | Expr::Like { .. }
            | Expr::Glob { .. }
            | Expr::Between { .. }
            | Expr::IsNull { .. }
    );
    expr.serialize(&ctx.with_use_parentheses(unbracketed), binds)
}

/// An AND/OR operand; nested AND/OR nodes are parenthesized.
fn logical_operand(expr: &Expr, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
    let nested = matches!(expr, Expr::Logical { .. });
    expr.serialize(&ctx.with_use_parentheses(nested), binds)
}

impl Serialize for Function {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let keyword = self.kind.keyword();
        if self.kind == FunctionKind::CountAll {
            return Ok(format!("{keyword}(*)"));
        }
        let args = comma_list(&self.args, ctx, binds)?;
        if self.distinct {
            Ok(format!("{keyword}(DISTINCT {args})"))
        } else {
            Ok(format!("{keyword}({args})"))
        }
    }
}

impl Serialize for Condition {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        self.expr().serialize(ctx, binds)
    }
}

impl Serialize for WhereClause {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        Ok(format!("WHERE {}", self.0.serialize(ctx, binds)?))
    }
}

impl Serialize for FieldId {
    fn serialize(&self, ctx: &Context<'_>, _binds: &mut Bindings) -> Result<String> {
        column(self, ctx)
    }
}

impl<O, T> Serialize for Field<O, T> {
    fn serialize(&self, ctx: &Context<'_>, _binds: &mut Bindings) -> Result<String> {
        column(&self.id(), ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{
        Operand, and, asterisk, asterisk_defined, between, case, count_all, count_distinct,
        group_concat, group_concat_sep, in_, is_equal, is_null, like_escape, not, or, star,
        table, val,
    };
    use crate::serializer::fixtures::{
        Post, User, schema, stray_id, user_age, user_id, user_name,
    };
    use crate::serializer::{prepare, serialize};

    #[test]
    fn test_column_is_qualified() {
        let schema = schema();
        let ctx = schema.context();
        assert_eq!(serialize(&user_name(), &ctx).unwrap(), "\"users\".\"name\"");
        assert_eq!(
            serialize(&user_name(), &ctx.with_skip_table_name(true)).unwrap(),
            "\"name\""
        );
    }

    #[test]
    fn test_unmapped_column_fails() {
        let schema = schema();
        let err = serialize(&stray_id(), &schema.context()).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound { member: "id", .. }));
    }

    #[test]
    fn test_error_propagates_from_deep_child() {
        let schema = schema();
        let cond = is_equal(user_id(), 1) & (is_null(user_age()) | is_equal(stray_id(), 2));
        assert!(serialize(&cond, &schema.context()).is_err());
    }

    #[test]
    fn test_literal_modes() {
        let schema = schema();
        let ctx = schema.context();
        let prepared = prepare(&val("O'Brien"), &ctx).unwrap();
        assert_eq!(prepared.sql, "?");
        assert_eq!(prepared.params, vec![Value::Text("O'Brien".into())]);
        let literal_ctx = ctx.with_replace_bindable_with_question(false);
        assert_eq!(serialize(&val("O'Brien"), &literal_ctx).unwrap(), "'O''Brien'");
        assert_eq!(serialize(&val(Value::Null), &literal_ctx).unwrap(), "NULL");
    }

    #[test]
    fn test_logical_nesting() {
        let schema = schema();
        let ctx = schema.context().with_replace_bindable_with_question(false);
        let cond = and(
            or(is_equal(user_id(), 1), is_equal(user_id(), 2)),
            user_name().like("a%"),
        );
        assert_eq!(
            serialize(&cond, &ctx.with_skip_table_name(true)).unwrap(),
            "((\"id\" = 1) OR (\"id\" = 2)) AND \"name\" LIKE 'a%'"
        );
    }

    #[test]
    fn test_not_wraps_child() {
        let schema = schema();
        let ctx = schema.context().with_skip_table_name(true);
        let cond = is_equal(user_id(), 3);
        let inner = serialize(&cond, &ctx).unwrap();
        assert_eq!(serialize(&not(cond), &ctx).unwrap(), format!("NOT ({inner})"));
    }

    #[test]
    fn test_condition_operands_keep_their_grouping() {
        let schema = schema();
        let ctx = schema
            .context()
            .with_replace_bindable_with_question(false)
            .with_skip_table_name(true);
        let either = or(is_equal(user_id(), 1), is_equal(user_id(), 2));
        assert_eq!(
            serialize(&is_null(either), &ctx).unwrap(),
            "((\"id\" = 1) OR (\"id\" = 2)) IS NULL"
        );
        assert_eq!(
            serialize(&is_equal(val(1), is_null(user_age())), &ctx).unwrap(),
            "(1 = (\"age\" IS NULL))"
        );
        assert_eq!(
            serialize(&between(user_name().like("a%"), 0, 1), &ctx).unwrap(),
            "(\"name\" LIKE 'a%') BETWEEN 0 AND 1"
        );
        assert_eq!(
            serialize(&in_(not(is_null(user_age())), [1]), &ctx).unwrap(),
            "(NOT (\"age\" IS NULL)) IN (1)"
        );
        assert_eq!(
            serialize(&user_id().add(user_age().is_not_null()), &ctx).unwrap(),
            "(\"id\" + (\"age\" IS NOT NULL))"
        );
    }

    #[test]
    fn test_membership_and_patterns() {
        let schema = schema();
        let ctx = schema
            .context()
            .with_replace_bindable_with_question(false)
            .with_skip_table_name(true);
        assert_eq!(
            serialize(&in_(user_id(), [1, 2, 3]), &ctx).unwrap(),
            "\"id\" IN (1, 2, 3)"
        );
        assert_eq!(
            serialize(&user_id().not_in_list([4]), &ctx).unwrap(),
            "\"id\" NOT IN (4)"
        );
        assert_eq!(
            serialize(&like_escape(user_name(), "a!%", "!"), &ctx).unwrap(),
            "\"name\" LIKE 'a!%' ESCAPE '!'"
        );
        assert_eq!(
            serialize(&between(user_id(), 1, 10), &ctx).unwrap(),
            "\"id\" BETWEEN 1 AND 10"
        );
        assert_eq!(
            serialize(&user_age().is_not_null(), &ctx).unwrap(),
            "\"age\" IS NOT NULL"
        );
    }

    #[test]
    fn test_collate_placement() {
        let schema = schema();
        let ctx = schema.context().with_skip_table_name(true);
        assert_eq!(
            serialize(&user_name().eq("bob").collate_nocase(), &ctx).unwrap(),
            "(\"name\" = ? COLLATE NOCASE)"
        );
        assert_eq!(
            serialize(&user_name().collate(Collation::RTrim), &ctx).unwrap(),
            "\"name\" COLLATE RTRIM"
        );
        let bad = user_name().collate(Collation::Custom("no case".into()));
        assert!(matches!(
            serialize(&bad, &ctx),
            Err(Error::InvalidCollateArgument(_))
        ));
    }

    #[test]
    fn test_functions() {
        let schema = schema();
        let ctx = schema.context().with_skip_table_name(true);
        assert_eq!(serialize(&count_all(), &ctx).unwrap(), "COUNT(*)");
        assert_eq!(
            serialize(&count_distinct(user_name()), &ctx).unwrap(),
            "COUNT(DISTINCT \"name\")"
        );
        let single = serialize(&group_concat(user_name()), &ctx).unwrap();
        let double = serialize(&group_concat_sep(user_name(), ","), &ctx).unwrap();
        assert!(single.starts_with("GROUP_CONCAT("));
        assert!(double.starts_with("GROUP_CONCAT("));
    }

    #[test]
    fn test_case_omits_absent_parts() {
        let schema = schema();
        let ctx = schema
            .context()
            .with_replace_bindable_with_question(false)
            .with_skip_table_name(true);
        let expr = case().when(user_age().gt(17)).then("adult").end();
        assert_eq!(
            serialize(&expr, &ctx).unwrap(),
            "CASE WHEN (\"age\" > 17) THEN 'adult' END"
        );
    }

    #[test]
    fn test_asterisks() {
        let schema = schema();
        let ctx = schema.context();
        assert_eq!(serialize(&star(), &ctx).unwrap(), "*");
        assert_eq!(serialize(&asterisk::<User>(), &ctx).unwrap(), "\"users\".*");
        assert_eq!(
            serialize(&asterisk_defined::<Post>(), &ctx).unwrap(),
            "\"posts\".\"id\", \"posts\".\"user_id\", \"posts\".\"title\""
        );
        assert_eq!(
            serialize(&table::<User>().column(user_id()), &ctx).unwrap(),
            "\"users\".\"id\""
        );
    }

    #[test]
    fn test_arithmetic_and_alias() {
        let schema = schema();
        let ctx = schema
            .context()
            .with_replace_bindable_with_question(false)
            .with_skip_table_name(true);
        assert_eq!(
            serialize(&user_id().add(1).as_("next"), &ctx).unwrap(),
            "(\"id\" + 1) AS \"next\""
        );
    }
}
