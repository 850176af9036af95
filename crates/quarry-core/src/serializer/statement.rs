//! DML serialization and statement dispatch.

use crate::ast::{Delete, Insert, InsertSource, Statement, Update};
use crate::error::{Error, Result};
use crate::schema::{FieldId, TableDef};
use crate::serializer::expr::table_def;
use crate::serializer::schema::{create_index, create_table};
use crate::serializer::{Bindings, Context, Serialize, comma_list, quote_ident};

/// Name of a column that must belong to `table`.
fn own_column<'t>(table: &'t TableDef, field: &FieldId) -> Result<&'t str> {
    table
        .find_column_name(field)
        .ok_or(Error::ColumnNotFound {
            table_type: field.owner_name,
            member: field.member,
        })
}

impl Serialize for Insert {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let table = table_def(&self.table, ctx)?;
        let inner = ctx
            .with_skip_table_name(true)
            .with_highest_level(false)
            .with_use_parentheses(false);

        let mut sql = if self.replace {
            String::from("REPLACE INTO ")
        } else {
            match self.or_action {
                Some(action) => format!("INSERT OR {} INTO ", action.as_str()),
                None => String::from("INSERT INTO "),
            }
        };
        sql.push_str(&quote_ident(table.name()));

        if !self.columns.is_empty() {
            let names = self
                .columns
                .iter()
                .map(|f| own_column(table, f).map(quote_ident))
                .collect::<Result<Vec<_>>>()?;
            sql.push_str(" (");
            sql.push_str(&names.join(", "));
            sql.push(')');
        }

        match &self.source {
            InsertSource::Values(rows) => {
                if rows.is_empty() {
                    return Err(Error::InvalidExpression(format!(
                        "INSERT INTO `{}` without rows",
                        table.name()
                    )));
                }
                let mut rendered = Vec::with_capacity(rows.len());
                for row in rows {
                    if !self.columns.is_empty() && row.len() != self.columns.len() {
                        return Err(Error::InvalidExpression(format!(
                            "INSERT INTO `{}` names {} columns but a row has {} values",
                            table.name(),
                            self.columns.len(),
                            row.len()
                        )));
                    }
                    rendered.push(format!("({})", comma_list(row, &inner, binds)?));
                }
                sql.push_str(" VALUES ");
                sql.push_str(&rendered.join(", "));
            }
            InsertSource::Query(query) => {
                sql.push(' ');
                sql.push_str(&query.serialize(&ctx.with_highest_level(true), binds)?);
            }
            InsertSource::DefaultValues => sql.push_str(" DEFAULT VALUES"),
        }
        Ok(sql)
    }
}

impl Serialize for Update {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let table = table_def(&self.table, ctx)?;
        if self.assignments.is_empty() {
            return Err(Error::InvalidExpression(format!(
                "UPDATE `{}` without assignments",
                table.name()
            )));
        }
        let inner = ctx
            .with_skip_table_name(true)
            .with_highest_level(false)
            .with_use_parentheses(false);
        let mut assignments = Vec::with_capacity(self.assignments.len());
        for (field, value) in &self.assignments {
            let name = quote_ident(own_column(table, field)?);
            assignments.push(format!("{name} = {}", value.serialize(&inner, binds)?));
        }
        let mut sql = format!(
            "UPDATE {} SET {}",
            quote_ident(table.name()),
            assignments.join(", ")
        );
        if let Some(condition) = &self.where_clause {
            sql.push_str(" WHERE ");
            sql.push_str(&condition.serialize(&inner, binds)?);
        }
        Ok(sql)
    }
}

impl Serialize for Delete {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        let table = table_def(&self.table, ctx)?;
        let mut sql = format!("DELETE FROM {}", quote_ident(table.name()));
        if let Some(condition) = &self.where_clause {
            let inner = ctx
                .with_skip_table_name(true)
                .with_highest_level(false)
                .with_use_parentheses(false);
            sql.push_str(" WHERE ");
            sql.push_str(&condition.serialize(&inner, binds)?);
        }
        Ok(sql)
    }
}

impl Serialize for Statement {
    fn serialize(&self, ctx: &Context<'_>, binds: &mut Bindings) -> Result<String> {
        match self {
            Self::Query(query) => query.serialize(ctx, binds),
            Self::Insert(insert) => insert.serialize(ctx, binds),
            Self::Update(update) => update.serialize(ctx, binds),
            Self::Delete(delete) => delete.serialize(ctx, binds),
            Self::CreateTable {
                table,
                if_not_exists,
            } => create_table(table_def(table, ctx)?, *if_not_exists, ctx),
            Self::CreateIndex {
                name,
                if_not_exists,
            } => create_index(ctx.schema().index(name)?, *if_not_exists, ctx),
            Self::DropTable { name, if_exists } => Ok(format!(
                "DROP TABLE {}{}",
                if *if_exists { "IF EXISTS " } else { "" },
                quote_ident(name)
            )),
            Self::DropIndex { name, if_exists } => Ok(format!(
                "DROP INDEX {}{}",
                if *if_exists { "IF EXISTS " } else { "" },
                quote_ident(name)
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::ConflictAction;
    use crate::builder::{
        Operand, drop_table_if_exists, insert_into, is_equal, remove_all, replace_into, select,
        update_all, val,
    };
    use crate::serializer::fixtures::{
        Post, User, post_title, post_user_id, schema, stray_id, user_age, user_id, user_name,
    };
    use crate::serializer::{prepare, serialize};
    use crate::value::Value;

    #[test]
    fn test_insert_values_rows() {
        let schema = schema();
        let insert = insert_into::<User>()
            .or(ConflictAction::Ignore)
            .columns((user_name(), user_age()))
            .values((val("ann"), val(30)))
            .values((val("bob"), val(Value::Null)));
        let prepared = prepare(&insert, &schema.context()).unwrap();
        assert_eq!(
            prepared.sql,
            "INSERT OR IGNORE INTO \"users\" (\"name\", \"age\") VALUES (?, ?), (?, ?)"
        );
        assert_eq!(prepared.params.len(), 4);
        assert_eq!(prepared.params[3], Value::Null);
    }

    #[test]
    fn test_insert_from_select_and_defaults() {
        let schema = schema();
        let ctx = schema.context();
        let insert = replace_into::<Post>()
            .columns(post_title())
            .select(select(user_name()));
        assert_eq!(
            serialize(&insert, &ctx).unwrap(),
            "REPLACE INTO \"posts\" (\"title\") SELECT \"users\".\"name\" FROM \"users\""
        );
        assert_eq!(
            serialize(&insert_into::<User>().default_values(), &ctx).unwrap(),
            "INSERT INTO \"users\" DEFAULT VALUES"
        );
    }

    #[test]
    fn test_insert_rejects_foreign_column() {
        let schema = schema();
        let insert = insert_into::<User>().columns(post_user_id()).values((1,));
        assert!(matches!(
            serialize(&insert, &schema.context()),
            Err(Error::ColumnNotFound { .. })
        ));
        assert!(matches!(
            serialize(&insert_into::<User>(), &schema.context()),
            Err(Error::InvalidExpression(_))
        ));
    }

    #[test]
    fn test_update_and_delete_skip_table_names() {
        let schema = schema();
        let ctx = schema.context().with_replace_bindable_with_question(false);
        let update = update_all::<User>()
            .set(user_name(), "x")
            .set(user_age(), user_age().add(1))
            .where_(is_equal(user_id(), 5));
        assert_eq!(
            serialize(&update, &ctx).unwrap(),
            "UPDATE \"users\" SET \"name\" = 'x', \"age\" = (\"age\" + 1) WHERE (\"id\" = 5)"
        );
        let delete = remove_all::<User>().where_(user_id().gt(3));
        assert_eq!(
            serialize(&delete, &ctx).unwrap(),
            "DELETE FROM \"users\" WHERE (\"id\" > 3)"
        );
    }

    #[test]
    fn test_unmapped_table_fails() {
        let schema = schema();
        let delete = remove_all::<crate::serializer::fixtures::Stray>()
            .where_(is_equal(stray_id(), 1));
        assert_eq!(
            serialize(&delete, &schema.context()).unwrap_err(),
            Error::TableNotFound("Stray")
        );
    }

    #[test]
    fn test_drop_statements() {
        let schema = schema();
        assert_eq!(
            serialize(&drop_table_if_exists("users"), &schema.context()).unwrap(),
            "DROP TABLE IF EXISTS \"users\""
        );
    }
}
