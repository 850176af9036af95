use quarry_core::builder::{
    Operand, count, cte, cte_field, except, in_query, limit, max, offset_limit, on, order_by,
    select, select_distinct, table, union, val, with,
};
use quarry_core::schema::Schema;
use quarry_core::serializer::{prepare, serialize};
use quarry_core::Value;
use quarry_derive::Mapped;

#[derive(Debug, Default, Clone, Mapped)]
#[table(name = "users")]
struct User {
    #[column(primary_key, autoincrement)]
    id: i64,
    name: String,
}

#[derive(Debug, Default, Clone, Mapped)]
#[table(name = "posts")]
struct Post {
    #[column(primary_key)]
    id: i64,
    author: i64,
    title: String,
}

fn schema() -> Schema {
    Schema::builder()
        .table(User::table())
        .table(Post::table())
        .build()
        .unwrap()
}

#[test]
fn test_from_is_derived_from_referenced_columns() {
    let schema = schema();
    let query = select(Post::title()).where_(Post::author().eq(User::id()));
    assert_eq!(
        serialize(&query, &schema.context()).unwrap(),
        "SELECT \"posts\".\"title\" FROM \"posts\", \"users\" \
         WHERE (\"posts\".\"author\" = \"users\".\"id\")"
    );
}

#[test]
fn test_explicit_from_overrides_derivation() {
    let schema = schema();
    let query = select(val(1)).from(table::<User>());
    assert_eq!(
        serialize(&query, &schema.context().with_replace_bindable_with_question(false))
            .unwrap(),
        "SELECT 1 FROM \"users\""
    );
}

#[test]
fn test_joins_render_in_declaration_order() {
    let schema = schema();
    let query = select((User::name(), count(Post::id())))
        .left_join(table::<Post>(), on(Post::author().eq(User::id())))
        .group_by(User::name())
        .having(count(Post::id()).gt_eq(1));
    let prepared = prepare(&query, &schema.context()).unwrap();
    assert_eq!(
        prepared.sql,
        "SELECT \"users\".\"name\", COUNT(\"posts\".\"id\") FROM \"users\" \
         LEFT JOIN \"posts\" ON (\"posts\".\"author\" = \"users\".\"id\") \
         GROUP BY \"users\".\"name\" HAVING (COUNT(\"posts\".\"id\") >= ?)"
    );
    assert_eq!(prepared.params, vec![Value::Integer(1)]);

    let cross = select((User::name(), Post::title())).cross_join(table::<Post>());
    assert_eq!(
        serialize(&cross, &schema.context()).unwrap(),
        "SELECT \"users\".\"name\", \"posts\".\"title\" FROM \"users\" CROSS JOIN \"posts\""
    );
}

#[test]
fn test_limit_variants() {
    let schema = schema();
    let ctx = schema.context().with_replace_bindable_with_question(false);
    let base = || select(User::id()).order_by(order_by(User::id()));
    assert_eq!(
        serialize(&base().limit(limit(5)), &ctx).unwrap(),
        "SELECT \"users\".\"id\" FROM \"users\" ORDER BY \"users\".\"id\" LIMIT 5"
    );
    assert_eq!(
        serialize(&base().limit(offset_limit(10, 5)), &ctx).unwrap(),
        "SELECT \"users\".\"id\" FROM \"users\" ORDER BY \"users\".\"id\" LIMIT 10, 5"
    );
    assert_eq!(
        serialize(&base().limit(limit(5).offset(10)), &ctx).unwrap(),
        "SELECT \"users\".\"id\" FROM \"users\" ORDER BY \"users\".\"id\" LIMIT 5 OFFSET 10"
    );
}

#[test]
fn test_limit_binds_after_where() {
    let schema = schema();
    let query = select(User::name())
        .where_(User::name().like("j%"))
        .limit(limit(5).offset(10));
    let prepared = prepare(&query, &schema.context()).unwrap();
    assert_eq!(
        prepared.sql,
        "SELECT \"users\".\"name\" FROM \"users\" WHERE \"users\".\"name\" LIKE ? \
         LIMIT ? OFFSET ?"
    );
    assert_eq!(
        prepared.params,
        vec![
            Value::Text("j%".into()),
            Value::Integer(5),
            Value::Integer(10),
        ]
    );
}

#[test]
fn test_distinct_and_compounds() {
    let schema = schema();
    let ctx = schema.context();
    assert_eq!(
        serialize(&select_distinct(User::name()), &ctx).unwrap(),
        "SELECT DISTINCT \"users\".\"name\" FROM \"users\""
    );
    assert_eq!(
        serialize(&union(select(User::id()), select(Post::author())), &ctx).unwrap(),
        "SELECT \"users\".\"id\" FROM \"users\" UNION SELECT \"posts\".\"author\" FROM \"posts\""
    );
    assert_eq!(
        serialize(&except(select(User::id()), select(Post::author())), &ctx).unwrap(),
        "SELECT \"users\".\"id\" FROM \"users\" EXCEPT SELECT \"posts\".\"author\" FROM \"posts\""
    );
}

#[test]
fn test_subquery_in_condition() {
    let schema = schema();
    let query = select(User::name()).where_(in_query(
        User::id(),
        select(Post::author()).where_(Post::title().eq("hello")),
    ));
    let prepared = prepare(&query, &schema.context()).unwrap();
    assert_eq!(
        prepared.sql,
        "SELECT \"users\".\"name\" FROM \"users\" WHERE \"users\".\"id\" IN \
         (SELECT \"posts\".\"author\" FROM \"posts\" WHERE (\"posts\".\"title\" = ?))"
    );
    assert_eq!(prepared.params, vec![Value::Text("hello".into())]);
}

#[test]
fn test_cte_reexposes_fields_under_its_own_name() {
    let schema = schema();
    let latest = cte("latest").as_(select((Post::author(), max(Post::id()))).group_by(Post::author()));
    let query = with(latest, select(cte_field("latest", Post::author())));
    assert_eq!(
        serialize(&query, &schema.context()).unwrap(),
        "WITH \"latest\" AS (SELECT \"posts\".\"author\", MAX(\"posts\".\"id\") FROM \"posts\" \
         GROUP BY \"posts\".\"author\") \
         SELECT \"latest\".\"author\" FROM \"latest\""
    );
}
