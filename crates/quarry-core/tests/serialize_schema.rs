use quarry_core::builder::{
    create_table, create_table_if_not_exists, drop_index, drop_table_if_exists,
};
use quarry_core::schema::{
    Schema, autoincrement, default_value, make_column, make_index, make_table, make_unique_index,
    primary_key,
};
use quarry_core::serializer::serialize;
use quarry_core::Error;
use quarry_derive::Mapped;

#[derive(Debug, Default, Clone, Mapped)]
#[table(name = "accounts")]
struct Account {
    #[column(name = "account_id", primary_key, autoincrement)]
    id: i64,
    #[column(unique, collate = "nocase")]
    email: String,
    #[column(default = 0.5)]
    balance: f64,
    nickname: Option<String>,
}

#[derive(Debug, Default, Clone, Mapped)]
#[table(without_rowid)]
struct Setting {
    #[column(primary_key)]
    key: String,
    value: Option<String>,
}

fn schema() -> Schema {
    Schema::builder()
        .table(Account::table())
        .table(Setting::table())
        .index(make_unique_index("idx_accounts_email", Account::email()))
        .index(make_index("idx_setting_value", Setting::value()).where_(
            quarry_core::builder::is_not_null(Setting::value()),
        ))
        .build()
        .unwrap()
}

#[test]
fn test_derived_table_ddl() {
    let schema = schema();
    let ctx = schema.context();
    assert_eq!(
        serialize(&create_table::<Account>(), &ctx).unwrap(),
        "CREATE TABLE \"accounts\" (\"account_id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
         \"email\" TEXT UNIQUE COLLATE NOCASE NOT NULL, \
         \"balance\" REAL DEFAULT 0.5 NOT NULL, \"nickname\" TEXT)"
    );
    assert_eq!(
        serialize(&create_table_if_not_exists::<Setting>(), &ctx).unwrap(),
        "CREATE TABLE IF NOT EXISTS \"setting\" (\"key\" TEXT PRIMARY KEY NOT NULL, \
         \"value\" TEXT) WITHOUT ROWID"
    );
}

#[test]
fn test_autoincrement_is_moved_after_primary_key() {
    let schema = Schema::builder()
        .table(make_table(
            "accounts",
            vec![
                make_column("id", Account::id(), [autoincrement(), primary_key()]),
                make_column("email", Account::email(), []),
                make_column("balance", Account::balance(), []),
                make_column("nickname", Account::nickname(), []),
            ],
        ))
        .build()
        .unwrap();
    assert_eq!(
        serialize(&create_table::<Account>(), &schema.context()).unwrap(),
        "CREATE TABLE \"accounts\" (\"id\" INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL, \
         \"email\" TEXT NOT NULL, \"balance\" REAL NOT NULL, \"nickname\" TEXT)"
    );
}

#[test]
fn test_create_statements_cover_tables_then_indexes() {
    let schema = schema();
    let ctx = schema.context();
    let rendered: Vec<String> = schema
        .create_statements(true)
        .iter()
        .map(|statement| serialize(statement, &ctx).unwrap())
        .collect();
    assert_eq!(rendered.len(), 4);
    assert!(rendered[0].starts_with("CREATE TABLE IF NOT EXISTS \"accounts\""));
    assert!(rendered[1].starts_with("CREATE TABLE IF NOT EXISTS \"setting\""));
    assert_eq!(
        rendered[2],
        "CREATE UNIQUE INDEX IF NOT EXISTS \"idx_accounts_email\" ON \"accounts\" (\"email\")"
    );
    assert_eq!(
        rendered[3],
        "CREATE INDEX IF NOT EXISTS \"idx_setting_value\" ON \"setting\" (\"value\") \
         WHERE \"value\" IS NOT NULL"
    );
}

#[test]
fn test_ddl_never_binds_parameters() {
    let schema = schema();
    let prepared =
        quarry_core::prepare(&create_table::<Account>(), &schema.context()).unwrap();
    assert!(prepared.params.is_empty());
    assert!(prepared.sql.contains("DEFAULT 0.5"));
}

#[test]
fn test_drop_statements() {
    let schema = schema();
    let ctx = schema.context();
    assert_eq!(
        serialize(&drop_table_if_exists("accounts"), &ctx).unwrap(),
        "DROP TABLE IF EXISTS \"accounts\""
    );
    assert_eq!(
        serialize(&drop_index("idx_accounts_email"), &ctx).unwrap(),
        "DROP INDEX \"idx_accounts_email\""
    );
}

#[test]
fn test_duplicate_table_names_are_rejected() {
    let result = Schema::builder()
        .table(Account::table())
        .table(make_table(
            "accounts",
            vec![make_column("key", Setting::key(), [primary_key()])],
        ))
        .build();
    assert!(matches!(result, Err(Error::InvalidSchema(_))));
}

#[test]
fn test_infinite_default_renders_as_number() {
    let schema = Schema::builder()
        .table(make_table(
            "accounts",
            vec![
                make_column("id", Account::id(), [primary_key()]),
                make_column("email", Account::email(), []),
                make_column("balance", Account::balance(), [default_value(f64::INFINITY)]),
                make_column("nickname", Account::nickname(), []),
            ],
        ))
        .build()
        .unwrap();
    let sql = serialize(&create_table::<Account>(), &schema.context()).unwrap();
    assert!(sql.contains("\"balance\" REAL DEFAULT 9e999 NOT NULL"));
}
