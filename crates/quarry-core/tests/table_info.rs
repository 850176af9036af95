use quarry_core::builder::{lower, val};
use quarry_core::introspect::{ColumnInfo, SyncStatus, UNASSIGNED_CID, diff_table, sync_status};
use quarry_core::schema::{
    Schema, default_expr, default_value, make_column, make_table, primary_key_columns,
};
use quarry_derive::Mapped;

#[derive(Debug, Default, Clone, Mapped)]
#[table(name = "users")]
struct User {
    #[column(primary_key, autoincrement)]
    id: i64,
    #[column(unique)]
    email: String,
    #[column(default = 18)]
    age: i64,
    bio: Option<String>,
}

#[derive(Debug, Default, Clone)]
struct Membership {
    user_id: i64,
    group_id: i64,
    role: String,
}

fn membership_user(m: &Membership) -> &i64 {
    &m.user_id
}
fn membership_user_mut(m: &mut Membership) -> &mut i64 {
    &mut m.user_id
}
fn membership_group(m: &Membership) -> &i64 {
    &m.group_id
}
fn membership_group_mut(m: &mut Membership) -> &mut i64 {
    &mut m.group_id
}
fn membership_role(m: &Membership) -> &String {
    &m.role
}
fn membership_role_mut(m: &mut Membership) -> &mut String {
    &mut m.role
}

fn schema() -> Schema {
    let user_id = quarry_core::Field::member("user_id", membership_user, membership_user_mut);
    let group_id = quarry_core::Field::member("group_id", membership_group, membership_group_mut);
    let role = quarry_core::Field::member("role", membership_role, membership_role_mut);
    Schema::builder()
        .table(User::table())
        .table(
            make_table(
                "memberships",
                vec![
                    make_column("user_id", user_id, []),
                    make_column("group_id", group_id, []),
                    make_column("role", role, [default_expr(lower(val("MEMBER")))]),
                ],
            )
            .constraint(primary_key_columns((group_id, user_id))),
        )
        .build()
        .unwrap()
}

fn live(cid: i64, name: &str, data_type: &str, not_null: bool, default: Option<&str>, pk: i64) -> ColumnInfo {
    ColumnInfo {
        cid,
        name: name.into(),
        data_type: data_type.into(),
        not_null,
        default_value: default.map(String::from),
        pk,
    }
}

#[test]
fn test_descriptors_follow_declaration_order() {
    let schema = schema();
    let def = schema.table::<User>().unwrap().def();
    let info = schema.table_info(def).unwrap();
    assert_eq!(
        info,
        vec![
            live(UNASSIGNED_CID, "id", "INTEGER", true, None, 1),
            live(UNASSIGNED_CID, "email", "TEXT", true, None, 0),
            live(UNASSIGNED_CID, "age", "INTEGER", true, Some("18"), 0),
            live(UNASSIGNED_CID, "bio", "TEXT", false, None, 0),
        ]
    );
}

#[test]
fn test_composite_key_ranks_follow_key_order() {
    let schema = schema();
    let def = schema.table_def_by_name("memberships").unwrap();
    let info = schema.table_info(def).unwrap();
    let ranks: Vec<(&str, i64)> = info.iter().map(|c| (c.name.as_str(), c.pk)).collect();
    assert_eq!(ranks, [("user_id", 2), ("group_id", 1), ("role", 0)]);
    assert_eq!(info[2].default_value.as_deref(), Some("(LOWER('MEMBER'))"));
}

#[test]
fn test_live_table_with_renamed_type_is_in_sync() {
    let schema = schema();
    let expected = schema
        .table_info(schema.table::<User>().unwrap().def())
        .unwrap();
    let current = vec![
        live(0, "id", "INT", true, None, 1),
        live(1, "email", "VARCHAR(80)", true, None, 0),
        live(2, "age", "BIGINT", true, Some("21"), 0),
        live(3, "bio", "CLOB", false, None, 0),
    ];
    assert!(diff_table(&expected, &current).is_empty());
    assert_eq!(
        sync_status(&expected, Some(current.as_slice())),
        SyncStatus::AlreadyInSync
    );
}

#[test]
fn test_drift_classification() {
    let schema = schema();
    let expected = schema
        .table_info(schema.table::<User>().unwrap().def())
        .unwrap();

    // bio is nullable, so it can be appended.
    let without_bio = vec![
        live(0, "id", "INTEGER", true, None, 1),
        live(1, "email", "TEXT", true, None, 0),
        live(2, "age", "INTEGER", true, Some("18"), 0),
    ];
    assert_eq!(
        sync_status(&expected, Some(without_bio.as_slice())),
        SyncStatus::NewColumnsAdded
    );

    // email is NOT NULL without a default.
    let without_email = vec![
        live(0, "id", "INTEGER", true, None, 1),
        live(1, "age", "INTEGER", true, Some("18"), 0),
        live(2, "bio", "TEXT", false, None, 0),
        live(3, "legacy", "TEXT", false, None, 0),
    ];
    let diff = diff_table(&expected, &without_email);
    assert_eq!(diff.added[0].name, "email");
    assert_eq!(diff.removed[0].name, "legacy");
    assert_eq!(diff.status(), SyncStatus::DroppedAndRecreated);

    let lost_default = vec![
        live(0, "id", "INTEGER", true, None, 1),
        live(1, "email", "TEXT", true, None, 0),
        live(2, "age", "INTEGER", true, None, 0),
        live(3, "bio", "TEXT", false, None, 0),
    ];
    let diff = diff_table(&expected, &lost_default);
    assert_eq!(diff.changed.len(), 1);
    assert_eq!(diff.changed[0].0.name, "age");
    assert_eq!(diff.status(), SyncStatus::DroppedAndRecreated);
}

#[test]
fn test_literal_defaults_use_inline_text() {
    let schema = Schema::builder()
        .table(make_table(
            "users",
            vec![
                make_column("id", User::id(), []),
                make_column("email", User::email(), [default_value("it's")]),
                make_column("age", User::age(), [default_value(1.0)]),
                make_column("bio", User::bio(), []),
            ],
        ))
        .build()
        .unwrap();
    let info = schema
        .table_info(schema.table::<User>().unwrap().def())
        .unwrap();
    assert_eq!(info[0].pk, 0);
    assert_eq!(info[1].default_value.as_deref(), Some("'it''s'"));
    assert_eq!(info[2].default_value.as_deref(), Some("1.0"));
}
