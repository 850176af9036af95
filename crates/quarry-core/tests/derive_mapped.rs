use quarry_core::ast::Collation;
use quarry_core::schema::{
    ColumnConstraint, DataType, DefaultValue, FieldId, Schema, make_column, make_table,
};
use quarry_core::{Error, Value};
use quarry_derive::Mapped;

#[derive(Debug, Default, Clone, PartialEq, Mapped)]
struct BlogPost {
    #[column(primary_key, autoincrement)]
    id: i64,
    #[column(name = "headline", collate = "rtrim")]
    title: String,
    #[column(default = "draft")]
    state: String,
    #[column(collate = "my_collation")]
    slug: String,
    score: Option<f64>,
    published: bool,
}

fn schema() -> Schema {
    Schema::builder().table(BlogPost::table()).build().unwrap()
}

fn sample() -> BlogPost {
    BlogPost {
        id: 7,
        title: "Hello".into(),
        state: "live".into(),
        slug: "hello".into(),
        score: None,
        published: true,
    }
}

#[test]
fn test_table_name_defaults_to_snake_case() {
    assert_eq!(BlogPost::table().name(), "blog_post");
}

#[test]
fn test_field_handles_identify_members() {
    let id: FieldId = BlogPost::title().into();
    assert_eq!(id, FieldId::of::<BlogPost>("title"));
    assert_eq!(id.member, "title");
    assert_ne!(id, BlogPost::slug().id());

    let mut post = sample();
    assert_eq!(BlogPost::title().get(&post), "Hello");
    BlogPost::score().set(&mut post, Some(2.5));
    assert_eq!(post.score, Some(2.5));
}

#[test]
fn test_column_declarations() {
    let schema = schema();
    let table = schema.table::<BlogPost>().unwrap();
    let columns = table.def().columns();
    let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
    assert_eq!(names, ["id", "headline", "state", "slug", "score", "published"]);

    assert!(columns[0].is_primary_key());
    assert_eq!(columns[1].data_type(), DataType::Text);
    assert_eq!(
        columns[1].constraints(),
        [ColumnConstraint::Collate(Collation::RTrim)]
    );
    assert_eq!(
        columns[2].default_value(),
        Some(&DefaultValue::Value(Value::Text("draft".into())))
    );
    assert_eq!(
        columns[3].constraints(),
        [ColumnConstraint::Collate(Collation::Custom("my_collation".into()))]
    );
    assert!(columns[4].is_nullable());
    assert_eq!(columns[4].data_type(), DataType::Real);
    assert!(!columns[5].is_nullable());
    assert_eq!(columns[5].data_type(), DataType::Integer);

    assert_eq!(
        schema.find_column_name(&BlogPost::title().id()).unwrap(),
        "headline"
    );
    assert_eq!(table.def().rowid_alias().map(|c| c.name()), Some("id"));
}

#[test]
fn test_values_and_populate_follow_declaration_order() {
    let schema = schema();
    let table = schema.table::<BlogPost>().unwrap();
    let post = sample();
    let values = table.values(&post);
    assert_eq!(
        values,
        vec![
            Value::Integer(7),
            Value::Text("Hello".into()),
            Value::Text("live".into()),
            Value::Text("hello".into()),
            Value::Null,
            Value::Integer(1),
        ]
    );

    let mut loaded = BlogPost::default();
    table.populate(&mut loaded, values).unwrap();
    assert_eq!(loaded, post);

    table
        .set_by_name(&mut loaded, "headline", Value::Text("Renamed".into()))
        .unwrap();
    assert_eq!(loaded.title, "Renamed");
    assert!(table.populate(&mut loaded, vec![Value::Null]).is_err());
}

#[test]
fn test_handles_of_unmapped_type_do_not_resolve() {
    let schema = schema();
    let stranger = FieldId::of::<String>("len");
    assert!(matches!(
        schema.find_column_name(&stranger),
        Err(Error::ColumnNotFound { table_type: "String", member: "len" })
    ));
}

#[test]
fn test_handles_work_with_hand_written_tables() {
    let table = make_table(
        "posts",
        vec![
            make_column("pk", BlogPost::id(), []),
            make_column("t", BlogPost::title(), []),
        ],
    );
    assert_eq!(table.def().columns()[1].name(), "t");
    assert_eq!(table.value_at(0, &sample()), Some(Value::Integer(7)));
}
