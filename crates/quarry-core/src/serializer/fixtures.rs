//! Mapped types shared by the serializer unit tests.

use crate::schema::{
    Field, Schema, autoincrement, make_column, make_index, make_table, primary_key, references,
};

#[derive(Debug, Default, Clone)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub age: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
}

/// A type that no table maps.
#[derive(Debug, Default, Clone)]
pub struct Stray {
    pub id: i64,
}

fn user_id_ref(u: &User) -> &i64 {
    &u.id
}
fn user_id_mut(u: &mut User) -> &mut i64 {
    &mut u.id
}
fn user_name_ref(u: &User) -> &String {
    &u.name
}
fn user_name_mut(u: &mut User) -> &mut String {
    &mut u.name
}
fn user_age_ref(u: &User) -> &Option<i64> {
    &u.age
}
fn user_age_mut(u: &mut User) -> &mut Option<i64> {
    &mut u.age
}
fn post_id_ref(p: &Post) -> &i64 {
    &p.id
}
fn post_id_mut(p: &mut Post) -> &mut i64 {
    &mut p.id
}
fn post_user_ref(p: &Post) -> &i64 {
    &p.user_id
}
fn post_user_mut(p: &mut Post) -> &mut i64 {
    &mut p.user_id
}
fn post_title_ref(p: &Post) -> &String {
    &p.title
}
fn post_title_mut(p: &mut Post) -> &mut String {
    &mut p.title
}
fn stray_id_ref(s: &Stray) -> &i64 {
    &s.id
}
fn stray_id_mut(s: &mut Stray) -> &mut i64 {
    &mut s.id
}

pub fn user_id() -> Field<User, i64> {
    Field::member("id", user_id_ref, user_id_mut)
}
pub fn user_name() -> Field<User, String> {
    Field::member("name", user_name_ref, user_name_mut)
}
pub fn user_age() -> Field<User, Option<i64>> {
    Field::member("age", user_age_ref, user_age_mut)
}
pub fn post_id() -> Field<Post, i64> {
    Field::member("id", post_id_ref, post_id_mut)
}
pub fn post_user_id() -> Field<Post, i64> {
    Field::member("user_id", post_user_ref, post_user_mut)
}
pub fn post_title() -> Field<Post, String> {
    Field::member("title", post_title_ref, post_title_mut)
}
pub fn stray_id() -> Field<Stray, i64> {
    Field::member("id", stray_id_ref, stray_id_mut)
}

/// `users(id PK AUTOINCREMENT, name, age)` and `posts(id PK, user_id -> users.id, title)`.
pub fn schema() -> Schema {
    Schema::builder()
        .table(make_table(
            "users",
            vec![
                make_column("id", user_id(), [primary_key(), autoincrement()]),
                make_column("name", user_name(), []),
                make_column("age", user_age(), []),
            ],
        ))
        .table(make_table(
            "posts",
            vec![
                make_column("id", post_id(), [primary_key()]),
                make_column("user_id", post_user_id(), [references(user_id())]),
                make_column("title", post_title(), []),
            ],
        ))
        .index(make_index("idx_posts_title", post_title()))
        .build()
        .unwrap()
}
